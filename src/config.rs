//! Global service configuration.
//!
//! [`Config`] controls the producer sampling cadence and the capacities of
//! the two control-plane channels. The read-only user preferences consumed by
//! the speed producer live behind
//! [`PreferenceStore`](crate::PreferenceStore) instead; they belong to the
//! platform environment, not to this struct.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use speedwatch::Config;
//!
//! let mut cfg = Config::default();
//! cfg.poll_interval = Duration::from_millis(500);
//!
//! assert_eq!(cfg.signal_capacity, 16);
//! ```

use std::time::Duration;

/// Configuration for the service core.
#[derive(Clone, Debug)]
pub struct Config {
    /// Cadence at which both producers poll the location provider.
    pub poll_interval: Duration,
    /// Capacity of the broadcast signal bus.
    pub signal_capacity: usize,
    /// Capacity of the command queue feeding the dispatch loop.
    pub command_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `poll_interval = 1s`
    /// - `signal_capacity = 16`
    /// - `command_capacity = 8`
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            signal_capacity: 16,
            command_capacity: 8,
        }
    }
}
