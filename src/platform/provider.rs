//! Location provider seam.

use async_trait::async_trait;

use crate::error::ProviderError;

/// One raw speed sample from the platform, before any formatting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedSample {
    /// Ground speed in meters per second.
    pub meters_per_second: f64,
}

/// Access to the platform's location stack.
///
/// Implementations wrap whatever the host platform offers (a GPS daemon, a
/// location manager binding). The service core only ever:
/// - queries [`is_enabled`](LocationProvider::is_enabled) from the dispatch
///   loop when a provider-changed signal arrives, and
/// - polls the two `sample_*` methods from producer tasks on the worker
///   thread.
///
/// `is_enabled` must be cheap and non-blocking; it runs on the dispatch loop.
/// An `Err(PermissionDenied)` from it is treated as "provider disabled" by
/// the control receiver, never propagated.
#[async_trait]
pub trait LocationProvider: Send + Sync + 'static {
    /// Reports whether the required location provider is currently enabled.
    fn is_enabled(&self) -> Result<bool, ProviderError>;

    /// Polls one speed sample. `Ok(None)` means no fix yet.
    async fn sample_speed(&self) -> Result<Option<SpeedSample>, ProviderError>;

    /// Polls the current count of satellites in view.
    async fn sample_satellites(&self) -> Result<u32, ProviderError>;
}
