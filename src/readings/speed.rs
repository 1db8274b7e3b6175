//! A single computed speed reading.

use std::sync::Arc;

/// One speed measurement produced by the speed producer.
///
/// Immutable once created; a newer reading supersedes it, nothing mutates it.
/// "No signal yet" is represented as the absence of a reading
/// (`Option<SpeedReading>` in the observable cell), not as a variant here.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedReading {
    /// Raw speed in meters per second, as reported by the provider.
    pub meters_per_second: f64,
    /// Producer-formatted display string, e.g. `"42 km/h"`.
    ///
    /// This is what the notification title shows verbatim.
    pub display: Arc<str>,
}

impl SpeedReading {
    /// Creates a new reading.
    pub fn new(meters_per_second: f64, display: impl Into<Arc<str>>) -> Self {
        Self {
            meters_per_second,
            display: display.into(),
        }
    }
}
