//! # Speed producer.
//!
//! Polls [`LocationProvider::sample_speed`] on the configured cadence and
//! publishes [`SpeedReading`]s into the speed cell. The display string is
//! formatted here using the user's `speed_unit` preference; the rest of the
//! crate treats it as opaque text.
//!
//! ## Rules
//! - `Ok(None)` (no fix) and sampling errors both publish "no reading";
//!   errors are logged at debug level and never propagate.
//! - The preference store is consulted per sample, so a unit change takes
//!   effect on the next reading without restarting the session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::platform::{LocationProvider, PreferenceStore, SpeedSample};
use crate::producers::Producer;
use crate::readings::{SpeedReading, StateCell};

/// Preference key selecting the display unit: `km/h` (default), `mph`, `m/s`.
pub const SPEED_UNIT_KEY: &str = "speed_unit";

/// Background poller producing speed readings.
pub struct SpeedProducer {
    provider: Arc<dyn LocationProvider>,
    prefs: Arc<dyn PreferenceStore>,
    cell: StateCell<Option<SpeedReading>>,
    interval: Duration,
}

impl SpeedProducer {
    /// Creates a producer publishing into `cell` every `interval`.
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        prefs: Arc<dyn PreferenceStore>,
        cell: StateCell<Option<SpeedReading>>,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            prefs,
            cell,
            interval,
        }
    }

    fn reading_from(&self, sample: SpeedSample) -> SpeedReading {
        let unit = self
            .prefs
            .get(SPEED_UNIT_KEY)
            .unwrap_or_else(|| "km/h".to_string());
        let display = format_speed(sample.meters_per_second, &unit);
        SpeedReading::new(sample.meters_per_second, display)
    }
}

/// Formats a speed in `unit` ("km/h", "mph" or "m/s"; anything else falls
/// back to km/h).
fn format_speed(meters_per_second: f64, unit: &str) -> String {
    let (value, unit) = match unit {
        "mph" => (meters_per_second * 2.236_936, "mph"),
        "m/s" => (meters_per_second, "m/s"),
        _ => (meters_per_second * 3.6, "km/h"),
    };
    format!("{value:.0} {unit}")
}

#[async_trait]
impl Producer for SpeedProducer {
    fn name(&self) -> &str {
        "speed"
    }

    async fn run(&self, token: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            match self.provider.sample_speed().await {
                Ok(Some(sample)) => self.cell.set(Some(self.reading_from(sample))),
                Ok(None) => self.cell.set(None),
                Err(e) => {
                    debug!(error = %e, label = e.as_label(), "speed sample failed");
                    self.cell.set(None);
                }
            }
        }
    }
}
