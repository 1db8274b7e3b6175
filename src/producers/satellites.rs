//! Satellite-count producer.
//!
//! Same polling discipline as the speed producer, minus the formatting: the
//! count is published as-is, and a failed sample degrades to zero satellites.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::platform::LocationProvider;
use crate::producers::Producer;
use crate::readings::StateCell;

/// Background poller producing satellite counts.
pub struct SatelliteCountProducer {
    provider: Arc<dyn LocationProvider>,
    cell: StateCell<u32>,
    interval: Duration,
}

impl SatelliteCountProducer {
    /// Creates a producer publishing into `cell` every `interval`.
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        cell: StateCell<u32>,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            cell,
            interval,
        }
    }
}

#[async_trait]
impl Producer for SatelliteCountProducer {
    fn name(&self) -> &str {
        "satellite-count"
    }

    async fn run(&self, token: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            match self.provider.sample_satellites().await {
                Ok(count) => self.cell.set(count),
                Err(e) => {
                    debug!(error = %e, label = e.as_label(), "satellite sample failed");
                    self.cell.set(0);
                }
            }
        }
    }
}
