//! # Control receiver: signal → stop decision.
//!
//! The receiver exists only while a session is active (it lives inside the
//! session, so "registered iff Started" holds by construction). It translates
//! each [`ControlSignal`] into a verdict:
//!
//! - `StopRequest` → stop unconditionally.
//! - provider enablement/mode changed → query the provider; stop if it is no
//!   longer enabled. A failed query (permission revoked) counts as disabled:
//!   without the provider, further readings are impossible, so the service
//!   must self-terminate rather than sit idle.

use std::sync::Arc;

use tracing::warn;

use crate::platform::LocationProvider;
use crate::signals::ControlSignal;

/// Session-scoped translator from control signals to stop decisions.
pub(crate) struct ControlReceiver {
    provider: Arc<dyn LocationProvider>,
}

impl ControlReceiver {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self { provider }
    }

    /// Returns `true` if the signal requires the service to stop.
    pub fn wants_stop(&self, signal: ControlSignal) -> bool {
        match signal {
            ControlSignal::StopRequest => true,
            ControlSignal::ProviderEnablementChanged | ControlSignal::ProviderModeChanged => {
                match self.provider.is_enabled() {
                    Ok(enabled) => !enabled,
                    Err(e) => {
                        warn!(
                            error = %e,
                            label = e.as_label(),
                            "provider enablement query failed; treating provider as disabled"
                        );
                        true
                    }
                }
            }
        }
    }
}
