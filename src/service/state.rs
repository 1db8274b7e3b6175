//! Service lifecycle state.

/// Lifecycle state of the listening service.
///
/// Exactly one instance exists per service; transitions happen only inside
/// the dispatch loop, so observers never see a state mid-transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    /// No session active. Initial state, and terminal after teardown.
    Stopped,
    /// A session is active: both producers running, receiver registered,
    /// notification posted.
    Started,
}

impl ServiceState {
    /// Returns `true` for [`ServiceState::Started`].
    pub fn is_started(self) -> bool {
        matches!(self, ServiceState::Started)
    }
}
