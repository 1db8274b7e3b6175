//! Commands and broadcast signals consumed by the service.
//!
//! [`Command`]s are direct orders delivered to the dispatch loop through the
//! service handle. [`ControlSignal`]s arrive asynchronously over the
//! [`SignalBus`](crate::SignalBus) and are translated into a stop decision by
//! the control receiver while the service is Started.

/// Direct command accepted by the service entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Begin a listening session.
    Start,
    /// End the current listening session and tear the service down.
    Stop,
}

impl Command {
    /// Parses a platform action string into a command.
    ///
    /// Unrecognized actions map to `None` and are ignored by the dispatcher.
    ///
    /// # Example
    /// ```
    /// use speedwatch::Command;
    ///
    /// assert_eq!(Command::parse("START"), Some(Command::Start));
    /// assert_eq!(Command::parse("REBOOT"), None);
    /// ```
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "START" => Some(Command::Start),
            "STOP" => Some(Command::Stop),
            _ => None,
        }
    }
}

/// Asynchronous signal delivered over the signal bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlSignal {
    /// Explicit stop request (the notification's stop action, or app glue).
    StopRequest,
    /// The set of enabled location providers changed.
    ProviderEnablementChanged,
    /// The platform location mode changed.
    ProviderModeChanged,
}
