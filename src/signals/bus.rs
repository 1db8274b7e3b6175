//! # Broadcast bus for control signals.
//!
//! [`SignalBus`] is a thin wrapper around [`tokio::sync::broadcast`] that
//! carries [`ControlSignal`]s from platform glue (the notification's stop
//! action, provider-changed broadcasts) to the service dispatch loop.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; if nobody is
//!   subscribed the signal is dropped, which is exactly what a signal arriving
//!   while the service is Stopped deserves.
//! - **No replay**: a subscriber only observes signals published after it
//!   subscribed. The service subscribes per session, so signals from before
//!   start() never leak into a session.
//! - **Lag handling**: a slow subscriber observes `RecvError::Lagged(n)` and
//!   skips the `n` oldest signals.

use tokio::sync::broadcast;

use super::signal::ControlSignal;

/// Broadcast channel for control signals.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); every clone
/// publishes into the same channel.
#[derive(Clone, Debug)]
pub struct SignalBus {
    tx: broadcast::Sender<ControlSignal>,
}

impl SignalBus {
    /// Creates a new bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes a signal to all active subscribers.
    ///
    /// Returns immediately. With no subscribers the signal is dropped.
    pub fn publish(&self, signal: ControlSignal) {
        let _ = self.tx.send(signal);
    }

    /// Creates a new receiver observing subsequent signals only.
    pub fn subscribe(&self) -> broadcast::Receiver<ControlSignal> {
        self.tx.subscribe()
    }
}
