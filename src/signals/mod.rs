//! Control-plane commands, broadcast signals, and the signal bus.

mod bus;
mod signal;

pub use bus::SignalBus;
pub use signal::{Command, ControlSignal};
