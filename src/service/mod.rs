//! The service core: lifecycle state machine, control receiver, and the
//! per-session worker execution context.

mod controller;
mod receiver;
mod state;
mod worker;

pub use controller::{ServiceEnv, ServiceHandle, SpeedService};
pub use state::ServiceState;

pub(crate) use receiver::ControlReceiver;
pub(crate) use worker::WorkerContext;
