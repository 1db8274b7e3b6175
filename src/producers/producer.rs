//! # Reading producer trait.
//!
//! A producer is an unbounded background poller that emits readings into a
//! [`StateCell`](crate::StateCell) until cancelled. The service spawns each
//! producer exactly once per session, always onto the session's worker
//! context — never onto the caller's thread — and stops it exactly once by
//! cancelling the session token.
//!
//! Producers are stateless pollers: cancellation may land at any point and
//! nothing pending is lost.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Asynchronous, cancelable reading poller.
///
/// Implementations should check `token` at every await point boundary and
/// exit promptly once it is cancelled. Sampling errors are handled
/// internally (logged, degraded to "no reading"); they never escape `run`.
#[async_trait]
pub trait Producer: Send + Sync + 'static {
    /// Returns a stable, human-readable producer name.
    fn name(&self) -> &str;

    /// Polls until `token` is cancelled.
    async fn run(&self, token: CancellationToken);
}
