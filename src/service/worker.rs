//! # Per-session worker execution context.
//!
//! [`WorkerContext`] owns one dedicated background thread driving a
//! current-thread tokio runtime. Both producers run on it, serialized; all
//! polling and emission happens there, decoupled from the dispatch loop.
//!
//! ## Rules
//! - **One per session**: created fresh at start(), terminated at stop(),
//!   never reused.
//! - **Shutdown-now**: [`shutdown_now`](WorkerContext::shutdown_now) cancels
//!   the driver and drops the runtime; queued and in-flight work is
//!   discarded, not drained. Producers are stateless pollers, so nothing
//!   pending is lost.
//! - The driver unblocks immediately on cancel, so joining it from the
//!   dispatch loop is bounded.

use std::future::Future;
use std::io;
use std::thread;

use tokio::runtime;
use tokio_util::sync::CancellationToken;

/// Dedicated single-threaded execution context for producer work.
pub(crate) struct WorkerContext {
    handle: runtime::Handle,
    driver: Option<thread::JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl WorkerContext {
    /// Spawns the worker thread and its runtime.
    pub fn spawn() -> io::Result<Self> {
        let rt = runtime::Builder::new_current_thread().enable_time().build()?;
        let handle = rt.handle().clone();
        let shutdown = CancellationToken::new();
        let stop = shutdown.clone();

        let driver = thread::Builder::new()
            .name("speedwatch-worker".into())
            .spawn(move || {
                // block_on drives every task spawned via the handle; it
                // returns as soon as the shutdown token fires.
                rt.block_on(stop.cancelled());
                // Dropping the runtime without draining discards queued and
                // in-flight tasks.
                rt.shutdown_background();
            })?;

        Ok(Self {
            handle,
            driver: Some(driver),
            shutdown,
        })
    }

    /// Spawns a future onto the worker thread.
    pub fn spawn_task<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }

    /// Terminates the worker immediately, discarding outstanding work.
    pub fn shutdown_now(mut self) {
        self.shutdown.cancel();
        if let Some(driver) = self.driver.take() {
            let _ = driver.join();
        }
    }
}

impl Drop for WorkerContext {
    fn drop(&mut self) {
        // Unblock the driver so the thread never outlives the context.
        self.shutdown.cancel();
    }
}
