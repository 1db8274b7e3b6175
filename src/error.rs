//! Error types used by the service core and the platform seams.
//!
//! Two enums, split the same way the rest of the crate is:
//!
//! - [`ServiceError`] — failures of the lifecycle machinery itself.
//! - [`ProviderError`] — failures reported by the platform location provider.
//!
//! Nothing in this crate surfaces an error to the user as a visible failure:
//! the only user-visible consequence of an internal fault is the service
//! stopping and the notification disappearing.

use thiserror::Error;

/// Errors produced by the service lifecycle machinery.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// `start()` was called while the service is already Started.
    ///
    /// This is a programming error on the caller's side; the dispatch loop
    /// logs it and performs no state change.
    #[error("service already started")]
    AlreadyStarted,

    /// `start()` was called before [`attach`](crate::SpeedService::attach)
    /// installed the platform environment.
    #[error("service environment not attached")]
    NotAttached,

    /// The per-session worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// The command queue is full; the command was not delivered.
    #[error("command queue full")]
    Backlogged,

    /// The service has been torn down; commands are no longer accepted.
    #[error("service control channel closed")]
    Closed,
}

impl ServiceError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use speedwatch::ServiceError;
    ///
    /// assert_eq!(ServiceError::AlreadyStarted.as_label(), "service_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::AlreadyStarted => "service_already_started",
            ServiceError::NotAttached => "service_not_attached",
            ServiceError::WorkerSpawn(_) => "service_worker_spawn",
            ServiceError::Backlogged => "service_backlogged",
            ServiceError::Closed => "service_closed",
        }
    }
}

/// Errors reported by the platform location provider.
///
/// [`PermissionDenied`](ProviderError::PermissionDenied) is special-cased by
/// the control receiver: a provider whose enablement cannot even be queried is
/// treated as disabled, which stops the service.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The platform refused the query (location permission revoked).
    #[error("location permission denied")]
    PermissionDenied,

    /// The provider exists but could not produce a sample.
    #[error("location provider unavailable: {reason}")]
    Unavailable {
        /// Platform-specific description of the failure.
        reason: String,
    },
}

impl ProviderError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProviderError::PermissionDenied => "provider_permission_denied",
            ProviderError::Unavailable { .. } => "provider_unavailable",
        }
    }
}
