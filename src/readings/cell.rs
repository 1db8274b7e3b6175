//! # Latest-value observable cell.
//!
//! [`StateCell`] is a thin wrapper around [`tokio::sync::watch`] that holds
//! one value and lets any number of observers follow it.
//!
//! ## Rules
//! - **Latest-value replay**: a late subscriber observes only the current
//!   value, never history.
//! - **Non-blocking set**: `set()` never blocks and never fails; observers
//!   that fell behind simply skip to the newest value.
//! - **Owned by one writer**: the service core is the only writer; observers
//!   get read-only [`watch::Receiver`]s.

use std::sync::Arc;

use tokio::sync::watch;

/// Single-value publish/subscribe cell with latest-value replay.
///
/// Cheap to clone (internally an `Arc`-backed sender); all clones publish
/// into the same cell.
#[derive(Clone, Debug)]
pub struct StateCell<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> StateCell<T> {
    /// Creates a cell holding `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Replaces the current value and notifies all observers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Creates a new observer.
    ///
    /// The observer sees the current value immediately and every subsequent
    /// update; values published before subscription are gone.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone> StateCell<T> {
    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}
