//! Read-only user preference store.
//!
//! The speed producer consumes preferences opaquely (currently only the
//! display unit); the service core never interprets them. Platform glue backs
//! this with the real preference storage; [`MemoryPrefs`] serves tests and
//! demos.

use std::collections::HashMap;

/// Read-only key-value preference store.
pub trait PreferenceStore: Send + Sync + 'static {
    /// Returns the value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory preference store for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryPrefs {
    values: HashMap<String, String>,
}

impl MemoryPrefs {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a preference, returning the store for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl PreferenceStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
