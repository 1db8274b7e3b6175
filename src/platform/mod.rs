//! Platform collaborator seams: location provider, notifier, preferences.
//!
//! Everything the service needs from the hosting platform is a trait here.
//! The real implementations are platform glue outside this crate; tests and
//! demos plug in fakes.

mod notify;
mod prefs;
mod provider;

pub use notify::{
    render, Notification, NotificationAction, Notifier, NOTIFICATION_ID, WAITING_FOR_SIGNAL,
};
pub use prefs::{MemoryPrefs, PreferenceStore};
pub use provider::{LocationProvider, SpeedSample};
