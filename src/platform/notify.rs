//! # Notification payload and presentation seam.
//!
//! The service owns exactly one notification, identified by
//! [`NOTIFICATION_ID`]. Each rebuild replaces the previous one; there is
//! never more than one live notification for this service.
//!
//! [`render`] is a pure function of the latest reading (or its absence) to a
//! [`Notification`] payload. The [`Notifier`] trait is the platform seam that
//! posts, replaces, and withdraws that payload and holds the foreground
//! execution guarantee tied to it.

use crate::readings::SpeedReading;

/// Fixed platform slot for the service's single notification.
pub const NOTIFICATION_ID: u32 = 1;

/// Title shown before the first reading arrives.
pub const WAITING_FOR_SIGNAL: &str = "Waiting for GPS signal";

/// Action button carried by the notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationAction {
    /// Raises [`ControlSignal::StopRequest`](crate::ControlSignal::StopRequest)
    /// on the signal bus when tapped.
    Stop,
}

/// Notification payload, populated field by field.
///
/// Purely data; nothing happens until a [`Notifier`] posts it. Tapping the
/// notification body opens the host UI; that wiring lives in platform glue.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Content title (the formatted speed, or the waiting placeholder).
    pub title: String,
    /// Ticker text; mirrors the title.
    pub ticker: String,
    /// Action buttons. Always exactly one: stop.
    pub actions: Vec<NotificationAction>,
}

/// Builds the notification payload for the given reading.
pub fn render(reading: Option<&SpeedReading>) -> Notification {
    let title = match reading {
        Some(r) => r.display.to_string(),
        None => WAITING_FOR_SIGNAL.to_string(),
    };
    Notification {
        ticker: title.clone(),
        title,
        actions: vec![NotificationAction::Stop],
    }
}

/// Platform notification surface.
///
/// All methods must be cheap and non-blocking; they are called from the
/// service dispatch loop and the notification observer. Implementations
/// swallow platform failures; a notification that could not be posted is not
/// a reason to crash the service.
pub trait Notifier: Send + Sync + 'static {
    /// Posts `notification` into slot `id` and marks the process as holding a
    /// foreground execution guarantee tied to it.
    fn start_foreground(&self, id: u32, notification: Notification);

    /// Replaces the notification in slot `id`.
    fn notify(&self, id: u32, notification: Notification);

    /// Removes the notification from slot `id`.
    fn withdraw(&self, id: u32);

    /// Releases the foreground execution guarantee.
    fn stop_foreground(&self);
}
