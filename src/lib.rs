//! # speedwatch
//!
//! **Speedwatch** is the background listening core of a GPS speed-display
//! application. It keeps speed and satellite-count readings flowing while the
//! host UI is away, surfaces a persistent status notification, and tears
//! itself down when location access disappears or the user asks it to stop.
//!
//! ## Architecture
//! ```text
//!  Commands (Start/Stop)          Control signals (stop request,
//!  from the host UI               provider enablement/mode changed)
//!        │                                  │
//!        ▼                                  ▼
//!  ┌──────────────┐               ┌──────────────────┐
//!  │ ServiceHandle│──────────────►│    SignalBus     │
//!  └──────┬───────┘               └────────┬─────────┘
//!         │ mpsc                           │ broadcast (session-scoped sub)
//!         ▼                                ▼
//!  ┌───────────────────────────────────────────────────────────────┐
//!  │  SpeedService (single-threaded dispatch loop)                 │
//!  │  - Started/Stopped state machine (start once, stop once)      │
//!  │  - ControlReceiver: signal → stop decision                    │
//!  │  - StateCells: started / speed / satellites (latest-value)    │
//!  │  - notification refresh observer (speed cell → Notifier)      │
//!  └──────┬────────────────────────────────────────────────────────┘
//!         │ per session
//!         ▼
//!  ┌──────────────────┐  spawns   ┌────────────────────────────────┐
//!  │  WorkerContext   │──────────►│ SpeedProducer /                │
//!  │  (dedicated      │           │ SatelliteCountProducer         │
//!  │  thread driving a│           │ (poll the LocationProvider,    │
//!  │  current-thread  │           │  publish into the StateCells)  │
//!  │  runtime)        │           └────────────────────────────────┘
//!  └──────────────────┘
//! ```
//!
//! ## Lifecycle
//! ```text
//! start():
//!   ├─► post placeholder notification + enter foreground
//!   ├─► register ControlReceiver (subscribe to the SignalBus)
//!   ├─► spawn both producers on a fresh WorkerContext
//!   ├─► subscribe the notification observer to the speed cell
//!   └─► started = true
//!
//! stop():
//!   ├─► unregister ControlReceiver
//!   ├─► cancel producers, shut the worker down now (queued work discarded)
//!   ├─► withdraw the notification + leave foreground
//!   ├─► started = false
//!   └─► full teardown (the run loop exits; no stopped-but-resident state)
//! ```
//!
//! Double start is a logged no-op; stop from Stopped is idempotent. Losing
//! the location provider mid-session (or losing permission to query it) makes
//! further readings impossible, so the service stops itself.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use speedwatch::{
//!     Config, LocationProvider, MemoryPrefs, Notification, Notifier,
//!     ProviderError, ServiceEnv, SpeedSample, SpeedService,
//! };
//!
//! struct Gps;
//!
//! #[async_trait]
//! impl LocationProvider for Gps {
//!     fn is_enabled(&self) -> Result<bool, ProviderError> { Ok(true) }
//!     async fn sample_speed(&self) -> Result<Option<SpeedSample>, ProviderError> {
//!         Ok(Some(SpeedSample { meters_per_second: 11.8 }))
//!     }
//!     async fn sample_satellites(&self) -> Result<u32, ProviderError> { Ok(7) }
//! }
//!
//! struct Tray;
//!
//! impl Notifier for Tray {
//!     fn start_foreground(&self, _id: u32, _n: Notification) {}
//!     fn notify(&self, _id: u32, _n: Notification) {}
//!     fn withdraw(&self, _id: u32) {}
//!     fn stop_foreground(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut service = SpeedService::new(Config::default());
//!     service.attach(ServiceEnv {
//!         provider: Arc::new(Gps),
//!         notifier: Arc::new(Tray),
//!         preferences: Arc::new(MemoryPrefs::default()),
//!     });
//!
//!     let handle = service.handle();
//!     let shutdown = CancellationToken::new();
//!     let driver = tokio::spawn(service.run(shutdown.clone()));
//!
//!     handle.start().unwrap();
//!     // The host UI observes handle.started() / handle.speed(); the
//!     // notification's stop button calls handle.request_stop().
//!     handle.stop().unwrap();
//!     driver.await.unwrap().unwrap();
//! }
//! ```
mod config;
mod error;
mod platform;
mod producers;
mod readings;
mod service;
mod signals;

// ---- Public re-exports ----

pub use config::Config;
pub use error::{ProviderError, ServiceError};
pub use platform::{
    render, LocationProvider, MemoryPrefs, Notification, NotificationAction, Notifier,
    PreferenceStore, SpeedSample, NOTIFICATION_ID, WAITING_FOR_SIGNAL,
};
pub use producers::{Producer, SatelliteCountProducer, SpeedProducer, SPEED_UNIT_KEY};
pub use readings::{SpeedReading, StateCell};
pub use service::{ServiceEnv, ServiceHandle, ServiceState, SpeedService};
pub use signals::{Command, ControlSignal, SignalBus};
