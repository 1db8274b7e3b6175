//! # Lifecycle controller: the service state machine and dispatch loop.
//!
//! [`SpeedService`] owns the Started/Stopped state machine, the observable
//! cells, the signal bus, and the per-session resources (worker context,
//! control receiver, notification observer).
//!
//! ## Dispatch model
//! ```text
//! ServiceHandle ── Command (mpsc) ──┐
//!                                   ▼
//! SignalBus ── ControlSignal ──► run() loop ──► start() / stop()
//!              (session-scoped         │
//!               subscription)          └─► single-threaded: one command or
//!                                          signal completes before the next
//! ```
//!
//! All state transitions happen inside `run()`, one at a time; concurrent
//! `start()`/`stop()` requests cannot interleave partially. The loop never
//! blocks: it only toggles registrations, posts notifications, and spawns or
//! cancels work.
//!
//! ## Rules
//! - start() from Started: logged warning, no action.
//! - stop() from Stopped: idempotent no-op.
//! - Started iff producers active iff receiver registered; all three facts
//!   live in the one `Session` value and change together.
//! - An effective stop always ends in full teardown: the run loop exits and
//!   the service is gone. There is no stopped-but-resident state.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ServiceError;
use crate::platform::{render, LocationProvider, Notifier, PreferenceStore, NOTIFICATION_ID};
use crate::producers::{Producer, SatelliteCountProducer, SpeedProducer};
use crate::readings::{SpeedReading, StateCell};
use crate::service::{ControlReceiver, ServiceState, WorkerContext};
use crate::signals::{Command, ControlSignal, SignalBus};

/// Platform environment installed by [`SpeedService::attach`].
///
/// Construction is two-phase: [`SpeedService::new`] takes no environment, and
/// `attach` installs it once the hosting context is available. Producers and
/// the notification are never touched before attach.
pub struct ServiceEnv {
    /// Location stack access, shared with producers and the receiver.
    pub provider: Arc<dyn LocationProvider>,
    /// Notification surface and foreground guarantee.
    pub notifier: Arc<dyn Notifier>,
    /// Read-only user preferences, passed opaquely to the speed producer.
    pub preferences: Arc<dyn PreferenceStore>,
}

/// Everything that exists only while the service is Started.
///
/// Dropping (or dismantling) the session is what makes "Started iff producers
/// active iff receiver registered" hold atomically.
struct Session {
    receiver: ControlReceiver,
    signals: broadcast::Receiver<ControlSignal>,
    worker: WorkerContext,
    producers: CancellationToken,
    observer: JoinHandle<()>,
}

/// Input consumed by one turn of the dispatch loop.
enum Turn {
    Command(Option<Command>),
    Signal(Result<ControlSignal, broadcast::error::RecvError>),
    Shutdown,
}

/// The background listening service.
pub struct SpeedService {
    config: Config,
    env: Option<ServiceEnv>,
    bus: SignalBus,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: mpsc::Receiver<Command>,
    started: StateCell<bool>,
    speed: StateCell<Option<SpeedReading>>,
    satellites: StateCell<u32>,
    session: Option<Session>,
}

impl SpeedService {
    /// Creates a service with no platform environment attached.
    pub fn new(config: Config) -> Self {
        let bus = SignalBus::new(config.signal_capacity);
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_capacity);
        Self {
            config,
            env: None,
            bus,
            cmd_tx,
            cmd_rx,
            started: StateCell::new(false),
            speed: StateCell::new(None),
            satellites: StateCell::new(0),
            session: None,
        }
    }

    /// Installs the platform environment. Effective once; repeats are logged
    /// and ignored.
    pub fn attach(&mut self, env: ServiceEnv) {
        if self.env.is_some() {
            warn!("environment already attached; ignoring");
            return;
        }
        self.env = Some(env);
    }

    /// Returns a cloneable handle for commands, signals, and observation.
    pub fn handle(&self) -> ServiceHandle {
        ServiceHandle {
            cmd_tx: self.cmd_tx.clone(),
            bus: self.bus.clone(),
            started: self.started.watch(),
            speed: self.speed.watch(),
            satellites: self.satellites.watch(),
        }
    }

    /// Drives the dispatch loop until teardown.
    ///
    /// The loop ends when:
    /// - an effective stop completes (command or signal path), or
    /// - `shutdown` fires or every handle is dropped — both stop an active
    ///   session first.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), ServiceError> {
        // Replace our own sender with a detached one so the loop observes
        // closure once every handle has been dropped. No new handles can be
        // created past this point; `run` consumes the service.
        self.cmd_tx = mpsc::channel(1).0;
        loop {
            let turn = match self.session.as_mut() {
                Some(session) => tokio::select! {
                    cmd = self.cmd_rx.recv() => Turn::Command(cmd),
                    sig = session.signals.recv() => Turn::Signal(sig),
                    _ = shutdown.cancelled() => Turn::Shutdown,
                },
                None => tokio::select! {
                    cmd = self.cmd_rx.recv() => Turn::Command(cmd),
                    _ = shutdown.cancelled() => Turn::Shutdown,
                },
            };

            match turn {
                Turn::Command(Some(Command::Start)) => self.start(),
                Turn::Command(Some(Command::Stop)) => {
                    if self.stop().await {
                        break;
                    }
                }
                Turn::Command(None) | Turn::Shutdown => {
                    self.stop().await;
                    break;
                }
                Turn::Signal(Ok(signal)) => {
                    if self.handle_signal(signal).await {
                        break;
                    }
                }
                Turn::Signal(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    warn!(skipped, "signal bus lagged; oldest signals skipped");
                }
                Turn::Signal(Err(broadcast::error::RecvError::Closed)) => {
                    // The service holds the bus sender, so this cannot fire
                    // while a session is alive.
                    debug!("signal bus closed");
                }
            }
        }
        debug!("service torn down");
        Ok(())
    }

    fn start(&mut self) {
        if let Err(e) = self.try_start() {
            warn!(error = %e, label = e.as_label(), "start rejected");
        }
    }

    /// The start() path. Order matters: the notification and the foreground
    /// guarantee must exist before any producer emits, so the process is
    /// never running background work without a visible notification.
    fn try_start(&mut self) -> Result<(), ServiceError> {
        if self.session.is_some() {
            return Err(ServiceError::AlreadyStarted);
        }
        let env = self.env.as_ref().ok_or(ServiceError::NotAttached)?;

        // (a) Eager placeholder notification + foreground guarantee.
        env.notifier.start_foreground(NOTIFICATION_ID, render(None));

        // (b) Register the control receiver for this session.
        let receiver = ControlReceiver::new(Arc::clone(&env.provider));
        let signals = self.bus.subscribe();

        // A new session must not replay the previous session's readings.
        self.speed.set(None);
        self.satellites.set(0);
        // Subscribe before the producers start so no reading is missed.
        let speed_watch = self.speed.watch();

        // (c) Both producers on a fresh worker context.
        let worker = match WorkerContext::spawn() {
            Ok(worker) => worker,
            Err(e) => {
                env.notifier.withdraw(NOTIFICATION_ID);
                env.notifier.stop_foreground();
                return Err(e.into());
            }
        };
        let producers = CancellationToken::new();
        spawn_producer(
            &worker,
            Arc::new(SpeedProducer::new(
                Arc::clone(&env.provider),
                Arc::clone(&env.preferences),
                self.speed.clone(),
                self.config.poll_interval,
            )),
            producers.child_token(),
        );
        spawn_producer(
            &worker,
            Arc::new(SatelliteCountProducer::new(
                Arc::clone(&env.provider),
                self.satellites.clone(),
                self.config.poll_interval,
            )),
            producers.child_token(),
        );

        // (d) Notification refresh observer on the speed stream.
        let observer = spawn_notification_observer(speed_watch, Arc::clone(&env.notifier));

        // (e) Transition.
        self.session = Some(Session {
            receiver,
            signals,
            worker,
            producers,
            observer,
        });
        self.started.set(true);
        debug!("service started");
        Ok(())
    }

    /// The stop() path, shared by commands and the receiver's signal path.
    ///
    /// Returns `true` if a session was actually torn down; from Stopped this
    /// is an idempotent no-op.
    async fn stop(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        let Session {
            receiver,
            signals,
            worker,
            producers,
            observer,
        } = session;

        // (a) Unregister the control receiver.
        drop(receiver);
        drop(signals);
        // (b) Stop both producers.
        producers.cancel();
        // (c) Terminate the worker, discarding queued work.
        worker.shutdown_now();
        // (d) Withdraw the notification. The observer is aborted and awaited
        // first: a refresh already inside `notify` finishes before the
        // withdrawal, and nothing can repost after it.
        observer.abort();
        let _ = observer.await;
        if let Some(env) = self.env.as_ref() {
            env.notifier.withdraw(NOTIFICATION_ID);
            // (e) Release the foreground guarantee.
            env.notifier.stop_foreground();
        }
        // (f) Transition.
        self.started.set(false);
        debug!("service stopped");
        true
    }

    /// Routes a bus signal through the session's receiver.
    ///
    /// Signals observed while Stopped are ignored; asynchronous delivery
    /// makes late arrivals an expected race, not an error.
    async fn handle_signal(&mut self, signal: ControlSignal) -> bool {
        let Some(session) = self.session.as_ref() else {
            debug!(?signal, "signal while stopped; ignoring");
            return false;
        };
        if session.receiver.wants_stop(signal) {
            debug!(?signal, "signal demands stop");
            return self.stop().await;
        }
        false
    }
}

fn spawn_producer(worker: &WorkerContext, producer: Arc<dyn Producer>, token: CancellationToken) {
    debug!(producer = producer.name(), "starting producer");
    worker.spawn_task(async move { producer.run(token).await });
}

/// Reposts the notification whenever the observed speed reading changes.
fn spawn_notification_observer(
    mut speed: watch::Receiver<Option<SpeedReading>>,
    notifier: Arc<dyn Notifier>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while speed.changed().await.is_ok() {
            let reading = speed.borrow_and_update().clone();
            notifier.notify(NOTIFICATION_ID, render(reading.as_ref()));
        }
    })
}

/// Cloneable handle to a running [`SpeedService`].
///
/// The host UI issues commands and observes state through this; platform glue
/// publishes broadcast signals through [`signals`](ServiceHandle::signals).
#[derive(Clone)]
pub struct ServiceHandle {
    cmd_tx: mpsc::Sender<Command>,
    bus: SignalBus,
    started: watch::Receiver<bool>,
    speed: watch::Receiver<Option<SpeedReading>>,
    satellites: watch::Receiver<u32>,
}

impl ServiceHandle {
    /// Requests a start. Equivalent to `dispatch(Command::Start)`.
    pub fn start(&self) -> Result<(), ServiceError> {
        self.dispatch(Command::Start)
    }

    /// Requests a stop. Equivalent to `dispatch(Command::Stop)`.
    pub fn stop(&self) -> Result<(), ServiceError> {
        self.dispatch(Command::Stop)
    }

    /// Delivers a command to the dispatch loop without blocking.
    pub fn dispatch(&self, command: Command) -> Result<(), ServiceError> {
        self.cmd_tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ServiceError::Backlogged,
            mpsc::error::TrySendError::Closed(_) => ServiceError::Closed,
        })
    }

    /// Parses a platform action string and dispatches it.
    ///
    /// Unrecognized actions are logged and ignored, per the intent protocol.
    pub fn dispatch_action(&self, action: &str) -> Result<(), ServiceError> {
        match Command::parse(action) {
            Some(command) => self.dispatch(command),
            None => {
                debug!(action, "unrecognized command action; ignoring");
                Ok(())
            }
        }
    }

    /// Raises an explicit stop request on the signal bus — exactly what the
    /// notification's stop action does.
    pub fn request_stop(&self) {
        self.bus.publish(ControlSignal::StopRequest);
    }

    /// The signal bus, for platform glue publishing provider-changed signals.
    pub fn signals(&self) -> &SignalBus {
        &self.bus
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        if *self.started.borrow() {
            ServiceState::Started
        } else {
            ServiceState::Stopped
        }
    }

    /// Observes the started flag (latest value + future transitions).
    pub fn started(&self) -> watch::Receiver<bool> {
        self.started.clone()
    }

    /// Observes the latest speed reading, `None` before the first fix.
    pub fn speed(&self) -> watch::Receiver<Option<SpeedReading>> {
        self.speed.clone()
    }

    /// Observes the latest satellite count.
    pub fn satellites(&self) -> watch::Receiver<u32> {
        self.satellites.clone()
    }
}
