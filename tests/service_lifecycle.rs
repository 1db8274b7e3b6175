//! End-to-end lifecycle tests: command and signal paths, notification
//! discipline, and self-termination on provider loss.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use speedwatch::{
    Config, ControlSignal, LocationProvider, MemoryPrefs, Notification, Notifier, ProviderError,
    ServiceEnv, ServiceHandle, ServiceState, SpeedSample, SpeedService, WAITING_FOR_SIGNAL,
};

const WAIT: Duration = Duration::from_secs(5);

struct FakeProvider {
    enabled: AtomicBool,
    permission_denied: AtomicBool,
    speed_mps: Mutex<Option<f64>>,
    satellites: AtomicU32,
}

impl FakeProvider {
    fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            permission_denied: AtomicBool::new(false),
            speed_mps: Mutex::new(None),
            satellites: AtomicU32::new(0),
        }
    }

    fn set_speed(&self, meters_per_second: Option<f64>) {
        *self.speed_mps.lock().unwrap() = meters_per_second;
    }
}

#[async_trait]
impl LocationProvider for FakeProvider {
    fn is_enabled(&self) -> Result<bool, ProviderError> {
        if self.permission_denied.load(Ordering::SeqCst) {
            return Err(ProviderError::PermissionDenied);
        }
        Ok(self.enabled.load(Ordering::SeqCst))
    }

    async fn sample_speed(&self) -> Result<Option<SpeedSample>, ProviderError> {
        Ok(self
            .speed_mps
            .lock()
            .unwrap()
            .map(|meters_per_second| SpeedSample { meters_per_second }))
    }

    async fn sample_satellites(&self) -> Result<u32, ProviderError> {
        Ok(self.satellites.load(Ordering::SeqCst))
    }
}

#[derive(Clone, Debug, PartialEq)]
enum NotifierCall {
    StartForeground { id: u32, title: String },
    Notify { id: u32, title: String },
    Withdraw { id: u32 },
    StopForeground,
}

#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
}

impl RecordingNotifier {
    fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    fn titles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                NotifierCall::StartForeground { title, .. } | NotifierCall::Notify { title, .. } => {
                    Some(title)
                }
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn start_foreground(&self, id: u32, notification: Notification) {
        self.calls.lock().unwrap().push(NotifierCall::StartForeground {
            id,
            title: notification.title,
        });
    }

    fn notify(&self, id: u32, notification: Notification) {
        self.calls.lock().unwrap().push(NotifierCall::Notify {
            id,
            title: notification.title,
        });
    }

    fn withdraw(&self, id: u32) {
        self.calls.lock().unwrap().push(NotifierCall::Withdraw { id });
    }

    fn stop_foreground(&self) {
        self.calls.lock().unwrap().push(NotifierCall::StopForeground);
    }
}

struct Fixture {
    handle: ServiceHandle,
    notifier: Arc<RecordingNotifier>,
    provider: Arc<FakeProvider>,
    driver: tokio::task::JoinHandle<Result<(), speedwatch::ServiceError>>,
    shutdown: CancellationToken,
}

fn spawn_service() -> Fixture {
    let mut config = Config::default();
    config.poll_interval = Duration::from_millis(10);

    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(RecordingNotifier::default());

    let mut service = SpeedService::new(config);
    service.attach(ServiceEnv {
        provider: Arc::clone(&provider) as Arc<dyn LocationProvider>,
        notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
        preferences: Arc::new(MemoryPrefs::new()),
    });

    let handle = service.handle();
    let shutdown = CancellationToken::new();
    let driver = tokio::spawn(service.run(shutdown.clone()));

    Fixture {
        handle,
        notifier,
        provider,
        driver,
        shutdown,
    }
}

async fn wait_started(handle: &ServiceHandle, expected: bool) {
    let mut rx = handle.started();
    timeout(WAIT, async move {
        loop {
            if *rx.borrow_and_update() == expected {
                return;
            }
            if rx.changed().await.is_err() {
                // Service torn down; the last published value decides.
                assert_eq!(*rx.borrow(), expected);
                return;
            }
        }
    })
    .await
    .expect("timed out waiting for started flag");
}

async fn wait_for_title(notifier: &RecordingNotifier, title: &str) {
    timeout(WAIT, async {
        loop {
            if notifier.titles().iter().any(|t| t == title) {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("never saw notification title {title:?}"));
}

#[tokio::test]
async fn start_posts_placeholder_and_marks_started() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    assert_eq!(fx.handle.state(), ServiceState::Started);
    let calls = fx.notifier.calls();
    assert_eq!(
        calls.first(),
        Some(&NotifierCall::StartForeground {
            id: 1,
            title: WAITING_FOR_SIGNAL.to_string()
        })
    );

    fx.shutdown.cancel();
    fx.driver.await.unwrap().unwrap();
}

#[tokio::test]
async fn readings_refresh_the_notification_title() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.provider.set_speed(Some(10.0)); // 36 km/h
    wait_for_title(&fx.notifier, "36 km/h").await;

    fx.provider.set_speed(Some(20.0)); // 72 km/h
    wait_for_title(&fx.notifier, "72 km/h").await;

    fx.shutdown.cancel();
    fx.driver.await.unwrap().unwrap();
}

#[tokio::test]
async fn satellite_counts_are_observable() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.provider.satellites.store(7, Ordering::SeqCst);
    let mut rx = fx.handle.satellites();
    timeout(WAIT, async {
        while *rx.borrow_and_update() != 7 {
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("satellite count never reached 7");

    fx.shutdown.cancel();
    fx.driver.await.unwrap().unwrap();
}

#[tokio::test]
async fn double_start_is_ignored() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.handle.start().unwrap();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(fx.handle.state(), ServiceState::Started);
    let foregrounds = fx
        .notifier
        .calls()
        .iter()
        .filter(|c| matches!(c, NotifierCall::StartForeground { .. }))
        .count();
    assert_eq!(foregrounds, 1, "double start must not re-enter foreground");

    fx.shutdown.cancel();
    fx.driver.await.unwrap().unwrap();
}

#[tokio::test]
async fn stop_from_stopped_is_an_idempotent_no_op() {
    let fx = spawn_service();
    fx.handle.stop().unwrap();
    fx.handle.stop().unwrap();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(fx.handle.state(), ServiceState::Stopped);
    assert!(fx.notifier.calls().is_empty());

    // The dispatch loop survived the no-ops; a start still works.
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.shutdown.cancel();
    fx.driver.await.unwrap().unwrap();
}

#[tokio::test]
async fn stop_request_signal_tears_the_service_down() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.handle.request_stop();
    wait_started(&fx.handle, false).await;

    // An effective stop culminates in full teardown: the run loop exits.
    timeout(WAIT, fx.driver)
        .await
        .expect("run loop kept running after stop")
        .unwrap()
        .unwrap();

    let calls = fx.notifier.calls();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(
        tail,
        &[NotifierCall::Withdraw { id: 1 }, NotifierCall::StopForeground]
    );
}

#[tokio::test]
async fn provider_disabled_signal_stops_the_service() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.provider.enabled.store(false, Ordering::SeqCst);
    fx.handle.signals().publish(ControlSignal::ProviderEnablementChanged);

    wait_started(&fx.handle, false).await;
    timeout(WAIT, fx.driver).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn permission_failure_counts_as_provider_disabled() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.provider.permission_denied.store(true, Ordering::SeqCst);
    fx.handle.signals().publish(ControlSignal::ProviderModeChanged);

    wait_started(&fx.handle, false).await;
    timeout(WAIT, fx.driver).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn provider_change_while_enabled_is_a_no_op() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.handle.signals().publish(ControlSignal::ProviderEnablementChanged);
    fx.handle.signals().publish(ControlSignal::ProviderModeChanged);
    sleep(Duration::from_millis(50)).await;

    assert_eq!(fx.handle.state(), ServiceState::Started);

    fx.shutdown.cancel();
    fx.driver.await.unwrap().unwrap();
}

#[tokio::test]
async fn signals_before_start_have_no_effect() {
    let fx = spawn_service();
    fx.provider.enabled.store(false, Ordering::SeqCst);
    fx.handle.signals().publish(ControlSignal::ProviderEnablementChanged);
    sleep(Duration::from_millis(50)).await;

    assert_eq!(fx.handle.state(), ServiceState::Stopped);
    assert!(fx.notifier.calls().is_empty());

    // The service is still alive and startable.
    fx.provider.enabled.store(true, Ordering::SeqCst);
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.shutdown.cancel();
    fx.driver.await.unwrap().unwrap();
}

#[tokio::test]
async fn stale_signals_after_teardown_are_harmless() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.handle.request_stop();
    wait_started(&fx.handle, false).await;
    timeout(WAIT, fx.driver).await.unwrap().unwrap().unwrap();

    // Late delivery after teardown: dropped by the bus, state unchanged.
    fx.handle.request_stop();
    fx.handle.signals().publish(ControlSignal::ProviderModeChanged);
    assert_eq!(fx.handle.state(), ServiceState::Stopped);
}

/// Notifier whose `notify` dawdles before recording, widening the window in
/// which a refresh is still in flight while a stop is being processed.
struct LingeringNotifier {
    inner: RecordingNotifier,
}

impl Notifier for LingeringNotifier {
    fn start_foreground(&self, id: u32, notification: Notification) {
        self.inner.start_foreground(id, notification);
    }

    fn notify(&self, id: u32, notification: Notification) {
        std::thread::sleep(Duration::from_millis(50));
        self.inner.notify(id, notification);
    }

    fn withdraw(&self, id: u32) {
        self.inner.withdraw(id);
    }

    fn stop_foreground(&self) {
        self.inner.stop_foreground();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_notification_is_reposted_after_withdrawal() {
    let mut config = Config::default();
    config.poll_interval = Duration::from_millis(5);

    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(LingeringNotifier {
        inner: RecordingNotifier::default(),
    });

    let mut service = SpeedService::new(config);
    service.attach(ServiceEnv {
        provider: Arc::clone(&provider) as Arc<dyn LocationProvider>,
        notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
        preferences: Arc::new(MemoryPrefs::new()),
    });

    let handle = service.handle();
    let shutdown = CancellationToken::new();
    let driver = tokio::spawn(service.run(shutdown.clone()));

    handle.start().unwrap();
    wait_started(&handle, true).await;

    // Keep refreshes in flight, then stop while one is likely mid-notify.
    provider.set_speed(Some(10.0)); // 36 km/h
    wait_for_title(&notifier.inner, "36 km/h").await;
    provider.set_speed(Some(20.0));
    handle.request_stop();

    wait_started(&handle, false).await;
    timeout(WAIT, driver).await.unwrap().unwrap().unwrap();

    // Withdrawal must be a happens-after of every notification refresh.
    let calls = notifier.inner.calls();
    let withdraw_at = calls
        .iter()
        .position(|c| matches!(c, NotifierCall::Withdraw { .. }))
        .expect("notification never withdrawn");
    assert!(
        !calls[withdraw_at..]
            .iter()
            .any(|c| matches!(c, NotifierCall::Notify { .. })),
        "notification reposted after withdrawal: {calls:?}"
    );
}

#[tokio::test]
async fn dropping_every_handle_tears_the_service_down() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    drop(fx.handle);

    // With no handles left the dispatch loop observes closure, stops the
    // session, and exits.
    timeout(WAIT, fx.driver)
        .await
        .expect("run loop survived losing every handle")
        .unwrap()
        .unwrap();

    let calls = fx.notifier.calls();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(
        tail,
        &[NotifierCall::Withdraw { id: 1 }, NotifierCall::StopForeground]
    );
}

/// Full session: start, observe a formatted reading in the notification,
/// stop via the notification's stop action.
#[tokio::test]
async fn full_session_scenario() {
    let fx = spawn_service();
    fx.handle.start().unwrap();
    wait_started(&fx.handle, true).await;

    fx.provider.set_speed(Some(42.0 / 3.6));
    wait_for_title(&fx.notifier, "42 km/h").await;

    let mut speed = fx.handle.speed();
    let reading = speed.borrow_and_update().clone().expect("no reading");
    assert_eq!(&*reading.display, "42 km/h");

    fx.handle.request_stop();
    wait_started(&fx.handle, false).await;
    timeout(WAIT, fx.driver).await.unwrap().unwrap().unwrap();

    let calls = fx.notifier.calls();
    assert!(calls.contains(&NotifierCall::Withdraw { id: 1 }));
    assert_eq!(calls.last(), Some(&NotifierCall::StopForeground));
}
