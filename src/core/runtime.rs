//! # AdRuntime: the owner context of one controller.
//!
//! The [`AdRuntime`] owns an [`AdController`] and drains the command queue that
//! [`OwnerHandle`]s, the provider's [`EventSink`](super::EventSink) and the retry
//! timer feed. Every controller method runs here, one command at a time, so the
//! controller itself needs no locking.
//!
//! ## Architecture
//! ```text
//! AdRuntime::run(token)
//!   ├─ listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)   (fire-and-forget)
//!   ├─ controller.attach(provider, sink) ; controller.start()
//!   └─ loop:
//!        select! {
//!          token.cancelled()   ─► exit
//!          rx.recv() = cmd     ─► Shutdown ? exit : controller.apply(cmd)
//!        }
//!        after each command:
//!          ├─ warming up and no warm-up timer yet ─► arm warm-up (posts WarmupElapsed)
//!          └─ publish Snapshot on the watch channel
//!
//! Exit path:
//!   controller.shutdown()  → cancels retry, unsubscribes from provider
//!   cancel warm-up timer
//!   publish final Snapshot
//!   drop bus → listener drains, SubscriberSet::shutdown() awaits workers
//! ```
//!
//! The loop runs until [`OwnerHandle::shutdown`] is processed or the token is
//! cancelled. Dropping every `OwnerHandle` does **not** stop it: the provider sink
//! and the timers keep the queue open.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc, watch,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::controller::{AdController, Snapshot};
use crate::events::{Bus, Event};
use crate::provider::AdProvider;
use crate::scheduler::Timer;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::builder::AdRuntimeBuilder;
use super::dispatch::{Command, OwnerHandle};

/// Drives one [`AdController`] on a single task.
pub struct AdRuntime {
    controller: AdController,
    provider: Arc<dyn AdProvider>,
    handle: OwnerHandle,
    rx: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<Snapshot>,

    timer: Arc<dyn Timer>,
    sdk_warmup: Duration,
    warmup: Option<CancellationToken>,

    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl AdRuntime {
    /// Returns a builder for a runtime owning `cfg.ad_unit_id`.
    pub fn builder(cfg: Config) -> AdRuntimeBuilder {
        AdRuntimeBuilder::new(cfg)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_internal(
        controller: AdController,
        provider: Arc<dyn AdProvider>,
        handle: OwnerHandle,
        rx: mpsc::UnboundedReceiver<Command>,
        status: watch::Sender<Snapshot>,
        timer: Arc<dyn Timer>,
        sdk_warmup: Duration,
        bus: Bus,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            controller,
            provider,
            handle,
            rx,
            status,
            timer,
            sdk_warmup,
            warmup: None,
            bus,
            subscribers,
        }
    }

    /// Subscribes to the controller's raw event stream.
    ///
    /// Receivers created before [`run`](Self::run) see every event of the run.
    /// The stream closes once `run` returns.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Attaches to the provider, starts SDK initialization and processes
    /// commands until shutdown or until `token` is cancelled.
    ///
    /// Returns the final (shut down) snapshot once every subscriber has drained.
    pub async fn run(mut self, token: CancellationToken) -> Snapshot {
        let listener = self.subscriber_listener();
        tracing::debug!(unit = self.controller.ad_unit_id(), "owner loop started");

        self.controller
            .attach(Arc::clone(&self.provider), self.handle.sink());
        self.controller.start();
        self.after_command();

        loop {
            let cmd = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => cmd,
                    None => break,
                },
            };
            if matches!(cmd, Command::Shutdown) {
                break;
            }
            self.controller.apply(cmd);
            self.after_command();
        }

        self.controller.shutdown();
        if let Some(warmup) = self.warmup.take() {
            warmup.cancel();
        }
        let last = self.controller.snapshot();
        self.status.send_replace(last);
        tracing::debug!(
            unit = self.controller.ad_unit_id(),
            state = %last.state,
            "owner loop stopped"
        );

        drop(self);
        if let Some(listener) = listener {
            let _ = listener.await;
        }
        last
    }

    /// Arms the warm-up timer when needed and republishes the status.
    fn after_command(&mut self) {
        if self.warmup.is_none() && self.controller.is_warming_up() {
            let cancel = CancellationToken::new();
            let handle = self.handle.clone();
            self.timer.arm_once(
                self.sdk_warmup,
                cancel.clone(),
                Box::new(move || {
                    let _ = handle.post(Command::WarmupElapsed);
                }),
            );
            tracing::debug!(
                unit = self.controller.ad_unit_id(),
                warmup = ?self.sdk_warmup,
                "sdk warm-up armed"
            );
            self.warmup = Some(cancel);
        }
        self.status.send_replace(self.controller.snapshot());
    }

    /// Forwards bus events to the subscriber set until the bus closes.
    fn subscriber_listener(&mut self) -> Option<JoinHandle<()>> {
        let subs = std::mem::take(&mut self.subscribers);
        if subs.is_empty() {
            return None;
        }
        let set = SubscriberSet::new(subs);
        let mut rx = self.bus.subscribe();

        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AdState;
    use crate::core::EventSink;
    use crate::events::EventKind;
    use crate::provider::{AdInfo, ErrorInfo, ProviderEvent, SdkConfiguration};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    const UNIT: &str = "d8d07eb9c12e7f99";

    /// Answers synchronously: the first `failures` loads fail, later ones fill.
    struct ScriptedProvider {
        sink: Mutex<Option<EventSink>>,
        failures: usize,
        loads: AtomicUsize,
        from_thread: bool,
    }

    impl ScriptedProvider {
        fn new(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                sink: Mutex::new(None),
                failures,
                loads: AtomicUsize::new(0),
                from_thread: false,
            })
        }

        fn threaded(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                sink: Mutex::new(None),
                failures,
                loads: AtomicUsize::new(0),
                from_thread: true,
            })
        }

        fn loads(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }

        fn emit(&self, ev: ProviderEvent) {
            let Some(sink) = self.sink.lock().clone() else {
                return;
            };
            if self.from_thread {
                std::thread::spawn(move || {
                    let _ = sink.emit(ev);
                });
            } else {
                let _ = sink.emit(ev);
            }
        }
    }

    impl AdProvider for ScriptedProvider {
        fn initialize(&self) {
            self.emit(ProviderEvent::SdkReady(SdkConfiguration::default()));
        }
        fn load(&self, ad_unit_id: &str) {
            let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
            let ad_unit_id: Arc<str> = ad_unit_id.into();
            if n <= self.failures {
                self.emit(ProviderEvent::LoadFailed {
                    ad_unit_id,
                    error: ErrorInfo::new(204, "no fill"),
                });
            } else {
                self.emit(ProviderEvent::LoadSucceeded {
                    ad_unit_id,
                    info: AdInfo::default(),
                });
            }
        }
        fn show(&self, ad_unit_id: &str) {
            self.emit(ProviderEvent::Shown {
                ad_unit_id: ad_unit_id.into(),
                info: AdInfo::default(),
            });
        }
        fn subscribe(&self, sink: EventSink) {
            *self.sink.lock() = Some(sink);
        }
        fn unsubscribe(&self) {
            self.sink.lock().take();
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Event>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().push(ev.clone());
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn warmup_then_two_failures_then_fill() {
        let started = Instant::now();
        let provider = ScriptedProvider::new(2);
        let (rt, handle) = AdRuntime::builder(Config::new(UNIT))
            .build(provider.clone())
            .expect("valid config");
        let token = CancellationToken::new();
        let run = tokio::spawn(rt.run(token.clone()));

        handle
            .wait_for(|s| s.state == AdState::ReadyToLoad)
            .await
            .expect("warm-up");
        assert!(started.elapsed() >= Duration::from_secs(3));

        handle.request_load().expect("queued");
        let ready = handle
            .wait_for(|s| s.state == AdState::ReadyToShow)
            .await
            .expect("filled");

        // 3s warm-up + 2s + 4s backoff.
        assert!(started.elapsed() >= Duration::from_secs(9));
        assert_eq!(provider.loads(), 3);
        assert_eq!(ready.retry_attempt, 0);
        assert!(!ready.retry_pending);

        handle.request_show().expect("queued");
        handle
            .wait_for(|s| s.state == AdState::ReadyToLoad)
            .await
            .expect("shown");

        handle.shutdown().expect("queued");
        let last = run.await.expect("run joined");
        assert!(last.shut_down);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_retry() {
        let provider = ScriptedProvider::new(usize::MAX);
        let mut cfg = Config::new(UNIT);
        cfg.sdk_warmup = Duration::ZERO;
        let (rt, handle) = AdRuntime::builder(cfg)
            .build(provider.clone())
            .expect("valid config");
        let run = tokio::spawn(rt.run(CancellationToken::new()));

        handle
            .wait_for(|s| s.state == AdState::ReadyToLoad)
            .await
            .expect("warm-up");
        handle.request_load().expect("queued");
        handle
            .wait_for(|s| s.retry_pending)
            .await
            .expect("retry armed");

        handle.shutdown().expect("queued");
        let last = run.await.expect("run joined");
        assert!(last.shut_down);
        assert!(!last.retry_pending);
        assert_eq!(last.state, AdState::WaitingRetry);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(provider.loads(), 1);
        assert!(handle.is_closed());
        assert_eq!(handle.snapshot(), last);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_stops_the_loop() {
        let provider = ScriptedProvider::new(0);
        let mut cfg = Config::new(UNIT);
        cfg.sdk_warmup = Duration::from_millis(10);
        let (rt, handle) = AdRuntime::builder(cfg)
            .build(provider.clone())
            .expect("valid config");
        let token = CancellationToken::new();
        let run = tokio::spawn(rt.run(token.clone()));

        handle
            .wait_for(|s| s.state == AdState::ReadyToLoad)
            .await
            .expect("warm-up");
        token.cancel();
        let last = run.await.expect("run joined");

        assert!(last.shut_down);
        assert!(handle.is_closed());
        assert_eq!(
            handle.request_load(),
            Err(crate::error::DispatchError::Closed)
        );
        assert_eq!(provider.loads(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn callbacks_from_foreign_threads_are_marshalled() {
        let provider = ScriptedProvider::threaded(1);
        let mut cfg = Config::new(UNIT);
        cfg.sdk_warmup = Duration::ZERO;
        cfg.backoff.step = Duration::from_millis(10);
        cfg.backoff.max = Duration::from_millis(50);
        let (rt, handle) = AdRuntime::builder(cfg)
            .build(provider.clone())
            .expect("valid config");
        let run = tokio::spawn(rt.run(CancellationToken::new()));

        tokio::time::timeout(Duration::from_secs(5), async {
            handle
                .wait_for(|s| s.state == AdState::ReadyToLoad)
                .await
                .expect("warm-up");
            handle.request_load().expect("queued");
            handle
                .wait_for(|s| s.state == AdState::ReadyToShow)
                .await
                .expect("filled");
        })
        .await
        .expect("cycle completes");

        assert_eq!(provider.loads(), 2);
        handle.shutdown().expect("queued");
        run.await.expect("run joined");
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_the_whole_run() {
        let recorder = Arc::new(Recorder::default());
        let mut cfg = Config::new(UNIT);
        cfg.sdk_warmup = Duration::ZERO;
        let (rt, handle) = AdRuntime::builder(cfg)
            .with_subscribers(vec![recorder.clone()])
            .build(ScriptedProvider::new(1))
            .expect("valid config");
        let run = tokio::spawn(rt.run(CancellationToken::new()));

        handle
            .wait_for(|s| s.state == AdState::ReadyToLoad)
            .await
            .expect("warm-up");
        handle.request_load().expect("queued");
        handle
            .wait_for(|s| s.state == AdState::ReadyToShow)
            .await
            .expect("filled");
        handle.shutdown().expect("queued");
        run.await.expect("run joined");

        let seen = recorder.seen.lock().clone();
        let scheduled = seen
            .iter()
            .find(|e| e.kind == EventKind::RetryScheduled)
            .expect("retry scheduled");
        assert_eq!(scheduled.delay(), Some(Duration::from_secs(2)));
        assert_eq!(scheduled.attempt, Some(1));
        assert!(seen.iter().all(|e| e.ad_unit.as_deref() == Some(UNIT)));
        assert_eq!(
            seen.last().map(|e| e.kind),
            Some(EventKind::ShutdownCompleted)
        );
        assert!(seen.windows(2).all(|w| w[0].seq < w[1].seq));
    }
}
