//! # AdController: single ad unit state machine.
//!
//! Owns the lifecycle state, the retry counter and the pending retry of one ad
//! unit. Every entry point must be called from the same owner context (see
//! [`AdRuntime`](crate::AdRuntime)); the controller does no locking and never
//! blocks.
//!
//! ## Triggers
//! ```text
//! state          trigger                 next            side effect
//! ─────────────  ──────────────────────  ──────────────  ──────────────────────────
//! None           start()                 WaitingForSdk   provider.initialize()
//! WaitingForSdk  on_sdk_ready            None            (runtime arms warm-up)
//! None*          on_warmup_elapsed       ReadyToLoad
//! ReadyToLoad    request_load            Loading         cancel retry, provider.load()
//! Loading        on_load_succeeded       ReadyToShow     cancel retry, attempt = 0
//! any            on_load_failed          WaitingRetry    attempt += 1, schedule retry
//! ReadyToShow    request_show            Showing         provider.show()
//! any            on_shown / on_hidden /  ReadyToLoad
//!                on_display_failed
//! WaitingRetry   retry fired             ReadyToLoad     then request_load()
//!
//! * only after the SDK reported ready
//! ```
//! Anything else is dropped without side effects. Callbacks for a different ad
//! unit are dropped as well.
//!
//! ## Shutdown
//! [`AdController::shutdown`] cancels the pending retry, detaches from the provider
//! and freezes the state. It is idempotent.

use std::sync::Arc;

use crate::config::Config;
use crate::core::{Command, EventSink};
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;
use crate::provider::{AdInfo, AdProvider, ErrorInfo, ProviderEvent, SdkConfiguration};
use crate::scheduler::{RetryScheduler, RetryTicket};

use super::state::{AdState, Snapshot};

/// Lifecycle controller for one ad unit.
pub struct AdController {
    ad_unit_id: Arc<str>,
    backoff: BackoffPolicy,
    bus: Bus,

    state: AdState,
    retry_attempt: u32,
    retry: RetryScheduler,

    provider: Option<Arc<dyn AdProvider>>,
    sdk_requested: bool,
    shut_down: bool,
}

impl AdController {
    /// Creates a detached controller in [`AdState::None`].
    ///
    /// `cfg` is expected to be validated; see [`Config::validate`].
    pub fn new(cfg: &Config, retry: RetryScheduler, bus: Bus) -> Self {
        Self {
            ad_unit_id: Arc::from(cfg.ad_unit_id.as_str()),
            backoff: cfg.backoff,
            bus,
            state: AdState::None,
            retry_attempt: 0,
            retry,
            provider: None,
            sdk_requested: false,
            shut_down: false,
        }
    }

    // ---- Queries ----

    /// Ad unit this controller owns.
    pub fn ad_unit_id(&self) -> &str {
        &self.ad_unit_id
    }

    /// Current state.
    pub fn current_state(&self) -> AdState {
        self.state
    }

    /// Consecutive load failures since the last successful load.
    pub fn current_retry_attempt(&self) -> u32 {
        self.retry_attempt
    }

    /// True while a retry timer is armed.
    pub fn is_retry_pending(&self) -> bool {
        self.retry.is_pending()
    }

    /// True while subscribed to a provider.
    pub fn is_attached(&self) -> bool {
        self.provider.is_some()
    }

    /// True after [`shutdown`](Self::shutdown).
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// True between SDK-ready and the end of the warm-up delay.
    pub fn is_warming_up(&self) -> bool {
        !self.shut_down && self.sdk_requested && self.state == AdState::None
    }

    /// Copy of the observable status.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            retry_attempt: self.retry_attempt,
            retry_pending: self.retry.is_pending(),
            shut_down: self.shut_down,
        }
    }

    // ---- Subscription lifetime ----

    /// Subscribes to `provider`'s callbacks through `sink`.
    ///
    /// Replaces (and detaches from) a previously attached provider.
    pub fn attach(&mut self, provider: Arc<dyn AdProvider>, sink: EventSink) {
        if self.shut_down {
            return;
        }
        self.detach();
        provider.subscribe(sink);
        self.provider = Some(provider);
        self.publish(Event::new(EventKind::Attached));
    }

    /// Unsubscribes from the provider and cancels the pending retry.
    ///
    /// While detached, callbacks and retry expiries are ignored and commands are
    /// rejected. Detaching twice is a no-op.
    pub fn detach(&mut self) {
        self.cancel_retry("detached");
        if let Some(provider) = self.provider.take() {
            provider.unsubscribe();
            self.publish(Event::new(EventKind::Detached));
        }
    }

    // ---- Commands ----

    /// Requests SDK initialization: `None` → `WaitingForSdk`.
    ///
    /// Runs once; later calls are ignored.
    pub fn start(&mut self) {
        if self.shut_down || self.sdk_requested {
            return;
        }
        let Some(provider) = self.provider.clone() else {
            self.reject("start");
            return;
        };
        self.sdk_requested = true;
        self.transition(AdState::WaitingForSdk);
        self.publish(Event::new(EventKind::SdkInitRequested));
        provider.initialize();
    }

    /// Issues a load: `ReadyToLoad` → `Loading`. No-op in any other state.
    pub fn request_load(&mut self) {
        if self.shut_down {
            return;
        }
        if self.state != AdState::ReadyToLoad {
            self.reject("load");
            return;
        }
        let Some(provider) = self.provider.clone() else {
            self.reject("load");
            return;
        };

        self.cancel_retry("load requested");
        self.transition(AdState::Loading);
        self.publish(Event::new(EventKind::LoadRequested).with_attempt(self.retry_attempt));
        provider.load(&self.ad_unit_id);
    }

    /// Presents the loaded ad: `ReadyToShow` → `Showing`. No-op in any other state.
    pub fn request_show(&mut self) {
        if self.shut_down {
            return;
        }
        if self.state != AdState::ReadyToShow {
            self.reject("show");
            return;
        }
        let Some(provider) = self.provider.clone() else {
            self.reject("show");
            return;
        };

        self.transition(AdState::Showing);
        self.publish(Event::new(EventKind::ShowRequested));
        provider.show(&self.ad_unit_id);
    }

    /// Cancels the pending retry, detaches and freezes the controller.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.cancel_retry("shutdown");
        self.detach();
        self.shut_down = true;
        self.publish(Event::new(EventKind::ShutdownCompleted).with_state(self.state));
    }

    // ---- Provider callbacks ----

    /// Routes one provider callback to its handler.
    pub fn on_provider_event(&mut self, ev: ProviderEvent) {
        match ev {
            ProviderEvent::SdkReady(cfg) => self.on_sdk_ready(&cfg),
            ProviderEvent::LoadSucceeded { ad_unit_id, info } => {
                self.on_load_succeeded(&ad_unit_id, &info)
            }
            ProviderEvent::LoadFailed { ad_unit_id, error } => {
                self.on_load_failed(&ad_unit_id, &error)
            }
            ProviderEvent::Shown { ad_unit_id, info } => self.on_shown(&ad_unit_id, &info),
            ProviderEvent::DisplayFailed {
                ad_unit_id,
                error,
                info,
            } => self.on_display_failed(&ad_unit_id, &error, &info),
            ProviderEvent::Hidden { ad_unit_id, info } => self.on_hidden(&ad_unit_id, &info),
        }
    }

    /// SDK finished initializing: `WaitingForSdk` → `None` (warm-up starts).
    pub fn on_sdk_ready(&mut self, _cfg: &SdkConfiguration) {
        if !self.is_listening() {
            return;
        }
        if self.state != AdState::WaitingForSdk {
            self.ignore("sdk ready outside waiting_for_sdk");
            return;
        }
        self.publish(Event::new(EventKind::SdkReady));
        self.transition(AdState::None);
    }

    /// Warm-up after SDK-ready elapsed: `None` → `ReadyToLoad`.
    pub fn on_warmup_elapsed(&mut self) {
        if !self.is_listening() {
            return;
        }
        if self.state != AdState::None || !self.sdk_requested {
            self.ignore("warm-up outside sdk warm-up");
            return;
        }
        self.transition(AdState::ReadyToLoad);
    }

    /// Ad loaded: `Loading` → `ReadyToShow`, retry counter reset.
    pub fn on_load_succeeded(&mut self, ad_unit_id: &str, info: &AdInfo) {
        if !self.accepts(ad_unit_id) {
            return;
        }
        if self.state != AdState::Loading {
            self.ignore("load succeeded outside loading");
            return;
        }

        self.cancel_retry("loaded");
        self.retry_attempt = 0;
        let mut ev = Event::new(EventKind::Loaded);
        if let Some(network) = &info.network_name {
            ev = ev.with_reason(Arc::clone(network));
        }
        self.publish(ev);
        self.transition(AdState::ReadyToShow);
    }

    /// Load failed: any state → `WaitingRetry`, retry armed after backoff.
    ///
    /// Accepted regardless of the current state so that late failures still
    /// end in a retry rather than a stuck controller.
    pub fn on_load_failed(&mut self, ad_unit_id: &str, error: &ErrorInfo) {
        if !self.accepts(ad_unit_id) {
            return;
        }

        self.retry_attempt = self.retry_attempt.saturating_add(1);
        let delay = self.backoff.next(self.retry_attempt);
        self.publish(
            Event::new(EventKind::LoadFailed)
                .with_attempt(self.retry_attempt)
                .with_code(error.code)
                .with_reason(Arc::clone(&error.message)),
        );

        self.transition(AdState::WaitingRetry);
        self.cancel_retry("replaced");
        let (ticket, _) = self.retry.schedule(delay);
        self.publish(
            Event::new(EventKind::RetryScheduled)
                .with_attempt(self.retry_attempt)
                .with_delay(delay)
                .with_reason(ticket.to_string()),
        );
    }

    /// Ad presented: → `ReadyToLoad`.
    pub fn on_shown(&mut self, ad_unit_id: &str, _info: &AdInfo) {
        if !self.accepts(ad_unit_id) {
            return;
        }
        self.publish(Event::new(EventKind::Shown));
        self.transition(AdState::ReadyToLoad);
    }

    /// Ad could not be presented: → `ReadyToLoad`, no retry escalation.
    pub fn on_display_failed(&mut self, ad_unit_id: &str, error: &ErrorInfo, _info: &AdInfo) {
        if !self.accepts(ad_unit_id) {
            return;
        }
        self.publish(
            Event::new(EventKind::DisplayFailed)
                .with_code(error.code)
                .with_reason(Arc::clone(&error.message)),
        );
        self.transition(AdState::ReadyToLoad);
    }

    /// Ad closed: → `ReadyToLoad`.
    pub fn on_hidden(&mut self, ad_unit_id: &str, _info: &AdInfo) {
        if !self.accepts(ad_unit_id) {
            return;
        }
        self.publish(Event::new(EventKind::Hidden));
        self.transition(AdState::ReadyToLoad);
    }

    // ---- Timer callbacks ----

    /// Retry timer expired: `WaitingRetry` → `ReadyToLoad`, then loads again.
    ///
    /// Stale tickets (cancelled or replaced retries) and expiries arriving in any
    /// other state are dropped.
    pub fn on_retry_fired(&mut self, ticket: RetryTicket) {
        if !self.is_listening() {
            return;
        }
        // Leaving WaitingRetry cancels the pending ticket, so outside that state
        // every expiry is stale.
        if self.state != AdState::WaitingRetry || !self.retry.complete(ticket) {
            self.publish(
                Event::new(EventKind::RetryStale)
                    .with_state(self.state)
                    .with_reason(format!("ticket {ticket} is not pending")),
            );
            return;
        }

        self.publish(Event::new(EventKind::RetryFired).with_attempt(self.retry_attempt));
        self.transition(AdState::ReadyToLoad);
        self.request_load();
    }

    /// Executes one owner-context command.
    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Load => self.request_load(),
            Command::Show => self.request_show(),
            Command::Provider(ev) => self.on_provider_event(ev),
            Command::RetryFired(ticket) => self.on_retry_fired(ticket),
            Command::WarmupElapsed => self.on_warmup_elapsed(),
            Command::Shutdown => self.shutdown(),
        }
    }

    // ---- Internals ----

    fn is_listening(&self) -> bool {
        !self.shut_down && self.provider.is_some()
    }

    /// Gate for unit-scoped callbacks: listening and addressed to this unit.
    fn accepts(&self, ad_unit_id: &str) -> bool {
        if !self.is_listening() {
            return false;
        }
        if ad_unit_id != &*self.ad_unit_id {
            self.publish(
                Event::new(EventKind::CallbackIgnored)
                    .with_state(self.state)
                    .with_reason(format!("foreign ad unit {ad_unit_id}")),
            );
            return false;
        }
        true
    }

    fn transition(&mut self, to: AdState) {
        let from = self.state;
        if from == AdState::WaitingRetry && to != AdState::WaitingRetry {
            self.cancel_retry("left waiting_retry");
        }
        self.state = to;
        if from != to {
            self.publish(Event::new(EventKind::StateChanged).with_transition(from, to));
        }
    }

    fn cancel_retry(&mut self, reason: &'static str) {
        if let Some(ticket) = self.retry.cancel() {
            self.publish(
                Event::new(EventKind::RetryCancelled)
                    .with_reason(format!("ticket {ticket}: {reason}")),
            );
        }
    }

    fn reject(&self, command: &'static str) {
        self.publish(
            Event::new(EventKind::CommandRejected)
                .with_state(self.state)
                .with_reason(command),
        );
    }

    fn ignore(&self, why: &'static str) {
        self.publish(
            Event::new(EventKind::CallbackIgnored)
                .with_state(self.state)
                .with_reason(why),
        );
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_ad_unit(Arc::clone(&self.ad_unit_id)));
    }
}
