//! # Runtime events emitted by the ad controller and its owner loop.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Transition events**: state changes of the controller
//! - **Provider events**: load/show requests and the provider's answers
//! - **Retry events**: backoff scheduling, firing and cancellation
//! - **Housekeeping events**: attach/detach, shutdown, dropped input
//!
//! The [`Event`] struct carries metadata such as timestamps, the ad unit,
//! the states involved, attempt numbers and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use adcycle::{AdState, Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_ad_unit("d8d07eb9c12e7f99")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(4));
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.delay_ms, Some(4_000));
//!
//! let moved = Event::new(EventKind::StateChanged).with_transition(AdState::Loading, AdState::WaitingRetry);
//! assert_eq!(moved.to, Some(AdState::WaitingRetry));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::controller::AdState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Transition events ===
    /// Controller moved between states.
    ///
    /// Sets: `ad_unit`, `from`, `to`
    StateChanged,

    // === Provider events ===
    /// SDK initialization was requested from the provider.
    ///
    /// Sets: `ad_unit`
    SdkInitRequested,

    /// SDK reported ready; warm-up begins.
    ///
    /// Sets: `ad_unit`
    SdkReady,

    /// A load call was issued to the provider.
    ///
    /// Sets: `ad_unit`, `attempt` (current failure count)
    LoadRequested,

    /// A show call was issued to the provider.
    ///
    /// Sets: `ad_unit`
    ShowRequested,

    /// Provider reported a loaded ad.
    ///
    /// Sets: `ad_unit`, `reason` (network name, if known)
    Loaded,

    /// Provider reported a load failure.
    ///
    /// Sets: `ad_unit`, `attempt` (after increment), `code`, `reason`
    LoadFailed,

    /// Provider reported the ad on screen.
    ///
    /// Sets: `ad_unit`
    Shown,

    /// Provider failed to present a loaded ad.
    ///
    /// Sets: `ad_unit`, `code`, `reason`
    DisplayFailed,

    /// Provider reported the ad closed.
    ///
    /// Sets: `ad_unit`
    Hidden,

    // === Retry events ===
    /// A retry timer was armed.
    ///
    /// Sets: `ad_unit`, `attempt`, `delay_ms`
    RetryScheduled,

    /// The pending retry fired and was accepted.
    ///
    /// Sets: `ad_unit`, `attempt`
    RetryFired,

    /// A pending retry was cancelled before firing.
    ///
    /// Sets: `ad_unit`, `reason`
    RetryCancelled,

    /// A retry fired into a state that no longer expects it and was dropped.
    ///
    /// Sets: `ad_unit`, `from` (current state), `reason`
    RetryStale,

    // === Housekeeping events ===
    /// A caller command was ignored because the controller was not in the required state.
    ///
    /// Sets: `ad_unit`, `from` (current state), `reason` (command name)
    CommandRejected,

    /// A provider callback was dropped (foreign ad unit, detached, or illegal state).
    ///
    /// Sets: `ad_unit`, `from` (current state), `reason`
    CallbackIgnored,

    /// Controller subscribed to a provider's callbacks.
    ///
    /// Sets: `ad_unit`
    Attached,

    /// Controller unsubscribed from its provider.
    ///
    /// Sets: `ad_unit`
    Detached,

    /// Controller shut down; no further transitions occur.
    ///
    /// Sets: `ad_unit`, `from` (final state)
    ShutdownCompleted,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Ad unit the event belongs to.
    pub ad_unit: Option<Arc<str>>,
    /// State before a transition, or the current state for rejections.
    pub from: Option<AdState>,
    /// State after a transition.
    pub to: Option<AdState>,
    /// Retry attempt count.
    pub attempt: Option<u32>,
    /// Retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Provider error code, when one was reported.
    pub code: Option<i32>,
    /// Human-readable reason (errors, rejected command names, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            ad_unit: None,
            from: None,
            to: None,
            attempt: None,
            delay_ms: None,
            code: None,
            reason: None,
        }
    }

    /// Attaches the ad unit identifier.
    #[inline]
    pub fn with_ad_unit(mut self, unit: impl Into<Arc<str>>) -> Self {
        self.ad_unit = Some(unit.into());
        self
    }

    /// Attaches both sides of a transition.
    #[inline]
    pub fn with_transition(mut self, from: AdState, to: AdState) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Attaches the state the controller was in when the event was raised.
    #[inline]
    pub fn with_state(mut self, state: AdState) -> Self {
        self.from = Some(state);
        self
    }

    /// Attaches a retry attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a provider error code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the retry delay as a [`Duration`], if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }
}
