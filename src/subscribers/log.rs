//! # LogWriter - renders events through `tracing`
//!
//! A minimal subscriber that turns incoming [`Event`]s into `tracing` records.
//! Failures are logged at `warn`, lifecycle steps at `info`, and dropped or
//! rejected input at `debug`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO adcycle: state changed unit=d8d07eb9c12e7f99 from=loading to=waiting_retry
//! WARN adcycle: load failed unit=d8d07eb9c12e7f99 attempt=1 code=204 reason=no fill
//! INFO adcycle: retry scheduled unit=d8d07eb9c12e7f99 attempt=1 delay_ms=2000
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let unit = e.ad_unit.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::StateChanged => {
                tracing::info!(target: "adcycle", unit, from = ?e.from, to = ?e.to, "state changed");
            }
            EventKind::SdkInitRequested => {
                tracing::info!(target: "adcycle", unit, "sdk init requested");
            }
            EventKind::SdkReady => {
                tracing::info!(target: "adcycle", unit, "sdk ready");
            }
            EventKind::LoadRequested => {
                tracing::info!(target: "adcycle", unit, attempt = ?e.attempt, "load requested");
            }
            EventKind::ShowRequested => {
                tracing::info!(target: "adcycle", unit, "show requested");
            }
            EventKind::Loaded => {
                tracing::info!(target: "adcycle", unit, network = reason, "loaded");
            }
            EventKind::LoadFailed => {
                tracing::warn!(
                    target: "adcycle",
                    unit,
                    attempt = ?e.attempt,
                    code = ?e.code,
                    reason,
                    "load failed"
                );
            }
            EventKind::Shown => {
                tracing::info!(target: "adcycle", unit, "shown");
            }
            EventKind::DisplayFailed => {
                tracing::warn!(target: "adcycle", unit, code = ?e.code, reason, "display failed");
            }
            EventKind::Hidden => {
                tracing::info!(target: "adcycle", unit, "hidden");
            }
            EventKind::RetryScheduled => {
                tracing::info!(
                    target: "adcycle",
                    unit,
                    attempt = ?e.attempt,
                    delay_ms = ?e.delay_ms,
                    "retry scheduled"
                );
            }
            EventKind::RetryFired => {
                tracing::info!(target: "adcycle", unit, attempt = ?e.attempt, "retry fired");
            }
            EventKind::RetryCancelled => {
                tracing::debug!(target: "adcycle", unit, reason, "retry cancelled");
            }
            EventKind::RetryStale => {
                tracing::debug!(target: "adcycle", unit, state = ?e.from, reason, "stale retry dropped");
            }
            EventKind::CommandRejected => {
                tracing::debug!(target: "adcycle", unit, state = ?e.from, command = reason, "command rejected");
            }
            EventKind::CallbackIgnored => {
                tracing::debug!(target: "adcycle", unit, state = ?e.from, reason, "callback ignored");
            }
            EventKind::Attached => {
                tracing::debug!(target: "adcycle", unit, "attached");
            }
            EventKind::Detached => {
                tracing::debug!(target: "adcycle", unit, "detached");
            }
            EventKind::ShutdownCompleted => {
                tracing::info!(target: "adcycle", unit, state = ?e.from, "shutdown completed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
