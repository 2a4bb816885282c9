//! # One-shot timer backends.
//!
//! [`Timer`] is the only scheduling facility the retry logic depends on: arm a
//! callback once after a delay, unless a [`CancellationToken`] fires first.
//! The token doubles as the cancel handle, so a backend never has to track
//! its own timers.
//!
//! Backends:
//! - [`TokioTimer`] - spawns a task that races `tokio::time::sleep` against the token
//! - [`ManualTimer`](super::ManualTimer) - records armed timers and fires them on demand

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Callback run when a timer expires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Arms single-shot delayed callbacks.
///
/// ### Contract
/// - `fire` runs **at most once**, after `delay`.
/// - If `cancel` is cancelled before expiry, `fire` never runs.
/// - Cancelling after `fire` started has no effect on that invocation.
pub trait Timer: Send + Sync + 'static {
    /// Arms `fire` to run after `delay` unless `cancel` is triggered first.
    fn arm_once(&self, delay: Duration, cancel: CancellationToken, fire: TimerCallback);
}

/// Timer backed by a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioTimer {
    handle: Handle,
}

impl TokioTimer {
    /// Creates a timer spawning onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Creates a timer for the runtime the caller is running in, if any.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Timer for TokioTimer {
    fn arm_once(&self, delay: Duration, cancel: CancellationToken, fire: TimerCallback) {
        self.handle.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !cancel.is_cancelled() {
                        fire();
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let timer = TokioTimer::try_current().expect("inside runtime");
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        timer.arm_once(
            Duration::from_secs(2),
            CancellationToken::new(),
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let timer = TokioTimer::try_current().expect("inside runtime");
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let token = CancellationToken::new();
        timer.arm_once(
            Duration::from_secs(2),
            token.clone(),
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
