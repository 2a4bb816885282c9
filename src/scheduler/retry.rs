//! # RetryScheduler: one pending retry, cancel-and-replace.
//!
//! Holds at most one armed retry. Each armed retry gets a fresh [`RetryTicket`]
//! and its own [`CancellationToken`]; when the timer expires the ticket is handed
//! to the [`RetrySink`], which is expected to marshal it to the owner context.
//!
//! ## Rules
//! - `schedule()` **always cancels** the previous retry before arming a new one
//! - `cancel()` prevents a not-yet-fired retry from reaching the sink
//! - a ticket reaching the owner context is honored only if it is still the
//!   pending one ([`RetryScheduler::complete`]); anything else is stale
//! - dropping the scheduler cancels its pending retry
//!
//! ```text
//! schedule(2s) ─► ticket #0 armed
//! schedule(4s) ─► cancel #0, ticket #1 armed      (never two pending)
//! timer expires ─► sink(#1) ─► owner ─► complete(#1) == true
//! late sink(#0) ─► owner ─► complete(#0) == false (stale)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::timer::Timer;

/// Tag identifying one armed retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RetryTicket(u64);

impl RetryTicket {
    /// Raw ticket number (monotonic per scheduler).
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RetryTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receives the ticket of an expired retry. Called from the timer backend's thread.
pub type RetrySink = Arc<dyn Fn(RetryTicket) + Send + Sync + 'static>;

struct PendingRetry {
    ticket: RetryTicket,
    delay: Duration,
    cancel: CancellationToken,
}

/// Cancellable single-shot retry timer owned by one controller.
pub struct RetryScheduler {
    timer: Arc<dyn Timer>,
    sink: RetrySink,
    pending: Option<PendingRetry>,
    next_ticket: u64,
}

impl RetryScheduler {
    /// Creates a scheduler arming timers on `timer` and delivering expiries to `sink`.
    pub fn new(timer: Arc<dyn Timer>, sink: RetrySink) -> Self {
        Self {
            timer,
            sink,
            pending: None,
            next_ticket: 0,
        }
    }

    /// Arms a retry after `delay`, replacing any pending one.
    ///
    /// Returns the new ticket and the ticket it replaced, if any.
    pub fn schedule(&mut self, delay: Duration) -> (RetryTicket, Option<RetryTicket>) {
        let replaced = self.cancel();

        let ticket = RetryTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);

        let cancel = CancellationToken::new();
        let sink = Arc::clone(&self.sink);
        self.timer
            .arm_once(delay, cancel.clone(), Box::new(move || sink(ticket)));

        self.pending = Some(PendingRetry {
            ticket,
            delay,
            cancel,
        });
        (ticket, replaced)
    }

    /// Cancels the pending retry. Returns its ticket if one was pending.
    pub fn cancel(&mut self) -> Option<RetryTicket> {
        self.pending.take().map(|p| {
            p.cancel.cancel();
            p.ticket
        })
    }

    /// Marks `ticket` as fired if it is the pending retry.
    ///
    /// Returns `false` for cancelled, replaced or unknown tickets.
    pub fn complete(&mut self, ticket: RetryTicket) -> bool {
        match &self.pending {
            Some(p) if p.ticket == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// True if a retry is armed.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ticket of the armed retry, if any.
    pub fn pending_ticket(&self) -> Option<RetryTicket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// Delay the armed retry was scheduled with, if any.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.delay)
    }
}

impl Drop for RetryScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualTimer;
    use parking_lot::Mutex;

    fn scheduler() -> (RetryScheduler, Arc<ManualTimer>, Arc<Mutex<Vec<RetryTicket>>>) {
        let timer = Arc::new(ManualTimer::new());
        let fired = Arc::new(Mutex::new(Vec::new()));
        let f = Arc::clone(&fired);
        let sink: RetrySink = Arc::new(move |t| f.lock().push(t));
        let sched = RetryScheduler::new(timer.clone(), sink);
        (sched, timer, fired)
    }

    #[test]
    fn schedule_replaces_pending() {
        let (mut sched, timer, fired) = scheduler();

        let (first, replaced) = sched.schedule(Duration::from_secs(2));
        assert_eq!(replaced, None);
        let (second, replaced) = sched.schedule(Duration::from_secs(4));
        assert_eq!(replaced, Some(first));
        assert_ne!(first, second);

        assert_eq!(timer.pending(), 1);
        assert_eq!(sched.pending_delay(), Some(Duration::from_secs(4)));

        timer.fire_all();
        assert_eq!(*fired.lock(), vec![second]);
        assert!(sched.complete(second));
        assert!(!sched.is_pending());
    }

    #[test]
    fn cancel_prevents_firing() {
        let (mut sched, timer, fired) = scheduler();
        let (ticket, _) = sched.schedule(Duration::from_secs(2));

        assert_eq!(sched.cancel(), Some(ticket));
        assert_eq!(sched.cancel(), None);
        assert_eq!(timer.fire_all(), 0);
        assert!(fired.lock().is_empty());
    }

    #[test]
    fn stale_ticket_is_not_completed() {
        let (mut sched, _timer, _fired) = scheduler();
        let (old, _) = sched.schedule(Duration::from_secs(2));
        let (new, _) = sched.schedule(Duration::from_secs(4));

        assert!(!sched.complete(old));
        assert_eq!(sched.pending_ticket(), Some(new));
    }

    #[test]
    fn drop_cancels_pending() {
        let (mut sched, timer, fired) = scheduler();
        sched.schedule(Duration::from_secs(2));
        drop(sched);

        assert_eq!(timer.pending(), 0);
        assert_eq!(timer.fire_all(), 0);
        assert!(fired.lock().is_empty());
    }
}
