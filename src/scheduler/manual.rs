//! # Manually driven timer.
//!
//! [`ManualTimer`] never fires on its own. It records every armed timer and lets
//! the caller decide when time passes, which makes retry behavior fully
//! deterministic in tests and in embedders that own their own frame clock.

use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::timer::{Timer, TimerCallback};

struct Armed {
    delay: Duration,
    cancel: CancellationToken,
    fire: Option<TimerCallback>,
}

impl Armed {
    fn is_live(&self) -> bool {
        self.fire.is_some() && !self.cancel.is_cancelled()
    }
}

/// Timer that fires only when told to.
#[derive(Default)]
pub struct ManualTimer {
    armed: Mutex<Vec<Armed>>,
}

impl ManualTimer {
    /// Creates an empty timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of armed timers that were neither fired nor cancelled.
    pub fn pending(&self) -> usize {
        self.armed.lock().iter().filter(|a| a.is_live()).count()
    }

    /// Delays of every timer ever armed, in arming order.
    pub fn armed_delays(&self) -> Vec<Duration> {
        self.armed.lock().iter().map(|a| a.delay).collect()
    }

    /// Delay of the most recently armed timer.
    pub fn last_delay(&self) -> Option<Duration> {
        self.armed.lock().last().map(|a| a.delay)
    }

    /// Fires the oldest live timer. Returns `false` if none was pending.
    ///
    /// The callback runs after the internal lock is released, so it may arm
    /// new timers.
    pub fn fire_next(&self) -> bool {
        let fire = {
            let mut armed = self.armed.lock();
            armed
                .iter_mut()
                .find(|a| a.is_live())
                .and_then(|a| a.fire.take())
        };
        match fire {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }

    /// Fires every live timer armed so far. Returns how many fired.
    pub fn fire_all(&self) -> usize {
        let mut n = 0;
        while self.fire_next() {
            n += 1;
        }
        n
    }
}

impl Timer for ManualTimer {
    fn arm_once(&self, delay: Duration, cancel: CancellationToken, fire: TimerCallback) {
        self.armed.lock().push(Armed {
            delay,
            cancel,
            fire: Some(fire),
        });
    }
}
