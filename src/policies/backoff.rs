//! # Backoff policy for reloading after a failed ad load.
//!
//! [`BackoffPolicy`] controls how the retry delay grows with consecutive load
//! failures. It is parameterized by:
//! - [`BackoffPolicy::step`] the delay added per failed attempt;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay for failure `n` (1-based) is `step × n`, clamped to `max`, then jitter
//! is applied. The base is derived purely from the attempt number, so jitter output
//! never feeds back into later delays. There is no attempt cutoff.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use adcycle::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::default();
//!
//! assert_eq!(backoff.next(1), Duration::from_secs(2));
//! assert_eq!(backoff.next(3), Duration::from_secs(6));
//!
//! // 2s × 7 = 14s → capped at max=10s
//! assert_eq!(backoff.next(7), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
///
/// - [`BackoffPolicy::step`] - linear growth per failure;
/// - [`BackoffPolicy::max`] - the maximum delay cap;
/// - [`BackoffPolicy::jitter`] - optional randomization of the clamped delay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay added for each consecutive failure.
    pub step: Duration,
    /// Maximum delay cap for retries.
    pub max: Duration,
    /// Jitter applied on top of the linear delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a policy producing 2s, 4s, 6s, 8s, 10s, 10s, … without jitter.
    fn default() -> Self {
        Self {
            step: Duration::from_secs(2),
            max: Duration::from_secs(10),
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay before retrying after the `attempt`-th consecutive failure.
    ///
    /// `attempt` is 1-based; `0` yields [`Duration::ZERO`]. Overflowing
    /// multiplications clamp to [`BackoffPolicy::max`].
    pub fn next(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let base = match self.step.checked_mul(attempt) {
            Some(d) if d <= self.max => d,
            _ => self.max,
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sequence_caps_at_ten() {
        let policy = BackoffPolicy::default();
        let got: Vec<u64> = (1..=8).map(|n| policy.next(n).as_secs()).collect();
        assert_eq!(got, vec![2, 4, 6, 8, 10, 10, 10, 10]);
    }

    #[test]
    fn test_attempt_zero_is_immediate() {
        assert_eq!(BackoffPolicy::default().next(0), Duration::ZERO);
    }

    #[test]
    fn test_matches_min_two_n_ten() {
        let policy = BackoffPolicy::default();
        for n in 1..50u32 {
            let expected = (2 * u64::from(n)).min(10);
            assert_eq!(policy.next(n), Duration::from_secs(expected), "attempt {n}");
        }
    }

    #[test]
    fn test_step_exceeds_max() {
        let policy = BackoffPolicy {
            step: Duration::from_secs(30),
            max: Duration::from_secs(5),
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(1), Duration::from_secs(5));
    }

    #[test]
    fn test_overflow_clamps_to_max() {
        let policy = BackoffPolicy {
            step: Duration::from_secs(u64::MAX / 2),
            max: Duration::from_secs(10),
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_equal_jitter_bounds() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Equal,
            ..BackoffPolicy::default()
        };
        for attempt in 1..30 {
            let base = Duration::from_secs((2 * u64::from(attempt)).min(10));
            let delay = policy.next(attempt);
            assert!(delay >= base / 2, "attempt {attempt}: {delay:?} < half");
            assert!(delay <= base, "attempt {attempt}: {delay:?} > base");
        }
    }

    #[test]
    fn test_full_jitter_never_exceeds_base() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..BackoffPolicy::default()
        };
        for attempt in 1..30 {
            assert!(policy.next(attempt) <= Duration::from_secs(10));
        }
    }
}
