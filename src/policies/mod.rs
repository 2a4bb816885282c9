//! Retry policies.
//!
//! This module groups the knobs that control **how long** the controller waits
//! before reloading after a failed load.
//!
//! ## Contents
//! - [`BackoffPolicy`] linear, capped retry delays (step / max + jitter)
//! - [`JitterPolicy`]  randomization strategy applied to each delay
//!
//! ## Quick wiring
//! ```text
//! Config { backoff: BackoffPolicy, .. }
//!      └─► controller::AdController::on_load_failed
//!           - retry_attempt += 1
//!           - delay = backoff.next(retry_attempt)
//!           - RetryScheduler::schedule(delay)
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → step=2s, max=10s, jitter=None (2, 4, 6, 8, 10, 10, …).

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
