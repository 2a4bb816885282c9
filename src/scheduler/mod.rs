//! # Delayed execution for retries and warm-up.
//!
//! - [`Timer`] - backend-agnostic one-shot timer (`arm_once` + cancellation token)
//! - [`TokioTimer`] - async sleep backend
//! - [`ManualTimer`] - caller-driven backend for deterministic runs
//! - [`RetryScheduler`] - at most one pending retry with cancel-and-replace semantics

mod manual;
mod retry;
mod timer;

pub use manual::ManualTimer;
pub use retry::{RetryScheduler, RetrySink, RetryTicket};
pub use timer::{Timer, TimerCallback, TokioTimer};
