//! # Event subscribers for the adcycle runtime.
//!
//! This module provides the [`Subscribe`] trait and the fan-out used to deliver
//! controller events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! AdController ── publish(Event) ──► Bus ──► AdRuntime listener ──► SubscriberSet
//!                                                                     │
//!                                                          ┌──────────┼──────────┐
//!                                                          ▼          ▼          ▼
//!                                                      LogWriter   Metrics    Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
