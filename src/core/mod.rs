//! Runtime core: owner context and dispatch.
//!
//! This module contains the single-threaded owner loop that drives an
//! [`AdController`](crate::AdController), and the thread-safe handles feeding it.
//!
//! Internal modules:
//! - [`dispatch`]: command queue, [`OwnerHandle`] and provider [`EventSink`];
//! - [`runtime`]: the owner loop, warm-up timer and subscriber fan-out;
//! - [`builder`]: validates configuration and wires the runtime together.

mod builder;
pub(crate) mod dispatch;
mod runtime;

pub use builder::AdRuntimeBuilder;
pub use dispatch::{Command, EventSink, OwnerHandle};
pub use runtime::AdRuntime;
