//! # Ad lifecycle controller.
//!
//! - [`AdController`] - the state machine for one ad unit
//! - [`AdState`] - lifecycle states
//! - [`Snapshot`] - copyable status published to other threads

mod core;
mod state;

pub use core::AdController;
pub use state::{AdState, Snapshot};
