//! # Mediation provider boundary.
//!
//! - [`AdProvider`] - commands the controller issues (initialize / load / show)
//!   and the subscription lifetime of its callbacks
//! - [`ProviderEvent`] - asynchronous callbacks the provider emits
//! - [`AdInfo`], [`ErrorInfo`], [`SdkConfiguration`] - callback payloads

mod provider;
mod types;

pub use provider::AdProvider;
pub use types::{AdInfo, ErrorInfo, ProviderEvent, SdkConfiguration};
