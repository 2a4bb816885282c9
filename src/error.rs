//! Error types used by the adcycle runtime.
//!
//! This module defines two error enums:
//!
//! - [`ConfigError`] - the runtime could not be built from the given configuration.
//! - [`DispatchError`] - a command could not be handed to the owner context.
//!
//! Controller operations themselves never fail: illegal commands are no-ops, foreign
//! callbacks are dropped and provider failures route into retry. Both types provide
//! `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while validating configuration or building the runtime.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The ad unit identifier is empty or whitespace.
    #[error("ad unit id must not be empty")]
    EmptyAdUnitId,

    /// The backoff step is zero, which would retry in a tight loop.
    #[error("backoff step must be positive, got {step:?}")]
    ZeroBackoffStep {
        /// The configured step.
        step: Duration,
    },

    /// The backoff cap is zero, which clamps every retry to an immediate reload.
    #[error("backoff max must be positive, got {max:?}")]
    ZeroBackoffMax {
        /// The configured cap.
        max: Duration,
    },

    /// No timer was supplied and the builder was called outside a tokio runtime.
    #[error("no timer configured and no tokio runtime available")]
    NoRuntime,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use adcycle::ConfigError;
    ///
    /// assert_eq!(ConfigError::EmptyAdUnitId.as_label(), "config_empty_ad_unit_id");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::EmptyAdUnitId => "config_empty_ad_unit_id",
            ConfigError::ZeroBackoffStep { .. } => "config_zero_backoff_step",
            ConfigError::ZeroBackoffMax { .. } => "config_zero_backoff_max",
            ConfigError::NoRuntime => "config_no_runtime",
        }
    }
}

/// # Errors returned when posting to the owner context.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The owner loop has exited (shutdown completed or runtime dropped).
    #[error("owner context closed")]
    Closed,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Closed => "dispatch_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            ConfigError::ZeroBackoffStep {
                step: Duration::ZERO
            }
            .as_label(),
            "config_zero_backoff_step"
        );
        assert_eq!(
            ConfigError::ZeroBackoffMax { max: Duration::ZERO }.as_label(),
            "config_zero_backoff_max"
        );
        assert_eq!(ConfigError::NoRuntime.as_label(), "config_no_runtime");
        assert_eq!(DispatchError::Closed.as_label(), "dispatch_closed");
    }

    #[test]
    fn messages_render() {
        assert_eq!(
            ConfigError::EmptyAdUnitId.to_string(),
            "ad unit id must not be empty"
        );
        assert_eq!(DispatchError::Closed.to_string(), "owner context closed");
    }
}
