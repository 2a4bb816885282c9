//! # Runtime configuration.
//!
//! [`Config`] defines the controller's identity and timing: the ad unit it owns,
//! the SDK warm-up window, the retry backoff and the event bus capacity.
//!
//! ## Sentinel values
//! - `sdk_warmup = 0s` → promote to `ReadyToLoad` as soon as the SDK reports ready
//! - `bus_capacity = 0` → clamped to 1 by the bus
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use adcycle::Config;
//!
//! let mut cfg = Config::new("d8d07eb9c12e7f99");
//! cfg.sdk_warmup = Duration::from_secs(1);
//!
//! assert!(cfg.validate().is_ok());
//! assert_eq!(cfg.backoff.next(2), Duration::from_secs(4));
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::BackoffPolicy;

/// Default wait between SDK-ready and the first allowed load.
pub const DEFAULT_SDK_WARMUP: Duration = Duration::from_secs(3);

/// Configuration for one ad unit controller and its owner runtime.
///
/// ## Field semantics
/// - `ad_unit_id`: identifier passed to the provider and matched against callbacks
/// - `sdk_warmup`: delay between SDK-ready and `ReadyToLoad`
/// - `backoff`: retry delay policy after load failures
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Ad unit owned by this controller. Must not be empty.
    pub ad_unit_id: String,

    /// Warm-up window after the SDK reports ready.
    ///
    /// Some mediation adapters finish their own setup after the SDK callback;
    /// loading earlier tends to fail with "no fill".
    pub sdk_warmup: Duration,

    /// Retry backoff after a failed load.
    pub backoff: BackoffPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Subscribers lagging more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Creates a configuration for `ad_unit_id` with default timing.
    ///
    /// - `sdk_warmup = 3s`
    /// - `backoff = BackoffPolicy::default()` (2s step, 10s cap)
    /// - `bus_capacity = 1024`
    pub fn new(ad_unit_id: impl Into<String>) -> Self {
        Self {
            ad_unit_id: ad_unit_id.into(),
            sdk_warmup: DEFAULT_SDK_WARMUP,
            backoff: BackoffPolicy::default(),
            bus_capacity: 1024,
        }
    }

    /// Checks the configuration for values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ad_unit_id.trim().is_empty() {
            return Err(ConfigError::EmptyAdUnitId);
        }
        if self.backoff.step.is_zero() {
            return Err(ConfigError::ZeroBackoffStep {
                step: self.backoff.step,
            });
        }
        if self.backoff.max.is_zero() {
            return Err(ConfigError::ZeroBackoffMax {
                max: self.backoff.max,
            });
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::new("unit");
        assert_eq!(cfg.sdk_warmup, Duration::from_secs(3));
        assert_eq!(cfg.backoff, BackoffPolicy::default());
        assert_eq!(cfg.bus_capacity, 1024);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_blank_ad_unit() {
        assert_eq!(Config::new("").validate(), Err(ConfigError::EmptyAdUnitId));
        assert_eq!(Config::new("  ").validate(), Err(ConfigError::EmptyAdUnitId));
    }

    #[test]
    fn rejects_zero_step() {
        let mut cfg = Config::new("unit");
        cfg.backoff.step = Duration::ZERO;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroBackoffStep { .. })
        ));
    }

    #[test]
    fn rejects_zero_max() {
        let mut cfg = Config::new("unit");
        cfg.backoff.max = Duration::ZERO;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroBackoffMax {
                max: Duration::ZERO
            })
        );
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let mut cfg = Config::new("unit");
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
