//! Payloads carried by provider callbacks.

use std::fmt;
use std::sync::Arc;

/// Configuration reported by the SDK once it finished initializing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SdkConfiguration {
    /// Whether the SDK considers itself initialized.
    pub is_initialized: bool,
    /// Two-letter country code resolved by the SDK, if any.
    pub country_code: Option<Arc<str>>,
}

/// Metadata about a loaded or displayed ad.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdInfo {
    /// Network that filled the request.
    pub network_name: Option<Arc<str>>,
    /// Placement name passed at show time.
    pub placement: Option<Arc<str>>,
    /// Estimated revenue in USD, `-1.0` when unknown.
    pub revenue: f64,
}

/// Error reported by the provider for a failed load or display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Provider-specific error code.
    pub code: i32,
    /// Provider message.
    pub message: Arc<str>,
}

impl ErrorInfo {
    /// Creates an error with the given code and message.
    pub fn new(code: i32, message: impl Into<Arc<str>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={} message={}", self.code, self.message)
    }
}

/// Asynchronous callback emitted by an [`AdProvider`](super::AdProvider).
///
/// Every variant except `SdkReady` carries the ad unit it refers to; the controller
/// drops callbacks for units other than its own.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderEvent {
    /// SDK initialization finished.
    SdkReady(SdkConfiguration),
    /// An ad was loaded.
    LoadSucceeded { ad_unit_id: Arc<str>, info: AdInfo },
    /// A load request failed.
    LoadFailed { ad_unit_id: Arc<str>, error: ErrorInfo },
    /// A loaded ad was presented.
    Shown { ad_unit_id: Arc<str>, info: AdInfo },
    /// A loaded ad could not be presented.
    DisplayFailed {
        ad_unit_id: Arc<str>,
        error: ErrorInfo,
        info: AdInfo,
    },
    /// A presented ad was closed.
    Hidden { ad_unit_id: Arc<str>, info: AdInfo },
}

impl ProviderEvent {
    /// Returns the ad unit the callback refers to (`None` for `SdkReady`).
    pub fn ad_unit_id(&self) -> Option<&str> {
        match self {
            ProviderEvent::SdkReady(_) => None,
            ProviderEvent::LoadSucceeded { ad_unit_id, .. }
            | ProviderEvent::LoadFailed { ad_unit_id, .. }
            | ProviderEvent::Shown { ad_unit_id, .. }
            | ProviderEvent::DisplayFailed { ad_unit_id, .. }
            | ProviderEvent::Hidden { ad_unit_id, .. } => Some(ad_unit_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_info_display() {
        let e = ErrorInfo::new(204, "no fill");
        assert_eq!(e.to_string(), "code=204 message=no fill");
    }

    #[test]
    fn ad_unit_of_callbacks() {
        let ev = ProviderEvent::Hidden {
            ad_unit_id: "a".into(),
            info: AdInfo::default(),
        };
        assert_eq!(ev.ad_unit_id(), Some("a"));
        assert_eq!(
            ProviderEvent::SdkReady(SdkConfiguration::default()).ad_unit_id(),
            None
        );
    }
}
