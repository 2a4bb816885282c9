//! # Ad provider trait.
//!
//! [`AdProvider`] is the narrow surface the controller uses to talk to a
//! mediation SDK. Calls are fire-and-forget: they return immediately and the
//! outcome arrives later as a [`ProviderEvent`](super::ProviderEvent) through the
//! [`EventSink`] handed over in [`AdProvider::subscribe`].
//!
//! ## Threading
//! Providers may emit callbacks from any thread. `EventSink::emit` is thread-safe
//! and only enqueues; the controller sees the callback later on its owner context.
//!
//! ## Example
//! ```rust
//! use parking_lot::Mutex;
//! use adcycle::{AdInfo, AdProvider, EventSink, ProviderEvent, SdkConfiguration};
//!
//! #[derive(Default)]
//! struct AlwaysFills {
//!     sink: Mutex<Option<EventSink>>,
//! }
//!
//! impl AdProvider for AlwaysFills {
//!     fn initialize(&self) {
//!         if let Some(sink) = self.sink.lock().as_ref() {
//!             let _ = sink.emit(ProviderEvent::SdkReady(SdkConfiguration::default()));
//!         }
//!     }
//!     fn load(&self, ad_unit_id: &str) {
//!         if let Some(sink) = self.sink.lock().as_ref() {
//!             let _ = sink.emit(ProviderEvent::LoadSucceeded {
//!                 ad_unit_id: ad_unit_id.into(),
//!                 info: AdInfo::default(),
//!             });
//!         }
//!     }
//!     fn show(&self, _ad_unit_id: &str) {}
//!     fn subscribe(&self, sink: EventSink) { *self.sink.lock() = Some(sink); }
//!     fn unsubscribe(&self) { self.sink.lock().take(); }
//! }
//! ```

use crate::core::EventSink;

/// Mediation SDK surface consumed by the controller.
///
/// ### Implementation requirements
/// - Never block: start the work and return.
/// - Report outcomes through the sink received in [`subscribe`](Self::subscribe).
/// - Stop emitting after [`unsubscribe`](Self::unsubscribe).
pub trait AdProvider: Send + Sync + 'static {
    /// Starts SDK initialization; completion is reported as `SdkReady`.
    fn initialize(&self);

    /// Requests an ad for `ad_unit_id`; answered by `LoadSucceeded` or `LoadFailed`.
    fn load(&self, ad_unit_id: &str);

    /// Presents the loaded ad; answered by `Shown`/`Hidden` or `DisplayFailed`.
    fn show(&self, ad_unit_id: &str);

    /// Registers the sink that receives this provider's callbacks.
    fn subscribe(&self, sink: EventSink);

    /// Removes the registered sink.
    fn unsubscribe(&self);
}
