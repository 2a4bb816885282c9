//! # adcycle
//!
//! **adcycle** drives the lifecycle of a single full-screen ad unit on top of a
//! mediation SDK: SDK initialization, a warm-up window, load/show requests and
//! automatic retries with capped linear backoff after load failures.
//!
//! The SDK is abstracted behind [`AdProvider`]. Its asynchronous callbacks may
//! arrive on any thread; they are marshalled onto one owner context where the
//! [`AdController`] state machine runs without locks.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller threads              SDK threads                 timer tasks
//!   OwnerHandle                 EventSink                   RetrySink / warm-up
//!   request_load/show           emit(ProviderEvent)         RetryFired / WarmupElapsed
//!        │                           │                           │
//!        └───────────────────────────┼───────────────────────────┘
//!                                    ▼
//!                         [unbounded command queue]
//!                                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  AdRuntime (owner context)                                        │
//! │  - AdController (state, retry counter, RetryScheduler)            │
//! │  - warm-up timer                                                  │
//! │  - watch<Snapshot> ──► OwnerHandle::current_state()               │
//! └──────┬─────────────────────────────────────────────┬──────────────┘
//!        │ provider.initialize/load/show               │ publish(Event)
//!        ▼                                             ▼
//!   AdProvider (SDK)                       Bus ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Lifecycle
//! ```text
//! None ─start─► WaitingForSdk ─SdkReady─► None ─warm-up─► ReadyToLoad
//!
//! ReadyToLoad ─load─► Loading ─LoadSucceeded─► ReadyToShow ─show─► Showing
//!                        │                                           │
//!                        └─LoadFailed─► WaitingRetry              Hidden / Shown /
//!                                          │                     DisplayFailed
//!                      delay = min(2s·n, 10s)                        │
//!                                          ▼                         ▼
//!                                    ReadyToLoad ─(auto load)    ReadyToLoad
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **State machine** | Lifecycle of one ad unit, guarded transitions.               | [`AdController`], [`AdState`], [`Snapshot`] |
//! | **Retry**         | One pending retry, capped linear backoff, optional jitter.   | [`RetryScheduler`], [`BackoffPolicy`]       |
//! | **Owner context** | Marshals commands and callbacks onto one task.               | [`AdRuntime`], [`OwnerHandle`], [`EventSink`] |
//! | **Provider**      | Narrow SDK surface and callback payloads.                    | [`AdProvider`], [`ProviderEvent`]           |
//! | **Subscriber API**| Hook into controller events (logging, metrics).              | [`Subscribe`], [`Event`]                    |
//! | **Timers**        | Pluggable one-shot timers, tokio-backed or manual.           | [`Timer`], [`TokioTimer`], [`ManualTimer`]  |
//! | **Errors**        | Typed configuration and dispatch errors.                     | [`ConfigError`], [`DispatchError`]          |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use parking_lot::Mutex;
//! use tokio_util::sync::CancellationToken;
//! use adcycle::{AdInfo, AdProvider, AdRuntime, AdState, Config, EventSink, ProviderEvent, SdkConfiguration};
//!
//! #[derive(Default)]
//! struct InstantFill {
//!     sink: Mutex<Option<EventSink>>,
//! }
//!
//! impl InstantFill {
//!     fn emit(&self, ev: ProviderEvent) {
//!         if let Some(sink) = self.sink.lock().as_ref() {
//!             let _ = sink.emit(ev);
//!         }
//!     }
//! }
//!
//! impl AdProvider for InstantFill {
//!     fn initialize(&self) {
//!         self.emit(ProviderEvent::SdkReady(SdkConfiguration::default()));
//!     }
//!     fn load(&self, ad_unit_id: &str) {
//!         self.emit(ProviderEvent::LoadSucceeded { ad_unit_id: ad_unit_id.into(), info: AdInfo::default() });
//!     }
//!     fn show(&self, ad_unit_id: &str) {
//!         self.emit(ProviderEvent::Hidden { ad_unit_id: ad_unit_id.into(), info: AdInfo::default() });
//!     }
//!     fn subscribe(&self, sink: EventSink) { *self.sink.lock() = Some(sink); }
//!     fn unsubscribe(&self) { self.sink.lock().take(); }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::new("d8d07eb9c12e7f99");
//!     cfg.sdk_warmup = Duration::from_millis(10);
//!
//!     let (runtime, handle) = AdRuntime::builder(cfg).build(Arc::new(InstantFill::default()))?;
//!     let run = tokio::spawn(runtime.run(CancellationToken::new()));
//!
//!     handle.wait_for(|s| s.state == AdState::ReadyToLoad).await?;
//!     handle.request_load()?;
//!     handle.wait_for(|s| s.state == AdState::ReadyToShow).await?;
//!     handle.request_show()?;
//!     handle.wait_for(|s| s.state == AdState::ReadyToLoad).await?;
//!
//!     handle.shutdown()?;
//!     let last = run.await?;
//!     assert!(last.shut_down);
//!     Ok(())
//! }
//! ```

mod config;
mod controller;
mod core;
mod error;
mod events;
mod policies;
mod provider;
mod scheduler;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_SDK_WARMUP};
pub use controller::{AdController, AdState, Snapshot};
pub use core::{AdRuntime, AdRuntimeBuilder, Command, EventSink, OwnerHandle};
pub use error::{ConfigError, DispatchError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use provider::{AdInfo, AdProvider, ErrorInfo, ProviderEvent, SdkConfiguration};
pub use scheduler::{
    ManualTimer, RetryScheduler, RetrySink, RetryTicket, Timer, TimerCallback, TokioTimer,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
