//! # Example: Interstitial with a flaky network
//!
//! A simulated mediation SDK answers from its own threads: initialization takes
//! 300ms, the first two loads fail with "no fill", later ones succeed.
//!
//! Run with:
//! ```text
//! RUST_LOG=adcycle=debug cargo run --example interstitial --features logging
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    thread,
    time::Duration,
};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use adcycle::{
    AdInfo, AdProvider, AdRuntime, AdState, BackoffPolicy, Config, ErrorInfo, EventSink,
    LogWriter, ProviderEvent, SdkConfiguration, Subscribe,
};

/// Mediation SDK stand-in that answers on background threads.
#[derive(Default)]
struct FlakySdk {
    sink: Mutex<Option<EventSink>>,
    loads: AtomicU32,
}

impl FlakySdk {
    fn later(&self, after: Duration, ev: ProviderEvent) {
        let Some(sink) = self.sink.lock().clone() else {
            return;
        };
        thread::spawn(move || {
            thread::sleep(after);
            let _ = sink.emit(ev);
        });
    }
}

impl AdProvider for FlakySdk {
    fn initialize(&self) {
        self.later(
            Duration::from_millis(300),
            ProviderEvent::SdkReady(SdkConfiguration {
                is_initialized: true,
                country_code: Some("DE".into()),
            }),
        );
    }

    fn load(&self, ad_unit_id: &str) {
        let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        let ad_unit_id: Arc<str> = ad_unit_id.into();
        let ev = if n <= 2 {
            ProviderEvent::LoadFailed {
                ad_unit_id,
                error: ErrorInfo::new(204, "no fill"),
            }
        } else {
            ProviderEvent::LoadSucceeded {
                ad_unit_id,
                info: AdInfo {
                    network_name: Some("AppLovin".into()),
                    placement: None,
                    revenue: 0.0042,
                },
            }
        };
        self.later(Duration::from_millis(150), ev);
    }

    fn show(&self, ad_unit_id: &str) {
        let ad_unit_id: Arc<str> = ad_unit_id.into();
        self.later(
            Duration::from_millis(50),
            ProviderEvent::Shown {
                ad_unit_id: Arc::clone(&ad_unit_id),
                info: AdInfo::default(),
            },
        );
        self.later(
            Duration::from_millis(800),
            ProviderEvent::Hidden {
                ad_unit_id,
                info: AdInfo::default(),
            },
        );
    }

    fn subscribe(&self, sink: EventSink) {
        *self.sink.lock() = Some(sink);
    }

    fn unsubscribe(&self) {
        self.sink.lock().take();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("adcycle=info")),
        )
        .init();

    let mut cfg = Config::new("d8d07eb9c12e7f99");
    cfg.sdk_warmup = Duration::from_millis(500);
    cfg.backoff = BackoffPolicy {
        step: Duration::from_millis(400),
        max: Duration::from_secs(2),
        ..BackoffPolicy::default()
    };

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let (runtime, handle) = AdRuntime::builder(cfg)
        .with_subscribers(subs)
        .build(Arc::new(FlakySdk::default()))?;

    let token = CancellationToken::new();
    let run = tokio::spawn(runtime.run(token.clone()));

    handle.wait_for(|s| s.state == AdState::ReadyToLoad).await?;
    handle.request_load()?;

    let ready = handle.wait_for(|s| s.state == AdState::ReadyToShow).await?;
    println!("[demo] ad ready after retries (attempt counter {})", ready.retry_attempt);

    handle.request_show()?;
    handle.wait_for(|s| s.state == AdState::ReadyToLoad).await?;
    println!("[demo] ad presented, unit back to {}", handle.current_state());

    handle.shutdown()?;
    let last = run.await?;
    println!("[demo] stopped in {} (shut down: {})", last.state, last.shut_down);
    Ok(())
}
