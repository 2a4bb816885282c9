use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::Config,
    controller::{AdController, Snapshot},
    error::ConfigError,
    events::Bus,
    provider::AdProvider,
    scheduler::{RetryScheduler, RetrySink, Timer, TokioTimer},
    subscribers::Subscribe,
};

use super::{
    dispatch::{self, Command, OwnerHandle},
    runtime::AdRuntime,
};

/// Builder for constructing an [`AdRuntime`] and its [`OwnerHandle`].
pub struct AdRuntimeBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    timer: Option<Arc<dyn Timer>>,
}

impl AdRuntimeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            timer: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive controller events (transitions, failures, retries)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Overrides the timer backend used for retries and the SDK warm-up.
    ///
    /// Defaults to a [`TokioTimer`] on the runtime `build` is called from.
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Builds the runtime around `provider`.
    ///
    /// This consumes the builder and wires all components:
    /// - Event bus for broadcasting
    /// - Command queue and status channel shared with the returned handle
    /// - Retry scheduler posting expiries back onto the queue
    ///
    /// Fails if the configuration is invalid, or if no timer was given and
    /// there is no tokio runtime to default to.
    pub fn build(
        self,
        provider: Arc<dyn AdProvider>,
    ) -> Result<(AdRuntime, OwnerHandle), ConfigError> {
        self.cfg.validate()?;
        let timer: Arc<dyn Timer> = match self.timer {
            Some(timer) => timer,
            None => Arc::new(TokioTimer::try_current().ok_or(ConfigError::NoRuntime)?),
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let (status_tx, status_rx) = watch::channel(Snapshot::default());
        let (handle, rx) = dispatch::channel(status_rx);

        let retry_handle = handle.clone();
        let sink: RetrySink = Arc::new(move |ticket| {
            let _ = retry_handle.post(Command::RetryFired(ticket));
        });
        let retry = RetryScheduler::new(Arc::clone(&timer), sink);
        let controller = AdController::new(&self.cfg, retry, bus.clone());

        let runtime = AdRuntime::new_internal(
            controller,
            provider,
            handle.clone(),
            rx,
            status_tx,
            timer,
            self.cfg.sdk_warmup,
            bus,
            self.subscribers,
        );
        Ok((runtime, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventSink;
    use crate::scheduler::ManualTimer;

    struct Silent;

    impl AdProvider for Silent {
        fn initialize(&self) {}
        fn load(&self, _ad_unit_id: &str) {}
        fn show(&self, _ad_unit_id: &str) {}
        fn subscribe(&self, _sink: EventSink) {}
        fn unsubscribe(&self) {}
    }

    #[test]
    fn rejects_invalid_config() {
        let err = AdRuntimeBuilder::new(Config::new(""))
            .with_timer(Arc::new(ManualTimer::new()))
            .build(Arc::new(Silent))
            .err();
        assert_eq!(err, Some(ConfigError::EmptyAdUnitId));
    }

    #[test]
    fn needs_a_runtime_without_explicit_timer() {
        let err = AdRuntimeBuilder::new(Config::new("unit"))
            .build(Arc::new(Silent))
            .err();
        assert_eq!(err, Some(ConfigError::NoRuntime));
    }

    #[test]
    fn explicit_timer_builds_outside_a_runtime() {
        let (rt, handle) = AdRuntimeBuilder::new(Config::new("unit"))
            .with_timer(Arc::new(ManualTimer::new()))
            .build(Arc::new(Silent))
            .expect("valid");
        assert_eq!(handle.snapshot(), Snapshot::default());
        assert!(!handle.is_closed());
        drop(rt);
        assert!(handle.is_closed());
    }
}
