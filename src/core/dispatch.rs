//! # Owner-context dispatch.
//!
//! Everything that touches controller state is funneled through one unbounded
//! queue drained by [`AdRuntime::run`](super::AdRuntime::run). Senders never block
//! and may live on any thread.
//!
//! ```text
//! UI thread ──► OwnerHandle::request_load() ──┐
//! SDK thread ─► EventSink::emit(LoadFailed) ──┼──► [mpsc queue] ──► owner loop ──► AdController
//! timer task ─► RetrySink(ticket) ────────────┘                         │
//!                                                                       ▼
//!                       OwnerHandle::current_state() ◄── watch<Snapshot>
//! ```
//!
//! The queue is unbounded so that no provider callback or retry expiry is lost
//! while the owner context is busy.

use tokio::sync::{mpsc, watch};

use crate::controller::{AdState, Snapshot};
use crate::error::DispatchError;
use crate::provider::ProviderEvent;
use crate::scheduler::RetryTicket;

/// Unit of work executed on the owner context.
#[derive(Debug)]
pub enum Command {
    /// Caller asked to load an ad.
    Load,
    /// Caller asked to show the loaded ad.
    Show,
    /// Provider callback.
    Provider(ProviderEvent),
    /// A retry timer expired.
    RetryFired(RetryTicket),
    /// The SDK warm-up window elapsed.
    WarmupElapsed,
    /// Caller asked to shut down.
    Shutdown,
}

/// Thread-safe sink handed to the provider for its callbacks.
#[derive(Clone, Debug)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Command>,
}

impl EventSink {
    /// Enqueues a provider callback for the owner context.
    pub fn emit(&self, ev: ProviderEvent) -> Result<(), DispatchError> {
        self.tx
            .send(Command::Provider(ev))
            .map_err(|_| DispatchError::Closed)
    }

    /// True once the owner loop has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Caller-facing handle to a running controller.
///
/// Cheap to clone; every clone talks to the same owner context.
#[derive(Clone, Debug)]
pub struct OwnerHandle {
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<Snapshot>,
}

impl OwnerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>, status: watch::Receiver<Snapshot>) -> Self {
        Self { tx, status }
    }

    /// Asks the controller to load an ad (no-op unless `ReadyToLoad`).
    pub fn request_load(&self) -> Result<(), DispatchError> {
        self.post(Command::Load)
    }

    /// Asks the controller to show the loaded ad (no-op unless `ReadyToShow`).
    pub fn request_show(&self) -> Result<(), DispatchError> {
        self.post(Command::Show)
    }

    /// Asks the owner loop to shut the controller down and exit.
    pub fn shutdown(&self) -> Result<(), DispatchError> {
        self.post(Command::Shutdown)
    }

    /// State as of the last command processed by the owner loop.
    pub fn current_state(&self) -> AdState {
        self.status.borrow().state
    }

    /// Retry counter as of the last command processed by the owner loop.
    pub fn current_retry_attempt(&self) -> u32 {
        self.status.borrow().retry_attempt
    }

    /// Full status as of the last command processed by the owner loop.
    pub fn snapshot(&self) -> Snapshot {
        *self.status.borrow()
    }

    /// Waits until the published status satisfies `pred`.
    ///
    /// Returns immediately if the current status already matches, and
    /// `DispatchError::Closed` if the owner loop exits first.
    pub async fn wait_for(
        &self,
        pred: impl FnMut(&Snapshot) -> bool,
    ) -> Result<Snapshot, DispatchError> {
        let mut rx = self.status.clone();
        rx.wait_for(pred)
            .await
            .map(|s| *s)
            .map_err(|_| DispatchError::Closed)
    }

    /// Returns a sink posting provider callbacks to this owner context.
    pub fn sink(&self) -> EventSink {
        EventSink {
            tx: self.tx.clone(),
        }
    }

    /// True once the owner loop has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub(crate) fn post(&self, cmd: Command) -> Result<(), DispatchError> {
        self.tx.send(cmd).map_err(|_| DispatchError::Closed)
    }
}

/// Creates a queue and its handle. The receiver goes to the owner loop.
pub(crate) fn channel(
    status: watch::Receiver<Snapshot>,
) -> (OwnerHandle, mpsc::UnboundedReceiver<Command>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OwnerHandle::new(tx, status), rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SdkConfiguration;

    #[test]
    fn handle_and_sink_share_one_queue() {
        let (_status_tx, status_rx) = watch::channel(Snapshot::default());
        let (handle, mut rx) = channel(status_rx);

        handle.request_load().unwrap();
        handle
            .sink()
            .emit(ProviderEvent::SdkReady(SdkConfiguration::default()))
            .unwrap();
        handle.request_show().unwrap();

        assert!(matches!(rx.try_recv(), Ok(Command::Load)));
        assert!(matches!(rx.try_recv(), Ok(Command::Provider(_))));
        assert!(matches!(rx.try_recv(), Ok(Command::Show)));
    }

    #[test]
    fn closed_queue_reports_error() {
        let (_status_tx, status_rx) = watch::channel(Snapshot::default());
        let (handle, rx) = channel(status_rx);
        drop(rx);

        assert!(handle.is_closed());
        assert_eq!(handle.request_load(), Err(DispatchError::Closed));
        assert_eq!(handle.shutdown(), Err(DispatchError::Closed));
    }

    #[test]
    fn status_reads_latest_snapshot() {
        let (status_tx, status_rx) = watch::channel(Snapshot::default());
        let (handle, _rx) = channel(status_rx);

        status_tx.send_replace(Snapshot {
            state: AdState::WaitingRetry,
            retry_attempt: 3,
            retry_pending: true,
            shut_down: false,
        });
        assert_eq!(handle.current_state(), AdState::WaitingRetry);
        assert_eq!(handle.current_retry_attempt(), 3);
    }
}
