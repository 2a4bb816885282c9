//! Controller states and the read-only status snapshot.

use std::fmt;

/// Lifecycle state of the ad unit.
///
/// ```text
/// None ─start─► WaitingForSdk ─sdk ready─► None ─warm-up─► ReadyToLoad
///
/// ReadyToLoad ─load─► Loading ─ok────► ReadyToShow ─show─► Showing ─hidden/display failed─► ReadyToLoad
///                        │
///                        └─failed─► WaitingRetry ─timer─► ReadyToLoad ─(auto load)─► Loading
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AdState {
    /// Not started yet, or SDK ready and warming up.
    #[default]
    None,
    /// Waiting for the one-time SDK initialization signal.
    WaitingForSdk,
    /// No ad loaded, no request pending.
    ReadyToLoad,
    /// Load issued, awaiting the provider callback.
    Loading,
    /// Ad loaded and available.
    ReadyToShow,
    /// Ad currently presented.
    Showing,
    /// Backoff timer running after a load failure.
    WaitingRetry,
}

impl AdState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AdState::None => "none",
            AdState::WaitingForSdk => "waiting_for_sdk",
            AdState::ReadyToLoad => "ready_to_load",
            AdState::Loading => "loading",
            AdState::ReadyToShow => "ready_to_show",
            AdState::Showing => "showing",
            AdState::WaitingRetry => "waiting_retry",
        }
    }
}

impl fmt::Display for AdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Point-in-time view of a controller, safe to hand to other threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Current state.
    pub state: AdState,
    /// Consecutive load failures since the last successful load.
    pub retry_attempt: u32,
    /// Whether a retry timer is armed.
    pub retry_pending: bool,
    /// Whether the controller has shut down.
    pub shut_down: bool,
}
