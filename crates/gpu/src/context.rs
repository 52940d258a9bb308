use tracing::{info, warn};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ContextState {
    #[default]
    Active,
    Lost,
}

/// Tracks the GPU context through `Active -> Lost -> Active`.
///
/// Repeated loss or restore notifications are ignored; the returned flag
/// tells the caller whether a transition actually happened.
#[derive(Debug, Default)]
pub struct ContextMonitor {
    state: ContextState,
    losses: u64,
}

impl ContextMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_lost(&self) -> bool {
        self.state == ContextState::Lost
    }

    pub fn losses(&self) -> u64 {
        self.losses
    }

    pub fn on_context_lost(&mut self) -> bool {
        if self.is_lost() {
            return false;
        }
        self.state = ContextState::Lost;
        self.losses += 1;
        warn!(losses = self.losses, "GPU context lost; rendering suspended");
        true
    }

    pub fn on_context_restored(&mut self) -> bool {
        if !self.is_lost() {
            return false;
        }
        self.state = ContextState::Active;
        info!("GPU context restored");
        true
    }
}
