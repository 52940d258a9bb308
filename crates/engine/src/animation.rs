use foundation::time::Millis;
use layers::pulse::pulse_phase;
use tracing::debug;

use crate::config::PulseConfig;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum PulseState {
    #[default]
    Idle,
    Pulsing,
}

/// Outcome of [`PulseAnimator::poll`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PulseTick {
    /// Nothing due.
    None,
    /// Pulse clock advanced; a frame rebuild should be requested.
    Tick,
    /// No candidates left; the interval was cleared.
    Stopped,
}

/// Drives the shared pulse clock: `Idle -> Pulsing -> Idle`.
///
/// Pulsing starts only once the warm-up since engine start has elapsed and
/// something qualifies. Each tick re-checks the candidates and stops on the
/// first tick that finds none.
#[derive(Debug, Clone)]
pub struct PulseAnimator {
    config: PulseConfig,
    started_at: Millis,
    state: PulseState,
    next_tick: Option<Millis>,
    pulse_time: Millis,
    ticks: u64,
}

impl PulseAnimator {
    pub fn new(config: PulseConfig, started_at: Millis) -> Self {
        Self {
            config,
            started_at,
            state: PulseState::Idle,
            next_tick: None,
            pulse_time: started_at,
            ticks: 0,
        }
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    pub fn is_pulsing(&self) -> bool {
        self.state == PulseState::Pulsing
    }

    pub fn pulse_time(&self) -> Millis {
        self.pulse_time
    }

    pub fn next_tick(&self) -> Option<Millis> {
        self.next_tick
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn warmed_up(&self, now: Millis) -> bool {
        now.since(self.started_at) >= self.config.warmup_ms
    }

    /// Shared phase while pulsing.
    pub fn phase(&self) -> Option<f32> {
        self.is_pulsing()
            .then(|| pulse_phase(self.pulse_time, self.config.period_ms))
    }

    /// Move to the state the candidates call for. Calling it again with the
    /// same answer is a no-op; `has_candidates` is only evaluated once the
    /// warm-up has elapsed.
    pub fn sync(&mut self, now: Millis, has_candidates: impl FnOnce() -> bool) -> PulseState {
        if !self.warmed_up(now) {
            return self.state;
        }
        match (self.state, has_candidates()) {
            (PulseState::Idle, true) => {
                self.state = PulseState::Pulsing;
                self.pulse_time = now;
                self.next_tick = Some(now.saturating_add_ms(self.config.interval_ms));
                debug!("pulse started");
            }
            (PulseState::Pulsing, false) => self.stop(),
            _ => {}
        }
        self.state
    }

    pub fn poll(&mut self, now: Millis, has_candidates: impl FnOnce() -> bool) -> PulseTick {
        let Some(due) = self.next_tick else {
            return PulseTick::None;
        };
        if now < due {
            return PulseTick::None;
        }
        if !has_candidates() {
            self.stop();
            return PulseTick::Stopped;
        }
        self.pulse_time = now;
        self.ticks += 1;
        self.next_tick = Some(now.saturating_add_ms(self.config.interval_ms));
        PulseTick::Tick
    }

    pub fn stop(&mut self) {
        if self.state == PulseState::Pulsing {
            debug!(ticks = self.ticks, "pulse stopped");
        }
        self.state = PulseState::Idle;
        self.next_tick = None;
    }
}
