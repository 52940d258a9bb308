use foundation::time::Millis;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::FrameGate;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Quiet period applied to coarse triggers.
    pub debounce_ms: i64,
    /// Minimum spacing between executed frames; `None` disables the gate.
    pub min_frame_interval_ms: Option<i64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            min_frame_interval_ms: None,
        }
    }
}

/// What happened to a rebuild request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Coarse trigger armed (or re-armed) its quiet period.
    Debounced,
    /// Continuous trigger scheduled for the next animation frame.
    Scheduled,
    /// A frame was already scheduled; this request collapsed into it.
    Coalesced,
    /// Rendering is paused; only the `pending` flag was recorded.
    Deferred,
    /// Rendering is suspended (GPU context lost); request dropped.
    Dropped,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RebuildCause {
    Frame,
    Debounce,
}

/// Result of polling the scheduler on an animation frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Poll {
    Idle,
    /// Work is due but the frame gate held it back; it stays scheduled.
    Skipped,
    Rebuild(RebuildCause),
}

/// Coalesces rebuild triggers into composition passes.
///
/// Coarse triggers (settled pan/zoom, data setters, API calls) are debounced;
/// continuous triggers (in-flight pan/zoom, pulse ticks) collapse into at most
/// one rebuild per animation frame. The scheduler itself never runs anything:
/// the owner polls it once per frame and executes the pass when told to.
///
/// While paused, requests are remembered as a single `pending` flag rather
/// than queued, so the rebuild issued on resume always reflects current state.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    config: SchedulerConfig,
    debounce_deadline: Option<Millis>,
    frame_scheduled: bool,
    paused: bool,
    pending: bool,
    suspended: bool,
    gate: FrameGate,
}

impl RenderScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            debounce_deadline: None,
            frame_scheduled: false,
            paused: false,
            pending: false,
            suspended: false,
            gate: FrameGate::new(config.min_frame_interval_ms),
        }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Swap timing parameters (device tier changed). Scheduled work is kept.
    pub fn reconfigure(&mut self, config: SchedulerConfig) {
        self.config = config;
        let last = self.gate.last_executed();
        self.gate = FrameGate::new(config.min_frame_interval_ms);
        if let Some(t) = last {
            self.gate.record(t);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// A frame-aligned rebuild is queued.
    pub fn is_scheduled(&self) -> bool {
        self.frame_scheduled
    }

    pub fn debounce_deadline(&self) -> Option<Millis> {
        self.debounce_deadline
    }

    pub fn has_work(&self) -> bool {
        self.frame_scheduled || self.debounce_deadline.is_some()
    }

    pub fn request_coarse(&mut self, now: Millis) -> RequestOutcome {
        if self.suspended {
            return RequestOutcome::Dropped;
        }
        if self.paused {
            self.pending = true;
            return RequestOutcome::Deferred;
        }
        self.debounce_deadline = Some(now.saturating_add_ms(self.config.debounce_ms));
        RequestOutcome::Debounced
    }

    pub fn request_frame(&mut self) -> RequestOutcome {
        if self.suspended {
            return RequestOutcome::Dropped;
        }
        if self.paused {
            self.pending = true;
            return RequestOutcome::Deferred;
        }
        if self.frame_scheduled {
            return RequestOutcome::Coalesced;
        }
        self.frame_scheduled = true;
        RequestOutcome::Scheduled
    }

    /// Called once per animation frame.
    pub fn poll(&mut self, now: Millis) -> Poll {
        if self.suspended || self.paused {
            return Poll::Idle;
        }
        let debounce_due = self.debounce_deadline.is_some_and(|d| now >= d);
        let cause = if self.frame_scheduled {
            RebuildCause::Frame
        } else if debounce_due {
            RebuildCause::Debounce
        } else {
            return Poll::Idle;
        };

        if !self.gate.admits(now) {
            return Poll::Skipped;
        }

        self.frame_scheduled = false;
        // A frame rebuild already reflects the state a due debounce would
        // have rendered; a debounce that is still quiet stays armed.
        if debounce_due {
            self.debounce_deadline = None;
        }
        self.gate.record(now);
        Poll::Rebuild(cause)
    }

    /// Pause or resume execution.
    ///
    /// Returns `true` when resuming with a pending request: the caller must
    /// issue exactly one rebuild immediately.
    pub fn set_paused(&mut self, paused: bool, now: Millis) -> bool {
        if paused == self.paused {
            return false;
        }
        self.paused = paused;
        if paused {
            if self.has_work() {
                self.pending = true;
            }
            self.frame_scheduled = false;
            self.debounce_deadline = None;
            debug!(pending = self.pending, "render paused");
            return false;
        }

        let replay = std::mem::take(&mut self.pending);
        debug!(replay, "render resumed");
        if replay {
            self.note_executed(now);
        }
        replay
    }

    /// Suspend while the GPU context is gone. Everything queued is dropped;
    /// recovery forces its own full pass.
    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
        if suspended {
            self.frame_scheduled = false;
            self.debounce_deadline = None;
        }
    }

    /// Record a rebuild executed outside [`poll`](Self::poll) (explicit
    /// render, resume replay, context restore).
    pub fn note_executed(&mut self, now: Millis) {
        self.frame_scheduled = false;
        self.debounce_deadline = None;
        self.gate.record(now);
    }

    /// Remember that a rebuild is owed without scheduling it.
    pub fn mark_pending(&mut self) {
        self.pending = true;
    }

    pub fn cancel(&mut self) {
        self.frame_scheduled = false;
        self.debounce_deadline = None;
        self.pending = false;
    }
}
