use foundation::time::Millis;

/// Minimum-interval gate for constrained devices.
///
/// With an interval of 33 ms a 60 Hz animation-frame source is thinned to
/// roughly 30 executed frames per second.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct FrameGate {
    min_interval_ms: Option<i64>,
    last_executed: Option<Millis>,
}

impl FrameGate {
    pub fn new(min_interval_ms: Option<i64>) -> Self {
        Self {
            min_interval_ms: min_interval_ms.filter(|ms| *ms > 0),
            last_executed: None,
        }
    }

    pub fn min_interval_ms(&self) -> Option<i64> {
        self.min_interval_ms
    }

    /// Whether a frame at `now` may execute. Does not record anything.
    pub fn admits(&self, now: Millis) -> bool {
        match (self.min_interval_ms, self.last_executed) {
            (Some(min), Some(last)) => now.since(last) >= min,
            _ => true,
        }
    }

    pub fn record(&mut self, now: Millis) {
        self.last_executed = Some(now);
    }

    pub fn last_executed(&self) -> Option<Millis> {
        self.last_executed
    }
}
