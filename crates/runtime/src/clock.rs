use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use foundation::time::Millis;

/// Source of "now" for everything time-dependent in the engine.
///
/// The engine never reads the system clock directly, so debounce windows,
/// frame gating and pulse timing can be driven by logical time in tests.
pub trait Clock {
    fn now(&self) -> Millis;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Millis(ms)
    }
}

/// Logical clock. Clones share the same time, so a test can keep a handle
/// while the engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Rc<Cell<i64>>,
    /// Advance applied after every `now()` read; simulates work taking time.
    step_ms: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(start.0)),
            step_ms: Rc::new(Cell::new(0)),
        }
    }

    pub fn set(&self, t: Millis) {
        self.now_ms.set(t.0);
    }

    pub fn advance(&self, ms: i64) {
        self.now_ms.set(self.now_ms.get().saturating_add(ms));
    }

    pub fn set_auto_step(&self, ms: i64) {
        self.step_ms.set(ms);
    }

    pub fn peek(&self) -> Millis {
        Millis(self.now_ms.get())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        let t = self.now_ms.get();
        self.now_ms.set(t.saturating_add(self.step_ms.get()));
        Millis(t)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};
    use foundation::time::Millis;

    #[test]
    fn clones_share_time() {
        let a = ManualClock::new(Millis(100));
        let b = a.clone();
        a.advance(50);
        assert_eq!(b.now(), Millis(150));
    }

    #[test]
    fn auto_step_advances_per_read() {
        let c = ManualClock::new(Millis(0));
        c.set_auto_step(10);
        assert_eq!(c.now(), Millis(0));
        assert_eq!(c.now(), Millis(10));
        assert_eq!(c.peek(), Millis(20));
    }
}
