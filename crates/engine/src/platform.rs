use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use layers::Theme;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlatformSignal {
    ThemeChanged(Theme),
    Resized { width: u32, height: u32 },
}

/// Host environment notifications, drained by the engine on every tick.
pub trait PlatformSignals {
    fn drain(&mut self) -> Vec<PlatformSignal>;
}

/// Host without theme or resize notifications.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoSignals;

impl PlatformSignals for NoSignals {
    fn drain(&mut self) -> Vec<PlatformSignal> {
        Vec::new()
    }
}

/// FIFO of signals pushed by the host. Clones share the queue.
#[derive(Debug, Default, Clone)]
pub struct QueuedSignals {
    queue: Rc<RefCell<VecDeque<PlatformSignal>>>,
}

impl QueuedSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, signal: PlatformSignal) {
        self.queue.borrow_mut().push_back(signal);
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl PlatformSignals for QueuedSignals {
    fn drain(&mut self) -> Vec<PlatformSignal> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{PlatformSignal, PlatformSignals, QueuedSignals};
    use layers::Theme;

    #[test]
    fn drains_in_push_order() {
        let host = QueuedSignals::new();
        let mut engine_side = host.clone();
        host.push(PlatformSignal::ThemeChanged(Theme::Light));
        host.push(PlatformSignal::Resized {
            width: 800,
            height: 600,
        });
        assert_eq!(host.len(), 2);
        assert_eq!(
            engine_side.drain(),
            vec![
                PlatformSignal::ThemeChanged(Theme::Light),
                PlatformSignal::Resized {
                    width: 800,
                    height: 600
                }
            ]
        );
        assert!(host.is_empty());
    }
}
