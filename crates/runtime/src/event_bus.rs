use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// Typed observer list.
///
/// Handlers run synchronously on the emitting thread in subscription order.
/// There is no buffering: an event emitted with no subscribers is dropped.
pub struct EventBus<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
    emitted: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
            emitted: 0,
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .field("emitted", &self.emitted)
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, handler: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn emit(&mut self, event: &E) {
        self.emitted += 1;
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn emitted_count(&self) -> u64 {
        self.emitted
    }
}
