//! Payload-free notifications with any number of subscribers.

use std::fmt;

use gate_puzzle_core::Event;

/// Handle returned by [`Signal::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Subscriber list invoked once per emitted notification.
#[derive(Default)]
pub struct Signal {
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut()>)>,
    next_id: u64,
}

impl Signal {
    /// Creates a signal without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber; subscribers run in registration order.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut() + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscriber, reporting whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Reports whether nobody listens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Invokes every subscriber once.
    pub fn emit(&mut self) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber();
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Engine notifications exposed to game code.
#[derive(Debug, Default)]
pub struct Signals {
    /// Fires once per block removed through a gate.
    pub block_removed: Signal,
    /// Fires once each time the grid finishes (re)initialising.
    pub grid_initialized: Signal,
}

impl Signals {
    /// Creates an empty set of signals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the signals matching world events, in event order.
    pub fn notify(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::BlockRemoved { .. } => self.block_removed.emit(),
                Event::GridInitialized => self.grid_initialized.emit(),
                _ => {}
            }
        }
    }
}
