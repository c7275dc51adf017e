// Standard Library Imports
use std::{
    fmt::{self, Debug, Formatter},
    sync::{Arc, RwLock},
    time::Instant,
};

// Public API ==========================================================================================================

/// A shared "something changed" signal. Every `bump()` stamps the current time, advances the generation, and calls
/// each subscriber once with the new generation
#[derive(Clone)]
pub struct Refresh(Arc<RwLock<Inner>>);

pub type RefreshCallback = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Subscription(u64);

impl Refresh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timestamp(&self) -> Instant {
        self.0.read().unwrap().timestamp
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.0.read().unwrap().generation
    }

    pub fn subscribe(&self, callback: RefreshCallback) -> Subscription {
        let mut inner = self.0.write().unwrap();
        let id = inner.next_subscription;
        inner.next_subscription += 1;
        inner.subscribers.push((id, callback));

        Subscription(id)
    }

    pub fn unsubscribe(&self, Subscription(id): Subscription) {
        self.0
            .write()
            .unwrap()
            .subscribers
            .retain(|&(subscriber, _)| subscriber != id);
    }

    pub fn bump(&self) -> u64 {
        let (generation, subscribers) = {
            let mut inner = self.0.write().unwrap();
            inner.timestamp = Instant::now();
            inner.generation += 1;

            let subscribers: Vec<_> = inner
                .subscribers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect();
            (inner.generation, subscribers)
        };

        // NOTE: The lock is released before calling out, so subscribers are free to read the `Refresh` themselves
        for callback in subscribers {
            callback(generation);
        }

        generation
    }
}

impl Default for Refresh {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(Inner {
            timestamp: Instant::now(),
            generation: 0,
            next_subscription: 0,
            subscribers: Vec::new(),
        })))
    }
}

impl Debug for Refresh {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let inner = self.0.read().unwrap();
        f.debug_struct("Refresh")
            .field("timestamp", &inner.timestamp)
            .field("generation", &inner.generation)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

// Private Helper Code =================================================================================================

struct Inner {
    timestamp: Instant,
    generation: u64,
    next_subscription: u64,
    subscribers: Vec<(u64, RefreshCallback)>,
}

// Unit Tests ==========================================================================================================
