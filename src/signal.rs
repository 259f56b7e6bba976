//! Synchronous, single-threaded notifications.
//!
//! The engine never redraws or persists anything itself; it only announces
//! intent through signals and lets the host decide scheduling (debouncing,
//! batching, animation frames).

#[cfg(test)]
#[path = "signal_test.rs"]
mod signal_test;

use std::fmt;

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// A list of callbacks invoked in subscription order on every [`Signal::emit`].
pub struct Signal<T> {
    subscribers: Vec<Subscriber<T>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self { subscribers: Vec::new() }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T> Signal<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Callbacks cannot be removed individually; drop the
    /// owner to release them.
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Invoke every subscriber with `value`, synchronously, before returning.
    pub fn emit(&mut self, value: &T) {
        for subscriber in &mut self.subscribers {
            subscriber(value);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Move all subscribers out of `other` into `self`.
    pub fn absorb(&mut self, other: &mut Signal<T>) {
        self.subscribers.append(&mut other.subscribers);
    }
}
