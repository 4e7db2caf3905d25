//! A polled debounce timer.
//!
//! The debouncer holds at most one pending value and the instant at which
//! it becomes due. It owns no thread and no runtime timer: callers pass the
//! current time in and ask for the value back with [`Debouncer::poll`].
//! Event loops sleep until [`Debouncer::deadline`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    pending: Option<(T, Instant)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending value with `value`, due at `now + delay`.
    pub fn schedule(&mut self, value: T, delay: Duration, now: Instant) {
        self.pending = Some((value, now + delay));
    }

    /// Drop the pending value, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Take the pending value if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.cancel()
        } else {
            None
        }
    }

    /// Take the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.cancel()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_value(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }
}
