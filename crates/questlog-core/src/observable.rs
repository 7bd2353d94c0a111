//! Change-notified values.
//!
//! A [`Property`] holds the latest published value. Writers call
//! [`Property::set`], which compares with the held value and notifies
//! subscribers only when it changed. Subscribers receive owned copies over
//! a channel, so a slow or dropped subscriber never blocks the writer.

use std::sync::mpsc::{self, Receiver, Sender};

/// A value with change notification.
#[derive(Debug)]
pub struct Property<T> {
    value: T,
    subscribers: Vec<Sender<T>>,
}

impl<T: Clone + PartialEq> Property<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    /// Borrow the current value.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Owned copy of the current value.
    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Receive every future change. The current value is not replayed.
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Store `value`, publishing it if it differs from the held value.
    ///
    /// Returns `true` when the value changed. Subscribers whose receiver was
    /// dropped are pruned here.
    pub(crate) fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        let published = &self.value;
        self.subscribers
            .retain(|subscriber| subscriber.send(published.clone()).is_ok());
        true
    }
}

impl<T: Clone + PartialEq + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
