//! Latest-value cell backing every state-container field.
//!
//! A field is created as a pair: a read-only [`Latest`] handed to consumers
//! and a mutate-only [`LatestWriter`] handed to the backend adapter. Both sit
//! on one [`tokio::sync::watch`] channel, so
//!
//! * reads never suspend and always see a whole value,
//! * a new value replaces the old one (no history, no queue),
//! * readers that care can await the next change through [`Latest::watch`].

use std::sync::Arc;

use tokio::sync::watch;

/// Create a new, initially absent field.
pub fn field<T>() -> (Latest<T>, LatestWriter<T>) {
    let (tx, rx) = watch::channel(None);
    (Latest { rx }, LatestWriter { tx: Arc::new(tx) })
}

/// Read-only view of a field. Clone it freely; all clones observe the same
/// value.
#[derive(Debug, Clone)]
pub struct Latest<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> Latest<T> {
    /// The most recently delivered value, or `None` when nothing has been
    /// delivered since creation or the last reset.
    pub fn get(&self) -> Option<T> {
        self.rx.borrow().clone()
    }
}

impl<T> Latest<T> {
    /// `true` once a value is present.
    pub fn is_present(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// A fresh receiver for change notification.
    pub fn watch(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }
}

/// Mutate-only view of a field.
#[derive(Debug)]
pub struct LatestWriter<T> {
    tx: Arc<watch::Sender<Option<T>>>,
}

impl<T> Clone for LatestWriter<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> LatestWriter<T> {
    /// Replace the current value. Succeeds whether or not anyone is reading.
    pub fn set(&self, value: T) {
        self.tx.send_replace(Some(value));
    }

    /// Return the field to the absent state.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}
