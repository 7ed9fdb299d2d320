//! Ownership of live backend subscriptions.
//!
//! [`SubscriptionSet`] collects every handle the adapter opens during one
//! connection so teardown can dispose them together. [`DeliveryGate`] sits in
//! front of every stream callback: once closed, no callback writes to the
//! vehicle, including callbacks the backend had already started.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::backend::Disposable;

#[derive(Default)]
pub(crate) struct SubscriptionSet {
    handles: Mutex<Vec<Box<dyn Disposable>>>,
}

impl SubscriptionSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn track(&self, handle: Box<dyn Disposable>) {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Dispose and forget every tracked handle. Returns how many there were.
    pub(crate) fn dispose_all(&self) -> usize {
        let handles: Vec<_> = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in &handles {
            handle.dispose();
        }
        handles.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Open/closed switch shared by all stream callbacks of one connection.
///
/// Deliveries hold the read side for the whole write, so [`close`] returns
/// only after every in-flight delivery has finished.
///
/// [`close`]: DeliveryGate::close
#[derive(Clone)]
pub(crate) struct DeliveryGate {
    open: Arc<RwLock<bool>>,
}

impl DeliveryGate {
    pub(crate) fn new() -> Self {
        Self {
            open: Arc::new(RwLock::new(true)),
        }
    }

    /// Run `write` if the gate is open. Returns whether it ran.
    pub(crate) fn deliver(&self, write: impl FnOnce()) -> bool {
        let open = self.open.read().unwrap_or_else(PoisonError::into_inner);
        if *open {
            write();
        }
        *open
    }

    pub(crate) fn close(&self) {
        *self.open.write().unwrap_or_else(PoisonError::into_inner) = false;
    }

    pub(crate) fn is_open(&self) -> bool {
        *self.open.read().unwrap_or_else(PoisonError::into_inner)
    }
}
