//! Listener registry - Copy-on-write collection of message listeners
//!
//! The registry holds one immutable snapshot behind a lock. Add and remove
//! build a new snapshot and swap it in; dispatch clones the current `Arc` and
//! iterates without holding the lock, so listeners may add or remove
//! listeners (or supply further messages) from inside a callback.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::entities::Message;
use crate::domain::traits::MessageListener;

type Snapshot = Arc<Vec<Arc<dyn MessageListener>>>;

/// Thread-safe registry of message listeners
pub struct ListenerRegistry {
    listeners: RwLock<Snapshot>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Register a listener. The same listener added twice is notified twice.
    pub fn add(&self, listener: Arc<dyn MessageListener>) {
        let mut current = self.listeners.write().unwrap_or_else(PoisonError::into_inner);

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(listener);
        *current = Arc::new(next);

        tracing::debug!(listeners = current.len(), "Message listener added");
    }

    /// Unregister the first registration of `listener`, compared by identity.
    ///
    /// Returns false (and changes nothing) when it was not registered.
    pub fn remove(&self, listener: &Arc<dyn MessageListener>) -> bool {
        let mut current = self.listeners.write().unwrap_or_else(PoisonError::into_inner);

        let Some(position) = current.iter().position(|l| same_listener(l, listener)) else {
            return false;
        };

        let mut next: Vec<_> = current.iter().cloned().collect();
        next.remove(position);
        *current = Arc::new(next);

        tracing::debug!(listeners = current.len(), "Message listener removed");
        true
    }

    /// Current snapshot, in registration order
    pub fn snapshot(&self) -> Snapshot {
        let current = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify every listener in the current snapshot.
    ///
    /// Each call is isolated: an error or a panic is logged and the next
    /// listener still runs. Returns the number of listeners that failed.
    pub fn dispatch(&self, message: &Message) -> usize {
        let snapshot = self.snapshot();
        let mut failures = 0;

        for (index, listener) in snapshot.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.on_message(message))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    tracing::error!(listener = index, error = %e, "Message listener failed");
                }
                Err(payload) => {
                    failures += 1;
                    tracing::error!(listener = index, panic = panic_message(&*payload), "Message listener panicked");
                }
            }
        }

        failures
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn same_listener(a: &Arc<dyn MessageListener>, b: &Arc<dyn MessageListener>) -> bool {
    // Compare data pointers only; vtable pointers are not guaranteed unique.
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
