use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use super::AuthUser;

/// Session-change notification
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(AuthUser),
    SignedOut,
    PasswordRecovery,
}

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Registry of session-change listeners
#[derive(Default)]
pub struct SessionEvents {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<u64, Listener>>,
}

impl SessionEvents {
    pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, Arc::new(callback));
        debug!(subscription = id, "Session listener registered");
        Subscription {
            id,
            events: Some(Arc::downgrade(self)),
        }
    }

    pub fn publish(&self, event: &SessionEvent) {
        // Listeners run outside the lock so they may unsubscribe themselves
        let listeners: Vec<Listener> = self.lock().values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn remove(&self, id: u64) -> bool {
        self.lock().remove(&id).is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Listener>> {
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle to a registered listener. Released by [`Subscription::unsubscribe`]
/// or on drop, whichever comes first; never both.
#[must_use = "dropping a subscription releases the listener immediately"]
pub struct Subscription {
    id: u64,
    events: Option<Weak<SessionEvents>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        match self.events.as_ref().and_then(Weak::upgrade) {
            Some(events) => {
                let active = events.lock().contains_key(&self.id);
                active
            }
            None => false,
        }
    }

    /// Release the listener. Returns whether it was still registered.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        match self.events.take().and_then(|weak| weak.upgrade()) {
            Some(events) => {
                let removed = events.remove(self.id);
                debug!(subscription = self.id, "Session listener released");
                removed
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
