//! Ordered listener registry with explicit subscription handles.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::change::TreeChangeEvent;
use crate::tree::SyntaxTree;

/// Receives tree change events.
///
/// Listeners run on the mutating thread while the document is locked for
/// writing; they see the tree in its current state through the `tree`
/// argument and must not try to lock the document themselves.
pub trait TreeChangeListener: Send + Sync {
    fn tree_changed(&self, event: &TreeChangeEvent, tree: &SyntaxTree);
}

impl<F> TreeChangeListener for F
where
    F: Fn(&TreeChangeEvent, &SyntaxTree) + Send + Sync,
{
    fn tree_changed(&self, event: &TreeChangeEvent, tree: &SyntaxTree) {
        self(event, tree)
    }
}

struct Registration {
    id: u64,
    active: AtomicBool,
    listener: Arc<dyn TreeChangeListener>,
}

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: RwLock<Arc<Vec<Arc<Registration>>>>,
}

impl Listeners {
    fn remove(&self, id: u64) {
        let mut entries = self.entries.write();
        let next: Vec<Arc<Registration>> = entries
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        *entries = Arc::new(next);
    }
}

/// Broadcasts [`TreeChangeEvent`]s to listeners in registration order.
#[derive(Default, Clone)]
pub struct EventBus {
    listeners: Arc<Listeners>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned
    /// subscription is disposed; dropping the handle does not unregister.
    pub fn subscribe(&self, listener: impl TreeChangeListener + 'static) -> Subscription {
        let registration = Arc::new(Registration {
            id: self.listeners.next_id.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            listener: Arc::new(listener),
        });
        let mut entries = self.listeners.entries.write();
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push(Arc::clone(&registration));
        *entries = Arc::new(next);
        tracing::trace!("[EVENTS] listener {} subscribed", registration.id);
        Subscription {
            listeners: Arc::downgrade(&self.listeners),
            registration,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.entries.read().len()
    }

    /// Deliver `event` to every listener registered at the time of the
    /// call, skipping any disposed while the dispatch is running.
    pub(crate) fn publish(&self, event: &TreeChangeEvent, tree: &SyntaxTree) {
        let snapshot = Arc::clone(&self.listeners.entries.read());
        tracing::trace!(
            "[EVENTS] {:?} in {} to {} listeners",
            event.change,
            event.document,
            snapshot.len()
        );
        for registration in snapshot.iter() {
            if registration.active.load(Ordering::Acquire) {
                registration.listener.tree_changed(event, tree);
            }
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[must_use = "a listener stays registered until its subscription is disposed"]
pub struct Subscription {
    listeners: Weak<Listeners>,
    registration: Arc<Registration>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.registration.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.registration.active.load(Ordering::Acquire)
    }

    /// Unregister the listener. Takes effect immediately, also for a
    /// dispatch that is currently running.
    pub fn dispose(&self) {
        if !self.registration.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.registration.id);
        }
        tracing::trace!("[EVENTS] listener {} disposed", self.registration.id);
    }
}
