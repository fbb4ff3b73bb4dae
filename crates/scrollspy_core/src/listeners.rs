//! Listener sets with disposer handles
//!
//! Every observable in scrollspy (the UI store, the visibility tracker, the
//! section resolver) keeps its subscribers in a [`ListenerSet`]. Subscribing
//! returns a [`Subscription`] that removes the listener when it is dropped or
//! explicitly unsubscribed, so re-initialization never stacks duplicate
//! handlers.
//!
//! Listeners are invoked in subscription order. A listener that panics is
//! logged and skipped; the remaining listeners still run.

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

new_key_type! {
    /// Unique identifier for a registered listener
    pub struct ListenerId;
}

/// Listener callback type
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Entry<T> {
    order: u64,
    listener: Listener<T>,
}

struct Registry<T> {
    entries: SlotMap<ListenerId, Entry<T>>,
    next_order: u64,
}

/// An ordered, thread-safe set of listeners for values of type `T`
pub struct ListenerSet<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> ListenerSet<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                entries: SlotMap::with_key(),
                next_order: 0,
            })),
        }
    }

    /// Register a listener and return its id
    pub fn add<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let order = registry.next_order;
        registry.next_order += 1;
        registry.entries.insert(Entry {
            order,
            listener: Arc::new(listener),
        })
    }

    /// Register a listener and return a disposer handle for it
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.add(listener);
        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.lock().entries.remove(id);
            }
        })
    }

    /// Remove a listener. Removing an unknown id is a no-op.
    pub fn remove(&self, id: ListenerId) -> bool {
        self.registry.lock().entries.remove(id).is_some()
    }

    /// Remove every listener
    pub fn clear(&self) {
        self.registry.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.lock().entries.is_empty()
    }

    /// Invoke every listener with `value`.
    ///
    /// The registry lock is released before any listener runs, so listeners
    /// may subscribe or unsubscribe. Returns the number of listeners that
    /// completed without panicking.
    pub fn emit(&self, value: &T) -> usize {
        let listeners = self.snapshot();
        let mut delivered = 0;

        for listener in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(value))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    tracing::error!(
                        panic = %panic_message(payload.as_ref()),
                        "listener panicked; continuing with remaining listeners"
                    );
                }
            }
        }

        delivered
    }

    fn snapshot(&self) -> Vec<Listener<T>> {
        let registry = self.registry.lock();
        let mut entries: Vec<(u64, Listener<T>)> = registry
            .entries
            .values()
            .map(|entry| (entry.order, entry.listener.clone()))
            .collect();
        drop(registry);

        entries.sort_unstable_by_key(|(order, _)| *order);
        entries.into_iter().map(|(_, listener)| listener).collect()
    }
}

impl<T: 'static> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ListenerSet<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Disposer handle returned by `subscribe`.
///
/// The listener is removed when the handle is dropped or
/// [`unsubscribe`](Subscription::unsubscribe)d. Call
/// [`detach`](Subscription::detach) to keep the listener for the lifetime of
/// its source instead.
#[must_use = "dropping a Subscription immediately removes the listener"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Remove the listener now
    pub fn unsubscribe(mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }

    /// Keep the listener registered without holding the handle
    pub fn detach(mut self) {
        self.dispose = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}
