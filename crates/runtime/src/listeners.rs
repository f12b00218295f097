//! Ordered listener registries for pipeline events.
//!
//! Listeners run synchronously in registration order. A listener receives the
//! event payload only, never the system, so it cannot re-enter the pipeline
//! for the entity being processed.

use std::fmt;

use damage_core::{DamageChangedEvent, EntityId};

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

struct Entry<L> {
    id: ListenerId,
    name: String,
    listener: L,
}

struct Entries<L> {
    entries: Vec<Entry<L>>,
    next_id: u64,
}

impl<L> Entries<L> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    fn push(&mut self, name: String, listener: L) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, name, listener });
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

type Listener<E> = Box<dyn FnMut(EntityId, &mut E) + Send>;

/// Listeners for a mutable event payload such as
/// [`damage_core::BeforeDamageChangedEvent`] or [`damage_core::DamageModifyEvent`].
pub struct ListenerRegistry<E> {
    inner: Entries<Listener<E>>,
}

impl<E> ListenerRegistry<E> {
    pub fn new() -> Self {
        Self {
            inner: Entries::new(),
        }
    }

    /// Appends a listener; it runs after every listener registered before it.
    pub fn subscribe<F>(&mut self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: FnMut(EntityId, &mut E) + Send + 'static,
    {
        self.inner.push(name.into(), Box::new(listener))
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.inner.remove(id)
    }

    /// Runs every listener in registration order.
    pub fn dispatch(&mut self, entity: EntityId, event: &mut E) {
        for entry in &mut self.inner.entries {
            (entry.listener)(entity, event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Listener names in dispatch order (for debugging).
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.names()
    }
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

type ChangedListener = Box<dyn FnMut(EntityId, &DamageChangedEvent<'_>) + Send>;

/// Listeners for the informational [`DamageChangedEvent`].
///
/// The payload is read-only; these listeners observe but cannot alter the change.
pub struct ChangedListeners {
    inner: Entries<ChangedListener>,
}

impl ChangedListeners {
    pub fn new() -> Self {
        Self {
            inner: Entries::new(),
        }
    }

    pub fn subscribe<F>(&mut self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: FnMut(EntityId, &DamageChangedEvent<'_>) + Send + 'static,
    {
        self.inner.push(name.into(), Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.inner.remove(id)
    }

    pub fn dispatch(&mut self, entity: EntityId, event: &DamageChangedEvent<'_>) {
        for entry in &mut self.inner.entries {
            (entry.listener)(entity, event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.names()
    }
}

impl Default for ChangedListeners {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChangedListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use damage_core::DamageableState;

    #[test]
    fn dispatches_in_registration_order() {
        let mut registry: ListenerRegistry<Vec<&'static str>> = ListenerRegistry::new();
        registry.subscribe("first", |_, seen| seen.push("first"));
        registry.subscribe("second", |_, seen| seen.push("second"));
        registry.subscribe("third", |_, seen| seen.push("third"));

        let mut seen = Vec::new();
        registry.dispatch(EntityId(1), &mut seen);

        assert_eq!(seen, ["first", "second", "third"]);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let mut registry: ListenerRegistry<u32> = ListenerRegistry::new();
        let add_one = registry.subscribe("add_one", |_, n| *n += 1);
        registry.subscribe("double", |_, n| *n *= 2);

        assert!(registry.unsubscribe(add_one));
        assert!(!registry.unsubscribe(add_one));

        let mut n = 5;
        registry.dispatch(EntityId(1), &mut n);
        assert_eq!(n, 10);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn changed_listeners_observe_entity() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = ChangedListeners::new();
        let sink = Arc::clone(&seen);
        listeners.subscribe("record", move |entity, event: &DamageChangedEvent<'_>| {
            sink.lock()
                .unwrap()
                .push((entity, event.damageable().total_damage()));
        });

        let state = DamageableState::new();
        listeners.dispatch(EntityId(4), &DamageChangedEvent::new(&state, None, true, None));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, EntityId(4));
    }
}
