//! In-process publish/subscribe registry.
//!
//! Single-threaded: the bus is shared as `Rc<EventBus>` and uses interior
//! mutability so handlers can re-enter it (publish, subscribe, unsubscribe)
//! while a dispatch is in progress. Dispatch iterates a snapshot of the
//! subscriber list taken at publish time, so list mutation mid-publish never
//! corrupts iteration.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::types::{EventKind, GameEvent};

/// Token returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Handler = Rc<RefCell<dyn FnMut(&GameEvent)>>;

struct Subscriber {
    id: SubscriptionId,
    handler: Handler,
}

/// Publish/subscribe registry keyed by [`EventKind`].
#[derive(Default)]
pub struct EventBus {
    registry: RefCell<HashMap<EventKind, Vec<Subscriber>>>,
    warned_unregistered: RefCell<HashSet<EventKind>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus with every event kind pre-registered.
    pub fn with_all_registered() -> Self {
        let bus = Self::new();
        for kind in EventKind::all() {
            bus.register(kind);
        }
        bus
    }

    /// Registers an event kind. Idempotent.
    pub fn register(&self, kind: EventKind) {
        self.registry.borrow_mut().entry(kind).or_default();
    }

    /// Appends a handler to the subscriber list for `kind`.
    ///
    /// Handlers run in subscription order. Subscribing to an unregistered
    /// kind creates its list.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.registry
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push(Subscriber {
                id,
                handler: Rc::new(RefCell::new(handler)),
            });
        id
    }

    /// Removes a handler. No-op when the id is not subscribed to `kind`.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) {
        if let Some(subs) = self.registry.borrow_mut().get_mut(&kind) {
            subs.retain(|s| s.id != id);
        }
    }

    /// Synchronously invokes all handlers registered for the event's kind,
    /// in subscription order.
    ///
    /// Publishing an unregistered kind auto-registers it and warns once per
    /// kind, so a forgotten registration surfaces without crashing or
    /// spamming the log.
    pub fn publish(&self, event: &GameEvent) {
        let kind = event.kind();
        let snapshot: Vec<Handler> = {
            let mut registry = self.registry.borrow_mut();
            match registry.get(&kind) {
                Some(subs) => subs.iter().map(|s| Rc::clone(&s.handler)).collect(),
                None => {
                    if self.warned_unregistered.borrow_mut().insert(kind) {
                        log::warn!("publish of unregistered event kind {kind:?}; auto-registering");
                    }
                    let _ = registry.entry(kind).or_default();
                    Vec::new()
                }
            }
        };
        // Registry borrow is released; handlers are free to re-enter the bus.
        for handler in snapshot {
            (handler.borrow_mut())(event);
        }
    }

    /// Number of live subscribers for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry
            .borrow()
            .get(&kind)
            .map_or(0, |subs| subs.len())
    }
}
