// src/host/bus.rs

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

/// Identity of a registered handler, used to unregister it later.
pub type HandlerId = u64;

/// Single-threaded named-event bus.
///
/// One instance is constructed by the host and injected into whoever needs
/// it (no ambient globals). Event-wait tasks register a callback for a named
/// event; the driver calls [`EventBus::dispatch`] when the external system
/// reports that the event occurred.
///
/// Dispatch operates on a snapshot of the registered handlers, so a handler
/// may register or unregister (including itself) without upsetting the
/// iteration.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

#[derive(Default)]
struct BusInner {
    handlers: HashMap<String, Vec<(HandlerId, Rc<dyn Fn()>)>>,
    next_id: HandlerId,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `event`; returns the id needed to unregister.
    pub fn register_event(&self, event: &str, callback: Rc<dyn Fn()>) -> HandlerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .handlers
            .entry(event.to_string())
            .or_default()
            .push((id, callback));
        debug!(event = %event, handler = id, "registered event handler");
        id
    }

    /// Remove a previously registered handler. Unknown ids are a no-op.
    pub fn unregister_event(&self, event: &str, id: HandlerId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(handlers) = inner.handlers.get_mut(event) {
            handlers.retain(|(hid, _)| *hid != id);
            if handlers.is_empty() {
                inner.handlers.remove(event);
            }
        }
    }

    /// Invoke every handler currently registered for `event`.
    ///
    /// Returns how many handlers were called.
    pub fn dispatch(&self, event: &str) -> usize {
        let snapshot: Vec<Rc<dyn Fn()>> = {
            let inner = self.inner.borrow();
            inner
                .handlers
                .get(event)
                .map(|handlers| handlers.iter().map(|(_, cb)| Rc::clone(cb)).collect())
                .unwrap_or_default()
        };

        debug!(event = %event, handlers = snapshot.len(), "dispatching event");
        for callback in &snapshot {
            callback();
        }
        snapshot.len()
    }

    /// How many handlers are registered for `event` (used by tests).
    pub fn handler_count(&self, event: &str) -> usize {
        self.inner
            .borrow()
            .handlers
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
