//! Typed publish/subscribe bus for pipeline lifecycle events
//!
//! The bus is the only shared mutable structure in the pipeline. Delivery is
//! synchronous: `publish` invokes every wildcard handler, then every handler
//! registered for the event's kind, in registration order, while holding a
//! read lock. Handlers must therefore not call back into the bus in a way
//! that needs the write lock (subscribe/close), and must not block
//! indefinitely; a presentation layer that needs asynchrony buffers events
//! on its own side.

pub mod events;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub use events::{Event, EventKind, EventPayload, LogLevel};

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Default)]
struct Registry {
    by_kind: HashMap<EventKind, Vec<Handler>>,
    wildcard: Vec<Handler>,
    closed: bool,
}

/// Decoupled publish/subscribe mechanism connecting the pipeline to its
/// presentation layer.
#[derive(Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific event kind.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut registry = self.registry.write().expect("event bus lock poisoned");
        registry
            .by_kind
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Register a handler that receives every event.
    pub fn subscribe_all<F>(&self, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut registry = self.registry.write().expect("event bus lock poisoned");
        registry.wildcard.push(Arc::new(handler));
    }

    /// Publish an event to all matching subscribers synchronously.
    ///
    /// After [`EventBus::close`] this is a no-op.
    pub fn publish(&self, payload: EventPayload) {
        let event = Event::new(payload);
        let registry = self.registry.read().expect("event bus lock poisoned");
        if registry.closed {
            return;
        }
        for handler in &registry.wildcard {
            handler(&event);
        }
        if let Some(handlers) = registry.by_kind.get(&event.kind()) {
            for handler in handlers {
                handler(&event);
            }
        }
    }

    /// Latch the bus shut; subsequent publishes are dropped.
    pub fn close(&self) {
        let mut registry = self.registry.write().expect("event bus lock poisoned");
        registry.closed = true;
    }
}
