//! Collision event channel
//!
//! Gameplay reacts to contacts through handlers registered per entity
//! instead of overriding callbacks on the object type. Key principles:
//! - Handlers are registered for one entity and only see its events
//! - Every delivered event is also queued for polling consumers
//! - A handler can ask for its entity to be deactivated

use std::collections::HashMap;

use crate::ecs::Entity;

/// Lifecycle transition of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEventKind {
    /// A new contact between two solid objects
    Begin,
    /// A contact lapsed without being detected again
    End,
    /// A new contact where the receiving entity is a trigger volume
    Trigger,
}

/// Event delivered to one entity about another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionEvent {
    /// What happened
    pub kind: CollisionEventKind,
    /// Entity receiving the event
    pub entity: Entity,
    /// The other participant
    pub other: Entity,
}

impl CollisionEvent {
    /// Create a new event
    pub const fn new(kind: CollisionEventKind, entity: Entity, other: Entity) -> Self {
        Self { kind, entity, other }
    }
}

/// What a handler wants done with its entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerResponse {
    /// Nothing
    #[default]
    Continue,
    /// Mark the entity inactive; it is removed from the world when its contact ends
    Deactivate,
}

/// Event handler trait
pub trait CollisionHandler {
    /// Handle an event addressed to the handler's entity
    fn on_event(&mut self, event: &CollisionEvent) -> HandlerResponse;
}

impl<F> CollisionHandler for F
where
    F: FnMut(&CollisionEvent) -> HandlerResponse,
{
    fn on_event(&mut self, event: &CollisionEvent) -> HandlerResponse {
        self(event)
    }
}

/// Per-entity handler registry plus a queue of everything delivered
#[derive(Default)]
pub struct EventChannel {
    handlers: HashMap<Entity, Vec<Box<dyn CollisionHandler>>>,
    queue: Vec<CollisionEvent>,
}

impl EventChannel {
    /// Create a new empty channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `entity`; several handlers may share an entity
    pub fn register_handler(&mut self, entity: Entity, handler: Box<dyn CollisionHandler>) {
        self.handlers.entry(entity).or_default().push(handler);
    }

    /// Drop every handler registered for `entity`
    pub fn remove_handlers(&mut self, entity: Entity) {
        self.handlers.remove(&entity);
    }

    /// Deliver an event immediately and queue it
    ///
    /// Returns [`HandlerResponse::Deactivate`] if any handler asked for it.
    pub fn send(&mut self, event: CollisionEvent) -> HandlerResponse {
        self.queue.push(event);
        let mut response = HandlerResponse::Continue;
        if let Some(handlers) = self.handlers.get_mut(&event.entity) {
            for handler in handlers.iter_mut() {
                if handler.on_event(&event) == HandlerResponse::Deactivate {
                    response = HandlerResponse::Deactivate;
                }
            }
        }
        response
    }

    /// Events delivered since the last drain, oldest first
    pub fn pending(&self) -> &[CollisionEvent] {
        &self.queue
    }

    /// Take every queued event
    pub fn drain(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.queue)
    }

    /// Clear handlers and queue
    pub fn clear(&mut self) {
        self.handlers.clear();
        self.queue.clear();
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("handled_entities", &self.handlers.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_send_queues_and_dispatches_to_owner_only() {
        let mut channel = EventChannel::new();
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        channel.register_handler(
            Entity::new(1),
            Box::new(move |_: &CollisionEvent| {
                seen.set(seen.get() + 1);
                HandlerResponse::Continue
            }),
        );

        channel.send(CollisionEvent::new(CollisionEventKind::Begin, Entity::new(1), Entity::new(2)));
        channel.send(CollisionEvent::new(CollisionEventKind::Begin, Entity::new(2), Entity::new(1)));

        assert_eq!(hits.get(), 1);
        assert_eq!(channel.pending().len(), 2);
        assert_eq!(channel.drain().len(), 2);
        assert!(channel.pending().is_empty());
    }

    #[test]
    fn test_deactivate_response_wins() {
        let mut channel = EventChannel::new();
        let owner = Entity::new(4);
        channel.register_handler(owner, Box::new(|_: &CollisionEvent| HandlerResponse::Continue));
        channel.register_handler(
            owner,
            Box::new(|event: &CollisionEvent| {
                if event.kind == CollisionEventKind::Trigger {
                    HandlerResponse::Deactivate
                } else {
                    HandlerResponse::Continue
                }
            }),
        );

        let begin = CollisionEvent::new(CollisionEventKind::Begin, owner, Entity::new(5));
        let trigger = CollisionEvent::new(CollisionEventKind::Trigger, owner, Entity::new(5));
        assert_eq!(channel.send(begin), HandlerResponse::Continue);
        assert_eq!(channel.send(trigger), HandlerResponse::Deactivate);

        channel.remove_handlers(owner);
        assert_eq!(channel.send(trigger), HandlerResponse::Continue);
    }
}
