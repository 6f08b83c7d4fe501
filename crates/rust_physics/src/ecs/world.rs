//! World container

use super::{Entity, GameObject};
use crate::events::{CollisionEvent, CollisionHandler, EventChannel};
use crate::physics::constraints::Constraint;

/// Owns every object, constraint and event handler of one simulation
///
/// Objects are kept sorted by id, which is also insertion order.
#[derive(Debug, Default)]
pub struct World {
    objects: Vec<GameObject>,
    constraints: Vec<Box<dyn Constraint>>,
    events: EventChannel,
    next_entity_id: u32,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object and hand back its id
    ///
    /// Returns [`Entity::INVALID`] without inserting once ids run out.
    pub fn add_object(&mut self, object: GameObject) -> Entity {
        self.try_add_object(object).unwrap_or(Entity::INVALID)
    }

    /// Insert an object, or `None` once every id has been handed out
    pub fn try_add_object(&mut self, mut object: GameObject) -> Option<Entity> {
        let Some(next_id) = self.next_entity_id.checked_add(1) else {
            log::warn!("entity ids exhausted, '{}' was not added", object.name());
            return None;
        };
        let entity = Entity::new(self.next_entity_id);
        self.next_entity_id = next_id;
        object.set_entity(entity);
        log::trace!("added {} '{}'", entity, object.name());
        self.objects.push(object);
        Some(entity)
    }

    /// Remove an object along with its handlers and any constraint that uses it
    pub fn remove_object(&mut self, entity: Entity) -> Option<GameObject> {
        let index = index_of(&self.objects, entity)?;
        let object = self.objects.remove(index);
        self.events.remove_handlers(entity);
        self.constraints.retain(|c| {
            let (a, b) = c.entities();
            a != entity && b != entity
        });
        log::debug!("removed {} '{}'", entity, object.name());
        Some(object)
    }

    /// Look up an object
    pub fn object(&self, entity: Entity) -> Option<&GameObject> {
        index_of(&self.objects, entity).map(|i| &self.objects[i])
    }

    /// Look up an object mutably
    pub fn object_mut(&mut self, entity: Entity) -> Option<&mut GameObject> {
        index_of(&self.objects, entity).map(move |i| &mut self.objects[i])
    }

    /// Every object in id order
    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    /// Every object in id order, mutably
    pub fn objects_mut(&mut self) -> &mut [GameObject] {
        &mut self.objects
    }

    /// Number of objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Register a constraint
    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    /// Number of registered constraints
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Register a collision handler for `entity`
    pub fn set_handler(&mut self, entity: Entity, handler: Box<dyn CollisionHandler>) {
        self.events.register_handler(entity, handler);
    }

    /// Event channel
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    /// Event channel, mutably
    pub fn events_mut(&mut self) -> &mut EventChannel {
        &mut self.events
    }

    /// Take every event delivered since the last call
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        self.events.drain()
    }

    /// Objects and constraints borrowed together for the solver
    pub fn split_constraints_mut(&mut self) -> (&mut [GameObject], &mut [Box<dyn Constraint>]) {
        (&mut self.objects, &mut self.constraints)
    }

    /// Remove everything; ids keep counting up
    pub fn clear(&mut self) {
        self.objects.clear();
        self.constraints.clear();
        self.events.clear();
    }
}

/// Position of `entity` in an id-sorted object slice
pub fn index_of(objects: &[GameObject], entity: Entity) -> Option<usize> {
    objects.binary_search_by_key(&entity, GameObject::entity).ok()
}

/// Borrow two distinct objects mutably, in the order asked for
pub fn pair_mut(
    objects: &mut [GameObject],
    a: Entity,
    b: Entity,
) -> Option<(&mut GameObject, &mut GameObject)> {
    let ia = index_of(objects, a)?;
    let ib = index_of(objects, b)?;
    if ia == ib {
        return None;
    }
    if ia < ib {
        let (low, high) = objects.split_at_mut(ib);
        Some((&mut low[ia], &mut high[0]))
    } else {
        let (low, high) = objects.split_at_mut(ia);
        Some((&mut high[0], &mut low[ib]))
    }
}
