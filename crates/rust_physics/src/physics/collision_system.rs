//! Persistent contact set and collision lifecycle
//!
//! Contacts are not diffed frame to frame. Each detection refreshes a
//! countdown; a contact ends only when its countdown runs out, so a pair
//! that is missed for a frame or two does not flap between begin and end.

use std::collections::BTreeMap;

use crate::ecs::{Entity, GameObject, World};
use crate::events::{CollisionEvent, CollisionEventKind, HandlerResponse};
use crate::physics::collision::{CollisionInfo, CollisionPair};

#[derive(Debug, Clone, Copy)]
struct TrackedCollision {
    info: CollisionInfo,
    announced: bool,
}

/// Every live contact, keyed by canonical pair
#[derive(Debug, Default, Clone)]
pub struct CollisionTracker {
    collisions: BTreeMap<CollisionPair, TrackedCollision>,
}

impl CollisionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a detection, starting or restarting the pair's countdown
    pub fn refresh(&mut self, mut info: CollisionInfo, num_collision_frames: i32) {
        info.frames_left = num_collision_frames;
        self.collisions
            .entry(info.pair())
            .and_modify(|tracked| tracked.info = info)
            .or_insert(TrackedCollision { info, announced: false });
    }

    /// Live contacts in pair order
    pub fn iter(&self) -> impl Iterator<Item = &CollisionInfo> {
        self.collisions.values().map(|tracked| &tracked.info)
    }

    /// Contact for a pair, in either order
    pub fn get(&self, a: Entity, b: Entity) -> Option<&CollisionInfo> {
        self.collisions
            .get(&CollisionPair::new(a, b))
            .map(|tracked| &tracked.info)
    }

    /// Number of live contacts
    pub fn len(&self) -> usize {
        self.collisions.len()
    }

    /// Whether there are no live contacts
    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty()
    }

    /// Forget every contact without raising events
    pub fn clear(&mut self) {
        self.collisions.clear();
    }

    /// Announce new contacts, age every contact and end the ones that lapsed
    ///
    /// Participants that are inactive when their contact ends are removed
    /// from the world.
    pub fn update(&mut self, world: &mut World) {
        self.collisions.retain(|pair, tracked| {
            if world.object(pair.entity_a).is_none() && world.object(pair.entity_b).is_none() {
                return false;
            }

            if !tracked.announced {
                tracked.announced = true;
                announce(world, *pair);
            }

            tracked.info.frames_left -= 1;
            if tracked.info.frames_left >= 0 {
                return true;
            }

            log::debug!("collision end {} / {}", pair.entity_a, pair.entity_b);
            for (entity, other) in [(pair.entity_a, pair.entity_b), (pair.entity_b, pair.entity_a)] {
                send(world, CollisionEventKind::End, entity, other);
            }
            for entity in [pair.entity_a, pair.entity_b] {
                if world.object(entity).is_some_and(|o| !o.is_active()) {
                    world.remove_object(entity);
                }
            }
            false
        });
    }
}

/// Begin for both solid participants, or trigger for the trigger volume only
fn announce(world: &mut World, pair: CollisionPair) {
    let (a, b) = (pair.entity_a, pair.entity_b);
    let a_is_trigger = world.object(a).is_some_and(GameObject::is_trigger);
    let b_is_trigger = world.object(b).is_some_and(GameObject::is_trigger);

    if a_is_trigger {
        log::debug!("trigger {} entered by {}", a, b);
        send(world, CollisionEventKind::Trigger, a, b);
    } else if b_is_trigger {
        log::debug!("trigger {} entered by {}", b, a);
        send(world, CollisionEventKind::Trigger, b, a);
    } else {
        log::debug!("collision begin {} / {}", a, b);
        send(world, CollisionEventKind::Begin, a, b);
        send(world, CollisionEventKind::Begin, b, a);
    }
}

/// Deliver one event if its receiver still exists, applying the handler's response
fn send(world: &mut World, kind: CollisionEventKind, entity: Entity, other: Entity) {
    if world.object(entity).is_none() {
        return;
    }
    let response = world.events_mut().send(CollisionEvent::new(kind, entity, other));
    if response == HandlerResponse::Deactivate {
        if let Some(object) = world.object_mut(entity) {
            object.set_active(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::collision::ContactPoint;

    const FRAMES: i32 = 3;

    fn contact(a: Entity, b: Entity) -> CollisionInfo {
        CollisionInfo::new(
            a,
            b,
            ContactPoint {
                local_a: Vec3::zeros(),
                local_b: Vec3::zeros(),
                normal: Vec3::y(),
                penetration: 0.1,
            },
        )
    }

    fn kinds(world: &mut World) -> Vec<(CollisionEventKind, u32)> {
        world
            .drain_events()
            .into_iter()
            .map(|e| (e.kind, e.entity.id()))
            .collect()
    }

    #[test]
    fn test_begin_once_then_end_after_countdown() {
        let mut world = World::new();
        let a = world.add_object(GameObject::new("a"));
        let b = world.add_object(GameObject::new("b"));
        let mut tracker = CollisionTracker::new();

        for _ in 0..4 {
            tracker.refresh(contact(b, a), FRAMES);
            tracker.update(&mut world);
        }
        let events = kinds(&mut world);
        assert_eq!(events, vec![(CollisionEventKind::Begin, 0), (CollisionEventKind::Begin, 1)]);

        // separated: the contact survives FRAMES more updates, then ends
        for frame in 1..=FRAMES {
            tracker.update(&mut world);
            if frame < FRAMES {
                assert!(world.events().pending().is_empty(), "ended early at {frame}");
            }
        }
        let events = kinds(&mut world);
        assert_eq!(events, vec![(CollisionEventKind::End, 0), (CollisionEventKind::End, 1)]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_single_missed_frame_does_not_flap() {
        let mut world = World::new();
        let a = world.add_object(GameObject::new("a"));
        let b = world.add_object(GameObject::new("b"));
        let mut tracker = CollisionTracker::new();

        tracker.refresh(contact(a, b), FRAMES);
        tracker.update(&mut world);
        tracker.update(&mut world);
        tracker.refresh(contact(a, b), FRAMES);
        tracker.update(&mut world);

        let events = kinds(&mut world);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|(kind, _)| *kind == CollisionEventKind::Begin));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_trigger_only_notifies_trigger_volume() {
        let mut world = World::new();
        let zone = world.add_object(GameObject::new("zone").as_trigger());
        let player = world.add_object(GameObject::new("player"));
        let mut tracker = CollisionTracker::new();

        tracker.refresh(contact(player, zone), FRAMES);
        tracker.update(&mut world);

        let events = world.drain_events();
        assert_eq!(events, vec![CollisionEvent::new(CollisionEventKind::Trigger, zone, player)]);
    }

    #[test]
    fn test_deactivated_participant_is_removed_when_contact_ends() {
        let mut world = World::new();
        let pickup = world.add_object(GameObject::new("pickup").as_trigger());
        let player = world.add_object(GameObject::new("player"));
        world.set_handler(
            pickup,
            Box::new(|event: &CollisionEvent| match event.kind {
                CollisionEventKind::Trigger => HandlerResponse::Deactivate,
                _ => HandlerResponse::Continue,
            }),
        );
        let mut tracker = CollisionTracker::new();

        tracker.refresh(contact(pickup, player), 0);
        tracker.update(&mut world);

        assert!(world.object(pickup).is_none());
        assert!(world.object(player).is_some());
        let kinds: Vec<_> = world.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![CollisionEventKind::Trigger, CollisionEventKind::End, CollisionEventKind::End]
        );
    }

    #[test]
    fn test_contacts_of_removed_entities_are_dropped() {
        let mut world = World::new();
        let a = world.add_object(GameObject::new("a"));
        let b = world.add_object(GameObject::new("b"));
        let mut tracker = CollisionTracker::new();
        tracker.refresh(contact(a, b), FRAMES);
        world.remove_object(a);
        world.remove_object(b);

        tracker.update(&mut world);
        assert!(tracker.is_empty());
        assert!(world.drain_events().is_empty());
    }
}
