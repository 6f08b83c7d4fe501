//! Simulated object: transform, volume, body and flags

use super::Entity;
use crate::foundation::math::{Transform, Vec3};
use crate::physics::collision::CollisionVolume;
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::physics_object::PhysicsObject;

/// One object in a [`World`](super::World)
///
/// Objects without a volume never collide; objects without a body are
/// never integrated or resolved.
#[derive(Debug, Clone)]
pub struct GameObject {
    entity: Entity,
    name: String,

    /// World transform
    pub transform: Transform,
    volume: Option<CollisionVolume>,
    physics: Option<PhysicsObject>,

    /// Layers this object pairs with and can be ray-hit on
    pub layers: CollisionLayers,

    is_active: bool,
    is_asleep: bool,
    is_trigger: bool,
    is_spring: bool,
}

impl GameObject {
    /// Create an object; the world assigns the real entity id on insertion
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entity: Entity::new(u32::MAX),
            name: name.into(),
            transform: Transform::identity(),
            volume: None,
            physics: None,
            layers: CollisionLayers::default(),
            is_active: true,
            is_asleep: false,
            is_trigger: false,
            is_spring: false,
        }
    }

    /// Builder: place at `position`
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder: set the whole transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: attach a collision volume
    pub fn with_volume(mut self, volume: CollisionVolume) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Builder: attach a rigid body
    pub fn with_physics(mut self, physics: PhysicsObject) -> Self {
        self.physics = Some(physics);
        self
    }

    /// Builder: set the layer mask
    pub fn with_layers(mut self, layers: CollisionLayers) -> Self {
        self.layers = layers;
        self
    }

    /// Builder: mark as trigger volume (events only, no response)
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Builder: resolve this object's contacts with springs instead of impulses
    pub fn as_spring(mut self) -> Self {
        self.is_spring = true;
        self
    }

    pub(crate) fn set_entity(&mut self, entity: Entity) {
        self.entity = entity;
    }

    /// Stable id
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collision volume, if any
    pub const fn volume(&self) -> Option<&CollisionVolume> {
        self.volume.as_ref()
    }

    /// Replace the collision volume
    pub fn set_volume(&mut self, volume: Option<CollisionVolume>) {
        self.volume = volume;
    }

    /// Rigid body, if any
    pub const fn physics(&self) -> Option<&PhysicsObject> {
        self.physics.as_ref()
    }

    /// Mutable rigid body, if any
    pub fn physics_mut(&mut self) -> Option<&mut PhysicsObject> {
        self.physics.as_mut()
    }

    /// Transform and body borrowed together
    pub fn split_physics_mut(&mut self) -> (&mut Transform, Option<&mut PhysicsObject>) {
        (&mut self.transform, self.physics.as_mut())
    }

    /// Half extents the broadphase inserts, if the object has a volume
    pub fn broadphase_half_extents(&self) -> Option<Vec3> {
        self.volume.map(|v| v.broadphase_half_extents(&self.transform))
    }

    /// Active objects take part in the simulation
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Activate or deactivate; inactive objects are removed when a contact ends
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Asleep objects skip integration
    pub const fn is_asleep(&self) -> bool {
        self.is_asleep
    }

    /// Put to sleep (zeroing velocities) or wake up
    pub fn set_asleep(&mut self, asleep: bool) {
        self.is_asleep = asleep;
        if asleep {
            if let Some(body) = self.physics.as_mut() {
                body.stop();
            }
        }
    }

    /// Wake and reset the motion average so the body is not put straight back to sleep
    pub fn wake(&mut self, sleep_epsilon: f32) {
        self.is_asleep = false;
        if let Some(body) = self.physics.as_mut() {
            body.set_weighted_average_motion(sleep_epsilon * 10.0);
        }
    }

    /// Trigger volumes raise events but get no physical response
    pub const fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Spring objects resolve contacts with penalty forces
    pub const fn is_spring(&self) -> bool {
        self.is_spring
    }
}
