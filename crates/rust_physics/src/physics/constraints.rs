//! Pairwise constraints relaxed by impulses
//!
//! Constraints are solved one at a time, several passes per tick, rather
//! than as a global system.

use std::fmt::Debug;

use crate::ecs::{pair_mut, Entity, GameObject};
use crate::foundation::math::{utils, Quat, Vec3};

/// Share of the positional error fed back each pass, scaled by 1/dt
const BIAS_FACTOR: f32 = 0.01;

/// A relation between two objects that the solver keeps satisfied
pub trait Constraint: Debug {
    /// The two objects this constraint binds
    fn entities(&self) -> (Entity, Entity);

    /// Relax the constraint once over a sub-step of `dt`
    fn update_constraint(&mut self, objects: &mut [GameObject], dt: f32);
}

/// Keeps two objects no further apart than a maximum distance (a rope)
#[derive(Debug, Clone)]
pub struct PositionConstraint {
    object_a: Entity,
    object_b: Entity,
    distance: f32,
}

impl PositionConstraint {
    /// Bind `a` and `b` with the given maximum separation
    pub const fn new(a: Entity, b: Entity, distance: f32) -> Self {
        Self { object_a: a, object_b: b, distance }
    }

    /// Maximum separation
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    fn solve(&self, a: &mut GameObject, b: &mut GameObject, dt: f32) {
        let relative = a.transform.position - b.transform.position;
        let current = relative.magnitude();
        let offset = self.distance - current;
        if offset >= 0.0 || dt <= 0.0 {
            return;
        }
        let Some(direction) = utils::try_normalize(relative) else {
            return;
        };

        let (Some(body_a), Some(body_b)) = (a.physics_mut(), b.physics_mut()) else {
            return;
        };
        let constraint_mass = body_a.inverse_mass() + body_b.inverse_mass();
        if constraint_mass <= 0.0 {
            return;
        }

        let relative_velocity = body_a.linear_velocity() - body_b.linear_velocity();
        let velocity_dot = relative_velocity.dot(&direction);
        let bias = -(BIAS_FACTOR / dt) * offset;
        let lambda = -(velocity_dot + bias) / constraint_mass;

        body_a.apply_linear_impulse(direction * lambda);
        body_b.apply_linear_impulse(-direction * lambda);
    }
}

impl Constraint for PositionConstraint {
    fn entities(&self) -> (Entity, Entity) {
        (self.object_a, self.object_b)
    }

    fn update_constraint(&mut self, objects: &mut [GameObject], dt: f32) {
        if let Some((a, b)) = pair_mut(objects, self.object_a, self.object_b) {
            self.solve(a, b, dt);
        }
    }
}

/// A rope that also locks both ends to one yaw about world up
///
/// A is turned so its local +X points from B towards A, and B copies A's
/// orientation.
#[derive(Debug, Clone)]
pub struct PositionOrientationConstraint {
    position: PositionConstraint,
}

impl PositionOrientationConstraint {
    /// Bind `a` and `b` with the given maximum separation
    pub const fn new(a: Entity, b: Entity, distance: f32) -> Self {
        Self {
            position: PositionConstraint::new(a, b, distance),
        }
    }
}

/// Rotation about Y that points local +X along `direction`'s ground projection
fn yaw_towards(direction: Vec3) -> Quat {
    let yaw = (-direction.z).atan2(direction.x);
    Quat::from_axis_angle(&Vec3::y_axis(), yaw)
}

impl Constraint for PositionOrientationConstraint {
    fn entities(&self) -> (Entity, Entity) {
        self.position.entities()
    }

    fn update_constraint(&mut self, objects: &mut [GameObject], dt: f32) {
        let Some((a, b)) = pair_mut(objects, self.position.object_a, self.position.object_b) else {
            return;
        };
        let b_to_a = a.transform.position - b.transform.position;
        if b_to_a.x.abs() > f32::EPSILON || b_to_a.z.abs() > f32::EPSILON {
            a.transform.rotation = yaw_towards(b_to_a);
            b.transform.rotation = a.transform.rotation;
        }
        self.position.solve(a, b, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::physics::physics_object::PhysicsObject;
    use approx::assert_relative_eq;

    fn rope_world(separation: f32) -> (World, Entity, Entity) {
        let mut world = World::new();
        let anchor = world.add_object(
            GameObject::new("anchor").with_physics(PhysicsObject::new_static()),
        );
        let bob = world.add_object(
            GameObject::new("bob")
                .at(Vec3::new(separation, 0.0, 0.0))
                .with_physics(PhysicsObject::new(1.0)),
        );
        (world, anchor, bob)
    }

    #[test]
    fn test_slack_rope_does_nothing() {
        let (mut world, anchor, bob) = rope_world(1.0);
        let mut rope = PositionConstraint::new(anchor, bob, 2.0);
        rope.update_constraint(world.objects_mut(), 1.0 / 120.0);
        assert_eq!(world.object(bob).unwrap().physics().unwrap().linear_velocity(), Vec3::zeros());
    }

    #[test]
    fn test_taut_rope_pulls_back() {
        let (mut world, anchor, bob) = rope_world(3.0);
        world.object_mut(bob).unwrap().physics_mut().unwrap().set_linear_velocity(Vec3::x());
        let mut rope = PositionConstraint::new(anchor, bob, 2.0);

        rope.update_constraint(world.objects_mut(), 1.0 / 120.0);

        let velocity = world.object(bob).unwrap().physics().unwrap().linear_velocity();
        // outward motion removed and a small corrective pull added
        assert!(velocity.x < 0.0);
        assert_relative_eq!(velocity.y, 0.0);
        let anchor_body = world.object(anchor).unwrap().physics().unwrap();
        assert_eq!(anchor_body.linear_velocity(), Vec3::zeros());
    }

    #[test]
    fn test_missing_entity_is_skipped() {
        let (mut world, anchor, _) = rope_world(3.0);
        let mut rope = PositionConstraint::new(anchor, Entity::new(99), 2.0);
        rope.update_constraint(world.objects_mut(), 1.0 / 120.0);
    }

    #[test]
    fn test_orientation_lock_shares_one_yaw() {
        let (mut world, anchor, bob) = rope_world(0.0);
        world.object_mut(bob).unwrap().transform.position = Vec3::new(0.0, 0.0, -3.0);
        let mut lock = PositionOrientationConstraint::new(anchor, bob, 5.0);

        lock.update_constraint(world.objects_mut(), 1.0 / 120.0);

        let anchor_forward = world.object(anchor).unwrap().transform.rotation * Vec3::x();
        let bob_forward = world.object(bob).unwrap().transform.rotation * Vec3::x();
        assert_relative_eq!(anchor_forward, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(bob_forward, anchor_forward, epsilon = 1e-5);
    }

    #[test]
    fn test_orientation_lock_points_anchor_away_from_partner() {
        let (mut world, anchor, bob) = rope_world(3.0);
        let mut lock = PositionOrientationConstraint::new(anchor, bob, 5.0);

        lock.update_constraint(world.objects_mut(), 1.0 / 120.0);

        let anchor_forward = world.object(anchor).unwrap().transform.rotation * Vec3::x();
        let bob_forward = world.object(bob).unwrap().transform.rotation * Vec3::x();
        assert_relative_eq!(anchor_forward, -Vec3::x(), epsilon = 1e-5);
        assert_relative_eq!(anchor_forward.angle(&bob_forward), 0.0, epsilon = 1e-3);
    }
}
