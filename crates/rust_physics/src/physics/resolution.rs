//! Contact resolution
//!
//! Rigid contacts use a projection step followed by a restitution and
//! Coulomb friction impulse. Spring contacts push the bodies apart with a
//! Hookean penalty force instead.

use crate::ecs::GameObject;
use crate::foundation::math::{utils, Vec3};
use crate::physics::collision::ContactPoint;

/// Closing speed below which a contact counts as separating
const SEPARATING_SPEED: f32 = 0.01;

/// Resolve one contact with projection and impulses
///
/// `point` is expressed the way the narrow phase reports it: the normal
/// points from `a` to `b`, and the local points are offsets from each
/// object's position. Contacts closing slower than `restitution_threshold`
/// do not bounce. Objects without a body, or a pair of immovable bodies,
/// are left untouched.
pub fn resolve_impulse(
    a: &mut GameObject,
    b: &mut GameObject,
    point: &ContactPoint,
    restitution_threshold: f32,
) {
    let (transform_a, Some(body_a)) = a.split_physics_mut() else {
        return;
    };
    let (transform_b, Some(body_b)) = b.split_physics_mut() else {
        return;
    };

    let total_mass = body_a.inverse_mass() + body_b.inverse_mass();
    if total_mass <= 0.0 {
        return;
    }
    let normal = point.normal;

    // Projection: split the overlap by how easily each body moves
    transform_a.position -= normal * point.penetration * (body_a.inverse_mass() / total_mass);
    transform_b.position += normal * point.penetration * (body_b.inverse_mass() / total_mass);

    let rel_a = point.local_a;
    let rel_b = point.local_b;

    let full_velocity_a = body_a.linear_velocity() + body_a.angular_velocity().cross(&rel_a);
    let full_velocity_b = body_b.linear_velocity() + body_b.angular_velocity().cross(&rel_b);
    let contact_velocity = full_velocity_b - full_velocity_a;

    let impulse_force = contact_velocity.dot(&normal);
    if impulse_force > SEPARATING_SPEED {
        return;
    }

    let inertia_a = (body_a.inverse_inertia_tensor() * rel_a.cross(&normal)).cross(&rel_a);
    let inertia_b = (body_b.inverse_inertia_tensor() * rel_b.cross(&normal)).cross(&rel_b);
    let angular_effect = (inertia_a + inertia_b).dot(&normal);

    let restitution = if -impulse_force < restitution_threshold {
        0.0
    } else {
        (body_a.elasticity + body_b.elasticity) * 0.5
    };
    let j = (-(1.0 + restitution) * impulse_force) / (total_mass + angular_effect);
    let mut full_impulse = normal * j;

    let tangent_velocity = contact_velocity - normal * impulse_force;
    if let Some(tangent) = utils::try_normalize(tangent_velocity) {
        let friction_a = (body_a.inverse_inertia_tensor() * rel_a.cross(&tangent)).cross(&rel_a);
        let friction_b = (body_b.inverse_inertia_tensor() * rel_b.cross(&tangent)).cross(&rel_b);
        let friction_effect = (friction_a + friction_b).dot(&tangent);

        let friction = (body_a.friction + body_b.friction) * 0.5;
        let limit = friction * j.abs();
        let jt = (-(friction * contact_velocity.dot(&tangent)) / (total_mass + friction_effect))
            .clamp(-limit, limit);
        full_impulse += tangent * jt;
    }

    body_a.apply_linear_impulse(-full_impulse);
    body_b.apply_linear_impulse(full_impulse);
    body_a.apply_angular_impulse(rel_a.cross(&-full_impulse));
    body_b.apply_angular_impulse(rel_b.cross(&full_impulse));
}

/// Resolve one contact with a penalty spring over `dt`
///
/// The force is proportional to the penetration and the averaged stiffness,
/// applied at each contact point and integrated straight into velocity.
pub fn resolve_penalty(a: &mut GameObject, b: &mut GameObject, point: &ContactPoint, dt: f32) {
    let (Some(body_a), Some(body_b)) = (a.physics_mut(), b.physics_mut()) else {
        return;
    };
    let stiffness = (body_a.stiffness + body_b.stiffness) * 0.5;
    let force: Vec3 = point.normal * (stiffness * point.penetration);

    body_a.apply_linear_impulse(-force * dt);
    body_a.apply_angular_impulse(point.local_a.cross(&-force) * dt);
    body_b.apply_linear_impulse(force * dt);
    body_b.apply_angular_impulse(point.local_b.cross(&force) * dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::{object_intersection, CollisionVolume};
    use crate::physics::PhysicsObject;
    use approx::assert_relative_eq;

    fn sphere(position: Vec3, velocity: Vec3) -> GameObject {
        let mut body = PhysicsObject::new(1.0);
        body.init_sphere_inertia(1.0, false);
        body.set_linear_velocity(velocity);
        GameObject::new("sphere")
            .at(position)
            .with_volume(CollisionVolume::sphere(1.0))
            .with_physics(body)
    }

    #[test]
    fn test_head_on_spheres_bounce_apart() {
        let mut a = sphere(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
        let mut b = sphere(Vec3::new(0.0, 0.0, 1.5), Vec3::new(0.0, 0.0, -1.0));
        let info = object_intersection(&a, &b).unwrap();

        resolve_impulse(&mut a, &mut b, &info.point, 0.0);

        // equal masses share the projection
        assert_relative_eq!(a.transform.position.z, -0.25, epsilon = 1e-5);
        assert_relative_eq!(b.transform.position.z, 1.75, epsilon = 1e-5);

        // e = 0.8: closing speed 2 becomes separating speed 1.6
        let va = a.physics().unwrap().linear_velocity();
        let vb = b.physics().unwrap().linear_velocity();
        assert_relative_eq!(va.z, -0.8, epsilon = 1e-5);
        assert_relative_eq!(vb.z, 0.8, epsilon = 1e-5);
        // central impact, no spin
        assert_relative_eq!(a.physics().unwrap().angular_velocity().norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_momentum_is_conserved() {
        let mut a = sphere(Vec3::zeros(), Vec3::new(0.3, 0.0, 2.0));
        let mut b = sphere(Vec3::new(0.2, 0.1, 1.8), Vec3::new(-0.5, 0.0, -0.5));
        a.physics_mut().unwrap().set_inverse_mass(0.5);
        let momentum = |a: &GameObject, b: &GameObject| {
            a.physics().unwrap().linear_velocity() * 2.0 + b.physics().unwrap().linear_velocity()
        };
        let before = momentum(&a, &b);
        let info = object_intersection(&a, &b).unwrap();

        resolve_impulse(&mut a, &mut b, &info.point, 0.0);

        let after = momentum(&a, &b);
        assert_relative_eq!(before, after, epsilon = 1e-4);
    }

    #[test]
    fn test_separating_contact_only_projects() {
        let mut a = sphere(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        let mut b = sphere(Vec3::new(0.0, 0.0, 1.5), Vec3::new(0.0, 0.0, 1.0));
        let info = object_intersection(&a, &b).unwrap();

        resolve_impulse(&mut a, &mut b, &info.point, 0.0);

        assert_relative_eq!(a.physics().unwrap().linear_velocity().z, -1.0);
        assert_relative_eq!(b.physics().unwrap().linear_velocity().z, 1.0);
        assert_relative_eq!(b.transform.position.z - a.transform.position.z, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_static_body_takes_no_projection() {
        let mut floor = GameObject::new("floor")
            .with_volume(CollisionVolume::aabb(Vec3::new(10.0, 1.0, 10.0)))
            .with_physics(PhysicsObject::new_static());
        let mut ball = sphere(Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.0, -2.0, 0.0));
        let info = object_intersection(&floor, &ball).unwrap();

        resolve_impulse(&mut floor, &mut ball, &info.point, 0.0);

        assert_eq!(floor.transform.position, Vec3::zeros());
        assert_relative_eq!(ball.transform.position.y, 2.0, epsilon = 1e-5);
        assert!(ball.physics().unwrap().linear_velocity().y > 0.0);
    }

    #[test]
    fn test_friction_slows_sliding_without_reversing() {
        let mut floor = GameObject::new("floor")
            .with_volume(CollisionVolume::aabb(Vec3::new(10.0, 1.0, 10.0)))
            .with_physics(PhysicsObject::new_static());
        let mut ball = sphere(Vec3::new(0.0, 1.95, 0.0), Vec3::new(3.0, -1.0, 0.0));
        let info = object_intersection(&floor, &ball).unwrap();

        resolve_impulse(&mut floor, &mut ball, &info.point, 0.0);

        let body = ball.physics().unwrap();
        let v = body.linear_velocity();
        assert!(v.x < 3.0 && v.x > 0.0, "sliding speed {}", v.x);
        assert!(body.angular_velocity().norm() > 0.0);
    }

    #[test]
    fn test_slow_contact_does_not_bounce() {
        let mut a = sphere(Vec3::zeros(), Vec3::new(0.0, 0.0, 0.1));
        let mut b = sphere(Vec3::new(0.0, 0.0, 1.5), Vec3::new(0.0, 0.0, -0.1));

        let info = object_intersection(&a, &b).unwrap();
        resolve_impulse(&mut a, &mut b, &info.point, 0.5);

        assert_relative_eq!(a.physics().unwrap().linear_velocity().z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(b.physics().unwrap().linear_velocity().z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_penalty_pushes_apart_along_normal() {
        let mut a = sphere(Vec3::zeros(), Vec3::zeros()).as_spring();
        let mut b = sphere(Vec3::new(0.0, 0.0, 1.5), Vec3::zeros());
        let info = object_intersection(&a, &b).unwrap();

        resolve_penalty(&mut a, &mut b, &info.point, 0.1);

        // k = 20, penetration 0.5, dt 0.1, inverse mass 1
        assert_relative_eq!(a.physics().unwrap().linear_velocity().z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(b.physics().unwrap().linear_velocity().z, 1.0, epsilon = 1e-5);
        // penalty contacts leave positions to the integrator
        assert_eq!(a.transform.position, Vec3::zeros());
    }
}
