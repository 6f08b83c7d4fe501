//! Ray against volume tests

use crate::ecs::GameObject;
use crate::foundation::math::{Transform, Vec3};
use crate::physics::collision::ray::{Ray, RayCollision};
use crate::physics::collision::volume::{capsule_segment, CollisionVolume};
use crate::physics::collision_layers::CollisionLayers;

/// Slack allowed when checking a slab hit lies on the box
const BOX_HIT_EPSILON: f32 = 1.0e-4;

/// Ray against one object, honouring layer masks
///
/// The returned hit names the object.
pub fn ray_intersection(ray: &Ray, object: &GameObject) -> Option<RayCollision> {
    if !CollisionLayers::ray_can_hit(ray.mask, object.layers) {
        return None;
    }
    let transform = &object.transform;
    let hit = match *object.volume()? {
        CollisionVolume::Aabb { half_extents } => {
            ray_box_intersection(ray, transform.position, half_extents)
        }
        CollisionVolume::Obb { half_extents } => ray_obb_intersection(ray, transform, half_extents),
        CollisionVolume::Sphere { radius } => ray_sphere_intersection(ray, transform.position, radius),
        CollisionVolume::Capsule { half_height, radius } => {
            ray_capsule_intersection(ray, transform, half_height, radius)
        }
    }?;
    Some(RayCollision {
        entity: Some(object.entity()),
        ..hit
    })
}

/// Slab test against an axis-aligned box
///
/// Only the entry face is considered, so a ray starting inside the box
/// reports no hit.
pub fn ray_box_intersection(ray: &Ray, box_pos: Vec3, half_extents: Vec3) -> Option<RayCollision> {
    let box_min = box_pos - half_extents;
    let box_max = box_pos + half_extents;

    let mut best_t = -1.0_f32;
    for i in 0..3 {
        let t = if ray.direction[i] > 0.0 {
            (box_min[i] - ray.origin[i]) / ray.direction[i]
        } else if ray.direction[i] < 0.0 {
            (box_max[i] - ray.origin[i]) / ray.direction[i]
        } else {
            -1.0
        };
        best_t = best_t.max(t);
    }
    if best_t < 0.0 {
        return None;
    }

    let point = ray.point_at(best_t);
    let inside = (0..3).all(|i| {
        point[i] + BOX_HIT_EPSILON >= box_min[i] && point[i] - BOX_HIT_EPSILON <= box_max[i]
    });
    inside.then(|| RayCollision::along(ray, best_t))
}

/// Ray against an oriented box, by moving the ray into the box's frame
pub fn ray_obb_intersection(ray: &Ray, transform: &Transform, half_extents: Vec3) -> Option<RayCollision> {
    let local_ray = Ray {
        origin: transform.to_local_point(ray.origin),
        direction: transform.rotation.inverse_transform_vector(&ray.direction),
        mask: ray.mask,
    };
    let local = ray_box_intersection(&local_ray, Vec3::zeros(), half_extents)?;
    Some(RayCollision {
        point: transform.to_world_point(local.point),
        ..local
    })
}

/// Distance along the ray to a sphere's surface
fn sphere_distance(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - ray.origin;
    let projection = to_center.dot(&ray.direction);
    if projection < 0.0 && to_center.magnitude_squared() > radius * radius {
        return None;
    }
    let closest = ray.point_at(projection);
    let separation_sq = (closest - center).magnitude_squared();
    if separation_sq > radius * radius {
        return None;
    }
    let offset = (radius * radius - separation_sq).sqrt();
    // an origin inside the sphere counts as a hit at distance zero
    Some((projection - offset).max(0.0))
}

/// Ray against a sphere by projecting the centre onto the ray
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<RayCollision> {
    sphere_distance(ray, center, radius).map(|t| RayCollision::along(ray, t))
}

/// Ray against a capsule: the cylindrical body plus both hemispherical caps
pub fn ray_capsule_intersection(
    ray: &Ray,
    transform: &Transform,
    half_height: f32,
    radius: f32,
) -> Option<RayCollision> {
    let (start, end) = capsule_segment(half_height, radius, transform);
    let segment = end - start;
    let length = segment.magnitude();

    let mut best = [start, end]
        .iter()
        .filter_map(|&cap| sphere_distance(ray, cap, radius))
        .reduce(f32::min);

    if length > f32::EPSILON {
        let axis = segment / length;
        let m = ray.origin - start;
        let d_perp = ray.direction - axis * ray.direction.dot(&axis);
        let m_perp = m - axis * m.dot(&axis);

        let a = d_perp.magnitude_squared();
        let b = 2.0 * m_perp.dot(&d_perp);
        let c = m_perp.magnitude_squared() - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if a > f32::EPSILON && discriminant >= 0.0 {
            let t = (-b - discriminant.sqrt()) / (2.0 * a);
            let along = m.dot(&axis) + t * ray.direction.dot(&axis);
            if t >= 0.0 && (0.0..=length).contains(&along) {
                best = Some(best.map_or(t, |current| current.min(t)));
            }
        }
    }

    best.map(|t| RayCollision::along(ray, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_ray_hits_box_front_face() {
        let ray = Ray::new(Vec3::new(-5.0, 0.2, 0.0), Vec3::x());
        let hit = ray_box_intersection(&ray, Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point, Vec3::new(-1.0, 0.2, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_ray_misses_box_and_ignores_boxes_behind() {
        let miss = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::x());
        assert!(ray_box_intersection(&miss, Vec3::zeros(), Vec3::repeat(1.0)).is_none());

        let behind = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::x());
        assert!(ray_box_intersection(&behind, Vec3::zeros(), Vec3::repeat(1.0)).is_none());
    }

    #[test]
    fn test_ray_obb_uses_rotation() {
        let transform = Transform::from_position_rotation(
            Vec3::zeros(),
            Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_4),
        );
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::x());
        let hit = ray_obb_intersection(&ray, &transform, Vec3::repeat(1.0)).unwrap();
        // the diamond's corner points at the ray
        assert_relative_eq!(hit.distance, 5.0 - std::f32::consts::SQRT_2, epsilon = 1e-4);
        assert_relative_eq!(hit.point.x, -std::f32::consts::SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn test_ray_sphere_distance() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::z());
        let hit = ray_sphere_intersection(&ray, Vec3::new(0.0, 0.0, 0.0), 2.0).unwrap();
        assert_relative_eq!(hit.distance, 8.0, epsilon = 1e-5);

        let grazing = Ray::new(Vec3::new(0.0, 2.5, -10.0), Vec3::z());
        assert!(ray_sphere_intersection(&grazing, Vec3::zeros(), 2.0).is_none());

        let away = Ray::new(Vec3::new(0.0, 0.0, -10.0), -Vec3::z());
        assert!(ray_sphere_intersection(&away, Vec3::zeros(), 2.0).is_none());
    }

    #[test]
    fn test_ray_capsule_body_and_cap() {
        let capsule = Transform::identity();
        let side = Ray::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::x());
        let hit = ray_capsule_intersection(&side, &capsule, 2.0, 0.5).unwrap();
        assert_relative_eq!(hit.distance, 4.5, epsilon = 1e-4);

        let down = Ray::new(Vec3::new(0.0, 10.0, 0.0), -Vec3::y());
        let hit = ray_capsule_intersection(&down, &capsule, 2.0, 0.5).unwrap();
        assert_relative_eq!(hit.distance, 8.0, epsilon = 1e-4);

        let over = Ray::new(Vec3::new(-5.0, 2.2, 0.0), Vec3::x());
        assert!(ray_capsule_intersection(&over, &capsule, 2.0, 0.5).is_none());
    }

    #[test]
    fn test_layer_filtering() {
        let mut world = World::new();
        let visible = world.add_object(
            GameObject::new("visible")
                .with_volume(CollisionVolume::sphere(1.0))
                .with_layers(CollisionLayers::ENEMY),
        );
        let hidden = world.add_object(
            GameObject::new("hidden")
                .with_volume(CollisionVolume::sphere(1.0))
                .with_layers(CollisionLayers::ENEMY | CollisionLayers::IGNORE_RAYCAST),
        );
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z());

        let hit = ray_intersection(&ray, world.object(visible).unwrap()).unwrap();
        assert_eq!(hit.entity, Some(visible));
        assert!(ray_intersection(&ray, world.object(hidden).unwrap()).is_none());

        let player_only = Ray::with_mask(ray.origin, ray.direction, CollisionLayers::PLAYER);
        assert!(ray_intersection(&player_only, world.object(visible).unwrap()).is_none());
    }
}
