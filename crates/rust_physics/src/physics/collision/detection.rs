//! Narrow-phase shape-pair intersection
//!
//! Pure functions over positions, rotations and extents. Every routine
//! returns `None` for "no collision", including coincident sphere centres,
//! which cannot produce a normal. Parallel SAT axes are skipped.
//!
//! Supported pairs: AABB/AABB, AABB/OBB, OBB/OBB, sphere/sphere,
//! AABB/sphere, OBB/sphere and capsule/sphere. Capsule against boxes or
//! capsules is not implemented and never collides.

use crate::ecs::GameObject;
use crate::foundation::math::{utils, Mat3, Transform, Vec3};
use crate::physics::collision::contact::{CollisionInfo, ContactPoint};
use crate::physics::collision::volume::{capsule_segment, CollisionVolume};

/// Squared length below which a SAT axis is considered degenerate
const SAT_AXIS_EPSILON: f32 = 1.0e-6;

/// Projections smaller than this are treated as lying in the contact plane
const FACE_EPSILON: f32 = 1.0e-4;

/// Strict overlap test of two axis-aligned boxes given centres and half sizes
///
/// Touching faces do not overlap. Symmetric in its two boxes.
pub fn aabb_test(pos_a: Vec3, pos_b: Vec3, half_a: Vec3, half_b: Vec3) -> bool {
    let delta = pos_b - pos_a;
    let total = half_a + half_b;
    delta.x.abs() < total.x && delta.y.abs() < total.y && delta.z.abs() < total.z
}

/// AABB against AABB: picks the face of least penetration
pub fn aabb_intersection(pos_a: Vec3, half_a: Vec3, pos_b: Vec3, half_b: Vec3) -> Option<ContactPoint> {
    if !aabb_test(pos_a, pos_b, half_a, half_b) {
        return None;
    }
    let (min_a, max_a) = (pos_a - half_a, pos_a + half_a);
    let (min_b, max_b) = (pos_b - half_b, pos_b + half_b);

    let faces = [
        -Vec3::x(), Vec3::x(),
        -Vec3::y(), Vec3::y(),
        -Vec3::z(), Vec3::z(),
    ];
    let distances = [
        max_b.x - min_a.x, max_a.x - min_b.x,
        max_b.y - min_a.y, max_a.y - min_b.y,
        max_b.z - min_a.z, max_a.z - min_b.z,
    ];

    let mut best = 0;
    for (i, distance) in distances.iter().enumerate().skip(1) {
        if *distance < distances[best] {
            best = i;
        }
    }

    Some(ContactPoint {
        local_a: Vec3::zeros(),
        local_b: Vec3::zeros(),
        normal: faces[best],
        penetration: distances[best],
    })
}

/// Sphere against sphere
pub fn sphere_intersection(pos_a: Vec3, radius_a: f32, pos_b: Vec3, radius_b: f32) -> Option<ContactPoint> {
    let radii = radius_a + radius_b;
    let delta = pos_b - pos_a;
    let distance = delta.magnitude();
    if distance >= radii {
        return None;
    }
    let normal = utils::try_normalize(delta)?;
    Some(ContactPoint {
        local_a: normal * radius_a,
        local_b: -normal * radius_b,
        normal,
        penetration: radii - distance,
    })
}

/// AABB (A) against sphere (B) via the closest point on the box
///
/// A sphere whose centre is inside the box is pushed out through the
/// nearest face.
pub fn aabb_sphere_intersection(pos_a: Vec3, half_a: Vec3, pos_b: Vec3, radius_b: f32) -> Option<ContactPoint> {
    let delta = pos_b - pos_a;
    let closest = utils::clamp_to_extents(delta, half_a);
    let local = delta - closest;
    let distance = local.magnitude();
    if distance >= radius_b {
        return None;
    }
    let Some(normal) = utils::try_normalize(local) else {
        return Some(buried_sphere_contact(delta, half_a, radius_b));
    };
    Some(ContactPoint {
        local_a: Vec3::zeros(),
        local_b: -normal * radius_b,
        normal,
        penetration: radius_b - distance,
    })
}

fn buried_sphere_contact(delta: Vec3, half_a: Vec3, radius_b: f32) -> ContactPoint {
    let depth = half_a - delta.abs();
    let axis = depth.imin();
    let mut normal = Vec3::zeros();
    normal[axis] = if delta[axis] < 0.0 { -1.0 } else { 1.0 };
    ContactPoint {
        local_a: Vec3::zeros(),
        local_b: -normal * radius_b,
        normal,
        penetration: radius_b + depth[axis],
    }
}

/// Box with its own frame, for the separating axis test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World centre
    pub center: Vec3,
    /// Columns are the box's local axes in world space
    pub axes: Mat3,
    /// Half size along each local axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Box rotated by `transform`
    pub fn from_transform(transform: &Transform, half_extents: Vec3) -> Self {
        Self {
            center: transform.position,
            axes: transform.rotation_matrix(),
            half_extents,
        }
    }

    /// Box aligned with the world axes
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            axes: Mat3::identity(),
            half_extents,
        }
    }

    fn axis(&self, i: usize) -> Vec3 {
        self.axes.column(i).into_owned()
    }

    /// Half length of the box's shadow on a unit axis
    fn projected_radius(&self, axis: &Vec3) -> f32 {
        (0..3)
            .map(|i| self.axis(i).dot(axis).abs() * self.half_extents[i])
            .sum()
    }

    /// Point of the box furthest along `direction`
    ///
    /// Axes nearly perpendicular to `direction` contribute their midpoint, so
    /// face contacts report the face centre rather than an arbitrary corner.
    fn support(&self, direction: &Vec3) -> Vec3 {
        (0..3).fold(self.center, |point, i| {
            let axis = self.axis(i);
            let along = axis.dot(direction);
            if along.abs() < FACE_EPSILON {
                point
            } else {
                point + axis * (self.half_extents[i] * along.signum())
            }
        })
    }
}

/// Separating axis test over the 15 candidate axes of two boxes
///
/// The axis of least penetration becomes the normal, pointing from A to B.
pub fn obb_intersection(a: &OrientedBox, b: &OrientedBox) -> Option<ContactPoint> {
    let mut candidates = Vec::with_capacity(15);
    for i in 0..3 {
        candidates.push(a.axis(i));
    }
    for i in 0..3 {
        candidates.push(b.axis(i));
    }
    for i in 0..3 {
        for j in 0..3 {
            candidates.push(a.axis(i).cross(&b.axis(j)));
        }
    }

    let mut best: Option<(f32, Vec3)> = None;
    for candidate in candidates {
        let length_sq = candidate.magnitude_squared();
        if length_sq < SAT_AXIS_EPSILON {
            continue;
        }
        let axis = candidate / length_sq.sqrt();

        let center_a = a.center.dot(&axis);
        let center_b = b.center.dot(&axis);
        let radius_a = a.projected_radius(&axis);
        let radius_b = b.projected_radius(&axis);

        // B on the positive side of A, and B on the negative side
        let forward = (center_a + radius_a) - (center_b - radius_b);
        let backward = (center_b + radius_b) - (center_a - radius_a);
        let (penetration, normal) = if forward < backward {
            (forward, axis)
        } else {
            (backward, -axis)
        };

        if penetration <= 0.0 {
            return None;
        }
        if best.map_or(true, |(current, _)| penetration < current) {
            best = Some((penetration, normal));
        }
    }

    let (penetration, normal) = best?;
    let deepest_b = b.support(&-normal);
    Some(ContactPoint {
        local_a: deepest_b + normal * penetration - a.center,
        local_b: deepest_b - b.center,
        normal,
        penetration,
    })
}

/// OBB (A) against sphere (B), solved as AABB/sphere in the box's frame
pub fn obb_sphere_intersection(
    box_transform: &Transform,
    half_a: Vec3,
    pos_b: Vec3,
    radius_b: f32,
) -> Option<ContactPoint> {
    let local_sphere = box_transform.to_local_point(pos_b);
    let local = aabb_sphere_intersection(Vec3::zeros(), half_a, local_sphere, radius_b)?;
    let rotation = box_transform.rotation;
    Some(ContactPoint {
        local_a: rotation * local.local_a,
        local_b: rotation * local.local_b,
        normal: rotation * local.normal,
        penetration: local.penetration,
    })
}

/// Capsule (A) against sphere (B)
///
/// The capsule is reduced to a sphere of its radius placed at the point of
/// its segment nearest the other sphere, which lands on one of the two caps
/// or on the cylindrical body.
pub fn capsule_sphere_intersection(
    capsule_transform: &Transform,
    half_height: f32,
    radius_a: f32,
    pos_b: Vec3,
    radius_b: f32,
) -> Option<ContactPoint> {
    let (start, end) = capsule_segment(half_height, radius_a, capsule_transform);
    let nearest = utils::closest_point_on_segment(start, end, pos_b);
    let mut contact = sphere_intersection(nearest, radius_a, pos_b, radius_b)?;
    contact.local_a += nearest - capsule_transform.position;
    Some(contact)
}

/// Contact between two objects, with the normal pointing from `a` to `b`
///
/// Objects missing a volume, and unsupported shape pairs, yield `None`.
pub fn object_intersection(a: &GameObject, b: &GameObject) -> Option<CollisionInfo> {
    use CollisionVolume::{Aabb, Capsule, Obb, Sphere};

    let (volume_a, volume_b) = (a.volume()?, b.volume()?);
    let (ta, tb) = (&a.transform, &b.transform);

    let contact = match (*volume_a, *volume_b) {
        (Aabb { half_extents: ha }, Aabb { half_extents: hb }) => {
            aabb_intersection(ta.position, ha, tb.position, hb)
        }
        (Sphere { radius: ra }, Sphere { radius: rb }) => {
            sphere_intersection(ta.position, ra, tb.position, rb)
        }
        (Aabb { half_extents }, Sphere { radius }) => {
            aabb_sphere_intersection(ta.position, half_extents, tb.position, radius)
        }
        (Obb { half_extents }, Sphere { radius }) => {
            obb_sphere_intersection(ta, half_extents, tb.position, radius)
        }
        (Capsule { half_height, radius: ra }, Sphere { radius: rb }) => {
            capsule_sphere_intersection(ta, half_height, ra, tb.position, rb)
        }
        (Obb { half_extents: ha }, Obb { half_extents: hb }) => obb_intersection(
            &OrientedBox::from_transform(ta, ha),
            &OrientedBox::from_transform(tb, hb),
        ),
        (Aabb { half_extents: ha }, Obb { half_extents: hb }) => obb_intersection(
            &OrientedBox::axis_aligned(ta.position, ha),
            &OrientedBox::from_transform(tb, hb),
        ),
        (Obb { half_extents: ha }, Aabb { half_extents: hb }) => obb_intersection(
            &OrientedBox::from_transform(ta, ha),
            &OrientedBox::axis_aligned(tb.position, hb),
        ),
        (Sphere { .. }, Aabb { .. } | Obb { .. } | Capsule { .. }) => {
            return object_intersection(b, a).map(CollisionInfo::swapped);
        }
        (Capsule { .. }, Capsule { .. } | Aabb { .. } | Obb { .. })
        | (Aabb { .. } | Obb { .. }, Capsule { .. }) => {
            log::trace!(
                "no test for {:?} against {:?}",
                volume_a.volume_type(),
                volume_b.volume_type()
            );
            None
        }
    }?;

    Some(CollisionInfo::new(a.entity(), b.entity(), contact))
}
