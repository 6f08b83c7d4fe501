//! Collision volume descriptors
//!
//! A volume stores only its own dimensions. Position and, for oriented
//! shapes, rotation are read from the owning object's transform, so a
//! volume is always paired with a [`Transform`] at the call site.

use crate::foundation::math::{utils, Transform, Vec3};

/// Shape tag used for dispatch and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeType {
    /// Axis-aligned box
    Aabb,
    /// Oriented box
    Obb,
    /// Sphere
    Sphere,
    /// Capsule (segment swept by a sphere)
    Capsule,
}

/// Collision volume attached to an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionVolume {
    /// Axis-aligned box; the owner's rotation is ignored
    Aabb {
        /// Half size on each world axis
        half_extents: Vec3,
    },
    /// Box rotated by the owner's transform
    Obb {
        /// Half size on each local axis
        half_extents: Vec3,
    },
    /// Sphere around the owner's position
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Capsule along the owner's local Y axis
    Capsule {
        /// Half of the full height, caps included
        half_height: f32,
        /// Radius of the swept sphere
        radius: f32,
    },
}

impl CollisionVolume {
    /// Axis-aligned box from half extents
    pub const fn aabb(half_extents: Vec3) -> Self {
        Self::Aabb { half_extents }
    }

    /// Oriented box from half extents
    pub const fn obb(half_extents: Vec3) -> Self {
        Self::Obb { half_extents }
    }

    /// Sphere from radius
    pub const fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Capsule from half height (caps included) and radius
    pub const fn capsule(half_height: f32, radius: f32) -> Self {
        Self::Capsule { half_height, radius }
    }

    /// Shape tag
    pub const fn volume_type(&self) -> VolumeType {
        match self {
            Self::Aabb { .. } => VolumeType::Aabb,
            Self::Obb { .. } => VolumeType::Obb,
            Self::Sphere { .. } => VolumeType::Sphere,
            Self::Capsule { .. } => VolumeType::Capsule,
        }
    }

    /// Box half extents, for box shapes
    pub const fn half_extents(&self) -> Option<Vec3> {
        match self {
            Self::Aabb { half_extents } | Self::Obb { half_extents } => Some(*half_extents),
            _ => None,
        }
    }

    /// Radius, for round shapes
    pub const fn radius(&self) -> Option<f32> {
        match self {
            Self::Sphere { radius } | Self::Capsule { radius, .. } => Some(*radius),
            _ => None,
        }
    }

    /// World-space half extents of the box that bounds this volume
    ///
    /// This is what the broadphase inserts.
    pub fn broadphase_half_extents(&self, transform: &Transform) -> Vec3 {
        match self {
            Self::Aabb { half_extents } => *half_extents,
            Self::Obb { half_extents } => {
                utils::abs_matrix(&transform.rotation_matrix()) * half_extents
            }
            Self::Sphere { radius } => Vec3::repeat(*radius),
            Self::Capsule { half_height, radius } => {
                let (start, end) = capsule_segment(*half_height, *radius, transform);
                let reach = (end - start).abs() * 0.5;
                reach + Vec3::repeat(*radius)
            }
        }
    }
}

/// End points of a capsule's inner segment in world space
///
/// The segment runs along the owner's local Y axis and stops one radius short
/// of each end, so the swept sphere reaches exactly `half_height`.
pub fn capsule_segment(half_height: f32, radius: f32, transform: &Transform) -> (Vec3, Vec3) {
    let inner = (half_height - radius).max(0.0);
    let axis = transform.rotation * Vec3::y();
    (
        transform.position - axis * inner,
        transform.position + axis * inner,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_volume_type_tags() {
        assert_eq!(CollisionVolume::aabb(Vec3::repeat(1.0)).volume_type(), VolumeType::Aabb);
        assert_eq!(CollisionVolume::sphere(1.0).volume_type(), VolumeType::Sphere);
        assert_eq!(CollisionVolume::capsule(2.0, 0.5).radius(), Some(0.5));
        assert_eq!(CollisionVolume::sphere(1.0).half_extents(), None);
    }

    #[test]
    fn test_obb_bounds_grow_when_rotated() {
        let volume = CollisionVolume::obb(Vec3::new(1.0, 1.0, 1.0));
        let rotated = Transform::from_position_rotation(
            Vec3::zeros(),
            Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_4),
        );
        let bounds = volume.broadphase_half_extents(&rotated);
        assert_relative_eq!(bounds.x, std::f32::consts::SQRT_2, epsilon = 1e-5);
        assert_relative_eq!(bounds.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(bounds.z, std::f32::consts::SQRT_2, epsilon = 1e-5);
    }

    #[test]
    fn test_upright_capsule_bounds() {
        let volume = CollisionVolume::capsule(2.0, 0.5);
        let bounds = volume.broadphase_half_extents(&Transform::identity());
        assert_relative_eq!(bounds, Vec3::new(0.5, 2.0, 0.5), epsilon = 1e-5);
    }
}
