//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the [`Transform`] every simulated object
//! carries.

pub use nalgebra::{
    Vector2, Vector3,
    Matrix3,
    Quaternion,
    Unit,
};

/// 2D vector type (used for the XZ ground plane)
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Lengths below this are treated as zero when normalizing
pub const NORMALIZE_EPSILON: f32 = 1.0e-6;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors (render-facing; collision volumes carry their own extents)
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation as a 3x3 matrix
    pub fn rotation_matrix(&self) -> Mat3 {
        *self.rotation.to_rotation_matrix().matrix()
    }

    /// Map a world-space point into this transform's rotated frame (scale ignored)
    pub fn to_local_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse_transform_vector(&(point - self.position))
    }

    /// Map a point from this transform's rotated frame back to world space
    pub fn to_world_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Math utility functions
pub mod utils {
    use super::{Mat3, Vec3, NORMALIZE_EPSILON};

    /// Normalize a vector, or `None` when it is too short to carry a direction
    pub fn try_normalize(v: Vec3) -> Option<Vec3> {
        v.try_normalize(NORMALIZE_EPSILON)
    }

    /// Component-wise clamp of `v` into `[-extent, extent]`
    pub fn clamp_to_extents(v: Vec3, extent: Vec3) -> Vec3 {
        Vec3::new(
            v.x.clamp(-extent.x, extent.x),
            v.y.clamp(-extent.y, extent.y),
            v.z.clamp(-extent.z, extent.z),
        )
    }

    /// Element-wise absolute value of a matrix
    pub fn abs_matrix(m: &Mat3) -> Mat3 {
        m.map(f32::abs)
    }

    /// Closest point to `point` on the segment `start`..`end`
    pub fn closest_point_on_segment(start: Vec3, end: Vec3, point: Vec3) -> Vec3 {
        let segment = end - start;
        let length_sq = segment.magnitude_squared();
        if length_sq <= f32::EPSILON {
            return start;
        }
        let t = ((point - start).dot(&segment) / length_sq).clamp(0.0, 1.0);
        start + segment * t
    }
}
