//! Per-body dynamic state
//!
//! A [`PhysicsObject`] never points back at its owner's transform. Methods
//! that need the owner's position or orientation take it as an argument.

use crate::foundation::math::{Mat3, Quat, Vec3};
use crate::physics::collision::CollisionVolume;

/// Weight of the previous value in the running motion average
pub const MOTION_BIAS: f32 = 0.94;

/// Default sleep threshold, used to seed the motion average of new bodies
pub const DEFAULT_SLEEP_EPSILON: f32 = 0.05;

/// Dynamic state of a rigid body
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsObject {
    inverse_mass: f32,
    is_static: bool,

    /// Restitution in [0, 1], averaged with the other body on contact
    pub elasticity: f32,
    /// Coulomb friction coefficient, averaged with the other body on contact
    pub friction: f32,
    /// Spring constant for penalty contacts
    pub stiffness: f32,
    /// Fraction of linear velocity removed per second
    pub linear_damping: f32,
    /// Fraction of angular velocity removed per second
    pub angular_damping: f32,

    linear_velocity: Vec3,
    angular_velocity: Vec3,
    force: Vec3,
    torque: Vec3,

    inverse_inertia: Vec3,
    inverse_inertia_tensor: Mat3,

    motion: f32,
}

impl Default for PhysicsObject {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PhysicsObject {
    /// Create a body with the given inverse mass (0 makes it static)
    pub fn new(inverse_mass: f32) -> Self {
        let mut body = Self {
            inverse_mass: 0.0,
            is_static: false,
            elasticity: 0.8,
            friction: 0.8,
            stiffness: 20.0,
            linear_damping: 0.4,
            angular_damping: 0.4,
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            torque: Vec3::zeros(),
            inverse_inertia: Vec3::repeat(1.0),
            inverse_inertia_tensor: Mat3::identity(),
            motion: DEFAULT_SLEEP_EPSILON * 10.0,
        };
        body.set_inverse_mass(inverse_mass);
        body
    }

    /// Create an immovable body
    pub fn new_static() -> Self {
        Self::new(0.0)
    }

    /// Builder-style material override
    pub fn with_material(mut self, elasticity: f32, friction: f32) -> Self {
        self.elasticity = elasticity;
        self.friction = friction;
        self
    }

    /// Builder-style damping override
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// Builder-style stiffness override
    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Inverse mass (0 for static bodies)
    pub const fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Set the inverse mass; non-positive values make the body static
    pub fn set_inverse_mass(&mut self, inverse_mass: f32) {
        self.inverse_mass = inverse_mass.max(0.0);
        self.is_static = self.inverse_mass == 0.0;
        if self.is_static {
            self.inverse_inertia = Vec3::zeros();
            self.inverse_inertia_tensor = Mat3::zeros();
            self.linear_velocity = Vec3::zeros();
            self.angular_velocity = Vec3::zeros();
        }
    }

    /// Whether the body has infinite mass
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Linear velocity
    pub const fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    /// Angular velocity (radians per second around each world axis)
    pub const fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Set linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    /// Set angular velocity
    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    /// Accumulated force for this frame
    pub const fn force(&self) -> Vec3 {
        self.force
    }

    /// Accumulated torque for this frame
    pub const fn torque(&self) -> Vec3 {
        self.torque
    }

    /// World-space inverse inertia tensor as of the last update
    pub const fn inverse_inertia_tensor(&self) -> Mat3 {
        self.inverse_inertia_tensor
    }

    /// Local-space diagonal of the inverse inertia
    pub const fn inverse_inertia(&self) -> Vec3 {
        self.inverse_inertia
    }

    /// Apply an instantaneous change of momentum through the center of mass
    pub fn apply_linear_impulse(&mut self, impulse: Vec3) {
        self.linear_velocity += impulse * self.inverse_mass;
    }

    /// Apply an instantaneous change of angular momentum
    pub fn apply_angular_impulse(&mut self, impulse: Vec3) {
        self.angular_velocity += self.inverse_inertia_tensor * impulse;
    }

    /// Add a force through the center of mass
    pub fn add_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Add a force at a world-space point, given the body's world position
    pub fn add_force_at_position(&mut self, force: Vec3, position: Vec3, body_position: Vec3) {
        self.add_force_at_local_position(force, position - body_position);
    }

    /// Add a force at an offset from the center of mass
    pub fn add_force_at_local_position(&mut self, force: Vec3, local_position: Vec3) {
        self.force += force;
        self.torque += local_position.cross(&force);
    }

    /// Add a torque
    pub fn add_torque(&mut self, torque: Vec3) {
        self.torque += torque;
    }

    /// Zero accumulated force and torque
    pub fn clear_forces(&mut self) {
        self.force = Vec3::zeros();
        self.torque = Vec3::zeros();
    }

    /// Solid box inertia from half extents
    pub fn init_cube_inertia(&mut self, half_extents: Vec3) {
        let dims = half_extents * 2.0;
        let sq = dims.component_mul(&dims);
        let k = 12.0 * self.inverse_mass;
        self.inverse_inertia = Vec3::new(
            safe_div(k, sq.y + sq.z),
            safe_div(k, sq.x + sq.z),
            safe_div(k, sq.x + sq.y),
        );
    }

    /// Sphere inertia; hollow spheres resist rotation more
    pub fn init_sphere_inertia(&mut self, radius: f32, hollow: bool) {
        let factor = if hollow { 1.5 } else { 2.5 };
        self.inverse_inertia = Vec3::repeat(safe_div(factor * self.inverse_mass, radius * radius));
    }

    /// Inertia matching a collision volume; capsules are treated as their bounding box
    pub fn init_volume_inertia(&mut self, volume: &CollisionVolume) {
        match *volume {
            CollisionVolume::Aabb { half_extents } | CollisionVolume::Obb { half_extents } => {
                self.init_cube_inertia(half_extents);
            }
            CollisionVolume::Sphere { radius } => self.init_sphere_inertia(radius, false),
            CollisionVolume::Capsule { half_height, radius } => {
                self.init_cube_inertia(Vec3::new(radius, half_height, radius));
            }
        }
    }

    /// Rotate the local inverse inertia into world space
    pub fn update_inertia_tensor(&mut self, orientation: &Quat) {
        let rotation = orientation.to_rotation_matrix();
        let r = rotation.matrix();
        self.inverse_inertia_tensor = r * Mat3::from_diagonal(&self.inverse_inertia) * r.transpose();
    }

    /// Running average of squared linear plus angular speed
    pub const fn weighted_average_motion(&self) -> f32 {
        self.motion
    }

    /// Fold the current speeds into the running motion average
    pub fn update_weighted_average_motion(&mut self) {
        let current = self.linear_velocity.magnitude_squared()
            + self.angular_velocity.magnitude_squared();
        self.motion = MOTION_BIAS * self.motion + (1.0 - MOTION_BIAS) * current;
    }

    /// Overwrite the motion average
    pub fn set_weighted_average_motion(&mut self, motion: f32) {
        self.motion = motion;
    }

    /// Zero both velocities
    pub fn stop(&mut self) {
        self.linear_velocity = Vec3::zeros();
        self.angular_velocity = Vec3::zeros();
    }

    /// Semi-implicit Euler: forces into velocities
    ///
    /// `gravity` is only applied to bodies with finite mass.
    pub fn integrate_acceleration(&mut self, gravity: Vec3, dt: f32) {
        if self.is_static {
            return;
        }
        let acceleration = self.force * self.inverse_mass + gravity;
        self.linear_velocity += acceleration * dt;
        let angular_acceleration = self.inverse_inertia_tensor * self.torque;
        self.angular_velocity += angular_acceleration * dt;
    }

    /// Velocities into position and orientation, then damping
    pub fn integrate_velocity(&mut self, position: &mut Vec3, orientation: &mut Quat, dt: f32) {
        if self.is_static {
            return;
        }
        *position += self.linear_velocity * dt;
        self.linear_velocity *= (1.0 - self.linear_damping * dt).max(0.0);

        let half = self.angular_velocity * (dt * 0.5);
        let spin = nalgebra::Quaternion::new(0.0, half.x, half.y, half.z);
        let q = orientation.into_inner();
        *orientation = Quat::new_normalize(q + spin * q);
        self.angular_velocity *= (1.0 - self.angular_damping * dt).max(0.0);
    }
}

fn safe_div(numerator: f32, denominator: f32) -> f32 {
    if denominator.abs() <= f32::EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_inverse_mass_is_static() {
        let mut body = PhysicsObject::new(1.0);
        body.set_linear_velocity(Vec3::x());
        body.set_inverse_mass(0.0);
        assert!(body.is_static());
        assert_eq!(body.linear_velocity(), Vec3::zeros());

        body.apply_linear_impulse(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(body.linear_velocity(), Vec3::zeros());
    }

    #[test]
    fn test_negative_inverse_mass_clamps_to_static() {
        let body = PhysicsObject::new(-2.0);
        assert_relative_eq!(body.inverse_mass(), 0.0);
        assert!(body.is_static());
    }

    #[test]
    fn test_force_at_local_position_adds_torque() {
        let mut body = PhysicsObject::new(1.0);
        body.add_force_at_local_position(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(body.force(), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(body.torque(), Vec3::new(0.0, -1.0, 0.0));

        body.clear_forces();
        assert_eq!(body.force(), Vec3::zeros());
        assert_eq!(body.torque(), Vec3::zeros());
    }

    #[test]
    fn test_cube_inertia() {
        let mut body = PhysicsObject::new(2.0);
        body.init_cube_inertia(Vec3::repeat(0.5));
        // 12 * 2 / (1 + 1)
        assert_relative_eq!(body.inverse_inertia(), Vec3::repeat(12.0), epsilon = 1e-5);
    }

    #[test]
    fn test_volume_inertia_matches_shape_helpers() {
        let mut from_volume = PhysicsObject::new(2.0);
        from_volume.init_volume_inertia(&CollisionVolume::obb(Vec3::new(1.0, 0.5, 0.25)));
        let mut direct = PhysicsObject::new(2.0);
        direct.init_cube_inertia(Vec3::new(1.0, 0.5, 0.25));
        assert_relative_eq!(from_volume.inverse_inertia(), direct.inverse_inertia());

        from_volume.init_volume_inertia(&CollisionVolume::sphere(0.5));
        direct.init_sphere_inertia(0.5, false);
        assert_relative_eq!(from_volume.inverse_inertia(), direct.inverse_inertia());
    }

    #[test]
    fn test_sphere_inertia_solid_and_hollow() {
        let mut body = PhysicsObject::new(1.0);
        body.init_sphere_inertia(1.0, false);
        assert_relative_eq!(body.inverse_inertia().x, 2.5);
        body.init_sphere_inertia(1.0, true);
        assert_relative_eq!(body.inverse_inertia().x, 1.5);
    }

    #[test]
    fn test_inertia_tensor_follows_orientation() {
        let mut body = PhysicsObject::new(1.0);
        body.init_cube_inertia(Vec3::new(2.0, 0.5, 0.5));
        let quarter_turn = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2);
        body.update_inertia_tensor(&quarter_turn);
        let tensor = body.inverse_inertia_tensor();
        let local = body.inverse_inertia();
        assert_relative_eq!(tensor[(0, 0)], local.y, epsilon = 1e-5);
        assert_relative_eq!(tensor[(1, 1)], local.x, epsilon = 1e-5);
    }

    #[test]
    fn test_motion_average_decays_toward_current_motion() {
        let mut body = PhysicsObject::new(1.0);
        body.set_weighted_average_motion(1.0);
        body.update_weighted_average_motion();
        assert_relative_eq!(body.weighted_average_motion(), MOTION_BIAS);

        body.set_linear_velocity(Vec3::new(1.0, 0.0, 0.0));
        body.set_weighted_average_motion(0.0);
        body.update_weighted_average_motion();
        assert_relative_eq!(body.weighted_average_motion(), 1.0 - MOTION_BIAS, epsilon = 1e-6);
    }

    #[test]
    fn test_undamped_velocity_integration_is_straight_line() {
        let mut body = PhysicsObject::new(1.0).with_damping(0.0, 0.0);
        let velocity = Vec3::new(1.0, 2.0, -3.0);
        body.set_linear_velocity(velocity);
        let mut position = Vec3::zeros();
        let mut orientation = Quat::identity();

        for _ in 0..240 {
            body.integrate_acceleration(Vec3::zeros(), 1.0 / 120.0);
            body.integrate_velocity(&mut position, &mut orientation, 1.0 / 120.0);
        }

        assert_relative_eq!(body.linear_velocity(), velocity, epsilon = 1e-6);
        assert_relative_eq!(position.normalize(), velocity.normalize(), epsilon = 1e-5);
        assert_relative_eq!(position, velocity * 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_orientation_stays_normalized_while_spinning() {
        let mut body = PhysicsObject::new(1.0).with_damping(0.0, 0.0);
        body.set_angular_velocity(Vec3::new(0.0, std::f32::consts::PI, 0.0));
        let mut position = Vec3::zeros();
        let mut orientation = Quat::identity();
        for _ in 0..120 {
            body.integrate_velocity(&mut position, &mut orientation, 1.0 / 120.0);
        }
        assert_relative_eq!(orientation.into_inner().norm(), 1.0, epsilon = 1e-5);
        // roughly half a turn about Y
        let forward = orientation * Vec3::x();
        assert!(forward.x < -0.9);
    }
}
