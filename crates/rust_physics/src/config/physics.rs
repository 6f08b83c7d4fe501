//! Simulation tuning values

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::{Vec2, Vec3};

/// Quad-tree broadphase settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadphaseConfig {
    /// Use the quad-tree; when false every pair of objects is tested
    pub enabled: bool,

    /// Half size of the root region on the XZ plane, centred on the origin
    pub half_size: Vec2,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Entries a leaf may hold before it splits
    pub max_entries_per_leaf: usize,
}

impl Default for BroadphaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            half_size: Vec2::new(1024.0, 1024.0),
            max_depth: 7,
            max_entries_per_leaf: 6,
        }
    }
}

/// Physics system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration applied to every body with finite mass
    pub gravity: Vec3,

    /// Toggle for gravity without losing the configured vector
    pub apply_gravity: bool,

    /// Linear damping given to bodies created through the system
    pub linear_damping: f32,

    /// Angular damping given to bodies created through the system
    pub angular_damping: f32,

    /// Whether near-stationary bodies are put to sleep
    pub sleep_enabled: bool,

    /// Motion average below which a body sleeps
    pub sleep_epsilon: f32,

    /// Constraint relaxation passes per physics tick
    pub constraint_iterations: u32,

    /// Closing speed below which contacts do not bounce
    pub restitution_threshold: f32,

    /// Ticks a contact survives without re-detection before it ends
    pub num_collision_frames: i32,

    /// Simulation rate the adaptive controller climbs back to
    pub ideal_hz: u32,

    /// Lowest simulation rate the adaptive controller may fall to
    pub min_hz: u32,

    /// Broadphase settings
    pub broadphase: BroadphaseConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            apply_gravity: true,
            linear_damping: 0.4,
            angular_damping: 0.4,
            sleep_enabled: true,
            sleep_epsilon: 0.05,
            constraint_iterations: 10,
            restitution_threshold: 0.5,
            num_collision_frames: 5,
            ideal_hz: 120,
            min_hz: 15,
            broadphase: BroadphaseConfig::default(),
        }
    }
}

impl Config for PhysicsConfig {}

impl PhysicsConfig {
    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ideal_hz == 0 || self.min_hz == 0 {
            return Err(ConfigError::Invalid("simulation rates must be positive".into()));
        }
        if self.min_hz > self.ideal_hz {
            return Err(ConfigError::Invalid(format!(
                "min_hz ({}) exceeds ideal_hz ({})",
                self.min_hz, self.ideal_hz
            )));
        }
        if self.constraint_iterations == 0 {
            return Err(ConfigError::Invalid("constraint_iterations must be at least 1".into()));
        }
        if self.num_collision_frames < 0 {
            return Err(ConfigError::Invalid("num_collision_frames must not be negative".into()));
        }
        if self.linear_damping < 0.0
            || self.angular_damping < 0.0
            || self.sleep_epsilon < 0.0
            || self.restitution_threshold < 0.0
        {
            return Err(ConfigError::Invalid("damping and thresholds must not be negative".into()));
        }
        let bp = &self.broadphase;
        if bp.half_size.x <= 0.0 || bp.half_size.y <= 0.0 || bp.max_entries_per_leaf == 0 {
            return Err(ConfigError::Invalid("broadphase extents and leaf capacity must be positive".into()));
        }
        Ok(())
    }

    /// Load from a `.toml`/`.ron` file and validate
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.gravity.y, -9.8);
        assert_eq!(config.ideal_hz, 120);
        assert_eq!(config.broadphase.max_depth, 7);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let text = r"
            sleep_epsilon = 0.1
            constraint_iterations = 4

            [broadphase]
            max_entries_per_leaf = 3
        ";
        let config = PhysicsConfig::from_str_with_format(text, "physics.toml").unwrap();
        assert_relative_eq!(config.sleep_epsilon, 0.1);
        assert_eq!(config.constraint_iterations, 4);
        assert_eq!(config.broadphase.max_entries_per_leaf, 3);
        assert_eq!(config.broadphase.max_depth, 7);
        assert_eq!(config.min_hz, 15);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = PhysicsConfig::default();
        config.min_hz = 30;
        config.apply_gravity = false;
        let text = config.to_string_with_format("physics.ron").unwrap();
        let parsed = PhysicsConfig::from_str_with_format(&text, "physics.ron").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = PhysicsConfig::from_str_with_format("", "physics.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate_rejects_floor_above_ideal() {
        let config = PhysicsConfig {
            min_hz: 240,
            ..PhysicsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = PhysicsConfig::load_from_file("definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
