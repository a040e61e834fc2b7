use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound on rotatable objects in one scene.
pub const MAX_OBJECTS: usize = 8;

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scene config: {0}")]
    Invalid(String),
}

/// Scene-wide constants. Fixed for the lifetime of a session once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the camera to the plane the objects sit on.
    pub camera_distance: f32,
    /// Horizontal distance between neighbouring object centres.
    pub object_spacing: f32,
    pub object_count: usize,
    /// Radians of angular velocity per pixel of pointer travel.
    pub sensitivity: f32,
    /// Radians added to every object's auto-rotation angle per tick.
    pub auto_rotation_step: f32,
    /// Idle time after which momentum starts to decay.
    pub decay_threshold_ms: u64,
    /// Exponential decay time constant.
    pub decay_time_constant_ms: u64,
    /// Light position in camera space.
    pub light_position: Vec3,
    /// Whether lighting starts enabled.
    pub lighting_enabled: bool,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            camera_distance: 6.0,
            object_spacing: 3.0,
            object_count: 2,
            sensitivity: 0.01,
            auto_rotation_step: 0.01,
            decay_threshold_ms: 100,
            decay_time_constant_ms: 1000,
            light_position: Vec3::new(2.0, 3.0, 2.0),
            lighting_enabled: false,
            canvas_width: 800,
            canvas_height: 600,
        }
    }
}

impl SceneConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.object_count == 0 || self.object_count > MAX_OBJECTS {
            return Err(ConfigError::Invalid(format!(
                "object_count must be in 1..={MAX_OBJECTS}, got {}",
                self.object_count
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees must be in (0, 180), got {}",
                self.fov_degrees
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        if self.decay_time_constant_ms == 0 {
            return Err(ConfigError::Invalid(
                "decay_time_constant_ms must be positive".into(),
            ));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid("canvas size must be non-zero".into()));
        }
        Ok(())
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn decay_threshold(&self) -> Duration {
        Duration::from_millis(self.decay_threshold_ms)
    }

    pub fn decay_time_constant(&self) -> Duration {
        Duration::from_millis(self.decay_time_constant_ms)
    }

    /// World offset of the object at `index`, centred on the view axis and
    /// pushed back by the camera distance.
    pub fn object_offset(&self, index: usize) -> Vec3 {
        let centre = (self.object_count as f32 - 1.0) / 2.0;
        Vec3::new(
            (index as f32 - centre) * self.object_spacing,
            0.0,
            -self.camera_distance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.object_count, 2);
        assert_eq!(config.decay_threshold(), Duration::from_millis(100));
        assert_eq!(config.decay_time_constant(), Duration::from_secs(1));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SceneConfig::from_json_str(r#"{ "object_count": 1 }"#).unwrap();
        assert_eq!(config.object_count, 1);
        assert_eq!(config.sensitivity, 0.01);
        assert_eq!(config.fov_degrees, 45.0);
    }

    #[test]
    fn rejects_zero_objects() {
        let err = SceneConfig::from_json_str(r#"{ "object_count": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let config = SceneConfig {
            near: 10.0,
            far: 1.0,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = SceneConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn two_object_layout_is_symmetric() {
        let config = SceneConfig::default();
        let left = config.object_offset(0);
        let right = config.object_offset(1);
        assert_eq!(left.x, -1.5);
        assert_eq!(right.x, 1.5);
        assert_eq!(left.z, -6.0);
        assert_eq!(right.z, -6.0);
    }

    #[test]
    fn single_object_is_centred() {
        let config = SceneConfig {
            object_count: 1,
            ..SceneConfig::default()
        };
        assert_eq!(config.object_offset(0), Vec3::new(0.0, 0.0, -6.0));
    }
}
