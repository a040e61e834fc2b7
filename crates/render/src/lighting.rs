use cubespin_common::SceneConfig;
use glam::Vec3;

/// User-controlled lighting switch plus the fixed light position.
///
/// Only an explicit toggle changes it; dragging and rotation never do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingState {
    enabled: bool,
    position: Vec3,
}

/// Lighting values uploaded with every draw call, shared by all objects in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingUniforms {
    pub enabled: bool,
    /// Camera-space light position.
    pub light_position: Vec3,
}

impl LightingState {
    pub fn new(enabled: bool, position: Vec3) -> Self {
        Self { enabled, position }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.lighting_enabled, config.light_position)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Flip lighting on or off. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        tracing::info!(enabled = self.enabled, "lighting toggled");
        self.enabled
    }

    pub fn uniforms(&self) -> LightingUniforms {
        LightingUniforms {
            enabled: self.enabled,
            light_position: self.position,
        }
    }
}

impl Default for LightingState {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disabled_by_default() {
        let lighting = LightingState::default();
        assert!(!lighting.is_enabled());
        assert_eq!(lighting.position(), SceneConfig::default().light_position);
    }

    #[test]
    fn toggle_round_trip_restores_uniforms() {
        let mut lighting = LightingState::default();
        let before = lighting.uniforms();

        assert!(lighting.toggle());
        let on = lighting.uniforms();
        assert!(on.enabled);
        assert_eq!(on.light_position, before.light_position);

        assert!(!lighting.toggle());
        assert_eq!(lighting.uniforms(), before);
    }
}
