use crate::integrator::RotationIntegrator;
use crate::object::RotatingObject;
use cubespin_common::{FacePalette, MAX_OBJECTS, SceneConfig};
use std::time::Duration;

/// Errors from scene operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("object index {index} out of range (scene has {count} objects)")]
    InvalidObjectIndex { index: usize, count: usize },
    #[error("object count {0} unsupported")]
    InvalidObjectCount(usize),
}

/// The set of rotatable objects plus the integrator that advances them.
///
/// Object count is fixed at construction. Objects are stored and advanced in
/// index order.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<RotatingObject>,
    integrator: RotationIntegrator,
    tick: u64,
}

impl Scene {
    /// Build a scene laid out from `config`, every object at rest.
    pub fn from_config(config: &SceneConfig) -> Result<Self, SceneError> {
        let count = config.object_count;
        if count == 0 || count > MAX_OBJECTS {
            return Err(SceneError::InvalidObjectCount(count));
        }
        let objects = (0..count)
            .map(|i| RotatingObject::new(config.object_offset(i), FacePalette::for_object(i)))
            .collect();
        Ok(Self {
            objects,
            integrator: RotationIntegrator::from_config(config),
            tick: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of ticks integrated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn integrator(&self) -> &RotationIntegrator {
        &self.integrator
    }

    pub fn objects(&self) -> &[RotatingObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Result<&RotatingObject, SceneError> {
        let count = self.objects.len();
        self.objects
            .get(index)
            .ok_or(SceneError::InvalidObjectIndex { index, count })
    }

    pub fn object_mut(&mut self, index: usize) -> Result<&mut RotatingObject, SceneError> {
        let count = self.objects.len();
        self.objects
            .get_mut(index)
            .ok_or(SceneError::InvalidObjectIndex { index, count })
    }

    /// Advance every object by one tick at session time `now`.
    pub fn step(&mut self, now: Duration) {
        self.integrator.step(&mut self.objects, now);
        self.tick += 1;
        tracing::trace!(tick = self.tick, "scene stepped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn two_objects() -> Scene {
        Scene::from_config(&SceneConfig::default()).unwrap()
    }

    #[test]
    fn builds_configured_object_count() {
        let scene = two_objects();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.tick(), 0);
        assert_eq!(*scene.objects()[0].palette(), FacePalette::PRIMARY);
        assert_eq!(*scene.objects()[1].palette(), FacePalette::SECONDARY);
        assert!(scene.objects()[0].offset().x < scene.objects()[1].offset().x);
    }

    #[test]
    fn rejects_zero_objects() {
        let config = SceneConfig {
            object_count: 0,
            ..SceneConfig::default()
        };
        assert_eq!(
            Scene::from_config(&config).unwrap_err(),
            SceneError::InvalidObjectCount(0)
        );
    }

    #[test]
    fn out_of_range_index_is_guarded() {
        let mut scene = two_objects();
        assert_eq!(
            scene.object_mut(2).unwrap_err(),
            SceneError::InvalidObjectIndex { index: 2, count: 2 }
        );
        assert!(scene.object(1).is_ok());
    }

    #[test]
    fn step_advances_objects_independently() {
        let mut scene = two_objects();
        let now = Duration::from_millis(16);
        scene
            .object_mut(0)
            .unwrap()
            .drive(Vec2::new(0.2, 0.1), now);
        scene.step(now);

        assert_eq!(scene.tick(), 1);
        assert_eq!(scene.objects()[0].orientation(), Vec2::new(0.2, 0.1));
        assert_eq!(scene.objects()[1].orientation(), Vec2::ZERO);
        assert_eq!(scene.objects()[1].angular_velocity(), Vec2::ZERO);
        for obj in scene.objects() {
            assert!((obj.auto_rotation() - 0.01).abs() < 1e-6);
        }
    }
}
