use crate::object::RotatingObject;
use cubespin_common::SceneConfig;
use std::time::Duration;

/// Per-tick momentum decay, orientation integration and auto-rotation.
///
/// Decay is driven by wall-clock idle time, not tick count, so the fall-off
/// is the same at any frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationIntegrator {
    /// Idle time at or below which velocity is left untouched.
    pub decay_threshold: Duration,
    pub time_constant: Duration,
    /// Radians added to the auto-rotation angle every tick.
    pub auto_step: f32,
}

impl Default for RotationIntegrator {
    fn default() -> Self {
        Self {
            decay_threshold: Duration::from_millis(100),
            time_constant: Duration::from_millis(1000),
            auto_step: 0.01,
        }
    }
}

impl RotationIntegrator {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            decay_threshold: config.decay_threshold(),
            time_constant: config.decay_time_constant(),
            auto_step: config.auto_rotation_step,
        }
    }

    /// Multiplier applied to velocity after `idle` without interaction.
    ///
    /// Exactly `1.0` up to the threshold, then `exp(-idle / time_constant)`.
    pub fn decay_factor(&self, idle: Duration) -> f32 {
        if idle <= self.decay_threshold {
            return 1.0;
        }
        (-idle.as_secs_f64() / self.time_constant.as_secs_f64()).exp() as f32
    }

    /// Advance one object by one tick at time `now`.
    pub fn step_object(&self, object: &mut RotatingObject, now: Duration) {
        // saturating: a timestamp from the future counts as no idle time
        let idle = now.saturating_sub(object.last_interaction());
        let factor = self.decay_factor(idle);
        if factor < 1.0 {
            object.scale_velocity(factor);
        }
        object.advance(self.auto_step);
    }

    /// Advance every object by one tick, in index order.
    pub fn step(&self, objects: &mut [RotatingObject], now: Duration) {
        for object in objects {
            self.step_object(object, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubespin_common::FacePalette;
    use glam::{Vec2, Vec3};

    fn spinning(velocity: Vec2, touched_at: Duration) -> RotatingObject {
        let mut obj = RotatingObject::new(Vec3::ZERO, FacePalette::PRIMARY);
        obj.drive(velocity, touched_at);
        obj
    }

    #[test]
    fn no_decay_at_or_below_threshold() {
        let integrator = RotationIntegrator::default();
        for ms in [0, 1, 50, 99, 100] {
            assert_eq!(integrator.decay_factor(Duration::from_millis(ms)), 1.0);
        }

        let mut obj = spinning(Vec2::new(0.3, -0.2), Duration::from_millis(1_000));
        integrator.step_object(&mut obj, Duration::from_millis(1_100));
        assert_eq!(obj.angular_velocity(), Vec2::new(0.3, -0.2));
    }

    #[test]
    fn exponential_decay_above_threshold() {
        let integrator = RotationIntegrator::default();
        for ms in [101u64, 250, 1_000, 3_000] {
            let mut obj = spinning(Vec2::new(0.4, -0.8), Duration::ZERO);
            integrator.step_object(&mut obj, Duration::from_millis(ms));
            let expected = (-(ms as f32) / 1000.0).exp();
            let v = obj.angular_velocity();
            assert!((v.x - 0.4 * expected).abs() < 1e-6, "ms={ms} x={}", v.x);
            assert!((v.y + 0.8 * expected).abs() < 1e-6, "ms={ms} y={}", v.y);
        }
    }

    #[test]
    fn decay_shrinks_but_never_flips_sign() {
        let integrator = RotationIntegrator::default();
        let mut obj = spinning(Vec2::new(0.5, -0.5), Duration::ZERO);
        let mut previous = obj.angular_velocity();
        for tick in 1..=20u64 {
            integrator.step_object(&mut obj, Duration::from_millis(tick * 16 + 100));
            let v = obj.angular_velocity();
            assert!(v.x > 0.0 && v.y < 0.0, "sign flipped at tick {tick}");
            assert!(v.length() <= previous.length());
            previous = v;
        }
        assert!(previous.length() < 0.5);
    }

    #[test]
    fn long_idle_never_reaches_zero() {
        let integrator = RotationIntegrator::default();
        let mut obj = spinning(Vec2::new(0.5, -0.5), Duration::ZERO);
        // well past the point where the f32 factor itself underflows
        for tick in 1..=10_000u64 {
            integrator.step_object(&mut obj, Duration::from_millis(tick * 16 + 100));
            let v = obj.angular_velocity();
            assert!(v.x > 0.0 && v.y < 0.0, "velocity hit zero at tick {tick}");
        }
        assert_eq!(
            integrator.decay_factor(Duration::from_secs(200)),
            0.0,
            "factor is expected to underflow at this idle time"
        );
    }

    #[test]
    fn decay_uses_wall_clock_not_ticks() {
        let integrator = RotationIntegrator::default();
        // one tick 500ms after release
        let mut a = spinning(Vec2::new(1.0, 0.0), Duration::ZERO);
        integrator.step_object(&mut a, Duration::from_millis(500));
        // a different object, also one tick, 500ms after its own release
        let mut b = spinning(Vec2::new(1.0, 0.0), Duration::from_millis(2_000));
        integrator.step_object(&mut b, Duration::from_millis(2_500));
        assert_eq!(a.angular_velocity(), b.angular_velocity());
    }

    #[test]
    fn auto_rotation_advances_every_tick() {
        let integrator = RotationIntegrator::default();
        let mut idle = spinning(Vec2::ZERO, Duration::ZERO);
        let mut busy = spinning(Vec2::new(0.2, 0.2), Duration::ZERO);
        for tick in 1..=10u64 {
            let now = Duration::from_millis(tick * 500);
            let before = idle.auto_rotation();
            busy.drive(Vec2::new(0.2, 0.2), now);
            integrator.step(std::slice::from_mut(&mut idle), now);
            integrator.step(std::slice::from_mut(&mut busy), now);
            assert!((idle.auto_rotation() - before - 0.01).abs() < 1e-6);
        }
        assert!((idle.auto_rotation() - 0.1).abs() < 1e-5);
        assert_eq!(idle.auto_rotation(), busy.auto_rotation());
    }

    #[test]
    fn orientation_integration_is_additive() {
        let integrator = RotationIntegrator::default();
        let now = Duration::from_millis(500);

        let mut twice = spinning(Vec2::new(0.1, 0.25), now);
        integrator.step_object(&mut twice, now);
        integrator.step_object(&mut twice, now);

        let mut once = spinning(Vec2::new(0.2, 0.5), now);
        integrator.step_object(&mut once, now);

        assert!((twice.orientation() - once.orientation()).length() < 1e-6);
    }

    #[test]
    fn dragging_keeps_velocity_from_decaying() {
        let integrator = RotationIntegrator::default();
        let mut obj = spinning(Vec2::ZERO, Duration::ZERO);
        // a move event every 16ms keeps idle time far under the threshold
        for tick in 1..=100u64 {
            let now = Duration::from_millis(tick * 16);
            obj.drive(Vec2::new(0.05, 0.02), now);
            integrator.step_object(&mut obj, now + Duration::from_millis(8));
            assert_eq!(obj.angular_velocity(), Vec2::new(0.05, 0.02));
        }
    }

    #[test]
    fn future_timestamp_counts_as_fresh() {
        let integrator = RotationIntegrator::default();
        let mut obj = spinning(Vec2::new(0.1, 0.1), Duration::from_secs(10));
        integrator.step_object(&mut obj, Duration::from_secs(1));
        assert_eq!(obj.angular_velocity(), Vec2::new(0.1, 0.1));
    }

    #[test]
    fn from_config_reads_constants() {
        let config = SceneConfig {
            decay_threshold_ms: 50,
            decay_time_constant_ms: 2_000,
            auto_rotation_step: 0.02,
            ..SceneConfig::default()
        };
        let integrator = RotationIntegrator::from_config(&config);
        assert_eq!(integrator.decay_threshold, Duration::from_millis(50));
        assert_eq!(integrator.time_constant, Duration::from_secs(2));
        assert_eq!(integrator.auto_step, 0.02);
    }
}
