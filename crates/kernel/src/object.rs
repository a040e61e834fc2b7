use cubespin_common::FacePalette;
use glam::{Vec2, Vec3};
use std::time::Duration;

/// One rotatable cube.
///
/// Orientation is a pair of unbounded Euler angles: `x` about the X axis, `y`
/// about the Y axis. Angles are never wrapped; trigonometry handles that.
/// Timestamps are measured from the start of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatingObject {
    orientation: Vec2,
    angular_velocity: Vec2,
    auto_rotation: f32,
    last_interaction: Duration,
    palette: FacePalette,
    offset: Vec3,
}

impl RotatingObject {
    /// A resting object at `offset`, last touched at session start.
    pub fn new(offset: Vec3, palette: FacePalette) -> Self {
        Self {
            orientation: Vec2::ZERO,
            angular_velocity: Vec2::ZERO,
            auto_rotation: 0.0,
            last_interaction: Duration::ZERO,
            palette,
            offset,
        }
    }

    pub fn orientation(&self) -> Vec2 {
        self.orientation
    }

    /// Radians per tick about the X (`x`) and Y (`y`) axes.
    pub fn angular_velocity(&self) -> Vec2 {
        self.angular_velocity
    }

    pub fn auto_rotation(&self) -> f32 {
        self.auto_rotation
    }

    pub fn last_interaction(&self) -> Duration {
        self.last_interaction
    }

    pub fn palette(&self) -> &FacePalette {
        &self.palette
    }

    /// Fixed world offset, camera distance included.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Replace the angular velocity from a drag and mark the object as just touched.
    pub fn drive(&mut self, velocity: Vec2, now: Duration) {
        self.angular_velocity = velocity;
        self.last_interaction = now;
    }

    /// Scale velocity by a decay factor in `0.0..=1.0`.
    ///
    /// A non-zero component that underflows is held at the smallest subnormal
    /// of its sign rather than reaching zero.
    pub(crate) fn scale_velocity(&mut self, factor: f32) {
        self.angular_velocity = Vec2::new(
            decay_component(self.angular_velocity.x, factor),
            decay_component(self.angular_velocity.y, factor),
        );
    }

    pub(crate) fn advance(&mut self, auto_step: f32) {
        self.orientation += self.angular_velocity;
        self.auto_rotation += auto_step;
    }
}

fn decay_component(value: f32, factor: f32) -> f32 {
    let scaled = value * factor;
    if scaled == 0.0 && value != 0.0 {
        f32::from_bits(1).copysign(value)
    } else {
        scaled
    }
}
