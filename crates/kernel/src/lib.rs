//! Rotation kernel: per-object orientation state and the per-tick integrator.
//!
//! # Invariants
//! - Orientation and angular velocity are always defined.
//! - Momentum decay shrinks velocity toward zero and never flips its sign.
//!   Velocity is `f32`: a non-zero component that would underflow is held at
//!   the smallest subnormal of its sign, so it never becomes exactly zero.
//! - Auto-rotation advances by a fixed step every tick, whatever the input state.
//! - Decay depends on wall-clock idle time, never on frame count.

mod integrator;
mod object;
mod scene;

pub use integrator::RotationIntegrator;
pub use object::RotatingObject;
pub use scene::{Scene, SceneError};
