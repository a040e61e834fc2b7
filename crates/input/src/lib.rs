//! Interaction tracking: pointer and touch drags mapped to angular velocity.
//!
//! # Invariants
//! - At most one drag session is live; it names exactly one target object.
//! - A drag move replaces the target's velocity and refreshes its interaction time.
//! - Releasing a drag leaves velocity untouched so momentum carries on.
//! - Only the contact that started a drag can move or end it.

mod event;
mod tracker;

pub use event::{PointerEvent, PointerSource};
pub use tracker::{DragSession, InteractionTracker};
