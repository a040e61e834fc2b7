//! Session state for one hosting view: scene, drag tracking, lighting, and the
//! render loop lifecycle, all held in one [`FrameContext`].
//!
//! # Invariants
//! - One context per view; input handlers and ticks mutate it in event order.
//! - Every tick recomputes the frame from current state.
//! - A stopped context never ticks again; detached input is dropped.

mod clock;
mod frame;

pub use clock::SessionClock;
pub use frame::{FrameContext, SessionError};
