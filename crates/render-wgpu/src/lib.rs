//! wgpu render backend for cubespin.
//!
//! Implements [`cubespin_render::RenderBackend`] on top of a window surface:
//! WGSL programs compiled under validation error scopes, one static buffer set
//! and uniform slot per object, one render pass per frame.
//!
//! # Invariants
//! - Static buffers are written once at upload and never again.
//! - Each draw writes its own uniform slot; nothing is inherited from the
//!   previous draw.
//! - Surface loss drops the current frame and is reported, never retried.

mod gpu;
mod shaders;

pub use gpu::{WgpuBackend, WgpuBuffers, WgpuProgram};
pub use shaders::{CUBE_SHADERS, FRAGMENT_SHADER, VERTEX_SHADER};
