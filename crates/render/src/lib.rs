//! Rendering adapter: backend-agnostic interface and per-frame scene composition.
//!
//! # Invariants
//! - The composer reads scene and lighting state; it never mutates them.
//! - Matrices are rebuilt from current state every frame, never cached.
//! - Objects are drawn once per frame, in index order, each call fully
//!   specifying its own transforms and buffers.
//!
//! A [`RecordingBackend`] captures draw calls without a GPU. The wgpu backend
//! lives in `cubespin-render-wgpu` and implements the same [`RenderBackend`] trait.

mod backend;
mod composer;
mod lighting;
mod recording;

pub use backend::{DrawUniforms, RenderBackend, RenderError, ShaderSources, ShaderStage};
pub use composer::{FramePlan, SceneComposer, SceneResources, Viewport};
pub use lighting::{LightingState, LightingUniforms};
pub use recording::{DrawCall, RecordingBackend};
