//! Shared types for the cubespin workspace: scene configuration and face palettes.

mod config;
mod types;

pub use config::{ConfigError, MAX_OBJECTS, SceneConfig};
pub use types::{FACE_COUNT, FacePalette, Rgba};
