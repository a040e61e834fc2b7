//! Geometry provider: the static unit-cube mesh every object is drawn with.
//!
//! # Invariants
//! - Output is pure and deterministic.
//! - Position, normal and colour streams share the 4-vertices-per-face layout.

mod mesh;

pub use mesh::{CubeMesh, INDEX_COUNT, VERTEX_COUNT, VERTICES_PER_FACE, cube_mesh};
