use crate::lighting::LightingUniforms;
use cubespin_geometry::CubeMesh;
use cubespin_kernel::SceneError;
use glam::Mat4;

/// Shader pipeline stage, used to attribute compile failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors surfaced by a render backend.
///
/// None of these are retried. Context and shader errors are fatal at startup;
/// a context loss mid-frame drops that frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {0}")]
    ProgramLink(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Fixed shader program text for one backend.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSources {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

/// Everything one draw call needs; nothing carries over from the previous call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub projection: Mat4,
    pub model_view: Mat4,
    pub lighting: LightingUniforms,
}

/// A graphics backend able to draw the cube mesh.
///
/// Programs and buffers are created once at startup and only read afterwards.
/// A frame is `begin_frame`, one `draw_object` per object, then `end_frame`.
/// Callers must not assume any pipeline binding survives between draws.
pub trait RenderBackend {
    type Program;
    type Buffers;

    /// Compile both stages and link them into a program.
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self::Program, RenderError>;

    /// One-time upload of positions, normals, colours and indices.
    fn upload_static_buffers(&mut self, mesh: &CubeMesh) -> Result<Self::Buffers, RenderError>;

    /// Start a frame: acquire the target, clear colour and depth.
    fn begin_frame(&mut self) -> Result<(), RenderError>;

    /// Draw all indices of `buffers` as a triangle list with the given uniforms.
    fn draw_object(
        &mut self,
        program: &Self::Program,
        buffers: &Self::Buffers,
        uniforms: &DrawUniforms,
    ) -> Result<(), RenderError>;

    /// Finish and submit the frame.
    fn end_frame(&mut self) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_stage() {
        let err = RenderError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "unexpected token".into(),
        };
        assert_eq!(
            err.to_string(),
            "fragment shader failed to compile: unexpected token"
        );
    }

    #[test]
    fn scene_errors_pass_through() {
        let err: RenderError = SceneError::InvalidObjectIndex { index: 3, count: 2 }.into();
        assert!(err.to_string().contains("index 3"));
    }
}
