use crate::backend::{DrawUniforms, RenderBackend, RenderError, ShaderSources, ShaderStage};
use cubespin_common::FacePalette;
use cubespin_geometry::CubeMesh;
use cubespin_kernel::SceneError;

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: usize,
    /// Which uploaded buffer set was bound.
    pub buffers: usize,
    pub index_count: u32,
    pub uniforms: DrawUniforms,
}

/// Headless backend that records draw calls instead of rasterizing.
///
/// Stands in for the GPU in tests and in the CLI. Shader "compilation" only
/// rejects blank sources, and "linking" requires a `@vertex` and a `@fragment`
/// entry point. Only the most recent frame is kept; earlier ones are counted.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    programs: usize,
    uploads: Vec<(FacePalette, u32)>,
    frame_count: usize,
    last_frame: Option<Vec<DrawCall>>,
    current: Option<Vec<DrawCall>>,
    context_lost: bool,
}

impl RecordingBackend {
    /// Minimal sources accepted by [`RecordingBackend::create_program`].
    pub const SHADERS: ShaderSources = ShaderSources {
        vertex: "@vertex fn vs_main() {}",
        fragment: "@fragment fn fs_main() {}",
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing the graphics context. Every later frame fails.
    pub fn lose_context(&mut self) {
        self.context_lost = true;
    }

    /// Palettes uploaded so far, in upload order.
    pub fn uploads(&self) -> Vec<FacePalette> {
        self.uploads.iter().map(|(p, _)| *p).collect()
    }

    /// Number of frames completed so far.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Draw calls of the most recent completed frame.
    pub fn last_frame(&self) -> Option<&[DrawCall]> {
        self.last_frame.as_deref()
    }

    fn check_context(&self) -> Result<(), RenderError> {
        if self.context_lost {
            return Err(RenderError::ContextUnavailable("context lost".into()));
        }
        Ok(())
    }
}

fn compile(stage: ShaderStage, source: &str) -> Result<(), RenderError> {
    if source.trim().is_empty() {
        return Err(RenderError::ShaderCompile {
            stage,
            log: "empty source".into(),
        });
    }
    Ok(())
}

impl RenderBackend for RecordingBackend {
    type Program = usize;
    type Buffers = usize;

    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<usize, RenderError> {
        self.check_context()?;
        compile(ShaderStage::Vertex, vertex_source)?;
        compile(ShaderStage::Fragment, fragment_source)?;
        if !vertex_source.contains("@vertex") {
            return Err(RenderError::ProgramLink("no vertex entry point".into()));
        }
        if !fragment_source.contains("@fragment") {
            return Err(RenderError::ProgramLink("no fragment entry point".into()));
        }
        self.programs += 1;
        Ok(self.programs - 1)
    }

    fn upload_static_buffers(&mut self, mesh: &CubeMesh) -> Result<usize, RenderError> {
        self.check_context()?;
        self.uploads
            .push((FacePalette(mesh.face_colors), mesh.index_count()));
        Ok(self.uploads.len() - 1)
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        self.check_context()?;
        self.current = Some(Vec::new());
        Ok(())
    }

    fn draw_object(
        &mut self,
        program: &usize,
        buffers: &usize,
        uniforms: &DrawUniforms,
    ) -> Result<(), RenderError> {
        self.check_context()?;
        let count = self.uploads.len();
        let index_count = self
            .uploads
            .get(*buffers)
            .map(|(_, n)| *n)
            .ok_or(SceneError::InvalidObjectIndex {
                index: *buffers,
                count,
            })?;
        let frame = self
            .current
            .as_mut()
            .ok_or_else(|| RenderError::ContextUnavailable("draw outside a frame".into()))?;
        frame.push(DrawCall {
            program: *program,
            buffers: *buffers,
            index_count,
            uniforms: *uniforms,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.check_context()?;
        if let Some(frame) = self.current.take() {
            self.frame_count += 1;
            self.last_frame = Some(frame);
        }
        Ok(())
    }
}
