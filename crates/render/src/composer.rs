use crate::backend::{DrawUniforms, RenderBackend, RenderError, ShaderSources};
use crate::lighting::{LightingState, LightingUniforms};
use cubespin_common::SceneConfig;
use cubespin_geometry::cube_mesh;
use cubespin_kernel::{RotatingObject, Scene, SceneError};
use glam::Mat4;

/// Drawable surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// GPU resources for a scene: one program, one buffer set per object.
pub struct SceneResources<B: RenderBackend> {
    program: B::Program,
    buffers: Vec<B::Buffers>,
}

impl<B: RenderBackend> SceneResources<B> {
    /// Build the program and upload each object's mesh in its own palette.
    pub fn create(
        backend: &mut B,
        shaders: ShaderSources,
        scene: &Scene,
    ) -> Result<Self, RenderError> {
        let program = backend.create_program(shaders.vertex, shaders.fragment)?;
        let buffers = scene
            .objects()
            .iter()
            .map(|object| backend.upload_static_buffers(&cube_mesh(*object.palette())))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(objects = buffers.len(), "scene resources created");
        Ok(Self { program, buffers })
    }

    pub fn program(&self) -> &B::Program {
        &self.program
    }

    pub fn buffers(&self, index: usize) -> Result<&B::Buffers, SceneError> {
        let count = self.buffers.len();
        self.buffers
            .get(index)
            .ok_or(SceneError::InvalidObjectIndex { index, count })
    }
}

/// Fully resolved draw state for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub projection: Mat4,
    pub lighting: LightingUniforms,
    /// Model-view matrix per object, in index order.
    pub model_views: Vec<Mat4>,
}

/// Builds camera and per-object transforms from current state.
///
/// Everything is recomputed each frame from the scene; no matrices are kept
/// between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneComposer {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl SceneComposer {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            fov: config.fov_radians(),
            near: config.near,
            far: config.far,
        }
    }

    pub fn projection(&self, viewport: Viewport) -> Mat4 {
        Mat4::perspective_rh(self.fov, viewport.aspect(), self.near, self.far)
    }

    /// Translate to the object's offset, rotate by the user orientation (X then
    /// Y), then apply auto-rotation about the already-rotated local Y axis.
    pub fn model_view(object: &RotatingObject) -> Mat4 {
        let orientation = object.orientation();
        Mat4::from_translation(object.offset())
            * Mat4::from_rotation_x(orientation.x)
            * Mat4::from_rotation_y(orientation.y)
            * Mat4::from_rotation_y(object.auto_rotation())
    }

    pub fn compose(
        &self,
        scene: &Scene,
        lighting: &LightingState,
        viewport: Viewport,
    ) -> FramePlan {
        FramePlan {
            projection: self.projection(viewport),
            lighting: lighting.uniforms(),
            model_views: scene.objects().iter().map(Self::model_view).collect(),
        }
    }

    /// Issue one frame: a draw per object, in index order.
    pub fn render<B: RenderBackend>(
        &self,
        backend: &mut B,
        resources: &SceneResources<B>,
        plan: &FramePlan,
    ) -> Result<(), RenderError> {
        backend.begin_frame()?;
        for (index, model_view) in plan.model_views.iter().enumerate() {
            let buffers = resources.buffers(index)?;
            let uniforms = DrawUniforms {
                projection: plan.projection,
                model_view: *model_view,
                lighting: plan.lighting,
            };
            backend.draw_object(resources.program(), buffers, &uniforms)?;
        }
        backend.end_frame()
    }
}

impl std::fmt::Display for FramePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "lighting={} light=({:.1}, {:.1}, {:.1})",
            if self.lighting.enabled { "on" } else { "off" },
            self.lighting.light_position.x,
            self.lighting.light_position.y,
            self.lighting.light_position.z,
        )?;
        for (i, mv) in self.model_views.iter().enumerate() {
            let t = mv.w_axis;
            writeln!(f, "  [{i}] translation=({:.2}, {:.2}, {:.2})", t.x, t.y, t.z)?;
        }
        Ok(())
    }
}
