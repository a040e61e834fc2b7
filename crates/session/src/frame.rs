use cubespin_common::{ConfigError, SceneConfig};
use cubespin_input::{InteractionTracker, PointerEvent};
use cubespin_kernel::{Scene, SceneError};
use cubespin_render::{
    FramePlan, LightingState, RenderBackend, RenderError, SceneComposer, SceneResources, Viewport,
};
use std::time::Duration;

/// Errors from building a frame context.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// The single authoritative state store for one hosting view.
///
/// Input handlers and the refresh callback both go through `&mut self`, so
/// every tick reads the state as it is now rather than a captured snapshot.
/// All mutation is ordered by the host's single event queue.
#[derive(Debug)]
pub struct FrameContext {
    scene: Scene,
    tracker: InteractionTracker,
    lighting: LightingState,
    composer: SceneComposer,
    viewport: Viewport,
    running: bool,
    input_attached: bool,
}

impl FrameContext {
    /// Validate `config` and build a scene with every object at rest.
    pub fn new(config: &SceneConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let scene = Scene::from_config(config)?;
        tracing::info!(
            objects = scene.len(),
            lighting = config.lighting_enabled,
            "frame context ready"
        );
        Ok(Self {
            scene,
            tracker: InteractionTracker::from_config(config),
            lighting: LightingState::from_config(config),
            composer: SceneComposer::from_config(config),
            viewport: Viewport::new(config.canvas_width, config.canvas_height),
            running: true,
            input_attached: true,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tracker(&self) -> &InteractionTracker {
        &self.tracker
    }

    pub fn lighting(&self) -> &LightingState {
        &self.lighting
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_input_attached(&self) -> bool {
        self.input_attached
    }

    /// Route one input event to the interaction tracker. Ignored once detached.
    pub fn handle_input(&mut self, event: PointerEvent, now: Duration) -> Result<(), SceneError> {
        if !self.input_attached {
            return Ok(());
        }
        self.tracker.handle(event, &mut self.scene, now)
    }

    /// The external lighting control. Returns the new enabled flag.
    pub fn toggle_lighting(&mut self) -> bool {
        self.lighting.toggle()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.tracker.set_canvas_width(width as f32);
        tracing::debug!(width, height, "viewport resized");
    }

    /// Advance one tick: integrate rotation, then compose the frame.
    ///
    /// Returns `None` once the loop has been stopped.
    pub fn tick(&mut self, now: Duration) -> Option<FramePlan> {
        if !self.running {
            return None;
        }
        self.scene.step(now);
        Some(self.composer.compose(&self.scene, &self.lighting, self.viewport))
    }

    /// Compose a frame from current state without advancing the scene.
    pub fn plan(&self) -> FramePlan {
        self.composer.compose(&self.scene, &self.lighting, self.viewport)
    }

    /// Tick and draw through `backend`. Returns `Ok(false)` when stopped.
    pub fn render_tick<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        resources: &SceneResources<B>,
        now: Duration,
    ) -> Result<bool, RenderError> {
        let Some(plan) = self.tick(now) else {
            return Ok(false);
        };
        self.composer.render(backend, resources, &plan)?;
        Ok(true)
    }

    /// Halt further ticks.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            tracing::info!(tick = self.scene.tick(), "render loop stopped");
        }
    }

    /// Stop accepting input events.
    pub fn detach_input(&mut self) {
        self.input_attached = false;
    }

    /// Teardown for the hosting view: stop ticking and detach input.
    pub fn shutdown(&mut self) {
        self.stop();
        self.detach_input();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubespin_render::RecordingBackend;
    use glam::Vec2;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn context() -> FrameContext {
        FrameContext::new(&SceneConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SceneConfig {
            object_count: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            FrameContext::new(&config),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn tick_reads_current_state() {
        let mut ctx = context();
        ctx.handle_input(PointerEvent::Down(Vec2::new(10.0, 10.0)), ms(0))
            .unwrap();
        ctx.handle_input(PointerEvent::Move(Vec2::new(20.0, 30.0)), ms(10))
            .unwrap();
        let plan = ctx.tick(ms(16)).unwrap();
        assert_eq!(plan.model_views.len(), 2);

        let left = &ctx.scene().objects()[0];
        assert!((left.orientation() - Vec2::new(0.2, 0.1)).length() < 1e-6);
        assert_eq!(ctx.scene().objects()[1].orientation(), Vec2::ZERO);

        // lighting flipped between ticks shows up in the very next frame
        ctx.toggle_lighting();
        assert!(ctx.tick(ms(32)).unwrap().lighting.enabled);
    }

    #[test]
    fn momentum_decays_after_release() {
        let mut ctx = context();
        ctx.handle_input(PointerEvent::Down(Vec2::new(10.0, 10.0)), ms(0))
            .unwrap();
        ctx.handle_input(PointerEvent::Move(Vec2::new(60.0, 10.0)), ms(10))
            .unwrap();
        ctx.handle_input(PointerEvent::Up, ms(12)).unwrap();

        ctx.tick(ms(50));
        let held = ctx.scene().objects()[0].angular_velocity();
        assert!((held.y - 0.5).abs() < 1e-6);

        ctx.tick(ms(510));
        let decayed = ctx.scene().objects()[0].angular_velocity();
        assert!(decayed.y > 0.0 && decayed.y < held.y);
    }

    #[test]
    fn resize_moves_the_half_plane() {
        let mut ctx = context();
        ctx.resize(200, 100);
        assert_eq!(ctx.viewport(), Viewport::new(200, 100));
        ctx.handle_input(PointerEvent::Down(Vec2::new(150.0, 10.0)), ms(0))
            .unwrap();
        assert_eq!(ctx.tracker().session().target(), Some(1));
    }

    #[test]
    fn stopped_loop_produces_no_frames() {
        let mut ctx = context();
        ctx.tick(ms(16));
        ctx.stop();
        assert!(!ctx.is_running());
        assert!(ctx.tick(ms(32)).is_none());
        assert_eq!(ctx.scene().tick(), 1);
    }

    #[test]
    fn plan_reads_state_without_stepping() {
        let mut ctx = context();
        let ticked = ctx.tick(ms(16)).unwrap();
        let planned = ctx.plan();
        assert_eq!(ctx.scene().tick(), 1);
        assert_eq!(planned, ticked);
    }

    #[test]
    fn detached_input_is_ignored() {
        let mut ctx = context();
        ctx.shutdown();
        assert!(!ctx.is_input_attached());
        ctx.handle_input(PointerEvent::Down(Vec2::new(10.0, 10.0)), ms(0))
            .unwrap();
        assert!(!ctx.tracker().session().is_dragging());
    }

    #[test]
    fn render_tick_draws_through_backend() {
        let mut ctx = context();
        let mut backend = RecordingBackend::new();
        let resources =
            SceneResources::create(&mut backend, RecordingBackend::SHADERS, ctx.scene()).unwrap();

        assert!(ctx.render_tick(&mut backend, &resources, ms(16)).unwrap());
        assert!(ctx.render_tick(&mut backend, &resources, ms(32)).unwrap());
        assert_eq!(backend.frame_count(), 2);

        ctx.stop();
        assert!(!ctx.render_tick(&mut backend, &resources, ms(48)).unwrap());
        assert_eq!(backend.frame_count(), 2);
    }
}
