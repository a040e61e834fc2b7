use anyhow::Result;
use clap::Parser;
use cubespin_common::SceneConfig;
use cubespin_input::PointerEvent;
use cubespin_render::SceneResources;
use cubespin_render_wgpu::{CUBE_SHADERS, WgpuBackend};
use cubespin_session::{FrameContext, SessionClock};
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cubespin-desktop", about = "Drag-to-rotate cubes with momentum")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of cubes
    #[arg(short, long)]
    objects: Option<usize>,

    /// Start with lighting enabled
    #[arg(long)]
    lighting: bool,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };
        if let Some(objects) = self.objects {
            config.object_count = objects;
        }
        if self.lighting {
            config.lighting_enabled = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn to_canvas(position: PhysicalPosition<f64>) -> Vec2 {
    Vec2::new(position.x as f32, position.y as f32)
}

/// Left-button event at the last known cursor position. A press with no known
/// position (nothing reported since the cursor entered) has no target.
fn left_button_event(state: ElementState, cursor: Option<Vec2>) -> Option<PointerEvent> {
    match state {
        ElementState::Pressed => cursor.map(PointerEvent::Down),
        ElementState::Released => Some(PointerEvent::Up),
    }
}

/// Application state.
struct AppState {
    frame: FrameContext,
    clock: SessionClock,
    /// Last reported position; `None` until the cursor moves over the window.
    cursor: Option<Vec2>,
    show_panel: bool,
}

impl AppState {
    fn pointer(&mut self, event: PointerEvent) {
        if let Err(e) = self.frame.handle_input(event, self.clock.now()) {
            tracing::error!("input rejected: {e}");
        }
    }

    fn touch(&mut self, touch: Touch) {
        let position = to_canvas(touch.location);
        let event = match touch.phase {
            TouchPhase::Started => PointerEvent::TouchStart {
                id: touch.id,
                position,
            },
            TouchPhase::Moved => PointerEvent::TouchMove {
                id: touch.id,
                position,
            },
            TouchPhase::Ended | TouchPhase::Cancelled => PointerEvent::TouchEnd { id: touch.id },
        };
        self.pointer(event);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::KeyL => {
                self.frame.toggle_lighting();
            }
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        egui::SidePanel::left("controls")
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Cubespin");
                ui.separator();

                let lighting = self.frame.lighting().is_enabled();
                let label = if lighting {
                    "Lighting: On (L)"
                } else {
                    "Lighting: Off (L)"
                };
                if ui.button(label).clicked() {
                    self.frame.toggle_lighting();
                }

                ui.separator();
                ui.label(format!("Tick: {}", self.frame.scene().tick()));
                let dragging = self.frame.tracker().session().target();
                for (i, obj) in self.frame.scene().objects().iter().enumerate() {
                    let marker = if dragging == Some(i) { ">" } else { " " };
                    let o = obj.orientation();
                    let v = obj.angular_velocity();
                    ui.label(format!(
                        "{marker} Cube {i}: rot=({:.2}, {:.2}) vel=({:.3}, {:.3})",
                        o.x, o.y, v.x, v.y
                    ));
                }

                ui.separator();
                ui.small("Drag: rotate | L: lighting | F1: panel");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
    resources: Option<SceneResources<WgpuBackend>>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    failed: bool,
}

impl GpuApp {
    fn new(frame: FrameContext) -> Self {
        Self {
            state: AppState {
                frame,
                clock: SessionClock::start(),
                cursor: None,
                show_panel: true,
            },
            window: None,
            backend: None,
            resources: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            failed: false,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let size = window.inner_size();
        let mut backend = WgpuBackend::new(window.clone(), size.width, size.height)?;
        let resources =
            SceneResources::create(&mut backend, CUBE_SHADERS, self.state.frame.scene())?;
        self.state.frame.resize(size.width, size.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(backend.device(), backend.surface_format(), None, 1, false);

        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        self.resources = Some(resources);
        self.backend = Some(backend);
        self.window = Some(window);
        Ok(())
    }

    fn teardown(&mut self, event_loop: &ActiveEventLoop) {
        self.state.frame.shutdown();
        event_loop.exit();
    }

    fn redraw(&mut self) {
        if !self.state.frame.is_running() {
            return;
        }
        let (Some(window), Some(backend), Some(resources)) =
            (&self.window, &mut self.backend, &self.resources)
        else {
            return;
        };

        let now = self.state.clock.now();
        if let Err(e) = self.state.frame.render_tick(backend, resources, now) {
            tracing::error!("frame dropped: {e}");
            window.request_redraw();
            return;
        }

        if let (Some(egui_winit), Some(egui_renderer)) =
            (&mut self.egui_winit, &mut self.egui_renderer)
        {
            let raw_input = egui_winit.take_egui_input(window);
            let full_output = self.egui_ctx.run(raw_input, |ctx| {
                self.state.draw_ui(ctx);
            });
            egui_winit.handle_platform_output(window, full_output.platform_output);

            let paint_jobs = self
                .egui_ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point);
            let (width, height) = backend.size();
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [width, height],
                pixels_per_point: full_output.pixels_per_point,
            };

            let device = backend.device();
            let queue = backend.queue();
            if let Some(view) = backend.frame_view() {
                for (id, image_delta) in &full_output.textures_delta.set {
                    egui_renderer.update_texture(device, queue, *id, image_delta);
                }
                let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("egui_encoder"),
                });
                egui_renderer.update_buffers(
                    device,
                    queue,
                    &mut encoder,
                    &paint_jobs,
                    &screen_descriptor,
                );
                {
                    let mut pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("egui_pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();
                    egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                }
                queue.submit(std::iter::once(encoder.finish()));
            }
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        backend.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failed {
            return;
        }

        let viewport = self.state.frame.viewport();
        let attrs = Window::default_attributes()
            .with_title("Cubespin")
            .with_inner_size(PhysicalSize::new(viewport.width, viewport.height));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("graphics context unavailable: {e}");
                self.failed = true;
                self.teardown(event_loop);
                return;
            }
        };

        if let Err(e) = self.init_gpu(window) {
            tracing::error!("rendering not started: {e}");
            self.failed = true;
            self.teardown(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            // releases always reach the tracker so a drag cannot get stuck
            let is_release = matches!(
                event,
                WindowEvent::MouseInput {
                    state: ElementState::Released,
                    ..
                } | WindowEvent::CursorLeft { .. }
            );
            if response.consumed && !is_release {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.teardown(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(backend) = &mut self.backend {
                    backend.resize(new_size.width, new_size.height);
                }
                self.state.frame.resize(new_size.width, new_size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = to_canvas(position);
                self.state.cursor = Some(position);
                self.state.pointer(PointerEvent::Move(position));
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                match left_button_event(state, self.state.cursor) {
                    Some(event) => self.state.pointer(event),
                    None => tracing::debug!("press before any cursor position; ignored"),
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.cursor = None;
                self.state.pointer(PointerEvent::Leave);
            }
            WindowEvent::Touch(touch) => {
                self.state.touch(touch);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    self.teardown(event_loop);
                } else {
                    self.state.handle_key(key);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cubespin-desktop starting");

    let config = cli.scene_config()?;
    let frame = FrameContext::new(&config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(frame);
    event_loop.run_app(&mut app)?;

    if app.failed {
        anyhow::bail!("rendering could not start; see log for details");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_without_cursor_position_has_no_target() {
        assert_eq!(left_button_event(ElementState::Pressed, None), None);
    }

    #[test]
    fn press_uses_last_cursor_position() {
        let at = Vec2::new(700.0, 20.0);
        assert_eq!(
            left_button_event(ElementState::Pressed, Some(at)),
            Some(PointerEvent::Down(at))
        );
    }

    #[test]
    fn release_always_ends_the_drag() {
        assert_eq!(
            left_button_event(ElementState::Released, None),
            Some(PointerEvent::Up)
        );
    }
}
