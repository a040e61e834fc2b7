use bytemuck::{Pod, Zeroable};
use cubespin_geometry::CubeMesh;
use cubespin_render::{DrawUniforms, RenderBackend, RenderError, ShaderStage};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Uniforms {
    projection: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
    light_position: [f32; 4],
    /// x: lighting enabled flag.
    params: [f32; 4],
}

impl From<&DrawUniforms> for Uniforms {
    fn from(u: &DrawUniforms) -> Self {
        Self {
            projection: u.projection.to_cols_array_2d(),
            model_view: u.model_view.to_cols_array_2d(),
            light_position: u.lighting.light_position.extend(1.0).to_array(),
            params: [
                if u.lighting.enabled { 1.0 } else { 0.0 },
                0.0,
                0.0,
                0.0,
            ],
        }
    }
}

/// Linked render pipeline.
pub struct WgpuProgram {
    pipeline: wgpu::RenderPipeline,
}

/// Static mesh buffers for one object plus that object's uniform slot.
pub struct WgpuBuffers {
    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    colors: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    pass: Option<wgpu::RenderPass<'static>>,
}

/// A submitted frame waiting to be shown, so overlays can draw on top first.
struct Presentable {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// wgpu implementation of [`RenderBackend`] drawing into a window surface.
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    bind_group_layout: wgpu::BindGroupLayout,
    depth_texture: wgpu::TextureView,
    frame: Option<Frame>,
    presentable: Option<Presentable>,
}

impl WgpuBackend {
    /// Acquire an adapter and device for `target` and configure its surface.
    ///
    /// Any failure along the way is [`RenderError::ContextUnavailable`].
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::ContextUnavailable(format!("create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::ContextUnavailable("no compatible adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubespin_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::ContextUnavailable(format!("request device: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::ContextUnavailable("surface has no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_uniforms_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let depth_texture = Self::create_depth_texture(&device, config.width, config.height);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            bind_group_layout,
            depth_texture,
            frame: None,
            presentable: None,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Self::create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Target view of the submitted-but-unpresented frame, for overlays.
    pub fn frame_view(&self) -> Option<&wgpu::TextureView> {
        self.presentable.as_ref().map(|p| &p.view)
    }

    /// Show the last submitted frame.
    pub fn present(&mut self) {
        if let Some(p) = self.presentable.take() {
            p.surface_texture.present();
        }
    }

    fn compile(&self, stage: ShaderStage, source: &str) -> Result<wgpu::ShaderModule, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "cube_vertex",
                    ShaderStage::Fragment => "cube_fragment",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(e) => Err(RenderError::ShaderCompile {
                stage,
                log: e.to_string(),
            }),
            None => Ok(module),
        }
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl RenderBackend for WgpuBackend {
    type Program = WgpuProgram;
    type Buffers = WgpuBuffers;

    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<WgpuProgram, RenderError> {
        let vertex = self.compile(ShaderStage::Vertex, vertex_source)?;
        let fragment = self.compile(ShaderStage::Fragment, fragment_source)?;

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("cube_pipeline_layout"),
                bind_group_layouts: &[&self.bind_group_layout],
                push_constant_ranges: &[],
            });

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("cube_pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![1 => Float32x3],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 4]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![2 => Float32x4],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });
        if let Some(e) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::ProgramLink(e.to_string()));
        }

        tracing::info!("cube program linked");
        Ok(WgpuProgram { pipeline })
    }

    fn upload_static_buffers(&mut self, mesh: &CubeMesh) -> Result<WgpuBuffers, RenderError> {
        let init = |label: &str, contents: &[u8], usage: wgpu::BufferUsages| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                })
        };
        let positions = init(
            "cube_positions",
            bytemuck::cast_slice(&mesh.positions),
            wgpu::BufferUsages::VERTEX,
        );
        let normals = init(
            "cube_normals",
            bytemuck::cast_slice(&mesh.normals),
            wgpu::BufferUsages::VERTEX,
        );
        let colors = init(
            "cube_colors",
            bytemuck::cast_slice(&mesh.vertex_colors()),
            wgpu::BufferUsages::VERTEX,
        );
        let indices = init(
            "cube_indices",
            bytemuck::cast_slice(&mesh.indices),
            wgpu::BufferUsages::INDEX,
        );

        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_uniforms_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(WgpuBuffers {
            positions,
            normals,
            colors,
            indices,
            index_count: mesh.index_count(),
            uniform_buffer,
            bind_group,
        })
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        // an overlay that never presented must not hold the swapchain image
        self.present();

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::ContextUnavailable(format!("surface: {e}")));
            }
            Err(e) => return Err(RenderError::ContextUnavailable(format!("surface: {e}"))),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        let pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            })
            .forget_lifetime();

        self.frame = Some(Frame {
            surface_texture,
            view,
            encoder,
            pass: Some(pass),
        });
        Ok(())
    }

    fn draw_object(
        &mut self,
        program: &WgpuProgram,
        buffers: &WgpuBuffers,
        uniforms: &DrawUniforms,
    ) -> Result<(), RenderError> {
        let Some(pass) = self.frame.as_mut().and_then(|f| f.pass.as_mut()) else {
            return Err(RenderError::ContextUnavailable("draw outside a frame".into()));
        };

        self.queue.write_buffer(
            &buffers.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::from(uniforms)),
        );

        pass.set_pipeline(&program.pipeline);
        pass.set_bind_group(0, &buffers.bind_group, &[]);
        pass.set_vertex_buffer(0, buffers.positions.slice(..));
        pass.set_vertex_buffer(1, buffers.normals.slice(..));
        pass.set_vertex_buffer(2, buffers.colors.slice(..));
        pass.set_index_buffer(buffers.indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..buffers.index_count, 0, 0..1);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let Some(mut frame) = self.frame.take() else {
            return Ok(());
        };
        drop(frame.pass.take());
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        self.presentable = Some(Presentable {
            surface_texture: frame.surface_texture,
            view: frame.view,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubespin_render::LightingState;
    use glam::{Mat4, Vec3};

    #[test]
    fn uniform_block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 160);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn uniforms_pack_matrices_column_major() {
        let model_view = Mat4::from_translation(Vec3::new(1.5, 0.0, -6.0));
        let draw = DrawUniforms {
            projection: Mat4::IDENTITY,
            model_view,
            lighting: LightingState::new(true, Vec3::new(2.0, 3.0, 2.0)).uniforms(),
        };
        let packed = Uniforms::from(&draw);
        assert_eq!(packed.model_view[3], [1.5, 0.0, -6.0, 1.0]);
        assert_eq!(packed.light_position, [2.0, 3.0, 2.0, 1.0]);
        assert_eq!(packed.params[0], 1.0);
    }

    #[test]
    fn disabled_lighting_clears_flag() {
        let draw = DrawUniforms {
            projection: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
            lighting: LightingState::new(false, Vec3::ONE).uniforms(),
        };
        assert_eq!(Uniforms::from(&draw).params, [0.0; 4]);
    }
}
