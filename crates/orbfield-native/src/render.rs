use glam::Vec3;
use image::RgbaImage;
use orbfield_core::{look_from, FrameCommands, ImageId, FLASH_SCALE, NEON_GREEN, SPECKLE_DIAMETER};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
// World-space stroke width of the orb outline.
const OUTLINE_WIDTH: f32 = 0.5;

const ORB_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    1 => Float32x3,
    2 => Float32,
    3 => Float32x3,
    4 => Float32,
    5 => Float32x3,
];
const SPECKLE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32];
const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    cam_right: [f32; 4],
    cam_up: [f32; 4],
    params: [f32; 4],
    neon: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct OrbInstance {
    center: [f32; 3],
    diameter: f32,
    right: [f32; 3],
    outline: f32,
    up: [f32; 3],
    _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SpeckleInstance {
    center: [f32; 3],
    alpha: f32,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LineVertex {
    pos: [f32; 3],
    alpha: f32,
}

/// Vertex buffer that grows to fit the largest frame seen so far.
struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    label: &'static str,
}

impl DynamicBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: u64) -> Self {
        let capacity = capacity.max(64);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            label,
        }
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            *self = Self::new(device, self.label, needed.next_power_of_two());
        }
        queue.write_buffer(&self.buffer, 0, bytes);
    }
}

pub struct GpuState<'w> {
    pub window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    orb_pipeline: wgpu::RenderPipeline,
    speckle_pipeline: wgpu::RenderPipeline,
    flash_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: Vec<Option<wgpu::BindGroup>>,
    quad_vb: wgpu::Buffer,
    orb_instances: DynamicBuffer,
    speckle_instances: DynamicBuffer,
    line_vertices: DynamicBuffer,
    width: u32,
    height: u32,
}

impl<'w> GpuState<'w> {
    pub async fn new(
        window: &'w winit::window::Window,
        image_count: usize,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        log::info!("[gpu] adapter: {}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        // Colours are authored in display space, so prefer a non-sRGB target.
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, width, height);

        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(orbfield_core::SPRITE_WGSL.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(orbfield_core::LINE_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bg"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("textured_pl"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let plain_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plain_pl"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        // Quad corners for two triangles, centred on the origin
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_layout = wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 2) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        };
        let orb_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OrbInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ORB_ATTRIBUTES,
        };
        let speckle_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpeckleInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &SPECKLE_ATTRIBUTES,
        };
        let line_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &LINE_ATTRIBUTES,
        };

        let pipes = PipelineFactory {
            device: &device,
            format,
        };
        let orb_pipeline = pipes.build(PipelineSpec {
            label: "orb_pipeline",
            layout: &textured_layout,
            shader: &sprite_shader,
            vs: "vs_orb",
            fs: "fs_orb",
            buffers: &[quad_layout.clone(), orb_layout],
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth: true,
        });
        let speckle_pipeline = pipes.build(PipelineSpec {
            label: "speckle_pipeline",
            layout: &plain_layout,
            shader: &sprite_shader,
            vs: "vs_speckle",
            fs: "fs_speckle",
            buffers: &[quad_layout.clone(), speckle_layout],
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth: true,
        });
        let flash_pipeline = pipes.build(PipelineSpec {
            label: "flash_pipeline",
            layout: &textured_layout,
            shader: &sprite_shader,
            vs: "vs_flash",
            fs: "fs_flash",
            buffers: &[quad_layout],
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth: false,
        });
        let line_pipeline = pipes.build(PipelineSpec {
            label: "line_pipeline",
            layout: &plain_layout,
            shader: &line_shader,
            vs: "vs_line",
            fs: "fs_line",
            buffers: &[line_layout],
            topology: wgpu::PrimitiveTopology::LineList,
            depth: true,
        });

        let orb_instances = DynamicBuffer::new(
            &device,
            "orb_instances",
            (std::mem::size_of::<OrbInstance>() * 64) as u64,
        );
        let speckle_instances = DynamicBuffer::new(
            &device,
            "speckle_instances",
            (std::mem::size_of::<SpeckleInstance>() * 1024) as u64,
        );
        let line_vertices = DynamicBuffer::new(
            &device,
            "line_vertices",
            (std::mem::size_of::<LineVertex>() * 256) as u64,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            orb_pipeline,
            speckle_pipeline,
            flash_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            sampler,
            textures: (0..image_count).map(|_| None).collect(),
            quad_vb,
            orb_instances,
            speckle_instances,
            line_vertices,
            width,
            height,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.width, self.height);
    }

    pub fn reconfigure(&mut self) {
        self.resize(self.window.inner_size());
    }

    /// Largest texture side the device accepts.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Upload a decoded image into its slot.
    pub fn upload_image(&mut self, id: ImageId, img: &RgbaImage) -> anyhow::Result<()> {
        let max = self.max_texture_dimension();
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 || width > max || height > max {
            anyhow::bail!("image {} is {}x{}, device limit is {}", id, width, height, max);
        }
        let Some(slot) = self.textures.get_mut(id.0) else {
            anyhow::bail!("no texture slot for image {}", id);
        };
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("sprite_texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            img.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        *slot = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_texture_bg"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
        Ok(())
    }

    fn texture(&self, id: ImageId) -> Option<&wgpu::BindGroup> {
        self.textures.get(id.0).and_then(Option::as_ref)
    }

    fn uniforms(&self, cmds: &FrameCommands) -> Uniforms {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        let camera = look_from(cmds.eye, aspect);
        let forward = (camera.target - camera.eye).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);
        let flash_opacity = cmds.flash.map(|f| f.opacity / 255.0).unwrap_or(0.0);
        Uniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            cam_right: right.extend(0.0).to_array(),
            cam_up: up.extend(0.0).to_array(),
            params: [
                cmds.ambient_light / 255.0,
                flash_opacity,
                FLASH_SCALE,
                SPECKLE_DIAMETER,
            ],
            neon: [
                NEON_GREEN[0] / 255.0,
                NEON_GREEN[1] / 255.0,
                NEON_GREEN[2] / 255.0,
                1.0,
            ],
        }
    }

    pub fn render(&mut self, cmds: &FrameCommands) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = self.uniforms(cmds);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let speckles: Vec<SpeckleInstance> = cmds
            .speckles
            .iter()
            .map(|s| SpeckleInstance {
                center: s.position.to_array(),
                alpha: s.alpha / 255.0,
            })
            .collect();
        self.speckle_instances
            .write(&self.device, &self.queue, bytemuck::cast_slice(&speckles));

        let lines: Vec<LineVertex> = cmds
            .lines
            .iter()
            .flat_map(|l| {
                let alpha = l.alpha / 255.0;
                [
                    LineVertex {
                        pos: l.from.to_array(),
                        alpha,
                    },
                    LineVertex {
                        pos: l.to.to_array(),
                        alpha,
                    },
                ]
            })
            .collect();
        self.line_vertices
            .write(&self.device, &self.queue, bytemuck::cast_slice(&lines));

        // Only orbs with an uploaded texture are drawn.
        let drawn: Vec<(ImageId, OrbInstance)> = cmds
            .orbs
            .iter()
            .filter(|o| self.texture(o.image).is_some())
            .map(|o| {
                let rotation = o.billboard.rotation();
                let outline = (OUTLINE_WIDTH / (o.diameter * 0.5).max(1e-3)).min(1.0);
                (
                    o.image,
                    OrbInstance {
                        center: o.position.to_array(),
                        diameter: o.diameter,
                        right: (rotation * Vec3::X).to_array(),
                        outline,
                        up: (rotation * Vec3::Y).to_array(),
                        _pad: 0.0,
                    },
                )
            })
            .collect();
        let orb_data: Vec<OrbInstance> = drawn.iter().map(|(_, inst)| *inst).collect();
        self.orb_instances
            .write(&self.device, &self.queue, bytemuck::cast_slice(&orb_data));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let [r, g, b] = cmds.background;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64 / 255.0,
                            g: g as f64 / 255.0,
                            b: b as f64 / 255.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.uniform_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));

            if let Some(flash) = cmds.flash {
                if let Some(tex) = self.texture(flash.image) {
                    rpass.set_pipeline(&self.flash_pipeline);
                    rpass.set_bind_group(1, tex, &[]);
                    rpass.draw(0..6, 0..1);
                }
            }

            if !speckles.is_empty() {
                rpass.set_pipeline(&self.speckle_pipeline);
                rpass.set_vertex_buffer(1, self.speckle_instances.buffer.slice(..));
                rpass.draw(0..6, 0..speckles.len() as u32);
            }

            if !lines.is_empty() {
                rpass.set_pipeline(&self.line_pipeline);
                rpass.set_vertex_buffer(0, self.line_vertices.buffer.slice(..));
                rpass.draw(0..lines.len() as u32, 0..1);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            }

            if !drawn.is_empty() {
                rpass.set_pipeline(&self.orb_pipeline);
                rpass.set_vertex_buffer(1, self.orb_instances.buffer.slice(..));
                for (i, (image, _)) in drawn.iter().enumerate() {
                    if let Some(tex) = self.texture(*image) {
                        rpass.set_bind_group(1, tex, &[]);
                        let i = i as u32;
                        rpass.draw(0..6, i..i + 1);
                    }
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

struct PipelineSpec<'a> {
    label: &'static str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    vs: &'static str,
    fs: &'static str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth: bool,
}

struct PipelineFactory<'a> {
    device: &'a wgpu::Device,
    format: wgpu::TextureFormat,
}

impl PipelineFactory<'_> {
    fn build(&self, spec: PipelineSpec<'_>) -> wgpu::RenderPipeline {
        // The pass always carries a depth target; overlays just ignore it.
        let depth_stencil = wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth,
            depth_compare: if spec.depth {
                wgpu::CompareFunction::LessEqual
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(spec.label),
                layout: Some(spec.layout),
                vertex: wgpu::VertexState {
                    module: spec.shader,
                    entry_point: Some(spec.vs),
                    buffers: spec.buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: spec.topology,
                    ..Default::default()
                },
                depth_stencil: Some(depth_stencil),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: spec.shader,
                    entry_point: Some(spec.fs),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                cache: None,
                multiview: None,
            })
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_tex"),
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
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}
