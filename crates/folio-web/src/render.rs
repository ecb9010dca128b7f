mod helpers;
mod targets;

use folio_core::{
    rgb_from_hex, ObjectId, Scene, ViewerSession, PARTICLES_WGSL, PARTICLE_COLOR, PARTICLE_SIZE,
    SCENE_WGSL,
};
use targets::FrameTargets;
use web_sys as web;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ObjectUniforms {
    base_color: [f32; 4],
    emissive: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ParticleUniforms {
    view_proj: [[f32; 4]; 4],
    right: [f32; 4],
    up: [f32; 4],
    color: [f32; 4],
}

/// Per-particle instance: xyz position, w opacity.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ParticleInstance {
    pos_opacity: [f32; 4],
}

struct GpuMesh {
    object: ObjectId,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    double_sided: bool,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    targets: FrameTargets,

    // Meshes
    mesh_pipeline: wgpu::RenderPipeline,
    mesh_pipeline_double_sided: wgpu::RenderPipeline,
    scene_uniform_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    object_bgl: wgpu::BindGroupLayout,
    meshes: Vec<GpuMesh>,

    // Particles
    particle_pipeline: wgpu::RenderPipeline,
    particle_uniform_buffer: wgpu::Buffer,
    particle_bind_group: wgpu::BindGroup,
    particle_instances: wgpu::Buffer,
    particle_capacity: usize,
    particle_scratch: Vec<ParticleInstance>,

    width: u32,
    height: u32,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
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
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let first_format = caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .unwrap_or(first_format);
        // Transparent canvas: the page background shows through cleared pixels.
        let alpha_mode = if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::PreMultiplied) {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        // Canvases are usually plain Unorm; shade through an sRGB view of it.
        let view_format = format.add_srgb_suffix();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: if view_format != format { vec![view_format] } else { vec![] },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "[gpu] surface {:?} (view {:?}) {}x{} alpha={:?}",
            format,
            view_format,
            width,
            height,
            alpha_mode
        );

        let sample_count = if adapter
            .get_texture_format_features(view_format)
            .flags
            .sample_count_supported(helpers::MSAA_SAMPLES)
        {
            helpers::MSAA_SAMPLES
        } else {
            log::warn!("[gpu] {:?} cannot be multisampled, rendering without MSAA", view_format);
            1
        };
        let targets = FrameTargets::new(&device, view_format, width, height, sample_count);

        // Mesh pass
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let scene_bgl = helpers::uniform_layout(
            &device,
            "scene_bgl",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );
        let object_bgl = helpers::uniform_layout(&device, "object_bgl", wgpu::ShaderStages::FRAGMENT);
        let mesh_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pl"),
            bind_group_layouts: &[&scene_bgl, &object_bgl],
            push_constant_ranges: &[],
        });
        let mesh_pipeline = helpers::make_mesh_pipeline(
            &device,
            "mesh_pipeline",
            &mesh_pl,
            &scene_shader,
            view_format,
            Some(wgpu::Face::Back),
            sample_count,
        );
        let mesh_pipeline_double_sided = helpers::make_mesh_pipeline(
            &device,
            "mesh_pipeline_double_sided",
            &mesh_pl,
            &scene_shader,
            view_format,
            None,
            sample_count,
        );
        let scene_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group =
            helpers::uniform_bind_group(&device, "scene_bg", &scene_bgl, &scene_uniform_buffer);

        // Particle pass
        let particle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particle_shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLES_WGSL.into()),
        });
        let particle_bgl = helpers::uniform_layout(
            &device,
            "particle_bgl",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );
        let particle_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particle_pl"),
            bind_group_layouts: &[&particle_bgl],
            push_constant_ranges: &[],
        });
        const PARTICLE_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];
        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle_pipeline"),
            layout: Some(&particle_pl),
            vertex: wgpu::VertexState {
                module: &particle_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &PARTICLE_ATTRS,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: helpers::DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: helpers::multisample(sample_count),
            fragment: Some(wgpu::FragmentState {
                module: &particle_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: view_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });
        let particle_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_uniforms"),
            size: std::mem::size_of::<ParticleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let particle_bind_group = helpers::uniform_bind_group(
            &device,
            "particle_bg",
            &particle_bgl,
            &particle_uniform_buffer,
        );
        let particle_capacity = folio_core::PARTICLE_COUNT * 4;
        let particle_instances = create_instance_buffer(&device, particle_capacity);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_format,
            targets,
            mesh_pipeline,
            mesh_pipeline_double_sided,
            scene_uniform_buffer,
            scene_bind_group,
            object_bgl,
            meshes: Vec::new(),
            particle_pipeline,
            particle_uniform_buffer,
            particle_bind_group,
            particle_instances,
            particle_capacity,
            particle_scratch: Vec::with_capacity(particle_capacity),
            width,
            height,
        })
    }

    /// Replace GPU meshes with the given scene (or drop them all).
    pub fn upload_scene(&mut self, scene: Option<&Scene>) {
        self.meshes.clear();
        let Some(scene) = scene else {
            return;
        };
        for obj in scene.objects() {
            if obj.indices.is_empty() {
                continue;
            }
            let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(&obj.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(&obj.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("object_uniforms"),
                size: std::mem::size_of::<ObjectUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group =
                helpers::uniform_bind_group(&self.device, "object_bg", &self.object_bgl, &uniform_buffer);
            self.meshes.push(GpuMesh {
                object: obj.id,
                vertex_buffer,
                index_buffer,
                index_count: obj.indices.len() as u32,
                uniform_buffer,
                bind_group,
                double_sided: obj.material.double_sided,
            });
        }
        log::info!("[gpu] uploaded {} meshes", self.meshes.len());
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.reconfigure();
        }
    }

    /// Reconfigure the surface at the current size (also used after a lost surface).
    pub fn reconfigure(&mut self) {
        self.config.width = self.width;
        self.config.height = self.height;
        self.surface.configure(&self.device, &self.config);
        self.targets.recreate(&self.device, self.width, self.height);
    }

    pub fn render(&mut self, session: &ViewerSession) -> Result<(), wgpu::SurfaceError> {
        let camera = session.camera();
        let view_proj = camera.view_projection().to_cols_array_2d();
        let lighting = session.lighting();
        let light_color = lighting.directional_color * lighting.directional_intensity;
        let ambient = lighting.ambient_color * lighting.ambient_intensity;
        let scene_u = SceneUniforms {
            view_proj,
            light_dir: lighting.light_direction().extend(0.0).to_array(),
            light_color: light_color.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
        };
        self.queue
            .write_buffer(&self.scene_uniform_buffer, 0, bytemuck::bytes_of(&scene_u));

        if let Some(scene) = session.scene() {
            for mesh in &self.meshes {
                if let Some(obj) = scene.object(mesh.object) {
                    let u = ObjectUniforms {
                        base_color: obj.material.base_color.to_array(),
                        emissive: obj.emissive.radiance().extend(1.0).to_array(),
                    };
                    self.queue
                        .write_buffer(&mesh.uniform_buffer, 0, bytemuck::bytes_of(&u));
                }
            }
        }

        let particle_count = self.upload_particles(session);
        if particle_count > 0 {
            let (right, up) = camera.billboard_axes();
            let pu = ParticleUniforms {
                view_proj,
                right: right.extend(0.0).to_array(),
                up: up.extend(0.0).to_array(),
                color: rgb_from_hex(PARTICLE_COLOR).extend(PARTICLE_SIZE).to_array(),
            };
            self.queue
                .write_buffer(&self.particle_uniform_buffer, 0, bytemuck::bytes_of(&pu));
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.view_format),
            ..Default::default()
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        let (color_view, resolve_target) = self.targets.color_attachment(&view);
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_bind_group(0, &self.scene_bind_group, &[]);
            for mesh in &self.meshes {
                let pipeline = if mesh.double_sided {
                    &self.mesh_pipeline_double_sided
                } else {
                    &self.mesh_pipeline
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(1, &mesh.bind_group, &[]);
                rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if particle_count > 0 {
                rpass.set_pipeline(&self.particle_pipeline);
                rpass.set_bind_group(0, &self.particle_bind_group, &[]);
                rpass.set_vertex_buffer(0, self.particle_instances.slice(..));
                rpass.draw(0..6, 0..particle_count);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Pack live particle instances, growing the buffer when needed.
    fn upload_particles(&mut self, session: &ViewerSession) -> u32 {
        self.particle_scratch.clear();
        self.particle_scratch.extend(
            session
                .particles()
                .instances()
                .map(|(p, opacity)| ParticleInstance { pos_opacity: p.extend(opacity).to_array() }),
        );
        let n = self.particle_scratch.len();
        if n == 0 {
            return 0;
        }
        if n > self.particle_capacity {
            self.particle_capacity = n.next_power_of_two();
            self.particle_instances.destroy();
            self.particle_instances = create_instance_buffer(&self.device, self.particle_capacity);
            log::debug!("[gpu] particle buffer grown to {}", self.particle_capacity);
        }
        self.queue.write_buffer(
            &self.particle_instances,
            0,
            bytemuck::cast_slice(&self.particle_scratch),
        );
        n as u32
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("particle_instances"),
        size: (capacity * std::mem::size_of::<ParticleInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
