use crate::render::{RenderCtx, RenderTarget, ViewportUniform};

use super::mesh::vertex_layouts;
use super::{GpuMesh, GpuTexture, ProgramModules, ShaderKind, ShaderProgram, TextureLayout};

/// One indexed draw: a mesh, optionally textured.
#[derive(Debug, Copy, Clone)]
pub struct MeshDraw<'a> {
    pub mesh: &'a GpuMesh,
    /// `None` samples the built-in white texture, leaving vertex colors as-is.
    pub texture: Option<&'a GpuTexture>,
}

impl<'a> MeshDraw<'a> {
    #[inline]
    pub fn new(mesh: &'a GpuMesh) -> Self {
        Self { mesh, texture: None }
    }

    #[inline]
    pub fn textured(mesh: &'a GpuMesh, texture: &'a GpuTexture) -> Self {
        Self {
            mesh,
            texture: Some(texture),
        }
    }
}

/// Draws [`GpuMesh`]es with the linked mesh program.
///
/// Layouts, the viewport uniform and the fallback texture are created up
/// front; the pipeline is (re)built whenever the surface format changes.
pub struct MeshRenderer {
    modules: ProgramModules,

    viewport_layout: wgpu::BindGroupLayout,
    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,

    texture_layout: TextureLayout,
    white: GpuTexture,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl MeshRenderer {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, program: &ShaderProgram) -> Self {
        let modules = program.create_modules(device);

        let viewport_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism mesh viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(ViewportUniform::SIZE),
                },
                count: None,
            }],
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism mesh viewport ubo"),
            size: ViewportUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism mesh viewport bind group"),
            layout: &viewport_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let texture_layout = TextureLayout::new(device);
        let white = GpuTexture::white(device, queue, &texture_layout);

        log::debug!("mesh renderer ready");

        Self {
            modules,
            viewport_layout,
            viewport_ubo,
            viewport_bind_group,
            texture_layout,
            white,
            pipeline_format: None,
            pipeline: None,
        }
    }

    /// Layout textures must be created with to be drawable here.
    #[inline]
    pub fn texture_layout(&self) -> &TextureLayout {
        &self.texture_layout
    }

    /// Records `draws` in order into `target`, on top of what it already holds.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, draws: &[MeshDraw<'_>]) {
        if draws.is_empty() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.write_viewport_uniform(ctx);

        let Some(pipeline) = self.pipeline.as_ref() else { return };

        let mut rpass = target.begin_pass("prism mesh pass", wgpu::LoadOp::Load);

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.viewport_bind_group, &[]);

        for draw in draws {
            if draw.mesh.index_count() == 0 {
                continue;
            }
            let texture = draw.texture.unwrap_or(&self.white);
            rpass.set_bind_group(1, texture.bind_group(), &[]);
            draw.mesh.bind(&mut rpass);
            rpass.draw_indexed(0..draw.mesh.index_count(), 0, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism mesh pipeline layout"),
            bind_group_layouts: &[&self.viewport_layout, self.texture_layout.raw()],
            immediate_size: 0,
        });

        let buffers = vertex_layouts();
        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prism mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &self.modules.vertex,
                entry_point: Some(ShaderKind::Vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.modules.fragment,
                entry_point: Some(ShaderKind::Fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("mesh pipeline built for {:?}", ctx.surface_format);
        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
    }

    fn write_viewport_uniform(&self, ctx: &RenderCtx<'_>) {
        let u = ctx.viewport_uniform();
        ctx.queue.write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&u));
    }
}
