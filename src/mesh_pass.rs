//! Forward mesh rendering with depth testing.
//!
//! [`MeshPass`] draws every mesh of a scene through the active camera. For
//! each mesh it composes `projection * view * model` on the CPU and hands it
//! to the shader together with the normal matrix and whether the mesh carries
//! vertex colors.
//!
//! # Architecture
//!
//! - **Group 0**: per-instance [`TransformUniforms`], one buffer and bind
//!   group per mesh so all instances can be written before the pass is
//!   encoded
//! - **Vertex buffer 0**: the mesh's [`Vertex3d`] triangle list
//!
//! # Depth Buffer
//!
//! The pass keeps its own `Depth32Float` buffer and recreates it whenever the
//! surface size changes.

use glam::Mat4;

use crate::camera::ViewProjection;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

/// Clear color behind the scene.
pub const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.12,
    a: 1.0,
};

/// Per-instance uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniforms {
    /// `projection * view * model`.
    pub xform: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix, used to orient normals.
    pub normal: [[f32; 4]; 4],
    /// Non-zero if the mesh's vertex colors should be shown.
    pub colored: u32,
    pub _pad: [u32; 3],
}

impl TransformUniforms {
    /// Uniforms for drawing `mesh` with the camera's combined `view_proj`.
    pub fn for_mesh(view_proj: Mat4, mesh: &Mesh) -> Self {
        let model = mesh.model_matrix();
        Self {
            xform: (view_proj * model).to_cols_array_2d(),
            normal: normal_matrix(model).to_cols_array_2d(),
            colored: mesh.is_colored() as u32,
            _pad: [0; 3],
        }
    }
}

/// Inverse-transpose of `model`, so normals stay perpendicular to their
/// surface under non-uniform scale. A singular model falls back to itself.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() <= f32::EPSILON {
        return model;
    }
    model.inverse().transpose()
}

struct InstanceSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Renders scene meshes with depth testing.
///
/// # Pipeline Configuration
///
/// - No face culling (scene files do not guarantee a winding order)
/// - Depth write and Less-than comparison
pub struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    instance_layout: wgpu::BindGroupLayout,
    instances: Vec<InstanceSlot>,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshPass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let instance_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&instance_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            instance_layout,
            instances: Vec::new(),
            depth_view: Self::create_depth_view(gpu),
            depth_size: (gpu.width(), gpu.height()),
        }
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreates the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Grows the per-instance uniform slots to at least `count`.
    fn ensure_instances(&mut self, gpu: &GpuContext, count: usize) {
        while self.instances.len() < count {
            let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Transform Uniforms"),
                size: std::mem::size_of::<TransformUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Transform Bind Group"),
                layout: &self.instance_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.instances.push(InstanceSlot { buffer, bind_group });
        }
    }

    /// Draws `meshes` through `camera` into the next surface frame and
    /// presents it.
    ///
    /// Meshes that have not been uploaded are skipped. Surface errors are
    /// returned so the caller can reconfigure or give up.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        camera: &dyn ViewProjection,
        meshes: &[Mesh],
    ) -> Result<(), wgpu::SurfaceError> {
        self.ensure_depth_size(gpu);
        self.ensure_instances(gpu, meshes.len());

        let view_proj = camera.view_proj();
        for (mesh, slot) in meshes.iter().zip(&self.instances) {
            let uniforms = TransformUniforms::for_mesh(view_proj, mesh);
            gpu.queue
                .write_buffer(&slot.buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mesh Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
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

            render_pass.set_pipeline(&self.pipeline);
            for (mesh, slot) in meshes.iter().zip(&self.instances) {
                if !mesh.is_uploaded() {
                    continue;
                }
                render_pass.set_bind_group(0, &slot.bind_group, &[]);
                mesh.draw(&mut render_pass);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
