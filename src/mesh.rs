//! Mesh instances: loaded geometry plus a model transform.
//!
//! - [`Vertex3d`] is the vertex format shared by both mesh formats
//! - [`Mesh`] owns one loaded geometry, its GPU vertex buffer and the model
//!   matrix that places it in the world
//!
//! # Vertex Layout
//!
//! The [`Vertex3d`] struct uses the following GPU layout (36 bytes per vertex):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | color     | Float32x3 | 24     | 2               |
//!
//! This layout is exposed via [`Vertex3d::LAYOUT`] for pipeline creation.
//!
//! # Lifecycle
//!
//! ```no_run
//! use roam::{Mat4, Mesh};
//!
//! let mut mesh = Mesh::load("models/bunny.ply")?.with_model_matrix(Mat4::IDENTITY);
//! println!("{} vertices", mesh.vertex_count());
//!
//! // Later: swap the geometry, keeping the placement. The new vertices
//! // must be uploaded again before they are drawn.
//! mesh.reload("models/bunny_hi.ply")?;
//! assert!(!mesh.is_uploaded());
//! mesh.release();
//! # Ok::<(), roam::GeometryError>(())
//! ```

use std::path::Path;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::geometry::{self, Aabb, GeometryError, RawGeometry};
use crate::gpu::GpuContext;

/// A vertex with position, normal and color.
///
/// Uncolored geometry carries [`Vertex3d::WHITE`]; the renderer decides per
/// mesh whether the color is shown.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// The 3D position of this vertex in model space.
    pub position: [f32; 3],
    /// The surface normal (unit length, or zero for a degenerate triangle).
    pub normal: [f32; 3],
    /// RGB color in [0, 1].
    pub color: [f32; 3],
}

impl Vertex3d {
    pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

/// One loaded geometry placed in the world.
///
/// The vertex list is a flat triangle list. After [`upload`](Self::upload) the
/// GPU buffer is the source of truth for drawing; the CPU copy is kept only
/// when asked to. The buffer is released exactly once, by
/// [`release`](Self::release), [`reload`](Self::reload) or drop.
#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<Vertex3d>,
    bounds: Aabb,
    colored: bool,
    vertex_count: u32,
    vertex_buffer: Option<wgpu::Buffer>,
    model: Mat4,
}

impl Mesh {
    /// Loads a mesh from an `.obj` or `.ply` file. The model matrix starts as
    /// the identity.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        Ok(Self::from_geometry(geometry::load_file(path)?))
    }

    /// Wraps already-parsed geometry.
    pub fn from_geometry(geometry: RawGeometry) -> Self {
        Self {
            vertex_count: geometry.vertices.len() as u32,
            vertices: geometry.vertices,
            bounds: geometry.bounds,
            colored: geometry.colored,
            vertex_buffer: None,
            model: Mat4::IDENTITY,
        }
    }

    /// Sets the model matrix.
    pub fn with_model_matrix(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    /// The CPU-side vertices; empty after an upload that did not keep them.
    pub fn vertices(&self) -> &[Vertex3d] {
        &self.vertices
    }

    /// Number of vertices to draw.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    /// Replaces the geometry with the contents of `path`, keeping the model
    /// matrix. The mesh is released first, so on error it is left empty.
    ///
    /// The new geometry is CPU-side only: [`draw`](Self::draw) does nothing
    /// until [`upload`](Self::upload) is called again.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<(), GeometryError> {
        self.release();
        let geometry = geometry::load_file(path)?;
        self.vertex_count = geometry.vertices.len() as u32;
        self.vertices = geometry.vertices;
        self.bounds = geometry.bounds;
        self.colored = geometry.colored;
        Ok(())
    }

    /// Uploads the vertices into a GPU vertex buffer.
    ///
    /// Unless `keep_local_geometry` is set, the CPU copy is dropped afterwards.
    /// Does nothing if there are no CPU-side vertices.
    pub fn upload(&mut self, gpu: &GpuContext, keep_local_geometry: bool) {
        if self.vertices.is_empty() {
            return;
        }
        if let Some(old) = self.vertex_buffer.take() {
            old.destroy();
        }

        let buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.vertex_buffer = Some(buffer);
        self.vertex_count = self.vertices.len() as u32;

        if !keep_local_geometry {
            self.vertices = Vec::new();
        }
    }

    /// Drops the local geometry and the GPU buffer. Safe to call repeatedly.
    pub fn release(&mut self) {
        self.vertices = Vec::new();
        self.bounds = Aabb::EMPTY;
        if let Some(buffer) = self.vertex_buffer.take() {
            buffer.destroy();
        }
        self.vertex_count = 0;
    }

    /// Records the draw call for this mesh. The caller binds the pipeline and
    /// the per-instance uniforms first. Does nothing before an upload.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if let Some(buffer) = &self.vertex_buffer {
            render_pass.set_vertex_buffer(0, buffer.slice(..));
            render_pass.draw(0..self.vertex_count, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle() -> RawGeometry {
        let mut bounds = Aabb::EMPTY;
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        for p in positions {
            bounds.include(Vec3::from_array(p));
        }
        RawGeometry {
            vertices: positions
                .iter()
                .map(|&p| Vertex3d::new(p, [0.0, 0.0, 1.0], Vertex3d::WHITE))
                .collect(),
            bounds,
            colored: false,
        }
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 36);
        assert_eq!(Vertex3d::LAYOUT.array_stride, 36);
        let offsets: Vec<_> = Vertex3d::LAYOUT.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
    }

    #[test]
    fn new_mesh_has_identity_model_and_local_vertices() {
        let mesh = Mesh::from_geometry(triangle());
        assert_eq!(mesh.model_matrix(), Mat4::IDENTITY);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices().len(), 3);
        assert!(!mesh.is_uploaded());
        assert!(!mesh.is_colored());
        assert_eq!(mesh.bounds().max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn model_matrix_is_set_by_builder() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let mesh = Mesh::from_geometry(triangle()).with_model_matrix(model);
        assert_eq!(mesh.model_matrix(), model);
    }

    #[test]
    fn release_twice_leaves_an_empty_mesh() {
        let mut mesh = Mesh::from_geometry(triangle());
        mesh.release();
        mesh.release();
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.vertices().is_empty());
        assert_eq!(mesh.bounds(), Aabb::EMPTY);
        assert!(mesh.bounds().is_empty());
        assert!(!mesh.is_uploaded());
    }

    #[test]
    fn reload_keeps_the_model_matrix() {
        let dir = std::env::temp_dir().join(format!("roam-mesh-reload-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quad.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();

        let model = Mat4::from_rotation_y(1.0);
        let mut mesh = Mesh::from_geometry(triangle()).with_model_matrix(model);
        mesh.reload(&path).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.vertices().len(), 6);
        assert_eq!(mesh.model_matrix(), model);
        // Drawing needs a fresh upload.
        assert!(!mesh.is_uploaded());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_reload_leaves_the_mesh_released() {
        let mut mesh = Mesh::from_geometry(triangle());
        assert!(mesh.reload("does/not/exist.ply").is_err());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.bounds().is_empty());
    }
}
