//! # Roam
//!
//! **An interactive viewer for scenes of placed triangle meshes.**
//!
//! Meshes are read from OBJ and ASCII PLY files, placed in the world by a
//! plain-text scene description, and drawn through one of two cameras:
//!
//! - a **ground** camera that turns and walks like a first-person viewer
//! - an **overhead** camera that orbits the origin by mouse drag and zooms
//!   with the wheel
//!
//! ## Quick Start
//!
//! ```no_run
//! use roam::ViewerConfig;
//!
//! fn main() -> Result<(), roam::ViewerError> {
//!     let (config, _) = ViewerConfig::discover(None)?;
//!     roam::run(config)
//! }
//! ```
//!
//! The camera, geometry and scene types work without a window, so the
//! transform pipeline can be driven directly:
//!
//! ```
//! use roam::{SceneDescription, ViewProjection, ViewerConfig};
//!
//! let description = SceneDescription::parse("1\ncube.obj\n1 0 0 0 1 0 0 0 1\n0 2 0\n").unwrap();
//! let model = description.entries[0].model_matrix();
//!
//! let cameras = ViewerConfig::default().camera_rig().unwrap();
//! let xform = cameras.active().view_proj() * model;
//! assert!(xform.is_finite());
//! ```

mod app;
mod camera;
mod config;
mod error;
pub mod geometry;
mod gpu;
mod ground_camera;
mod input;
mod mesh;
mod mesh_pass;
mod overhead_camera;
pub mod scene;
pub mod transform;

pub use app::{Response, apply_action, run};
pub use camera::{Camera, CameraError, CameraKind, CameraRig, Projection, ViewProjection};
pub use config::{
    ConfigError, DEFAULT_CONFIG_FILE, GroundConfig, KeyConfig, OverheadConfig, ProjectionConfig,
    SceneConfig, ViewerConfig, WindowConfig,
};
pub use error::ViewerError;
pub use geometry::{Aabb, GeometryError, RawGeometry};
pub use gpu::{GpuContext, GpuError};
pub use ground_camera::GroundCamera;
pub use input::{Input, InputAction, KeyBindings, ViewerCommand};
pub use mesh::{Mesh, Vertex3d};
pub use mesh_pass::{MeshPass, TransformUniforms, normal_matrix};
pub use overhead_camera::{OverheadCamera, rotation_scale, wrap_degrees};
pub use scene::{Scene, SceneDescription, SceneEntry, SceneError};

// Re-export glam types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3};
