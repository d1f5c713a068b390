//! Scene composition.
//!
//! A scene is a flat list of independently placed meshes, built once at
//! startup from a plain-text [`SceneDescription`]. Each entry names a mesh
//! file and gives a rotation and translation; the composer loads the mesh and
//! sets its model matrix to `[R | t]`.
//!
//! Failures are contained: an unreadable description yields an empty scene,
//! and an entry whose mesh fails to load is skipped without affecting the
//! rest.
//!
//! # Example
//!
//! ```no_run
//! use roam::Scene;
//!
//! let scene = Scene::load("models", "scene_a1.txt");
//! for mesh in scene.meshes() {
//!     println!("{} vertices at {}", mesh.vertex_count(), mesh.model_matrix().w_axis);
//! }
//! ```

mod description;
#[allow(clippy::module_inception)]
mod scene;

pub use description::{SceneDescription, SceneEntry, SceneError};
pub use scene::Scene;
