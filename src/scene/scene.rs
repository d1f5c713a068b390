//! The composed scene: a flat list of placed meshes.

use std::path::Path;

use super::description::SceneDescription;
use crate::gpu::GpuContext;
use crate::mesh::Mesh;

/// A flat, ordered list of mesh instances.
///
/// Order is render order only; meshes are independent of each other.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the description at `models_dir/scene_file` and composes it.
    ///
    /// An unreadable or malformed description is logged and yields an empty
    /// scene.
    pub fn load(models_dir: impl AsRef<Path>, scene_file: impl AsRef<Path>) -> Self {
        let models_dir = models_dir.as_ref();
        let path = models_dir.join(scene_file);
        match SceneDescription::from_file(&path) {
            Ok(description) => Self::compose(&description, models_dir),
            Err(e) => {
                log::error!("failed to read scene {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Loads one mesh per entry and places it with the entry's model matrix.
    ///
    /// An entry whose mesh fails to load is logged and skipped; the others
    /// still load.
    pub fn compose(description: &SceneDescription, models_dir: impl AsRef<Path>) -> Self {
        let models_dir = models_dir.as_ref();
        let mut meshes = Vec::with_capacity(description.len());

        for (index, entry) in description.entries.iter().enumerate() {
            let path = models_dir.join(&entry.mesh);
            match Mesh::load(&path) {
                Ok(mesh) => meshes.push(mesh.with_model_matrix(entry.model_matrix())),
                Err(e) => log::warn!(
                    "skipping scene object {} ({}): {}",
                    index + 1,
                    path.display(),
                    e
                ),
            }
        }

        log::info!(
            "scene composed: {} of {} objects loaded",
            meshes.len(),
            description.len()
        );
        Self { meshes }
    }

    /// Uploads every mesh to the GPU.
    pub fn upload(&mut self, gpu: &GpuContext, keep_local_geometry: bool) {
        for mesh in &mut self.meshes {
            mesh.upload(gpu, keep_local_geometry);
        }
    }

    /// Releases every mesh's geometry and GPU buffer.
    pub fn release(&mut self) {
        for mesh in &mut self.meshes {
            mesh.release();
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Total vertices across all meshes.
    pub fn vertex_count(&self) -> u64 {
        self.meshes.iter().map(|m| m.vertex_count() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{affine, mat3_from_rows};
    use glam::Vec3;
    use std::fs;
    use std::path::PathBuf;

    const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
    const RED_PLY: &str = "\
ply
format ascii 1.0
element vertex 3
element face 1
end_header
0 0 0 0 0 1
1 0 0 0 0 1
0 1 0 0 0 1
3 0 1 2 255 0 0
";

    fn models_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("roam-scene-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tri.obj"), TRIANGLE_OBJ).unwrap();
        fs::write(dir.join("red.ply"), RED_PLY).unwrap();
        dir
    }

    #[test]
    fn two_entries_make_two_placed_meshes() {
        let dir = models_dir("two");
        let text = "\
2
tri.obj  1 0 0  0 1 0  0 0 1   0 0 0
red.ply  0 0 1  0 1 0  -1 0 0  3 -1 2
";
        fs::write(dir.join("scene_a1.txt"), text).unwrap();

        let scene = Scene::load(&dir, "scene_a1.txt");
        assert_eq!(scene.len(), 2);

        let expected = [
            affine(mat3_from_rows([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]), Vec3::ZERO),
            affine(
                mat3_from_rows([0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0]),
                Vec3::new(3.0, -1.0, 2.0),
            ),
        ];
        for (mesh, model) in scene.meshes().iter().zip(expected) {
            assert_eq!(mesh.model_matrix(), model);
        }
        assert!(!scene.meshes()[0].is_colored());
        assert!(scene.meshes()[1].is_colored());
        assert_eq!(scene.vertex_count(), 6);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bad_entry_does_not_stop_later_entries() {
        let dir = models_dir("skip");
        fs::write(dir.join("broken.ply"), "ply\nformat ascii 1.0\nelement vertex 0\nend_header\n").unwrap();
        let text = "\
4
missing.obj 1 0 0 0 1 0 0 0 1 0 0 0
broken.ply  1 0 0 0 1 0 0 0 1 0 0 0
tri.obj     1 0 0 0 1 0 0 0 1 5 0 0
notes.txt   1 0 0 0 1 0 0 0 1 0 0 0
";
        let description = SceneDescription::parse(text).unwrap();
        let scene = Scene::compose(&description, &dir);

        assert_eq!(scene.len(), 1);
        assert_eq!(
            scene.meshes()[0].model_matrix().transform_point3(Vec3::ZERO),
            Vec3::new(5.0, 0.0, 0.0)
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_description_gives_an_empty_scene() {
        let dir = models_dir("missing");
        let scene = Scene::load(&dir, "nope.txt");
        assert!(scene.is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_description_gives_an_empty_scene() {
        let dir = models_dir("malformed");
        fs::write(dir.join("scene.txt"), "lots\ntri.obj").unwrap();
        let scene = Scene::load(&dir, "scene.txt");
        assert!(scene.is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn release_empties_every_mesh() {
        let dir = models_dir("release");
        fs::write(dir.join("s.txt"), "1 tri.obj 1 0 0 0 1 0 0 0 1 0 0 0").unwrap();
        let mut scene = Scene::load(&dir, "s.txt");
        scene.release();
        scene.release();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.vertex_count(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }
}
