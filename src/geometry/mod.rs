//! Geometry loading for the two supported mesh formats.
//!
//! Both formats are flattened into the same triangle list of [`Vertex3d`]s:
//! every three consecutive vertices form one triangle, and no index buffer is
//! kept after parsing.
//!
//! # Supported Formats
//!
//! | Format | Extensions | Notes |
//! |--------|------------|-------|
//! | Wavefront OBJ | `.obj` | Polygons are fan-triangulated; flat normals are synthesized when missing |
//! | PLY (ASCII) | `.ply` | Triangles only; per-face RGB color and per-vertex normals |
//!
//! # Example
//!
//! ```no_run
//! use roam::geometry;
//!
//! let geometry = geometry::load_file("models/bunny.obj")?;
//! println!("{} triangles, center {}", geometry.triangle_count(), geometry.bounds.center());
//! # Ok::<(), roam::GeometryError>(())
//! ```

mod obj;
mod ply;

pub use obj::parse_obj;
pub use ply::parse_ply;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::mesh::Vertex3d;

/// File extensions the loader understands, lowercase.
pub const MESH_EXTENSIONS: [&str; 2] = ["obj", "ply"];

/// Errors that can occur when loading geometry.
#[derive(Debug)]
pub enum GeometryError {
    /// File could not be read.
    Io(std::io::Error),
    /// File format could not be determined from extension.
    UnknownFormat(String),
    /// The geometry data was invalid or corrupt.
    ParseError(String),
    /// A PLY face declared a vertex count other than 3.
    NonTriangularFace {
        /// 1-based line number in the file.
        line: usize,
        /// The declared vertex count.
        vertices: usize,
    },
    /// The file held no positions or no faces.
    NoGeometry,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Io(e) => write!(f, "IO error: {}", e),
            GeometryError::UnknownFormat(ext) => {
                write!(f, "Unknown geometry format: '{}'", ext)
            }
            GeometryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            GeometryError::NonTriangularFace { line, vertices } => write!(
                f,
                "Line {}: face has {} vertices, only triangle meshes are supported",
                line, vertices
            ),
            GeometryError::NoGeometry => write!(f, "Invalid file or no geometry"),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeometryError {
    fn from(e: std::io::Error) -> Self {
        GeometryError::Io(e)
    }
}

/// An axis-aligned bounding box.
///
/// [`Aabb::EMPTY`] has `min = +∞` and `max = -∞`, so including any point
/// yields a box around exactly that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// The empty-box sentinel.
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Grows the box to contain `point`.
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// True until a point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Returns the center point of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the size of the box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Parsed geometry before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    /// Flat triangle list; the length is always a multiple of 3.
    pub vertices: Vec<Vertex3d>,
    /// Bounds over every position record read from the file.
    pub bounds: Aabb,
    /// Whether the vertices carry per-face colors.
    pub colored: bool,
}

impl RawGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

enum Format {
    Obj,
    Ply,
}

/// Loads geometry from a file, detecting the format from its extension.
pub fn load_file(path: impl AsRef<Path>) -> Result<RawGeometry, GeometryError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let format = match ext.as_str() {
        "obj" => Format::Obj,
        "ply" => Format::Ply,
        _ => return Err(GeometryError::UnknownFormat(ext)),
    };

    let reader = BufReader::new(File::open(path)?);
    let geometry = match format {
        Format::Obj => parse_obj(reader)?,
        Format::Ply => parse_ply(reader)?,
    };
    log::debug!(
        "loaded {}: {} vertices, bounds {} .. {}",
        path.display(),
        geometry.vertex_count(),
        geometry.bounds.min,
        geometry.bounds.max
    );
    Ok(geometry)
}

/// True if `path` has one of the [`MESH_EXTENSIONS`] (case-insensitive).
pub fn is_mesh_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MESH_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

/// Lists the mesh files directly inside `dir`, sorted by path.
pub fn find_mesh_files(dir: impl AsRef<Path>) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_mesh_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Triangles of a convex polygon with `corners` vertices, as a fan around
/// corner 0: `(0,1,2), (0,2,3), …`. Empty for fewer than 3 corners.
pub fn fan_triangles(corners: usize) -> impl Iterator<Item = [usize; 3]> {
    (1..corners.saturating_sub(1)).map(|i| [0, i, i + 1])
}

/// `normalize(cross(p1 - p0, p2 - p0))`; zero for a degenerate triangle.
pub fn flat_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0).normalize_or_zero()
}

/// Parses `N` whitespace-separated floats from `line`, after skipping the
/// first `skip` tokens.
pub(crate) fn parse_floats<const N: usize>(
    line: &str,
    skip: usize,
    line_no: usize,
) -> Result<[f32; N], GeometryError> {
    let mut values = [0.0; N];
    let mut tokens = line.split_whitespace().skip(skip);
    for value in &mut values {
        let token = tokens.next().ok_or_else(|| {
            GeometryError::ParseError(format!("line {}: expected {} numbers", line_no, N))
        })?;
        *value = token.parse().map_err(|_| {
            GeometryError::ParseError(format!("line {}: invalid number '{}'", line_no, token))
        })?;
    }
    Ok(values)
}
