//! The plain-text scene description format.
//!
//! A description is a stream of whitespace-separated tokens: an object count,
//! then for each object a mesh file name (relative to the models directory),
//! nine rotation scalars given row by row, and a three-component translation.
//!
//! ```text
//! 2
//! bunny.ply   1 0 0  0 1 0  0 0 1   0 0 0
//! teapot.obj  0 0 1  0 1 0 -1 0 0   4 0 -2
//! ```

use std::path::{Path, PathBuf};

use glam::{Mat3, Mat4, Vec3};

use crate::transform::{affine, mat3_from_rows};

/// Errors that can occur when reading a scene description.
#[derive(Debug)]
pub enum SceneError {
    /// The description file could not be read.
    Io(std::io::Error),
    /// The description is malformed.
    Parse(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(msg) => write!(f, "Scene parse error: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io(e) => Some(e),
            SceneError::Parse(_) => None,
        }
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

/// One object of a scene: which mesh, and where it goes.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEntry {
    /// Mesh file, relative to the models directory.
    pub mesh: PathBuf,
    pub rotation: Mat3,
    pub translation: Vec3,
}

impl SceneEntry {
    /// The affine model matrix `[R | t; 0 0 0 1]`.
    pub fn model_matrix(&self) -> Mat4 {
        affine(self.rotation, self.translation)
    }
}

/// A parsed scene description.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneDescription {
    pub entries: Vec<SceneEntry>,
}

impl SceneDescription {
    /// Reads and parses a description file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses description text. Any missing or malformed token fails the
    /// whole description; tokens after the last declared entry are ignored.
    pub fn parse(text: &str) -> Result<Self, SceneError> {
        let mut tokens = Tokens {
            inner: text.split_whitespace(),
        };

        let count: usize = tokens.parse("object count")?;
        let mut entries = Vec::with_capacity(count.min(1024));
        for index in 0..count {
            let what = |field: &str| format!("{} of object {}", field, index + 1);

            let mesh = PathBuf::from(tokens.next(&what("mesh file name"))?);
            let mut rotation = [0.0f32; 9];
            for value in &mut rotation {
                *value = tokens.parse(&what("rotation"))?;
            }
            let mut translation = [0.0f32; 3];
            for value in &mut translation {
                *value = tokens.parse(&what("translation"))?;
            }

            entries.push(SceneEntry {
                mesh,
                rotation: mat3_from_rows(rotation),
                translation: Vec3::from_array(translation),
            });
        }

        if tokens.inner.next().is_some() {
            log::debug!("ignoring trailing tokens after {} scene objects", count);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &str) -> Result<&'a str, SceneError> {
        self.inner
            .next()
            .ok_or_else(|| SceneError::Parse(format!("missing {}", what)))
    }

    fn parse<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, SceneError> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| SceneError::Parse(format!("invalid {}: '{}'", what, token)))
    }
}
