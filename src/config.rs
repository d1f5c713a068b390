//! Viewer configuration with TOML file support.
//!
//! Every section uses `#[serde(default)]`, so a file only needs the values it
//! overrides:
//!
//! ```toml
//! [scene]
//! models_dir = "assets/models"
//!
//! [overhead]
//! max_radius = 80.0
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraError, CameraRig, Projection};
use crate::ground_camera::GroundCamera;
use crate::overhead_camera::OverheadCamera;

/// Config file looked for in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "roam.toml";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// The config file is not valid TOML for [`ViewerConfig`].
    Parse(String),
    /// A value is out of its allowed range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub projection: ProjectionConfig,
    pub ground: GroundConfig,
    pub overhead: OverheadConfig,
    pub keys: KeyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Roam".to_string(),
            width: 800,
            height: 800,
        }
    }
}

/// Where the scene comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory holding the mesh files and the scene description.
    pub models_dir: PathBuf,
    /// Scene description file, relative to `models_dir`.
    pub scene_file: PathBuf,
    /// Keep CPU-side vertices after upload.
    pub keep_local_geometry: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            scene_file: PathBuf::from("scene_a1.txt"),
            keep_local_geometry: false,
        }
    }
}

impl SceneConfig {
    pub fn scene_path(&self) -> PathBuf {
        self.models_dir.join(&self.scene_file)
    }
}

/// Perspective parameters shared by both cameras.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroundConfig {
    pub eye: [f32; 3],
    pub center: [f32; 3],
    pub up: [f32; 3],
    /// Degrees per turn command.
    pub turn_step: f32,
    /// World units per move command.
    pub move_step: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 1.5, 20.0],
            center: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            turn_step: GroundCamera::DEFAULT_TURN_STEP,
            move_step: GroundCamera::DEFAULT_MOVE_STEP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverheadConfig {
    /// Initial yaw in degrees.
    pub yaw: f32,
    /// Initial pitch in degrees.
    pub pitch: f32,
    pub radius: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Radius change per scroll line.
    pub zoom_step: f32,
    pub drag_sensitivity: f32,
}

impl Default for OverheadConfig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 20.0,
            radius: 25.0,
            min_radius: OverheadCamera::DEFAULT_MIN_RADIUS,
            max_radius: OverheadCamera::DEFAULT_MAX_RADIUS,
            zoom_step: 0.1,
            drag_sensitivity: 1.0,
        }
    }
}

/// Single-character key bindings. Escape always exits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyConfig {
    pub turn_left: char,
    pub turn_right: char,
    pub move_forward: char,
    pub move_backward: char,
    pub move_up: char,
    pub move_down: char,
    pub switch_camera: char,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            turn_left: 'a',
            turn_right: 'd',
            move_forward: 'w',
            move_backward: 'x',
            move_up: 'c',
            move_down: 'z',
            switch_camera: 's',
        }
    }
}

impl KeyConfig {
    fn keys(&self) -> [char; 7] {
        [
            self.turn_left,
            self.turn_right,
            self.move_forward,
            self.move_backward,
            self.move_up,
            self.move_down,
            self.switch_camera,
        ]
    }
}

impl ViewerConfig {
    /// Load a config file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `explicit` if given, else [`DEFAULT_CONFIG_FILE`] if it exists
    /// in the working directory, else the defaults. Returns the file used.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok((Self::default(), None));
                }
                default
            }
        };
        let config = Self::load(&path)?;
        Ok((config, Some(path)))
    }

    /// Checks the value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.window.width == 0 || self.window.height == 0 {
            return invalid("window size must be non-zero".to_string());
        }

        let p = &self.projection;
        if !(p.fov_y > 0.0 && p.fov_y < 180.0) {
            return invalid(format!("projection.fov_y must be in (0, 180), got {}", p.fov_y));
        }
        if !(p.near > 0.0 && p.far > p.near) {
            return invalid(format!(
                "projection needs 0 < near < far, got near {} far {}",
                p.near, p.far
            ));
        }

        let o = &self.overhead;
        if !(o.min_radius > 0.0 && o.max_radius >= o.min_radius && o.max_radius.is_finite()) {
            return invalid(format!(
                "overhead radius limits need 0 < min <= max, got {} and {}",
                o.min_radius, o.max_radius
            ));
        }
        if !(o.zoom_step.is_finite() && o.drag_sensitivity.is_finite()) {
            return invalid("overhead zoom_step and drag_sensitivity must be finite".to_string());
        }

        let g = &self.ground;
        if !(g.turn_step.is_finite() && g.move_step.is_finite()) {
            return invalid("ground turn_step and move_step must be finite".to_string());
        }

        let keys = self.keys.keys();
        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].iter().any(|other| other.eq_ignore_ascii_case(key)) {
                return invalid(format!("key '{}' is bound to more than one command", key));
            }
        }
        Ok(())
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self.projection.fov_y, self.projection.near, self.projection.far)
    }

    /// Builds both cameras, sized to the configured window.
    pub fn camera_rig(&self) -> Result<CameraRig, CameraError> {
        let projection = self.projection();

        let ground = GroundCamera::new(
            Vec3::from(self.ground.eye),
            Vec3::from(self.ground.center),
            Vec3::from(self.ground.up),
        )?
        .projection_params(projection)
        .turn_step(self.ground.turn_step)
        .move_step(self.ground.move_step);

        let overhead = OverheadCamera::new(self.overhead.yaw, self.overhead.pitch, self.overhead.radius)
            .radius_limits(self.overhead.min_radius, self.overhead.max_radius)
            .drag_sensitivity(self.overhead.drag_sensitivity)
            .projection_params(projection);

        let mut rig = CameraRig::new(ground, overhead);
        rig.set_viewport(self.window.width, self.window.height);
        Ok(rig)
    }
}
