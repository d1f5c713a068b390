//! Top-level error type for the viewer binary.

use std::path::PathBuf;

use crate::camera::CameraError;
use crate::config::ConfigError;
use crate::gpu::GpuError;

/// Anything that stops the viewer from starting or keeps it from running.
#[derive(Debug)]
pub enum ViewerError {
    Config(ConfigError),
    Camera(CameraError),
    Gpu(GpuError),
    /// The models directory does not exist or is not a directory.
    MissingModelsDir(PathBuf),
    Io(std::io::Error),
    EventLoop(winit::error::EventLoopError),
    Window(winit::error::OsError),
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::Config(e) => write!(f, "{}", e),
            ViewerError::Camera(e) => write!(f, "Camera setup failed: {}", e),
            ViewerError::Gpu(e) => write!(f, "GPU setup failed: {}", e),
            ViewerError::MissingModelsDir(path) => {
                write!(f, "Models directory not found: {}", path.display())
            }
            ViewerError::Io(e) => write!(f, "IO error: {}", e),
            ViewerError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Config(e) => Some(e),
            ViewerError::Camera(e) => Some(e),
            ViewerError::Gpu(e) => Some(e),
            ViewerError::MissingModelsDir(_) => None,
            ViewerError::Io(e) => Some(e),
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
        }
    }
}

impl From<ConfigError> for ViewerError {
    fn from(e: ConfigError) -> Self {
        ViewerError::Config(e)
    }
}

impl From<CameraError> for ViewerError {
    fn from(e: CameraError) -> Self {
        ViewerError::Camera(e)
    }
}

impl From<GpuError> for ViewerError {
    fn from(e: GpuError) -> Self {
        ViewerError::Gpu(e)
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(e: std::io::Error) -> Self {
        ViewerError::Io(e)
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}
