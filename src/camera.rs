//! The camera capability shared by both navigation modes.
//!
//! Two camera variants exist: [`GroundCamera`] (first-person, eye + look-at
//! target) and [`OverheadCamera`] (orbit, yaw/pitch/radius). Both expose the
//! same [`ViewProjection`] capability, and [`Camera`] wraps them in a tagged
//! variant so that mode-specific controls can be dispatched uniformly: a
//! control that belongs to the other variant is a no-op.
//!
//! [`CameraRig`] owns one camera of each kind plus the active selection. It is
//! what the input layer mutates and what the renderer reads.

use glam::{Mat4, Vec2};

use crate::ground_camera::GroundCamera;
use crate::input::ViewerCommand;
use crate::overhead_camera::OverheadCamera;

/// Matrices a renderer needs from a camera.
pub trait ViewProjection {
    /// World-to-camera transform.
    fn view(&self) -> Mat4;

    /// Camera-to-clip transform.
    fn proj(&self) -> Mat4;

    /// Updates the viewport size the projection aspect is derived from.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Combined `proj * view`.
    fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

/// Perspective projection parameters plus the viewport they apply to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    width: u32,
    height: u32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 45.0,
            near: 0.1,
            far: 100.0,
            width: 1,
            height: 1,
        }
    }
}

impl Projection {
    pub fn new(fov_y: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y,
            near,
            far,
            ..Self::default()
        }
    }

    /// Sets the viewport size. Both dimensions are clamped to at least 1.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Right-handed perspective matrix with a 0..1 depth range.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect(), self.near, self.far)
    }
}

/// Errors raised when constructing a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraError {
    /// The eye coincides with the look-at point, or the up vector is zero,
    /// so no camera basis can be built.
    DegenerateBasis,
}

impl std::fmt::Display for CameraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraError::DegenerateBasis => {
                write!(f, "degenerate camera basis: eye equals center or up is zero")
            }
        }
    }
}

impl std::error::Error for CameraError {}

/// Which of the two cameras is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// First-person navigation.
    Ground,
    /// Orbit inspection.
    Overhead,
}

impl CameraKind {
    /// The other kind.
    pub fn toggled(self) -> Self {
        match self {
            CameraKind::Ground => CameraKind::Overhead,
            CameraKind::Overhead => CameraKind::Ground,
        }
    }

    fn index(self) -> usize {
        match self {
            CameraKind::Ground => 0,
            CameraKind::Overhead => 1,
        }
    }
}

/// A camera of either kind.
///
/// Ground controls (turn/move) do nothing on an overhead camera, and orbit
/// controls (drag-rotate/zoom) do nothing on a ground camera.
#[derive(Clone, Debug)]
pub enum Camera {
    Ground(GroundCamera),
    Overhead(OverheadCamera),
}

impl Camera {
    pub fn kind(&self) -> CameraKind {
        match self {
            Camera::Ground(_) => CameraKind::Ground,
            Camera::Overhead(_) => CameraKind::Overhead,
        }
    }

    pub fn as_ground(&self) -> Option<&GroundCamera> {
        match self {
            Camera::Ground(camera) => Some(camera),
            Camera::Overhead(_) => None,
        }
    }

    pub fn as_overhead(&self) -> Option<&OverheadCamera> {
        match self {
            Camera::Overhead(camera) => Some(camera),
            Camera::Ground(_) => None,
        }
    }

    pub fn turn_left(&mut self) {
        if let Camera::Ground(camera) = self {
            camera.turn_left();
        }
    }

    pub fn turn_right(&mut self) {
        if let Camera::Ground(camera) = self {
            camera.turn_right();
        }
    }

    pub fn move_forward(&mut self) {
        if let Camera::Ground(camera) = self {
            camera.move_forward();
        }
    }

    pub fn move_backward(&mut self) {
        if let Camera::Ground(camera) = self {
            camera.move_backward();
        }
    }

    pub fn move_up(&mut self) {
        if let Camera::Ground(camera) = self {
            camera.move_up();
        }
    }

    pub fn move_down(&mut self) {
        if let Camera::Ground(camera) = self {
            camera.move_down();
        }
    }

    pub fn begin_rotate(&mut self, mouse: Vec2) {
        if let Camera::Overhead(camera) = self {
            camera.begin_rotate(mouse);
        }
    }

    pub fn end_rotate(&mut self) {
        if let Camera::Overhead(camera) = self {
            camera.end_rotate();
        }
    }

    /// Returns true if the orbit angles changed.
    pub fn update_rotate(&mut self, mouse: Vec2) -> bool {
        match self {
            Camera::Overhead(camera) => camera.update_rotate(mouse),
            Camera::Ground(_) => false,
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.as_overhead().is_some_and(OverheadCamera::is_rotating)
    }

    pub fn zoom(&mut self, offset: f32) {
        if let Camera::Overhead(camera) = self {
            camera.zoom(offset);
        }
    }
}

impl ViewProjection for Camera {
    fn view(&self) -> Mat4 {
        match self {
            Camera::Ground(camera) => camera.view(),
            Camera::Overhead(camera) => camera.view(),
        }
    }

    fn proj(&self) -> Mat4 {
        match self {
            Camera::Ground(camera) => camera.proj(),
            Camera::Overhead(camera) => camera.proj(),
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        match self {
            Camera::Ground(camera) => camera.set_viewport(width, height),
            Camera::Overhead(camera) => camera.set_viewport(width, height),
        }
    }
}

/// One ground and one overhead camera, plus which of them is active.
#[derive(Clone, Debug)]
pub struct CameraRig {
    cameras: [Camera; 2],
    active: CameraKind,
}

impl CameraRig {
    /// Creates the rig with the ground camera active.
    pub fn new(ground: GroundCamera, overhead: OverheadCamera) -> Self {
        Self {
            cameras: [Camera::Ground(ground), Camera::Overhead(overhead)],
            active: CameraKind::Ground,
        }
    }

    pub fn active_kind(&self) -> CameraKind {
        self.active
    }

    pub fn active(&self) -> &Camera {
        &self.cameras[self.active.index()]
    }

    pub fn active_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active.index()]
    }

    pub fn camera(&self, kind: CameraKind) -> &Camera {
        &self.cameras[kind.index()]
    }

    /// Makes the other camera active and returns its kind.
    ///
    /// Any drag in progress on the camera being left is ended.
    pub fn switch(&mut self) -> CameraKind {
        self.active_mut().end_rotate();
        self.active = self.active.toggled();
        log::info!("switched to the {:?} camera", self.active);
        self.active
    }

    /// Resizes the viewport of both cameras.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        log::debug!("viewport resized to {width}x{height}");
        for camera in &mut self.cameras {
            camera.set_viewport(width, height);
        }
    }

    /// Applies a keyboard command to the active camera.
    pub fn apply(&mut self, command: ViewerCommand) {
        let camera = self.active_mut();
        match command {
            ViewerCommand::TurnLeft => camera.turn_left(),
            ViewerCommand::TurnRight => camera.turn_right(),
            ViewerCommand::MoveForward => camera.move_forward(),
            ViewerCommand::MoveBackward => camera.move_backward(),
            ViewerCommand::MoveUp => camera.move_up(),
            ViewerCommand::MoveDown => camera.move_down(),
            ViewerCommand::SwitchCamera => {
                self.switch();
            }
        }
    }
}
