//! A first-person "ground" camera for walking through a scene.
//!
//! The camera is described by an eye position, a look-at point and a world up
//! vector. Controls are discrete steps, one per key press:
//!
//! - **Turn left/right**: rotate the look direction about the up axis,
//!   pivoting on the eye (the eye stays put, the look-at point swings).
//! - **Move forward/backward**: walk along the look direction flattened onto
//!   the ground plane, so looking up or down never changes walking speed.
//! - **Move up/down**: rise or sink along the up axis.
//!
//! # Example
//!
//! ```
//! use roam::{GroundCamera, ViewProjection, Vec3};
//!
//! let mut camera = GroundCamera::new(Vec3::new(0.0, 1.5, 20.0), Vec3::ZERO, Vec3::Y)
//!     .unwrap()
//!     .move_step(0.5);
//! camera.set_viewport(800, 600);
//! camera.move_forward();
//! camera.turn_left();
//! let _view_proj = camera.view_proj();
//! ```

use glam::{Mat4, Vec3};

use crate::camera::{CameraError, Projection, ViewProjection};
use crate::transform::{look_at, rotate, translate};

/// First-person camera with step-wise turn and move controls.
///
/// The view and projection matrices are cached and recomputed after every
/// mutation, so they always reflect the current eye, look-at point, up vector
/// and viewport.
#[derive(Clone, Debug)]
pub struct GroundCamera {
    eye: Vec3,
    center: Vec3,
    up: Vec3,
    projection: Projection,
    /// Turn step in degrees.
    turn_step: f32,
    /// Move step in world units.
    move_step: f32,
    view: Mat4,
    proj: Mat4,
}

impl GroundCamera {
    pub const DEFAULT_TURN_STEP: f32 = 2.0;
    pub const DEFAULT_MOVE_STEP: f32 = 0.2;

    /// Creates a camera at `eye` looking at `center`.
    ///
    /// Fails with [`CameraError::DegenerateBasis`] if `eye == center` or `up`
    /// is the zero vector. The up vector is normalized.
    pub fn new(eye: Vec3, center: Vec3, up: Vec3) -> Result<Self, CameraError> {
        let up = up.try_normalize().ok_or(CameraError::DegenerateBasis)?;
        if (center - eye).length_squared() <= f32::EPSILON {
            return Err(CameraError::DegenerateBasis);
        }

        let mut camera = Self {
            eye,
            center,
            up,
            projection: Projection::default(),
            turn_step: Self::DEFAULT_TURN_STEP,
            move_step: Self::DEFAULT_MOVE_STEP,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        };
        camera.update_view_proj();
        Ok(camera)
    }

    /// Set the projection parameters.
    pub fn projection_params(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self.update_view_proj();
        self
    }

    /// Set the turn step in degrees.
    pub fn turn_step(mut self, degrees: f32) -> Self {
        self.turn_step = degrees;
        self
    }

    /// Set the move step in world units.
    pub fn move_step(mut self, step: f32) -> Self {
        self.move_step = step;
        self
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn turn_left(&mut self) {
        self.turn(self.turn_step);
    }

    pub fn turn_right(&mut self) {
        self.turn(-self.turn_step);
    }

    pub fn move_forward(&mut self) {
        self.shift(self.ground_forward() * self.move_step);
    }

    pub fn move_backward(&mut self) {
        self.shift(-self.ground_forward() * self.move_step);
    }

    pub fn move_up(&mut self) {
        self.shift(self.up * self.move_step);
    }

    pub fn move_down(&mut self) {
        self.shift(-self.up * self.move_step);
    }

    /// Swings the look-at point about the up axis through the eye.
    fn turn(&mut self, degrees: f32) {
        let rotation = rotate(degrees, self.up);
        self.center = self.eye + rotation.transform_vector3(self.center - self.eye);
        self.update_view_proj();
    }

    /// Moves eye and look-at point together.
    fn shift(&mut self, offset: Vec3) {
        let translation = translate(offset);
        self.eye = translation.transform_point3(self.eye);
        self.center = translation.transform_point3(self.center);
        self.update_view_proj();
    }

    /// Look direction with its component along `up` removed, normalized.
    /// Zero when looking straight up or down.
    fn ground_forward(&self) -> Vec3 {
        let forward = self.center - self.eye;
        (forward - self.up * forward.dot(self.up)).normalize_or_zero()
    }

    fn update_view_proj(&mut self) {
        self.view = look_at(self.eye, self.center, self.up);
        self.proj = self.projection.matrix();
    }
}

impl ViewProjection for GroundCamera {
    fn view(&self) -> Mat4 {
        self.view
    }

    fn proj(&self) -> Mat4 {
        self.proj
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.projection.set_viewport(width, height);
        self.update_view_proj();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn camera() -> GroundCamera {
        GroundCamera::new(Vec3::new(0.0, 1.5, 20.0), Vec3::ZERO, Vec3::Y).unwrap()
    }

    #[test]
    fn rejects_coincident_eye_and_center() {
        let result = GroundCamera::new(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert_eq!(result.unwrap_err(), CameraError::DegenerateBasis);
    }

    #[test]
    fn rejects_zero_up() {
        let result = GroundCamera::new(Vec3::Z, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(result.unwrap_err(), CameraError::DegenerateBasis);
    }

    #[test]
    fn view_matches_reference_look_at() {
        let camera = camera();
        let expected = Mat4::look_at_rh(Vec3::new(0.0, 1.5, 20.0), Vec3::ZERO, Vec3::Y);
        assert!(camera.view().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn turning_keeps_the_eye_and_the_look_distance() {
        let mut camera = camera();
        let distance = (camera.center() - camera.eye()).length();
        camera.turn_left();
        assert_eq!(camera.eye(), Vec3::new(0.0, 1.5, 20.0));
        assert!(((camera.center() - camera.eye()).length() - distance).abs() < TOLERANCE);
        assert!((camera.center().y - 0.0).abs() < TOLERANCE);
    }

    #[test]
    fn turn_left_swings_toward_negative_x() {
        let mut camera = camera();
        camera.turn_left();
        assert!(camera.center().x < 0.0);

        let mut camera = self::camera();
        camera.turn_right();
        assert!(camera.center().x > 0.0);
    }

    #[test]
    fn turn_left_then_right_restores_center() {
        let mut camera = camera();
        let original = camera.center();
        camera.turn_left();
        camera.turn_right();
        assert!(camera.center().abs_diff_eq(original, TOLERANCE));
    }

    #[test]
    fn forward_then_backward_restores_position() {
        let mut camera = camera();
        let (eye, center) = (camera.eye(), camera.center());
        camera.move_forward();
        assert!(!camera.eye().abs_diff_eq(eye, TOLERANCE));
        camera.move_backward();
        assert!(camera.eye().abs_diff_eq(eye, TOLERANCE));
        assert!(camera.center().abs_diff_eq(center, TOLERANCE));
    }

    #[test]
    fn forward_step_is_horizontal_and_fixed_length() {
        let mut camera = camera();
        let before = camera.eye();
        camera.move_forward();
        let step = camera.eye() - before;
        assert!(step.y.abs() < TOLERANCE);
        assert!((step.length() - GroundCamera::DEFAULT_MOVE_STEP).abs() < TOLERANCE);

        // A steeper look direction must not change the horizontal speed.
        let mut steep = GroundCamera::new(Vec3::new(0.0, 30.0, 20.0), Vec3::ZERO, Vec3::Y).unwrap();
        let before = steep.eye();
        steep.move_forward();
        let step = steep.eye() - before;
        assert!(step.y.abs() < TOLERANCE);
        assert!((step.length() - GroundCamera::DEFAULT_MOVE_STEP).abs() < TOLERANCE);
    }

    #[test]
    fn moving_translates_eye_and_center_together() {
        let mut camera = camera();
        let offset = camera.center() - camera.eye();
        camera.move_forward();
        camera.move_up();
        camera.turn_left();
        camera.move_down();
        assert!(((camera.center() - camera.eye()).length() - offset.length()).abs() < TOLERANCE);
    }

    #[test]
    fn vertical_moves_follow_world_up() {
        let mut camera = camera().move_step(0.5);
        camera.move_up();
        assert!(camera.eye().abs_diff_eq(Vec3::new(0.0, 2.0, 20.0), TOLERANCE));
        assert!(camera.center().abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), TOLERANCE));
        camera.move_down();
        camera.move_down();
        assert!(camera.eye().abs_diff_eq(Vec3::new(0.0, 1.0, 20.0), TOLERANCE));
    }

    #[test]
    fn looking_straight_down_does_not_walk() {
        let mut camera = GroundCamera::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Y).unwrap();
        camera.move_forward();
        assert_eq!(camera.eye(), Vec3::new(0.0, 5.0, 0.0));
        assert!(camera.view().is_finite());
    }

    #[test]
    fn matrices_follow_every_mutation() {
        let mut camera = camera();
        camera.set_viewport(1024, 512);
        camera.move_forward();
        camera.turn_right();
        let expected_view = Mat4::look_at_rh(camera.eye(), camera.center(), camera.up());
        let expected_proj = Mat4::perspective_rh(45.0_f32.to_radians(), 2.0, 0.1, 100.0);
        assert!(camera.view().abs_diff_eq(expected_view, 1e-5));
        assert!(camera.proj().abs_diff_eq(expected_proj, 1e-5));
    }
}
