//! An orbit ("overhead") camera for inspecting a scene from outside.
//!
//! The camera sits on a sphere around the world origin, described by a yaw
//! and pitch in degrees and a radial distance. Dragging with the mouse orbits
//! the camera and scrolling zooms in and out.

use glam::{Mat4, Vec2, Vec3};

use crate::camera::{Projection, ViewProjection};
use crate::transform::{rotate, translate};

/// Angle changes at or below this are ignored while dragging.
const ANGLE_EPSILON: f32 = f32::EPSILON;

/// Viewport the drag scale is measured against. The overhead camera never
/// takes its drag scale from the window, so one pixel of travel always turns
/// `1 / rotation_scale(1, 1)` = 0.45 degrees.
const DRAG_VIEWPORT: (u32, u32) = (1, 1);

/// Where a drag started, in screen space and in orbit angles.
#[derive(Clone, Copy, Debug)]
struct DragAnchor {
    mouse: Vec2,
    angles: Vec2,
}

/// A camera controller that orbits the world origin.
///
/// Invariants maintained by every operation:
/// - pitch stays within [-90°, 90°],
/// - yaw stays within (-180°, 180°],
/// - radius stays within the configured `[min_radius, max_radius]`.
///
/// # Example
/// ```
/// use roam::{OverheadCamera, ViewProjection, Vec2};
///
/// let mut orbit = OverheadCamera::new(0.0, 20.0, 25.0).radius_limits(2.0, 40.0);
/// orbit.set_viewport(800, 800);
///
/// orbit.begin_rotate(Vec2::new(400.0, 400.0));
/// orbit.update_rotate(Vec2::new(900.0, 400.0));
/// orbit.end_rotate();
/// orbit.zoom(-1.0);
/// ```
#[derive(Clone, Debug)]
pub struct OverheadCamera {
    /// Horizontal angle in degrees.
    yaw: f32,
    /// Vertical angle in degrees.
    pitch: f32,
    /// Distance from the origin.
    radius: f32,
    min_radius: f32,
    max_radius: f32,
    /// Multiplier on the drag-to-angle mapping.
    drag_sensitivity: f32,
    projection: Projection,
    drag: Option<DragAnchor>,
    view: Mat4,
    proj: Mat4,
}

impl OverheadCamera {
    pub const DEFAULT_MIN_RADIUS: f32 = 1.0;
    pub const DEFAULT_MAX_RADIUS: f32 = 50.0;

    /// Creates an orbit camera. Angles are in degrees; pitch is clamped, yaw
    /// wrapped and radius clamped to the default limits.
    pub fn new(yaw: f32, pitch: f32, radius: f32) -> Self {
        let mut camera = Self {
            yaw: wrap_degrees(yaw),
            pitch: pitch.clamp(-90.0, 90.0),
            radius,
            min_radius: Self::DEFAULT_MIN_RADIUS,
            max_radius: Self::DEFAULT_MAX_RADIUS,
            drag_sensitivity: 1.0,
            projection: Projection::default(),
            drag: None,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        };
        camera.radius = camera.radius.clamp(camera.min_radius, camera.max_radius);
        camera.update_view_proj();
        camera
    }

    /// Set the zoom limits. `min` is kept strictly positive and `max` no
    /// smaller than `min`; the current radius is clamped into the new range.
    pub fn radius_limits(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min.max(f32::EPSILON);
        self.max_radius = max.max(self.min_radius);
        self.radius = self.radius.clamp(self.min_radius, self.max_radius);
        self.update_view_proj();
        self
    }

    /// Set the drag sensitivity multiplier (1.0 keeps the reference mapping).
    pub fn drag_sensitivity(mut self, sensitivity: f32) -> Self {
        self.drag_sensitivity = sensitivity;
        self
    }

    /// Set the projection parameters.
    pub fn projection_params(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self.update_view_proj();
        self
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn radius_range(&self) -> (f32, f32) {
        (self.min_radius, self.max_radius)
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Starts a drag at `mouse`, remembering the current angles.
    pub fn begin_rotate(&mut self, mouse: Vec2) {
        self.drag = Some(DragAnchor {
            mouse,
            angles: Vec2::new(self.yaw, self.pitch),
        });
    }

    pub fn end_rotate(&mut self) {
        self.drag = None;
    }

    pub fn is_rotating(&self) -> bool {
        self.drag.is_some()
    }

    /// Continues a drag with the mouse now at `mouse`.
    ///
    /// The new angles are the drag-start angles plus the mouse offset divided
    /// by [`rotation_scale`] of a 1x1 viewport, whatever the window size.
    /// Returns true if the angles changed; does nothing when no drag is in
    /// progress.
    pub fn update_rotate(&mut self, mouse: Vec2) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };

        let scale = rotation_scale(DRAG_VIEWPORT.0, DRAG_VIEWPORT.1);
        let delta = (mouse - anchor.mouse) * self.drag_sensitivity / scale;
        let target = anchor.angles + delta;
        let angles = Vec2::new(wrap_degrees(target.x), target.y.clamp(-90.0, 90.0));

        if (angles - Vec2::new(self.yaw, self.pitch)).length() <= ANGLE_EPSILON {
            return false;
        }
        self.yaw = angles.x;
        self.pitch = angles.y;
        self.update_view_proj();
        true
    }

    /// Moves the camera `offset` units away from (positive) or toward
    /// (negative) the origin, within the radius limits.
    pub fn zoom(&mut self, offset: f32) {
        self.radius = (self.radius + offset).clamp(self.min_radius, self.max_radius);
        self.update_view_proj();
    }

    /// Camera position in world space.
    pub fn eye(&self) -> Vec3 {
        self.view.inverse().transform_point3(Vec3::ZERO)
    }

    /// `Translate(0, 0, -radius) * RotateX(pitch) * RotateY(yaw)`.
    fn update_view_proj(&mut self) {
        self.view = translate(Vec3::new(0.0, 0.0, -self.radius))
            * rotate(self.pitch, Vec3::X)
            * rotate(self.yaw, Vec3::Y);
        self.proj = self.projection.matrix();
    }
}

impl ViewProjection for OverheadCamera {
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

/// Pixels of mouse travel per degree of rotation for a viewport size:
/// `min(width * 1000 / 450, height * 1000 / 270)`.
pub fn rotation_scale(width: u32, height: u32) -> f32 {
    let by_width = width as f32 * 1000.0 / 450.0;
    let by_height = height as f32 * 1000.0 / 270.0;
    by_width.min(by_height)
}

/// Wraps an angle in degrees into (-180, 180].
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = 180.0 - (180.0 - degrees).rem_euclid(360.0);
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn dragging(camera: &mut OverheadCamera, from: Vec2, to: Vec2) -> bool {
        camera.begin_rotate(from);
        let changed = camera.update_rotate(to);
        camera.end_rotate();
        changed
    }

    #[test]
    fn wrap_degrees_lands_in_half_open_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert!((wrap_degrees(190.0) + 170.0).abs() < TOLERANCE);
        assert!((wrap_degrees(-190.0) - 170.0).abs() < TOLERANCE);
        assert!((wrap_degrees(725.0) - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn rotation_scale_uses_the_tighter_axis() {
        assert!((rotation_scale(450, 270) - 1000.0).abs() < TOLERANCE);
        assert!((rotation_scale(900, 270) - 1000.0).abs() < TOLERANCE);
        assert!((rotation_scale(1, 1) - 1000.0 / 450.0).abs() < TOLERANCE);
    }

    #[test]
    fn construction_enforces_invariants() {
        let camera = OverheadCamera::new(270.0, 120.0, 500.0);
        assert!((camera.yaw() + 90.0).abs() < TOLERANCE);
        assert_eq!(camera.pitch(), 90.0);
        assert_eq!(camera.radius(), OverheadCamera::DEFAULT_MAX_RADIUS);
    }

    #[test]
    fn drag_adds_scaled_mouse_offset_to_the_start_angles() {
        let mut camera = OverheadCamera::new(10.0, 20.0, 25.0);
        // 0.45 degrees per pixel: 100px right, 50px down.
        assert!(dragging(&mut camera, Vec2::ZERO, Vec2::new(100.0, 50.0)));
        assert!((camera.yaw() - 55.0).abs() < TOLERANCE);
        assert!((camera.pitch() - 42.5).abs() < TOLERANCE);
    }

    #[test]
    fn drag_speed_does_not_depend_on_the_viewport() {
        let mut small = OverheadCamera::new(0.0, 0.0, 25.0);
        let mut large = OverheadCamera::new(0.0, 0.0, 25.0);
        small.set_viewport(450, 270);
        large.set_viewport(1920, 1080);
        dragging(&mut small, Vec2::ZERO, Vec2::new(200.0, 0.0));
        dragging(&mut large, Vec2::ZERO, Vec2::new(200.0, 0.0));
        assert!((small.yaw() - 90.0).abs() < TOLERANCE);
        assert!((large.yaw() - 90.0).abs() < TOLERANCE);
    }

    #[test]
    fn drag_is_measured_from_the_start_not_incrementally() {
        let mut camera = OverheadCamera::new(0.0, 0.0, 10.0);
        camera.begin_rotate(Vec2::ZERO);
        camera.update_rotate(Vec2::new(10.0, 0.0));
        camera.update_rotate(Vec2::new(20.0, 0.0));
        camera.end_rotate();
        let expected = 20.0 / rotation_scale(1, 1);
        assert!((camera.yaw() - expected).abs() < TOLERANCE);
    }

    #[test]
    fn pitch_and_yaw_stay_in_range_under_any_drag() {
        let mut camera = OverheadCamera::new(0.0, 20.0, 25.0);
        let moves = [
            Vec2::new(5_000.0, 3_000.0),
            Vec2::new(-12_345.0, -9_999.0),
            Vec2::new(800.0, -200.0),
            Vec2::new(-400.0, 1e6),
            Vec2::new(1e5, -1e5),
        ];
        for to in moves {
            camera.begin_rotate(Vec2::ZERO);
            camera.update_rotate(to);
            camera.update_rotate(to * 0.5);
            camera.end_rotate();
            assert!((-90.0..=90.0).contains(&camera.pitch()));
            assert!(camera.yaw() > -180.0 && camera.yaw() <= 180.0);
        }
    }

    #[test]
    fn update_without_drag_does_nothing() {
        let mut camera = OverheadCamera::new(0.0, 20.0, 25.0);
        assert!(!camera.update_rotate(Vec2::new(300.0, 300.0)));
        assert_eq!(camera.yaw(), 0.0);
        assert_eq!(camera.pitch(), 20.0);
    }

    #[test]
    fn update_without_movement_reports_no_change() {
        let mut camera = OverheadCamera::new(0.0, 20.0, 25.0);
        assert!(!dragging(&mut camera, Vec2::splat(50.0), Vec2::splat(50.0)));
    }

    #[test]
    fn zoom_never_leaves_the_radius_limits() {
        let mut camera = OverheadCamera::new(0.0, 20.0, 25.0).radius_limits(1.0, 50.0);
        for _ in 0..1_000 {
            camera.zoom(3.7);
        }
        assert_eq!(camera.radius(), 50.0);
        for _ in 0..1_000 {
            camera.zoom(-3.7);
        }
        assert_eq!(camera.radius(), 1.0);
        camera.zoom(f32::MAX);
        assert_eq!(camera.radius(), 50.0);
        camera.zoom(-f32::MAX);
        assert_eq!(camera.radius(), 1.0);
    }

    #[test]
    fn radius_limits_are_sanitized() {
        let camera = OverheadCamera::new(0.0, 0.0, 10.0).radius_limits(-5.0, -10.0);
        let (min, max) = camera.radius_range();
        assert!(min > 0.0);
        assert!(max >= min);
        assert_eq!(camera.radius(), max);
    }

    #[test]
    fn view_is_pull_back_after_pitch_then_yaw() {
        let camera = OverheadCamera::new(30.0, 45.0, 12.0);
        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -12.0))
            * Mat4::from_rotation_x(45.0_f32.to_radians())
            * Mat4::from_rotation_y(30.0_f32.to_radians());
        assert!(camera.view().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn eye_sits_on_the_orbit_sphere() {
        let mut camera = OverheadCamera::new(-75.0, 35.0, 18.0);
        assert!((camera.eye().length() - 18.0).abs() < TOLERANCE);
        camera.zoom(-8.0);
        assert!((camera.eye().length() - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn origin_is_straight_ahead() {
        let camera = OverheadCamera::new(123.0, -40.0, 7.5);
        let origin = camera.view().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, -7.5), TOLERANCE));
    }
}
