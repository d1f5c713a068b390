//! Matrix builders shared by the cameras and the scene composer.
//!
//! All matrices are glam [`Mat4`]s (column-major storage) meant to be applied
//! to column vectors: `m * p`. Where a construction is easier to state row by
//! row, the rows are built explicitly and transposed into place.

use glam::{Mat3, Mat4, Vec3, Vec4};

/// Cross products shorter than this are treated as parallel input vectors.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Rotation of `degrees` about an arbitrary `axis` (Rodrigues' formula).
///
/// Rotation is counter-clockwise when looking down the axis toward the origin
/// (right-handed), which matches `Mat4::from_axis_angle`. The axis does not
/// need to be unit length. A zero-length axis yields the identity.
pub fn rotate(degrees: f32, axis: Vec3) -> Mat4 {
    let Some(k) = axis.try_normalize() else {
        return Mat4::IDENTITY;
    };
    let (s, c) = degrees.to_radians().sin_cos();
    let t = 1.0 - c;

    // R = cI + s[k]x + t(k k^T), written out column by column.
    Mat4::from_cols(
        Vec4::new(c + t * k.x * k.x, t * k.x * k.y + s * k.z, t * k.x * k.z - s * k.y, 0.0),
        Vec4::new(t * k.x * k.y - s * k.z, c + t * k.y * k.y, t * k.y * k.z + s * k.x, 0.0),
        Vec4::new(t * k.x * k.z + s * k.y, t * k.y * k.z - s * k.x, c + t * k.z * k.z, 0.0),
        Vec4::W,
    )
}

/// Standard 4×4 translation by `offset`.
pub fn translate(offset: Vec3) -> Mat4 {
    Mat4::from_cols(Vec4::X, Vec4::Y, Vec4::Z, offset.extend(1.0))
}

/// Builds a world-to-camera matrix from an eye position, a look-at point and
/// an up vector. The camera looks down its local -Z axis.
///
/// The basis is `Z = normalize(eye - center)`, `X = normalize(up × Z)`,
/// `Y = Z × X`, and the matrix rows are `[X, -X·eye]`, `[Y, -Y·eye]`,
/// `[Z, -Z·eye]`, `[0, 0, 0, 1]`. For valid input this is identical to
/// `Mat4::look_at_rh`.
///
/// If `up` is parallel to the viewing direction, the world axis least aligned
/// with the view direction is used as up instead. If `eye == center` the view
/// direction defaults to +Z.
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    let z = (eye - center).try_normalize().unwrap_or(Vec3::Z);

    let side = up.cross(z);
    let x = if side.length() > PARALLEL_EPSILON {
        side.normalize()
    } else {
        let fallback = fallback_up(z);
        log::warn!(
            "camera up {up} is parallel to the view direction {z}; using {fallback} as up"
        );
        fallback.cross(z).normalize()
    };
    let y = z.cross(x).normalize();

    let rows = Mat4::from_cols(
        x.extend(-x.dot(eye)),
        y.extend(-y.dot(eye)),
        z.extend(-z.dot(eye)),
        Vec4::W,
    );
    rows.transpose()
}

/// The principal axis least aligned with `forward`.
fn fallback_up(forward: Vec3) -> Vec3 {
    let a = forward.abs();
    if a.y <= a.x && a.y <= a.z {
        Vec3::Y
    } else if a.z <= a.x {
        Vec3::Z
    } else {
        Vec3::X
    }
}

/// Builds a 3×3 matrix from nine scalars given row by row.
pub fn mat3_from_rows(values: [f32; 9]) -> Mat3 {
    Mat3::from_cols_array(&values).transpose()
}

/// The affine transform `[R | t; 0 0 0 1]`: rotate (or otherwise linearly
/// transform) by `linear`, then translate by `translation`.
pub fn affine(linear: Mat3, translation: Vec3) -> Mat4 {
    Mat4::from_cols(
        linear.x_axis.extend(0.0),
        linear.y_axis.extend(0.0),
        linear.z_axis.extend(0.0),
        translation.extend(1.0),
    )
}
