//! Wavefront OBJ parsing.
//!
//! Only the records needed for shape are read: `v` (position), `vn` (normal)
//! and `f` (face). Everything else (`vt`, groups, materials, comments) is
//! skipped. Face references take the forms `p`, `p/t`, `p//n` and `p/t/n`,
//! 1-based, or negative to count back from the latest record.

use std::io::BufRead;

use glam::Vec3;

use super::{Aabb, GeometryError, RawGeometry, fan_triangles, flat_normal, parse_floats};
use crate::mesh::Vertex3d;

/// One face corner: indices into the position and normal lists.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Corner {
    position: usize,
    normal: Option<usize>,
}

/// Parses OBJ text into a flat triangle list.
///
/// Polygons are fan-triangulated. A triangle whose three corners all reference
/// normals uses them; any other triangle gets its flat normal on all three
/// vertices. Fails with [`GeometryError::NoGeometry`] if the input holds no
/// positions or no faces.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<RawGeometry, GeometryError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut corners: Vec<Corner> = Vec::new();
    let mut bounds = Aabb::EMPTY;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let position = Vec3::from_array(parse_floats(&line, 1, line_no)?);
                bounds.include(position);
                positions.push(position);
            }
            Some("vn") => {
                normals.push(Vec3::from_array(parse_floats(&line, 1, line_no)?));
            }
            Some("f") => {
                let face = tokens
                    .map(|token| parse_corner(token, positions.len(), normals.len(), line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if face.len() < 3 {
                    return Err(GeometryError::ParseError(format!(
                        "line {}: face needs at least 3 vertices, found {}",
                        line_no,
                        face.len()
                    )));
                }
                for triangle in fan_triangles(face.len()) {
                    corners.extend(triangle.map(|k| face[k]));
                }
            }
            _ => {}
        }
    }

    if positions.is_empty() || corners.is_empty() {
        return Err(GeometryError::NoGeometry);
    }

    let mut vertices = Vec::with_capacity(corners.len());
    for triangle in corners.chunks_exact(3) {
        let mut p = [Vec3::ZERO; 3];
        for (slot, corner) in p.iter_mut().zip(triangle) {
            *slot = lookup(&positions, corner.position, "position")?;
        }

        let n = match (triangle[0].normal, triangle[1].normal, triangle[2].normal) {
            (Some(a), Some(b), Some(c)) => [
                lookup(&normals, a, "normal")?,
                lookup(&normals, b, "normal")?,
                lookup(&normals, c, "normal")?,
            ],
            _ => [flat_normal(p[0], p[1], p[2]); 3],
        };

        for (position, normal) in p.into_iter().zip(n) {
            vertices.push(Vertex3d::new(
                position.to_array(),
                normal.to_array(),
                Vertex3d::WHITE,
            ));
        }
    }

    Ok(RawGeometry {
        vertices,
        bounds,
        colored: false,
    })
}

fn parse_corner(
    token: &str,
    positions: usize,
    normals: usize,
    line_no: usize,
) -> Result<Corner, GeometryError> {
    let mut parts = token.split('/');
    let position = parts.next().unwrap_or_default();
    let _texcoord = parts.next();
    let normal = parts.next().filter(|n| !n.is_empty());

    Ok(Corner {
        position: resolve_index(position, positions, line_no)?,
        normal: normal
            .map(|n| resolve_index(n, normals, line_no))
            .transpose()?,
    })
}

/// Turns a 1-based (or negative, relative) OBJ index into a 0-based one.
fn resolve_index(token: &str, count: usize, line_no: usize) -> Result<usize, GeometryError> {
    let invalid = || GeometryError::ParseError(format!("line {}: invalid index '{}'", line_no, token));
    let value: i64 = token.parse().map_err(|_| invalid())?;
    match value {
        0 => Err(invalid()),
        v if v > 0 => Ok((v - 1) as usize),
        v => {
            let back = v.unsigned_abs() as usize;
            count.checked_sub(back).ok_or_else(invalid)
        }
    }
}

fn lookup(values: &[Vec3], index: usize, what: &str) -> Result<Vec3, GeometryError> {
    values.get(index).copied().ok_or_else(|| {
        GeometryError::ParseError(format!(
            "{} index {} out of range ({} defined)",
            what,
            index + 1,
            values.len()
        ))
    })
}
