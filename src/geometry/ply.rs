//! ASCII PLY parsing for triangle meshes with per-face color.
//!
//! The expected layout is a header declaring `element vertex <n>` and
//! `element face <m>` and closed by `end_header`, followed by `n` vertex lines
//! of `x y z nx ny nz` and `m` face lines of `3 i j k r g b` with 0-based
//! indices and color channels in 0..=255.

use std::io::BufRead;

use glam::Vec3;

use super::{Aabb, GeometryError, RawGeometry, parse_floats};
use crate::mesh::Vertex3d;

/// Upper bound on elements preallocated from header counts. The counts are
/// untrusted until the data lines are actually read.
const PREALLOCATE_LIMIT: usize = 1 << 16;

#[derive(Debug, Default)]
struct Header {
    vertices: Option<usize>,
    faces: Option<usize>,
}

/// Parses an ASCII PLY file into a flat triangle list.
///
/// Every face must be a triangle; its color (scaled to [0, 1]) is copied onto
/// all three of its vertices. Fails with
/// [`GeometryError::NonTriangularFace`] on the first face with a different
/// vertex count, and with [`GeometryError::NoGeometry`] if the header declares
/// no vertices or no faces.
pub fn parse_ply<R: BufRead>(reader: R) -> Result<RawGeometry, GeometryError> {
    let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));

    let header = read_header(&mut lines)?;
    let vertex_count = header.vertices.ok_or_else(|| {
        GeometryError::ParseError("header does not declare 'element vertex'".to_string())
    })?;
    let face_count = header.faces.ok_or_else(|| {
        GeometryError::ParseError("header does not declare 'element face'".to_string())
    })?;
    if vertex_count == 0 || face_count == 0 {
        return Err(GeometryError::NoGeometry);
    }

    // Data lines, skipping blanks; running out early is an error.
    let mut data = lines.filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()));
    let mut next_line = |what: &str| -> Result<(usize, String), GeometryError> {
        match data.next() {
            Some((line_no, line)) => Ok((line_no, line?)),
            None => Err(GeometryError::ParseError(format!(
                "unexpected end of file while reading {}",
                what
            ))),
        }
    };

    let mut bounds = Aabb::EMPTY;
    let mut positions = Vec::with_capacity(vertex_count.min(PREALLOCATE_LIMIT));
    let mut normals = Vec::with_capacity(vertex_count.min(PREALLOCATE_LIMIT));
    for _ in 0..vertex_count {
        let (line_no, line) = next_line("vertices")?;
        let [x, y, z, nx, ny, nz] = parse_floats::<6>(&line, 0, line_no)?;
        let position = Vec3::new(x, y, z);
        bounds.include(position);
        positions.push(position);
        normals.push(Vec3::new(nx, ny, nz));
    }

    let mut vertices = Vec::with_capacity(face_count.min(PREALLOCATE_LIMIT) * 3);
    for _ in 0..face_count {
        let (line_no, line) = next_line("faces")?;
        let mut tokens = line.split_whitespace();

        let corners = parse_index(tokens.next(), line_no)?;
        if corners != 3 {
            return Err(GeometryError::NonTriangularFace {
                line: line_no,
                vertices: corners,
            });
        }

        let mut indices = [0usize; 3];
        for slot in &mut indices {
            let index = parse_index(tokens.next(), line_no)?;
            if index >= vertex_count {
                return Err(GeometryError::ParseError(format!(
                    "line {}: vertex index {} out of range ({} vertices)",
                    line_no, index, vertex_count
                )));
            }
            *slot = index;
        }

        let [r, g, b] = parse_floats::<3>(&line, 4, line_no)?;
        let color = [r / 255.0, g / 255.0, b / 255.0];
        for index in indices {
            vertices.push(Vertex3d::new(
                positions[index].to_array(),
                normals[index].to_array(),
                color,
            ));
        }
    }

    Ok(RawGeometry {
        vertices,
        bounds,
        colored: true,
    })
}

fn read_header<I>(lines: &mut I) -> Result<Header, GeometryError>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let mut header = Header::default();
    for (line_no, line) in lines {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["end_header", ..] => return Ok(header),
            ["format", encoding, ..] if *encoding != "ascii" => {
                return Err(GeometryError::ParseError(format!(
                    "line {}: unsupported PLY encoding '{}'",
                    line_no, encoding
                )));
            }
            ["element", kind @ ("vertex" | "face"), count, ..] => {
                let count: usize = count.parse().map_err(|_| {
                    GeometryError::ParseError(format!(
                        "line {}: invalid element count '{}'",
                        line_no, count
                    ))
                })?;
                if *kind == "vertex" {
                    header.vertices = Some(count);
                } else {
                    header.faces = Some(count);
                }
            }
            _ => {}
        }
    }
    Err(GeometryError::ParseError(
        "missing 'end_header' line".to_string(),
    ))
}

fn parse_index(token: Option<&str>, line_no: usize) -> Result<usize, GeometryError> {
    let token = token.ok_or_else(|| {
        GeometryError::ParseError(format!("line {}: face record is too short", line_no))
    })?;
    token.parse().map_err(|_| {
        GeometryError::ParseError(format!("line {}: invalid index '{}'", line_no, token))
    })
}
