//! Wavefront OBJ reading and writing
//!
//! Only the polygon subset is handled: `v` vertices and `f` faces. Normals,
//! texture coordinates, groups and smoothing lines are read and ignored.

use super::model::PolygonModel;
use crate::error::{ConvertError, Result};
use crate::format::fixed;
use crate::types::Point;
use std::io::Write;
use tracing::{info, warn};

fn f(n: f64) -> String {
    fixed(n, 6)
}

/// Write the model as OBJ. Face indices are 1-based.
pub fn write_obj<W: Write + ?Sized>(out: &mut W, model: &PolygonModel) -> std::io::Result<()> {
    writeln!(out, "g")?;
    for v in model.vertices() {
        writeln!(out, "v {} {} {}", f(v.x), f(v.y), f(v.z))?;
    }
    for face in model.faces() {
        let indices: Vec<String> = face.iter().map(|i| (i + 1).to_string()).collect();
        writeln!(out, "f {}", indices.join(" "))?;
    }
    info!(
        "Wrote {} vertices and {} faces.",
        model.vertices().len(),
        model.faces().len()
    );
    Ok(())
}

/// Render the model as an OBJ string
pub fn model_to_obj(model: &PolygonModel) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_obj(&mut out, model);
    String::from_utf8_lossy(&out).into_owned()
}

fn mesh_error(line: usize, reason: impl Into<String>) -> ConvertError {
    ConvertError::Mesh {
        line,
        reason: reason.into(),
    }
}

fn parse_coord(token: Option<&str>, line: usize) -> Result<f64> {
    let token = token.ok_or_else(|| mesh_error(line, "vertex needs 3 coordinates"))?;
    token
        .parse()
        .map_err(|_| mesh_error(line, format!("invalid coordinate '{}'", token)))
}

/// Resolve one face element (`7`, `7/1`, `7//3`, `-1`) to a 0-based index.
///
/// Negative indices count back from the vertices read so far. Positive ones
/// may point ahead and are range-checked once the whole file is read.
fn parse_face_index(token: &str, vertex_count: usize, line: usize) -> Result<usize> {
    let first = token.split('/').next().unwrap_or("");
    let raw: i64 = first
        .parse()
        .map_err(|_| mesh_error(line, format!("invalid face index '{}'", token)))?;

    match raw {
        0 => Err(mesh_error(line, "face index 0 is not valid")),
        n if n > 0 => Ok(n as usize - 1),
        n => vertex_count.checked_sub(n.unsigned_abs() as usize).ok_or_else(|| {
            mesh_error(
                line,
                format!("face index {} out of range ({} vertices)", n, vertex_count),
            )
        }),
    }
}

/// Join `\` continuation lines, keeping the number of the first physical line
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (i, raw) in text.lines().enumerate() {
        let (start, mut acc) = pending.take().unwrap_or((i + 1, String::new()));
        let trimmed = raw.trim_end();
        if let Some(head) = trimmed.strip_suffix('\\') {
            acc.push_str(head.trim());
            acc.push(' ');
            pending = Some((start, acc));
        } else {
            acc.push_str(raw.trim());
            lines.push((start, acc));
        }
    }
    if let Some(rest) = pending {
        lines.push(rest);
    }

    lines
}

/// Parse the polygon subset of an OBJ file.
///
/// Vertices are kept exactly as listed, duplicates included, so face
/// indices keep their meaning.
pub fn parse_obj(text: &str) -> Result<PolygonModel> {
    let mut vertices: Vec<Point> = Vec::new();
    let mut faces: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut off_plane = 0usize;

    for (line_no, raw) in logical_lines(text) {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or("");
        match keyword {
            "v" => {
                let x = parse_coord(tokens.next(), line_no)?;
                let y = parse_coord(tokens.next(), line_no)?;
                let z = parse_coord(tokens.next(), line_no)?;
                if z != 0.0 {
                    off_plane += 1;
                }
                vertices.push(Point::with_z(x, y, z));
            }
            "f" | "l" => {
                let face = tokens
                    .map(|t| parse_face_index(t, vertices.len(), line_no))
                    .collect::<Result<Vec<_>>>()?;
                if face.len() < 2 {
                    return Err(mesh_error(line_no, "face needs at least 2 vertices"));
                }
                faces.push((line_no, face));
            }
            "g" | "o" | "s" | "vn" | "vt" | "usemtl" | "mtllib" => {}
            _ => return Err(mesh_error(line_no, format!("unsupported line '{}'", line))),
        }
    }

    if off_plane > 0 {
        warn!("{} vertices are not in the z = 0 plane", off_plane);
    }
    for (line_no, face) in &faces {
        if let Some(&bad) = face.iter().find(|&&idx| idx >= vertices.len()) {
            return Err(mesh_error(
                *line_no,
                format!(
                    "face index {} out of range ({} vertices)",
                    bad + 1,
                    vertices.len()
                ),
            ));
        }
    }
    info!("Read {} vertices and {} faces.", vertices.len(), faces.len());

    PolygonModel::from_parts(vertices, faces.into_iter().map(|(_, face)| face).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Loop;

    #[test]
    fn test_write_square() {
        let square = Loop {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
                Point::new(0.0, 0.0),
            ],
            closed: true,
        };
        let obj = model_to_obj(&PolygonModel::from_loops([&square]));
        assert_eq!(
            obj,
            "g\n\
             v 0.000000 0.000000 0.000000\n\
             v 10.000000 0.000000 0.000000\n\
             v 10.000000 10.000000 0.000000\n\
             v 0.000000 10.000000 0.000000\n\
             f 1 2 3 4 1\n"
        );
    }

    #[test]
    fn test_parse_basic() {
        let model = parse_obj("# triangle\ng\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(model.vertices().len(), 3);
        assert_eq!(model.faces(), &[vec![0, 1, 2]]);
    }

    #[test]
    fn test_parse_slashes_and_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1/1/1 2//1 -1\n";
        let model = parse_obj(text).unwrap();
        assert_eq!(model.faces(), &[vec![0, 1, 2]]);
    }

    #[test]
    fn test_parse_faces_before_vertices() {
        let text = "f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n";
        let model = parse_obj(text).unwrap();
        assert_eq!(model.faces(), &[vec![0, 1, 2]]);
        assert_eq!(model.vertices().len(), 3);
    }

    #[test]
    fn test_write_through_trait_object() {
        let model = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap();
        let mut buf = Vec::new();
        let out: &mut dyn Write = &mut buf;
        write_obj(out, &model).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), model_to_obj(&model));
    }

    #[test]
    fn test_parse_line_continuation() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 \\\n  3\n";
        let model = parse_obj(text).unwrap();
        assert_eq!(model.faces(), &[vec![0, 1, 2]]);
    }

    #[test]
    fn test_parse_keeps_duplicate_vertices() {
        let model = parse_obj("v 0 0 0\nv 0 0 0\nf 1 2\n").unwrap();
        assert_eq!(model.vertices().len(), 2);
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 5\n").unwrap_err();
        assert!(matches!(err, ConvertError::Mesh { line: 3, .. }));

        let err = parse_obj("v 0 0\n").unwrap_err();
        assert!(matches!(err, ConvertError::Mesh { line: 1, .. }));

        let err = parse_obj("v 0 0 0\nbogus 1 2\n").unwrap_err();
        assert!(matches!(err, ConvertError::Mesh { line: 2, .. }));

        assert!(parse_obj("v 0 0 0\nf 0 1\n").is_err());
        assert!(parse_obj("v 0 0 0\nf 1\n").is_err());

        let err = parse_obj("f -1 2\nv 0 0 0\nv 1 0 0\n").unwrap_err();
        assert!(matches!(err, ConvertError::Mesh { line: 1, .. }));
    }
}
