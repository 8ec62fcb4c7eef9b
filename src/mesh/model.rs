use crate::error::{ConvertError, Result};
use crate::types::{Loop, Point};
use std::collections::HashMap;
use tracing::debug;

/// Exact-value key for a point; -0.0 and 0.0 share a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PointKey([u64; 3]);

impl From<Point> for PointKey {
    fn from(p: Point) -> Self {
        fn bits(v: f64) -> u64 {
            if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
        }
        PointKey([bits(p.x), bits(p.y), bits(p.z)])
    }
}

/// Shared vertex pool plus faces indexing into it.
///
/// Vertices keep first-insertion order. Every face index is valid and every
/// face has at least two entries.
#[derive(Debug, Clone, Default)]
pub struct PolygonModel {
    vertices: Vec<Point>,
    lookup: HashMap<PointKey, usize>,
    faces: Vec<Vec<usize>>,
}

impl PolygonModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble loops in order, dropping degenerate ones
    pub fn from_loops<'a>(loops: impl IntoIterator<Item = &'a Loop>) -> Self {
        let mut model = Self::new();
        let mut dropped = 0;
        for lp in loops {
            if !model.add_loop(lp) {
                dropped += 1;
            }
        }
        debug!(
            "Assembled {} vertices and {} faces ({} degenerate loops dropped)",
            model.vertices.len(),
            model.faces.len(),
            dropped
        );
        model
    }

    /// Build from explicit vertices and faces without merging duplicates.
    ///
    /// Fails if a face references a missing vertex or has fewer than two
    /// entries.
    pub fn from_parts(vertices: Vec<Point>, faces: Vec<Vec<usize>>) -> Result<Self> {
        for (i, face) in faces.iter().enumerate() {
            let reason = if face.len() < 2 {
                format!("face {} has fewer than 2 vertices", i + 1)
            } else if let Some(bad) = face.iter().find(|&&idx| idx >= vertices.len()) {
                format!(
                    "face {} references vertex {} of {}",
                    i + 1,
                    bad + 1,
                    vertices.len()
                )
            } else {
                continue;
            };
            return Err(ConvertError::Mesh { line: 0, reason });
        }

        let mut lookup = HashMap::with_capacity(vertices.len());
        for (i, v) in vertices.iter().enumerate() {
            lookup.entry(PointKey::from(*v)).or_insert(i);
        }

        Ok(Self {
            vertices,
            lookup,
            faces,
        })
    }

    fn vertex_index(&mut self, p: Point) -> usize {
        let next = self.vertices.len();
        let idx = *self.lookup.entry(PointKey::from(p)).or_insert(next);
        if idx == next {
            self.vertices.push(p);
        }
        idx
    }

    /// Append a loop as a face. Returns false when the loop has fewer than
    /// two distinct points and was skipped.
    pub fn add_loop(&mut self, lp: &Loop) -> bool {
        if lp.distinct_points() < 2 {
            debug!("Dropping degenerate loop with {} points", lp.points.len());
            return false;
        }
        let face = lp.points.iter().map(|p| self.vertex_index(*p)).collect();
        self.faces.push(face);
        true
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Faces as 0-based vertex indices
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Index of the first vertex equal to `p`
    pub fn index_of(&self, p: &Point) -> Option<usize> {
        self.lookup.get(&PointKey::from(*p)).copied()
    }

    /// Points of one face in order
    pub fn face_points(&self, face: usize) -> impl Iterator<Item = &Point> + '_ {
        self.faces[face].iter().map(|&i| &self.vertices[i])
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lp(coords: &[(f64, f64)], closed: bool) -> Loop {
        Loop {
            points: coords.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            closed,
        }
    }

    #[test]
    fn test_square_dedups_closing_point() {
        let square = lp(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
            true,
        );
        let model = PolygonModel::from_loops([&square]);
        assert_eq!(model.vertices().len(), 4);
        assert_eq!(model.faces(), &[vec![0, 1, 2, 3, 0]]);
    }

    #[test]
    fn test_shared_vertices_across_loops() {
        let a = lp(&[(0.0, 0.0), (1.0, 0.0)], false);
        let b = lp(&[(1.0, 0.0), (1.0, 1.0)], false);
        let model = PolygonModel::from_loops([&a, &b]);
        assert_eq!(model.vertices().len(), 3);
        assert_eq!(model.faces(), &[vec![0, 1], vec![1, 2]]);
    }

    #[test]
    fn test_degenerate_loops_dropped() {
        let single = lp(&[(1.0, 1.0)], false);
        let repeated = lp(&[(2.0, 2.0), (2.0, 2.0)], true);
        let ok = lp(&[(0.0, 0.0), (0.0, 1.0)], false);
        let model = PolygonModel::from_loops([&single, &repeated, &ok]);
        assert_eq!(model.faces().len(), 1);
        assert_eq!(model.vertices().len(), 2);
    }

    #[test]
    fn test_exact_dedup_only() {
        let a = lp(&[(0.0, 0.0), (1.0, 0.0)], false);
        let b = lp(&[(0.0, 0.0), (1.0 + 1e-12, 0.0)], false);
        let model = PolygonModel::from_loops([&a, &b]);
        assert_eq!(model.vertices().len(), 3);
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let a = lp(&[(0.0, 0.0), (1.0, 0.0)], false);
        let b = lp(&[(-0.0, 0.0), (1.0, 1.0)], false);
        let model = PolygonModel::from_loops([&a, &b]);
        assert_eq!(model.index_of(&Point::new(-0.0, 0.0)), Some(0));
        assert_eq!(model.vertices().len(), 3);
    }

    #[test]
    fn test_from_parts_validates() {
        let verts = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert!(PolygonModel::from_parts(verts.clone(), vec![vec![0, 1]]).is_ok());
        let err = PolygonModel::from_parts(verts.clone(), vec![vec![0, 2]]).unwrap_err();
        assert!(err.to_string().contains("face 1 references vertex 3 of 2"));
        assert!(PolygonModel::from_parts(verts, vec![vec![0]]).is_err());
    }

    #[test]
    fn test_face_points() {
        let tri = lp(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], false);
        let model = PolygonModel::from_loops([&tri]);
        let pts: Vec<_> = model.face_points(0).copied().collect();
        assert_eq!(pts, tri.points);
    }
}
