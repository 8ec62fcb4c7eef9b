//! Cubic Bézier flattening
//!
//! Adaptive subdivision: a segment whose control points lie within the
//! tolerance of its chord is emitted as a single line, otherwise it is split
//! in half with de Casteljau and both halves are examined against half the
//! tolerance. Depth is bounded, so coincident or degenerate control points
//! always terminate.

use crate::types::Point;

/// Maximum deviation between the curve's control polygon and its chord at
/// the top level; each subdivision level allows half of its parent's
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Segments at this depth are emitted without further checks
pub const MAX_DEPTH: u32 = 10;

#[derive(Debug, Clone, Copy)]
struct Cubic {
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
}

impl Cubic {
    fn flatness(&self) -> f64 {
        dist_point_to_segment(self.p1, self.p0, self.p3)
            .max(dist_point_to_segment(self.p2, self.p0, self.p3))
    }

    /// Split at t = 0.5
    fn bisect(&self) -> (Cubic, Cubic) {
        let p01 = self.p0.midpoint(&self.p1);
        let p12 = self.p1.midpoint(&self.p2);
        let p23 = self.p2.midpoint(&self.p3);
        let p012 = p01.midpoint(&p12);
        let p123 = p12.midpoint(&p23);
        let p0123 = p012.midpoint(&p123);
        (
            Cubic {
                p0: self.p0,
                p1: p01,
                p2: p012,
                p3: p0123,
            },
            Cubic {
                p0: p0123,
                p1: p123,
                p2: p23,
                p3: self.p3,
            },
        )
    }
}

/// Distance from `p` to the segment `a`-`b`, falling back to the nearest
/// endpoint when the projection lands outside it.
fn dist_point_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let v = b - a;
    let w = p - a;
    let c1 = v.x * w.x + v.y * w.y + v.z * w.z;
    if c1 <= 0.0 {
        return p.distance(&a);
    }
    let c2 = v.x * v.x + v.y * v.y + v.z * v.z;
    if c2 <= c1 {
        return p.distance(&b);
    }
    let t = c1 / c2;
    let proj = Point::with_z(a.x + t * v.x, a.y + t * v.y, a.z + t * v.z);
    p.distance(&proj)
}

/// Flattens cubic Bézier segments into points
#[derive(Debug, Clone, Copy)]
pub struct CurveSampler {
    tolerance: f64,
    max_depth: u32,
}

impl Default for CurveSampler {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_depth: MAX_DEPTH,
        }
    }
}

impl CurveSampler {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Sample the curve `p0 p1 p2 p3`, appending points after `p0` up to and
    /// including `p3` to `out`.
    pub fn sample_into(&self, p0: Point, p1: Point, p2: Point, p3: Point, out: &mut Vec<Point>) {
        let mut stack = vec![(Cubic { p0, p1, p2, p3 }, 0u32, self.tolerance)];

        while let Some((curve, depth, tolerance)) = stack.pop() {
            if depth >= self.max_depth || curve.flatness() <= tolerance {
                out.push(curve.p3);
                continue;
            }
            let (left, right) = curve.bisect();
            let tolerance = tolerance * 0.5;
            // Right goes first so the left half is emitted first
            stack.push((right, depth + 1, tolerance));
            stack.push((left, depth + 1, tolerance));
        }
    }

    pub fn sample(&self, p0: Point, p1: Point, p2: Point, p3: Point) -> Vec<Point> {
        let mut out = Vec::new();
        self.sample_into(p0, p1, p2, p3, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc_like() -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ]
    }

    #[test]
    fn test_collinear_evenly_spaced_is_single_segment() {
        let sampler = CurveSampler::default();
        let pts = sampler.sample(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 3.0),
        );
        assert_eq!(pts, vec![Point::new(3.0, 3.0)]);
    }

    #[test]
    fn test_ends_at_endpoint_and_excludes_start() {
        let [p0, p1, p2, p3] = arc_like();
        let pts = CurveSampler::default().sample(p0, p1, p2, p3);
        assert!(pts.len() > 1);
        assert_ne!(pts[0], p0);
        assert_eq!(*pts.last().unwrap(), p3);
    }

    #[test]
    fn test_points_are_ordered_along_curve() {
        let [p0, p1, p2, p3] = arc_like();
        let pts = CurveSampler::default().sample(p0, p1, p2, p3);
        // x grows monotonically along this symmetric arch
        for pair in pts.windows(2) {
            assert!(pair[0].x < pair[1].x);
        }
    }

    #[test]
    fn test_tighter_tolerance_refines() {
        let [p0, p1, p2, p3] = arc_like();
        let mut previous = 0;
        for tol in [10.0, 1.0, 0.1, 0.01] {
            let count = CurveSampler::with_tolerance(tol).sample(p0, p1, p2, p3).len();
            assert!(count >= previous, "tolerance {} gave {} < {}", tol, count, previous);
            previous = count;
        }
        let coarse = CurveSampler::with_tolerance(10.0).sample(p0, p1, p2, p3).len();
        let fine = CurveSampler::with_tolerance(0.01).sample(p0, p1, p2, p3).len();
        assert!(fine > coarse);
    }

    #[test]
    fn test_tolerance_halves_per_level() {
        let sampler = CurveSampler::default();
        let tol = sampler.tolerance();
        assert_eq!(tol, DEFAULT_TOLERANCE);

        let curve = Cubic {
            p0: Point::new(0.0, 0.0),
            p1: Point::new(0.0, 0.08),
            p2: Point::new(1.0, 0.08),
            p3: Point::new(1.0, 0.0),
        };
        assert!(curve.flatness() > tol);
        // Both halves would pass the top-level tolerance but not half of it
        let (left, right) = curve.bisect();
        for half in [left, right] {
            assert!(half.flatness() > tol / 2.0 && half.flatness() <= tol);
        }

        let pts = sampler.sample(curve.p0, curve.p1, curve.p2, curve.p3);
        assert!(pts.len() > 2, "got {} points", pts.len());
        assert_eq!(*pts.last().unwrap(), curve.p3);
    }

    #[test]
    fn test_depth_bound_terminates() {
        let [p0, p1, p2, p3] = arc_like();
        let pts = CurveSampler::with_tolerance(0.0).sample(p0, p1, p2, p3);
        assert_eq!(pts.len(), 1 << MAX_DEPTH);
    }

    #[test]
    fn test_coincident_points() {
        let p = Point::new(4.0, 4.0);
        let pts = CurveSampler::default().sample(p, p, p, p);
        assert_eq!(pts, vec![p]);
    }

    #[test]
    fn test_closed_loop_curve_subdivides() {
        // Start and end coincide but the controls pull far away
        let p = Point::new(0.0, 0.0);
        let pts = CurveSampler::default().sample(p, Point::new(50.0, 50.0), Point::new(-50.0, 50.0), p);
        assert!(pts.len() > 2);
        assert_eq!(*pts.last().unwrap(), p);
    }
}
