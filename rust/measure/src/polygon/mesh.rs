// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projection of polygon corners into the sweep plane and recovery of
//! boundary edges in the triangulation.
//!
//! The corners are projected onto the tangent plane through the polygon
//! center and scaled into the unit disk. The Delaunay triangulation of a
//! concave polygon may miss boundary edges; those are recovered by
//! inserting the points where the triangulation crosses the missing edge
//! and sweeping again, a bounded number of times.

use nalgebra::{Point2, Point3, Vector3};
use planet_measure_delaunay::{Site, Triangle, VoronoiGenerator};

/// Fuzzy band around polygon edges for the interior test, in projected
/// disk coordinates.
const EDGE_BAND: f64 = 0.001;

/// Relative distance to segment endpoints below which an intersection is
/// discarded, keeping recovery clear of near-degenerate splits.
const SAFETY_BAND: f64 = 0.01;

/// Edge recovery gives up after this many sweeps.
const MAX_EDGE_RECOVERY: u32 = 5;

/// The tangent-plane coordinate frame of one polygon computation.
#[derive(Debug, Clone)]
pub(crate) struct Projection {
    /// Point where the plane touches the sphere.
    pub middle: Point3<f64>,
    /// Outward unit normal through the polygon center.
    pub normal: Vector3<f64>,
    pub east: Vector3<f64>,
    pub north: Vector3<f64>,
    /// Scale that maps plane coordinates into the unit disk, with a 1.2
    /// margin; breakpoint arithmetic turns unstable near the horizon.
    pub max_dist: f64,
    pub radius: f64,
}

impl Projection {
    /// Builds the frame for the given heighted corner positions, or
    /// `None` when the polygon spans a hemisphere or more.
    pub fn new(positions: &[Point3<f64>], radius: f64) -> Option<Self> {
        let mut centroid = Vector3::zeros();
        for p in positions {
            centroid += p.coords / positions.len() as f64;
        }

        let mut dist = 0.0f64;
        for p in positions {
            dist = dist.max((p.coords - centroid).norm());
        }
        if dist >= radius {
            return None;
        }
        let max_dist = 1.2 * dist * radius / (radius * radius - dist * dist).sqrt();
        if !(max_dist > 0.0) || !max_dist.is_finite() {
            return None;
        }

        let normal = centroid.normalize();
        let north = if normal.y != 0.0 && normal.x * normal.x + normal.z * normal.z > 0.0 {
            let y_north = (normal.x * normal.x + normal.z * normal.z) / normal.y;
            if y_north < 0.0 {
                // Southern hemisphere, keep the frame's y axis pointing up.
                Vector3::new(normal.x, -y_north, normal.z).normalize()
            } else {
                Vector3::new(-normal.x, y_north, -normal.z).normalize()
            }
        } else if normal.y == 0.0 {
            Vector3::y()
        } else {
            // Exactly at a pole; any horizontal direction serves as north.
            Vector3::z()
        };
        let east = -normal.cross(&north);

        Some(Self {
            middle: Point3::from(normal * radius),
            normal,
            east,
            north,
            max_dist,
            radius,
        })
    }

    /// Plane coordinates of a corner position, in units of `max_dist`.
    pub fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        let denom = self.normal.dot(&p.coords);
        let k = self.normal.dot(&self.middle.coords) / denom;
        let rel = p.coords * k - self.middle.coords;
        Point2::new(
            self.east.dot(&rel) / self.max_dist,
            self.north.dot(&rel) / self.max_dist,
        )
    }

    /// The point on the body sphere under a plane coordinate.
    pub fn lift(&self, s: Point2<f64>) -> Point3<f64> {
        let v = self.middle.coords + self.max_dist * (s.x * self.east + s.y * self.north);
        Point3::from(v.normalize() * self.radius)
    }
}

/// Projects corner positions into sites, filtering consecutive duplicate
/// positions and assigning sequential addresses. `None` when any
/// projected coordinate is not finite.
pub(crate) fn project_corners(
    proj: &Projection,
    positions: &[Point3<f64>],
) -> Option<Vec<Site>> {
    let mut corners = Vec::with_capacity(positions.len());
    let mut last: Option<Point3<f64>> = None;
    let mut addr = 0u16;
    for p in positions {
        if last.map_or(false, |l| l == *p) {
            continue;
        }
        let s = proj.project(p);
        if !s.x.is_finite() || !s.y.is_finite() {
            return None;
        }
        corners.push(Site::new(s.x, s.y, addr));
        last = Some(*p);
        addr += 1;
    }
    Some(corners)
}

/// Half-line crossing test with a fuzzy band on near-edge cases.
pub(crate) fn point_in_polygon(corners: &[Site], p: Point2<f64>) -> bool {
    let n = corners.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let ci = &corners[i];
        let cj = &corners[j];
        if (ci.y > p.y) != (cj.y > p.y) {
            let cross_x = (cj.x - ci.x) * (p.y - ci.y) / (cj.y - ci.y) + ci.x;
            if p.x < cross_x || (p.x - cross_x).abs() < EDGE_BAND {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Intersection of segments `s1..s2` and `s3..s4` in closed form.
///
/// Rejects intersections within [`SAFETY_BAND`] relative distance of any
/// endpoint, and any configuration the slope-intercept arithmetic cannot
/// express (vertical segments, endpoints on an axis).
pub(crate) fn segment_intersection(
    s1: &Site,
    s2: &Site,
    s3: &Site,
    s4: &Site,
) -> Option<Point2<f64>> {
    // The relative endpoint test below divides by every coordinate.
    if s1.x == 0.0
        || s2.x == 0.0
        || s3.x == 0.0
        || s4.x == 0.0
        || s1.y == 0.0
        || s2.y == 0.0
        || s3.y == 0.0
        || s4.y == 0.0
    {
        return None;
    }

    let m1 = (s2.y - s1.y) / (s2.x - s1.x);
    let c1 = s1.y - m1 * s1.x;
    let m2 = (s4.y - s3.y) / (s4.x - s3.x);
    let c2 = s3.y - m2 * s3.x;

    if m1 == m2 {
        return None;
    }
    let x = (c2 - c1) / (m1 - m2);
    let y = m1 * x + c1;

    let on_both = (s1.x > x) != (s2.x > x)
        && (s3.x > x) != (s4.x > x)
        && (s1.y > y) != (s2.y > y)
        && (s3.y > y) != (s4.y > y);
    if !on_both {
        return None;
    }

    let clear = |s: &Site| {
        ((s.x - x) / s.x).abs() > SAFETY_BAND || ((s.y - y) / s.y).abs() > SAFETY_BAND
    };
    if clear(s1) && clear(s2) && clear(s3) && clear(s4) {
        Some(Point2::new(x, y))
    } else {
        None
    }
}

pub(crate) struct MeshOutcome {
    pub triangles: Vec<Triangle>,
    /// Whether every boundary edge ended up in the triangulation.
    pub edges_ok: bool,
    pub iterations: u32,
}

/// Triangulates the corner ring and recovers missing boundary edges.
///
/// Each iteration sweeps the current ring, checks that every pair of
/// cyclically adjacent addresses shares a Delaunay edge, and otherwise
/// splices the crossing points of each missing edge into the ring for
/// the next sweep. `corners` holds the final ring afterwards.
pub(crate) fn build_mesh(corners: &mut Vec<Site>) -> MeshOutcome {
    let mut voronoi = VoronoiGenerator::new();
    let mut triangles = Vec::new();
    let mut edges_ok = false;
    let mut iterations = 0;

    while !edges_ok && iterations < MAX_EDGE_RECOVERY {
        iterations += 1;

        voronoi.parse(corners);
        triangles = voronoi.triangles().to_vec();

        let n = corners.len();
        let mut found = vec![false; n];
        for (a, b) in voronoi.delaunay_edges() {
            let lo = a.addr.min(b.addr) as usize;
            let hi = a.addr.max(b.addr) as usize;
            if hi == lo + 1 {
                found[lo] = true;
            } else if lo == 0 && hi == n - 1 {
                found[n - 1] = true;
            }
        }
        if found.iter().all(|&f| f) {
            edges_ok = true;
            break;
        }

        // Collect the triangulation's crossings of every missing edge,
        // ordered outward from the edge's first corner.
        let mut added: Vec<Vec<(f64, Point2<f64>)>> = vec![Vec::new(); n];
        let mut any = false;
        for i in 0..n {
            if found[i] {
                continue;
            }
            let s1 = corners[i];
            let s2 = corners[(i + 1) % n];
            for (a, b) in voronoi.delaunay_edges() {
                if let Some(p) = segment_intersection(&s1, &s2, a, b) {
                    let t = (p - s1.position()).norm_squared();
                    added[i].push((t, p));
                    any = true;
                }
            }
        }
        if !any {
            break;
        }

        // Splice the crossings into the ring and re-address it.
        let mut merged: Vec<Point2<f64>> = Vec::with_capacity(n + 4);
        for (i, crossings) in added.iter_mut().enumerate() {
            merged.push(corners[i].position());
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (_, p) in crossings.iter() {
                if merged.last() != Some(p) {
                    merged.push(*p);
                }
            }
        }
        *corners = merged
            .iter()
            .enumerate()
            .map(|(i, p)| Site::new(p.x, p.y, i as u16))
            .collect();
    }

    if !edges_ok {
        log::warn!(
            "area calculation can be false: concave or self-intersecting polygon, \
             check the triangulation mesh"
        );
    }

    MeshOutcome {
        triangles,
        edges_ok,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_sites() -> Vec<Site> {
        vec![
            Site::new(0.1, 0.1, 0),
            Site::new(0.9, 0.1, 1),
            Site::new(0.9, 0.9, 2),
            Site::new(0.1, 0.9, 3),
        ]
    }

    #[test]
    fn interior_test_square() {
        let sq = square_sites();
        assert!(point_in_polygon(&sq, Point2::new(0.5, 0.5)));
        assert!(!point_in_polygon(&sq, Point2::new(1.5, 0.5)));
        assert!(!point_in_polygon(&sq, Point2::new(0.5, -0.2)));
    }

    #[test]
    fn interior_test_is_orientation_independent() {
        let mut sq = square_sites();
        sq.reverse();
        assert!(point_in_polygon(&sq, Point2::new(0.5, 0.5)));
        assert!(!point_in_polygon(&sq, Point2::new(-0.5, 0.5)));
    }

    #[test]
    fn crossing_segments_intersect() {
        let p = segment_intersection(
            &Site::new(0.1, 0.1, 0),
            &Site::new(0.9, 0.9, 1),
            &Site::new(0.1, 0.9, 2),
            &Site::new(0.9, 0.1, 3),
        )
        .expect("diagonals cross");
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(segment_intersection(
            &Site::new(0.1, 0.1, 0),
            &Site::new(0.2, 0.2, 1),
            &Site::new(0.8, 0.1, 2),
            &Site::new(0.9, 0.3, 3),
        )
        .is_none());
    }

    #[test]
    fn near_endpoint_intersections_are_rejected() {
        // Crossing within 1% of an endpoint falls into the safety band.
        assert!(segment_intersection(
            &Site::new(0.5, 0.1, 0),
            &Site::new(0.5004, 0.9, 1),
            &Site::new(0.1, 0.1001, 2),
            &Site::new(0.9, 0.1002, 3),
        )
        .is_none());
    }

    #[test]
    fn convex_ring_recovers_in_one_iteration() {
        let mut corners = square_sites();
        let outcome = build_mesh(&mut corners);
        assert!(outcome.edges_ok);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.triangles.len(), 2);
        assert_eq!(corners.len(), 4);
    }

    #[test]
    fn projection_round_trips_the_center() {
        let positions = [
            Point3::new(0.1, 0.1, 1.0),
            Point3::new(-0.1, 0.1, 1.0),
            Point3::new(-0.1, -0.1, 1.0),
            Point3::new(0.1, -0.1, 1.0),
        ];
        let proj = Projection::new(&positions, 1.0).expect("fits in a hemisphere");
        // The basis is right-handed and orthonormal.
        assert_relative_eq!(proj.east.norm(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(proj.north.norm(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(proj.east.dot(&proj.north), 0.0, epsilon = 1e-9);
        assert_relative_eq!(proj.east.dot(&proj.normal), 0.0, epsilon = 1e-9);

        let lifted = proj.lift(Point2::new(0.0, 0.0));
        assert_relative_eq!((lifted - proj.middle).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn oversize_polygon_is_rejected() {
        let positions = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.1, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        assert!(Projection::new(&positions, 1.0).is_none());
    }
}
