// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface integration of refined triangles.
//!
//! Every refined triangle is lifted from the sweep plane back onto the
//! body, heighted through the terrain oracle, and accumulated into the
//! surface area and into signed prism volumes against the least-squares
//! reference plane. Positive volume is material above the plane.

use nalgebra::{Point2, Point3};
use planet_measure_delaunay::{Site, Triangle};

use crate::body::Body;
use crate::convert::{to_cartesian, to_lng_lat_height};
use crate::plane::FittedPlane;
use crate::polygon::mesh::Projection;
use crate::polygon::refine::EdgeHeights;

/// Samples per edge when searching for the reference-plane crossing.
const CROSSING_SAMPLES: usize = 32;

/// One display segment of the refined mesh, on the terrain surface.
pub type MeshSegment = (Point3<f64>, Point3<f64>);

/// Accumulates area, volumes and display segments over one attempt.
pub(crate) struct Integrator<'a> {
    projection: &'a Projection,
    plane: &'a FittedPlane,
    body: &'a dyn Body,
    height_scale: f64,

    pub area: f64,
    pub positive_volume: f64,
    pub negative_volume: f64,
    pub segments: Vec<MeshSegment>,
    pub oracle_failures: u32,
}

impl<'a> Integrator<'a> {
    pub fn new(
        projection: &'a Projection,
        plane: &'a FittedPlane,
        body: &'a dyn Body,
        height_scale: f64,
    ) -> Self {
        Self {
            projection,
            plane,
            body,
            height_scale,
            area: 0.0,
            positive_volume: 0.0,
            negative_volume: 0.0,
            segments: Vec::new(),
            oracle_failures: 0,
        }
    }

    /// Scaled terrain height above a point on the body sphere.
    pub fn surface_height(&mut self, flat: &Point3<f64>) -> f64 {
        let (ll, _) = to_lng_lat_height(flat, self.projection.radius);
        let h = self.body.height(ll) * self.height_scale;
        if !h.is_finite() {
            self.oracle_failures += 1;
        }
        h
    }

    /// Lifts a refined edge onto the terrain for display and returns the
    /// endpoint heights for the refinement pass.
    pub fn mesh_segment(&mut self, edge: &(Site, Site)) -> (f64, f64) {
        let p1 = self.projection.lift(edge.0.position());
        let p2 = self.projection.lift(edge.1.position());

        let h1 = self.surface_height(&p1);
        let h2 = self.surface_height(&p2);
        if h1.is_finite() && h2.is_finite() {
            let (l1, _) = to_lng_lat_height(&p1, self.projection.radius);
            let (l2, _) = to_lng_lat_height(&p2, self.projection.radius);
            let r1 = to_cartesian(l1, self.projection.radius, h1);
            let r2 = to_cartesian(l2, self.projection.radius, h2);
            self.segments.push((r1, r2));
        }
        (h1, h2)
    }

    /// Height of a plane coordinate above the reference plane, through
    /// its point on the body sphere.
    fn relative_height(&mut self, flat: &Point3<f64>) -> f64 {
        let h = self.surface_height(flat);
        self.plane.height_above(flat, h)
    }

    /// Adds one refined triangle to the accumulators. Triangles with
    /// missing terrain data contribute nothing.
    pub fn add_triangle(&mut self, t: &Triangle) {
        let [s1, s2, s3] = t.sites();
        let p1 = self.projection.lift(s1.position());
        let p2 = self.projection.lift(s2.position());
        let p3 = self.projection.lift(s3.position());

        let h1 = self.surface_height(&p1);
        let h2 = self.surface_height(&p2);
        let h3 = self.surface_height(&p3);
        if !(h1.is_finite() && h2.is_finite() && h3.is_finite()) {
            return;
        }

        let radius = self.projection.radius;
        let (l1, _) = to_lng_lat_height(&p1, radius);
        let (l2, _) = to_lng_lat_height(&p2, radius);
        let (l3, _) = to_lng_lat_height(&p3, radius);
        let r1 = to_cartesian(l1, radius, h1);
        let r2 = to_cartesian(l2, radius, h2);
        let r3 = to_cartesian(l3, radius, h3);

        self.area += (r2 - r1).cross(&(r3 - r1)).norm() / 2.0;

        // Heights of the corners over the reference plane.
        let hl1 = self.plane.height_above(&p1, h1);
        let hl2 = self.plane.height_above(&p2, h2);
        let hl3 = self.plane.height_above(&p3, h3);

        if (hl1 > 0.0 && hl2 > 0.0 && hl3 > 0.0) || (hl1 < 0.0 && hl2 < 0.0 && hl3 < 0.0) {
            let base = (p2 - p1).cross(&(p3 - p1)).norm() / 2.0;
            self.add_prism(base * (hl1 + hl2 + hl3) / 3.0);
            return;
        }

        // The plane cuts the triangle; locate the crossing on each edge
        // with a differing sign pair.
        let c12 = if (hl1 > 0.0) != (hl2 > 0.0) {
            self.find_crossing(&p1, &p2, hl1)
        } else {
            None
        };
        let c13 = if (hl1 > 0.0) != (hl3 > 0.0) {
            self.find_crossing(&p1, &p3, hl1)
        } else {
            None
        };
        let c23 = if (hl2 > 0.0) != (hl3 > 0.0) {
            self.find_crossing(&p2, &p3, hl2)
        } else {
            None
        };

        match (c12, c13, c23) {
            (Some(m1), Some(m2), None) => {
                // Corner 1 is alone on its side of the plane.
                let tri = (m1 - p1).cross(&(m2 - p1)).norm() / 2.0;
                let quad = (m1 - p3).cross(&(m2 - p3)).norm() / 2.0
                    + (m1 - p2).cross(&(p3 - p2)).norm() / 2.0;
                self.add_split(hl1, hl2, hl3, tri, quad);
            }
            (Some(m1), None, Some(m3)) => {
                // Corner 2 is alone.
                let tri = (m1 - p2).cross(&(m3 - p2)).norm() / 2.0;
                let quad = (m1 - p1).cross(&(m3 - p1)).norm() / 2.0
                    + (m3 - p3).cross(&(p1 - p3)).norm() / 2.0;
                self.add_split(hl2, hl1, hl3, tri, quad);
            }
            (None, Some(m2), Some(m3)) => {
                // Corner 3 is alone.
                let tri = (m3 - p3).cross(&(m2 - p3)).norm() / 2.0;
                let quad = (m2 - p2).cross(&(m3 - p2)).norm() / 2.0
                    + (m2 - p1).cross(&(p2 - p1)).norm() / 2.0;
                self.add_split(hl3, hl1, hl2, tri, quad);
            }
            _ => {
                // Zero or three crossings found; treat as a single prism.
                let base = (p2 - p1).cross(&(p3 - p1)).norm() / 2.0;
                self.add_prism(base * (hl1 + hl2 + hl3) / 3.0);
            }
        }
    }

    fn add_prism(&mut self, volume: f64) {
        if !volume.is_finite() {
            return;
        }
        if volume > 0.0 {
            self.positive_volume += volume;
        } else {
            self.negative_volume += volume;
        }
    }

    /// Books the prisms of a split triangle: the lone corner's triangle
    /// against the quadrilateral under the remaining two corners.
    fn add_split(&mut self, lone: f64, other_a: f64, other_b: f64, tri: f64, quad: f64) {
        let tri_vol = tri * lone / 3.0;
        let quad_vol = quad * (other_a + other_b) / 4.0;
        if !tri_vol.is_finite() || !quad_vol.is_finite() {
            return;
        }
        if lone > 0.0 {
            self.positive_volume += tri_vol;
            self.negative_volume += quad_vol;
        } else {
            self.negative_volume += tri_vol;
            self.positive_volume += quad_vol;
        }
    }

    /// Walks an edge in small steps, looking for the sample pair between
    /// which the height over the reference plane changes sign, then
    /// interpolates linearly between the two samples.
    fn find_crossing(
        &mut self,
        pa: &Point3<f64>,
        pb: &Point3<f64>,
        hla: f64,
    ) -> Option<Point3<f64>> {
        let radius = self.projection.radius;
        let mut p_old = Point3::origin();
        let mut hl_old = 0.0;

        for i in 0..CROSSING_SAMPLES {
            let frac = i as f64 / CROSSING_SAMPLES as f64;
            let p = Point3::from(
                (pa.coords * (1.0 - frac) + pb.coords * frac).normalize() * radius,
            );
            let hl = self.relative_height(&p);
            if !hl.is_finite() {
                return None;
            }
            if (hla > 0.0) != (hl > 0.0) {
                let denom = hl - hl_old;
                if denom == 0.0 {
                    return Some(p);
                }
                return Some(p_old - (p - p_old) * hl_old / denom);
            }
            p_old = p;
            hl_old = hl;
        }
        None
    }
}

/// The terrain pass samples edge heights through the integrator so the
/// lifted geometry and failure accounting stay in one place.
impl EdgeHeights for Integrator<'_> {
    fn height_at(&mut self, x: f64, y: f64) -> f64 {
        let p = self.projection.lift(Point2::new(x, y));
        self.surface_height(&p)
    }
}
