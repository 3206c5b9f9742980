// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Least-squares plane fitting.
//!
//! Both the polygon volume reference and the dip and strike tool fit the
//! plane minimizing squared vertical residuals through a set of heighted
//! surface points. The fit solves the 3x3 normal-equation system for
//! `z = a*x + b*y + c` in coordinates relative to the point centroid.

use nalgebra::{Matrix3, Point3, Vector3};

/// A fitted reference plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedPlane {
    /// Unit normal, flipped so it points away from the body center.
    pub normal: Vector3<f64>,
    /// A point on the plane.
    pub middle: Point3<f64>,
    /// The constant term of the fit, in units of the body radius.
    pub offset: f64,
    /// Largest distance of any input point from the centroid.
    pub size: f64,
}

impl FittedPlane {
    /// Fits the plane through `positions` (heighted cartesian points).
    ///
    /// `ideal` is the outward direction used to orient the normal;
    /// `radius` scales the offset back into meters. Degenerate inputs
    /// (fewer than three points, collinear points) fall back to the
    /// plane through the centroid with the ideal normal.
    pub fn fit(positions: &[Point3<f64>], ideal: Vector3<f64>, radius: f64) -> Self {
        let mut centroid = Vector3::zeros();
        for p in positions {
            centroid += p.coords / positions.len() as f64;
        }
        let centroid = Point3::from(centroid);

        let mut size = 0.0f64;
        let mut mat = Matrix3::<f64>::zeros();
        let mut vec = Vector3::<f64>::zeros();
        for p in positions {
            let rel = p - centroid;
            size = size.max(rel.norm());

            mat[(0, 0)] += rel.x * rel.x;
            mat[(0, 1)] += rel.x * rel.y;
            mat[(0, 2)] += rel.x;
            mat[(1, 0)] += rel.x * rel.y;
            mat[(1, 1)] += rel.y * rel.y;
            mat[(1, 2)] += rel.y;
            mat[(2, 0)] += rel.x;
            mat[(2, 1)] += rel.y;
            mat[(2, 2)] += 1.0;

            vec.x += rel.x * rel.z;
            vec.y += rel.y * rel.z;
            vec.z += rel.z;
        }

        let solution = if positions.len() > 2 {
            mat.try_inverse().map(|inv| inv * vec)
        } else {
            None
        };

        match solution {
            Some(s) if s.x.is_finite() && s.y.is_finite() && s.z.is_finite() => {
                let mut normal = Vector3::new(-s.x, -s.y, 1.0).normalize();
                if normal.dot(&ideal) < 0.0 {
                    normal = -normal;
                }
                FittedPlane {
                    normal,
                    middle: centroid + normal * radius * s.z,
                    offset: s.z,
                    size,
                }
            }
            _ => FittedPlane {
                normal: ideal,
                middle: centroid,
                offset: 0.0,
                size,
            },
        }
    }

    /// Height of a surface point above this plane.
    ///
    /// `surface` is the point projected onto the body sphere (no terrain
    /// height), `height` the terrain height at that point. The plane is
    /// intersected along the ray from the body center through `surface`.
    pub fn height_above(&self, surface: &Point3<f64>, height: f64) -> f64 {
        let denom = self.normal.dot(&surface.coords);
        if denom.abs() < f64::EPSILON {
            return height;
        }
        let k = self.normal.dot(&self.middle.coords) / denom;
        height - (k - 1.0) * self.middle.coords.norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flat_points_fit_a_horizontal_plane() {
        // Points in the z = 5 plane; "up" is +z here.
        let pts = [
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(1.0, 0.0, 5.0),
            Point3::new(0.0, 1.0, 5.0),
            Point3::new(1.0, 1.0, 5.0),
        ];
        let plane = FittedPlane::fit(&pts, Vector3::z(), 1.0);
        assert_relative_eq!(plane.normal.z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(plane.normal.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(plane.offset, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn tilted_points_recover_the_slope() {
        // z = 0.5 * x tilt.
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 1.0),
        ];
        let plane = FittedPlane::fit(&pts, Vector3::z(), 1.0);
        let expected = Vector3::new(-0.5, 0.0, 1.0).normalize();
        assert_relative_eq!(plane.normal.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(plane.normal.z, expected.z, epsilon = 1e-9);
    }

    #[test]
    fn collinear_points_fall_back_to_the_ideal_normal() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        let plane = FittedPlane::fit(&pts, Vector3::z(), 1.0);
        assert_eq!(plane.normal, Vector3::z());
        assert_eq!(plane.offset, 0.0);
    }

    #[test]
    fn two_points_fall_back() {
        let pts = [Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0)];
        let plane = FittedPlane::fit(&pts, Vector3::z(), 1.0);
        assert_eq!(plane.normal, Vector3::z());
    }
}
