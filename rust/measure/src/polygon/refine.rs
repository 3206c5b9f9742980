// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adaptive refinement of interior triangles.
//!
//! Each interior triangle of the polygon triangulation owns a growing
//! site list. Two passes add sites: a sleekness pass splitting the long
//! side of thin sub-triangles, and a terrain pass splitting sub-edges
//! whose midpoint height disagrees with linear interpolation by more
//! than the configured ratio.

use planet_measure_delaunay::{Site, VoronoiGenerator};
use rustc_hash::FxHashSet;

/// Splits the longest side of every sub-triangle whose minimum angle is
/// below `min_angle` (radians), deduplicated per side.
///
/// Returns `true` when the pass added more than 1.5 times the previous
/// site count, signalling the caller to skip terrain refinement for this
/// attempt.
pub(crate) fn check_sleekness(sites: &mut Vec<Site>, min_angle: f64) -> bool {
    let previous = sites.len();

    let mut voronoi = VoronoiGenerator::new();
    voronoi.parse(sites);

    // Ratio of two sides in a triangle at the angle limit.
    let sleekness1 = 1.0 / min_angle.sin();
    // Ratio between the two shorter sides combined and the long side.
    let sleekness2 = 1.0 / min_angle.cos();

    let mut added: FxHashSet<(u16, u16)> = FxHashSet::default();

    for t in voronoi.triangles() {
        let [s1, s2, s3] = t.sites();

        let len1 = (s1.position() - s2.position()).norm();
        let len2 = (s1.position() - s3.position()).norm();
        let len3 = (s2.position() - s3.position()).norm();

        let mut split = |a: Site, b: Site, sites: &mut Vec<Site>| {
            let key = (a.addr.min(b.addr), a.addr.max(b.addr));
            if added.insert(key) {
                sites.push(Site::new(
                    0.5 * (a.x + b.x),
                    0.5 * (a.y + b.y),
                    sites.len() as u16,
                ));
            }
        };

        // Side 1..2 is too long compared to the other two.
        if len2 * sleekness1 < len1 || len3 * sleekness1 < len1 || len2 + len3 < len1 * sleekness2
        {
            split(s1, s2, sites);
        }
        // Side 1..3.
        if len1 * sleekness1 < len2 || len3 * sleekness1 < len2 || len1 + len3 < len2 * sleekness2
        {
            split(s1, s3, sites);
        }
        // Side 2..3.
        if len1 * sleekness1 < len3 || len2 * sleekness1 < len3 || len1 + len2 < len3 * sleekness2
        {
            split(s2, s3, sites);
        }
    }

    (added.len() as f64) > 1.5 * previous as f64
}

/// Context for the terrain pass: heights along one sub-edge are read
/// through this callback (already height-scaled).
pub(crate) trait EdgeHeights {
    /// Terrain height above the plane coordinate `(x, y)`.
    fn height_at(&mut self, x: f64, y: f64) -> f64;
}

/// Returns `true` when the two heights disagree by more than `limit` as
/// a ratio. `NaN` never triggers a split.
fn mismatch(a: f64, b: f64, limit: f64) -> bool {
    a / b > limit || b / a > limit
}

/// Terrain pass over one sub-edge with endpoint heights `h1`, `h2`.
///
/// Checks the midpoint first, then the third- and quarter-points, and
/// pushes every offending sample point into the site list. Clears
/// `fine` whenever a site is added.
pub(crate) fn refine_edge(
    edge: (&Site, &Site),
    h1: f64,
    h2: f64,
    heights: &mut dyn EdgeHeights,
    limit: f64,
    sites: &mut Vec<Site>,
    fine: &mut bool,
) {
    if !h1.is_finite() || !h2.is_finite() {
        return;
    }
    let (a, b) = edge;

    let mid_x = 0.5 * (a.x + b.x);
    let mid_y = 0.5 * (a.y + b.y);
    let h_mid = heights.height_at(mid_x, mid_y);
    if !h_mid.is_finite() {
        return;
    }

    if mismatch(h_mid, 0.5 * (h1 + h2), limit) {
        sites.push(Site::new(mid_x, mid_y, sites.len() as u16));
        *fine = false;
        return;
    }

    // Trisecting and quartering points, skipped as soon as any level of
    // this edge has added a site.
    for j in 3..6 {
        if !*fine {
            return;
        }
        for i in 1..j {
            let fi = i as f64;
            let fj = j as f64;
            let x = (fi * a.x + (fj - fi) * b.x) / fj;
            let y = (fi * a.y + (fj - fi) * b.y) / fj;
            let h = heights.height_at(x, y);
            if !h.is_finite() {
                continue;
            }
            let linear = (fi * h1 + (fj - fi) * h2) / fj;
            if mismatch(h, linear, limit) {
                sites.push(Site::new(x, y, sites.len() as u16));
                *fine = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FnHeights<F: FnMut(f64, f64) -> f64>(F);

    impl<F: FnMut(f64, f64) -> f64> EdgeHeights for FnHeights<F> {
        fn height_at(&mut self, x: f64, y: f64) -> f64 {
            (self.0)(x, y)
        }
    }

    #[test]
    fn well_shaped_triangle_is_left_alone() {
        let mut sites = vec![
            Site::new(0.0, 0.0, 0),
            Site::new(1.0, 0.0, 1),
            Site::new(0.5, 0.866, 2),
        ];
        let overflow = check_sleekness(&mut sites, 15f64.to_radians());
        assert!(!overflow);
        assert_eq!(sites.len(), 3);
    }

    #[test]
    fn sleek_triangle_gets_its_long_side_split() {
        let mut sites = vec![
            Site::new(0.0, 0.0, 0),
            Site::new(1.0, 0.0, 1),
            Site::new(0.5, 0.02, 2),
        ];
        check_sleekness(&mut sites, 15f64.to_radians());
        assert!(sites.len() > 3);
        // The added site splits the long bottom side.
        let added = &sites[3];
        assert!((added.x - 0.5).abs() < 1e-9);
        assert!(added.y.abs() < 0.011);
    }

    #[test]
    fn flat_heights_do_not_refine() {
        let a = Site::new(0.0, 0.0, 0);
        let b = Site::new(1.0, 0.0, 1);
        let mut sites = vec![a, b];
        let mut fine = true;
        refine_edge(
            (&a, &b),
            5.0,
            5.0,
            &mut FnHeights(|_, _| 5.0),
            1.002,
            &mut sites,
            &mut fine,
        );
        assert!(fine);
        assert_eq!(sites.len(), 2);
    }

    #[test]
    fn midpoint_mismatch_adds_the_midpoint() {
        let a = Site::new(0.0, 0.0, 0);
        let b = Site::new(1.0, 0.0, 1);
        let mut sites = vec![a, b];
        let mut fine = true;
        refine_edge(
            (&a, &b),
            5.0,
            5.0,
            &mut FnHeights(|x, _| if (x - 0.5).abs() < 0.01 { 6.0 } else { 5.0 }),
            1.002,
            &mut sites,
            &mut fine,
        );
        assert!(!fine);
        assert_eq!(sites.len(), 3);
        assert!((sites[2].x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn nan_heights_never_refine() {
        let a = Site::new(0.0, 0.0, 0);
        let b = Site::new(1.0, 0.0, 1);
        let mut sites = vec![a, b];
        let mut fine = true;
        refine_edge(
            (&a, &b),
            5.0,
            5.0,
            &mut FnHeights(|_, _| f64::NAN),
            1.002,
            &mut sites,
            &mut fine,
        );
        assert!(fine);
        assert_eq!(sites.len(), 2);
    }

    #[test]
    fn zero_against_nonzero_refines() {
        let a = Site::new(0.0, 0.0, 0);
        let b = Site::new(1.0, 0.0, 1);
        let mut sites = vec![a, b];
        let mut fine = true;
        refine_edge(
            (&a, &b),
            4.0,
            4.0,
            &mut FnHeights(|_, _| 0.0),
            1.002,
            &mut sites,
            &mut fine,
        );
        // The interpolated height is 4, the sampled one 0; the ratio
        // blows up and the midpoint is inserted.
        assert!(!fine);
    }
}
