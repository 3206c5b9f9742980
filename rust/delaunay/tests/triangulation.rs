// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural invariants of the sweep over larger site sets.

use planet_measure_delaunay::{Site, VoronoiGenerator};
use rustc_hash::FxHashSet;

/// Deterministically jittered grid, clear of cocircular degeneracies.
fn jittered_grid(cols: u16, rows: u16) -> Vec<Site> {
    let mut sites = Vec::new();
    let mut state = 0x2545f491u32;
    let mut jitter = || {
        // Small xorshift, plenty for test jitter.
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        f64::from(state % 1000) / 1000.0 * 0.2 - 0.1
    };

    let mut addr = 0;
    for i in 0..cols {
        for j in 0..rows {
            sites.push(Site::new(
                f64::from(i) + jitter(),
                f64::from(j) + jitter(),
                addr,
            ));
            addr += 1;
        }
    }
    sites
}

#[test]
fn every_site_joins_the_triangulation() {
    let sites = jittered_grid(6, 5);
    let mut gen = VoronoiGenerator::new();
    gen.parse(&sites);

    let mut seen = vec![false; sites.len()];
    for (a, b) in gen.delaunay_edges() {
        assert_ne!(a.addr, b.addr);
        seen[a.addr as usize] = true;
        seen[b.addr as usize] = true;
    }
    assert!(seen.iter().all(|&s| s));

    for t in gen.triangles() {
        for s in t.sites() {
            assert!((s.addr as usize) < sites.len());
        }
    }
}

#[test]
fn voronoi_edges_stay_finite() {
    let sites = jittered_grid(5, 5);
    let mut gen = VoronoiGenerator::new();
    gen.parse(&sites);

    assert!(!gen.voronoi_edges().is_empty());
    for (a, b) in gen.voronoi_edges() {
        for v in [a, b] {
            assert!(v.x.is_finite() && v.y.is_finite());
        }
    }
}

#[test]
fn neighbor_map_is_symmetric() {
    let sites = jittered_grid(4, 4);
    let mut gen = VoronoiGenerator::new();
    gen.parse(&sites);

    let neighbors = gen.neighbors();
    assert_eq!(neighbors.len(), sites.len());
    for (&addr, list) in neighbors {
        assert!(!list.is_empty());
        for other in list {
            assert!(
                neighbors[&other.addr].iter().any(|s| s.addr == addr),
                "site {} lists {} but not the reverse",
                addr,
                other.addr
            );
        }
    }
}

#[test]
fn triangle_count_matches_euler_for_a_dense_set() {
    // For a triangulated planar point set, every interior Delaunay
    // vertex event produces one triangle; the exact count varies with
    // hull shape but is bounded by 2n.
    let sites = jittered_grid(6, 6);
    let mut gen = VoronoiGenerator::new();
    gen.parse(&sites);

    let n = sites.len();
    assert!(gen.triangles().len() > n / 2);
    assert!(gen.triangles().len() < 2 * n);

    let unique: FxHashSet<(u16, u16, u16)> = gen
        .triangles()
        .iter()
        .map(|t| {
            let mut a = [t.0.addr, t.1.addr, t.2.addr];
            a.sort_unstable();
            (a[0], a[1], a[2])
        })
        .collect();
    assert_eq!(unique.len(), gen.triangles().len(), "duplicate triangles");
}

#[test]
fn repeated_parses_are_independent() {
    let mut gen = VoronoiGenerator::new();
    gen.parse(&jittered_grid(5, 4));
    let first = gen.triangles().len();

    gen.parse(&jittered_grid(3, 3));
    let second = gen.triangles().len();
    assert!(second < first);

    gen.parse(&jittered_grid(5, 4));
    assert_eq!(gen.triangles().len(), first);
}
