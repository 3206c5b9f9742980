// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The beach line: arcs and breakpoints under the sweep.
//!
//! Arcs and breakpoints are owned by per-sweep slot maps and wired up with
//! [`ArcKey`]/[`BreakKey`] instead of pointers. Breakpoints additionally
//! form a binary search tree ordered by their current x position, which
//! changes as the sweep advances but never reorders between two events.
//! Positions are therefore cached per sweep value and recomputed lazily.

use nalgebra::{Point2, Vector2};
use slotmap::SlotMap;

use crate::keys::{ArcKey, BreakKey};
use crate::site::Site;

/// Two finished endpoints of a Voronoi edge.
pub type VoronoiEdge = (Point2<f64>, Point2<f64>);

/// Below this distance from the sweep line a parabola degenerates into a
/// vertical ray through its focus.
const DEGENERATE_EPS: f64 = 1e-12;

/// A parabolic arc, identified by its focus site.
#[derive(Debug)]
pub(crate) struct Arc {
    pub site: Site,
    pub left_break: Option<BreakKey>,
    pub right_break: Option<BreakKey>,
    /// Bumped whenever the arc's pending circle event is replaced or
    /// invalidated. A queued event snapshots the value and is dead as
    /// soon as the arc has moved on.
    pub generation: u64,
}

impl Arc {
    fn new(site: Site) -> Self {
        Self {
            site,
            left_break: None,
            right_break: None,
            generation: 0,
        }
    }
}

/// A breakpoint between two adjacent arcs, doubling as a BST node.
#[derive(Debug)]
pub(crate) struct Breakpoint {
    pub left_arc: ArcKey,
    pub right_arc: ArcKey,
    /// Where the breakpoint first appeared; the Voronoi edge it traces
    /// runs from here to wherever the breakpoint dies.
    pub start: Point2<f64>,
    parent: Option<BreakKey>,
    left_child: Option<BreakKey>,
    right_child: Option<BreakKey>,
    cached_sweep: f64,
    cached_pos: Point2<f64>,
}

/// Outcome of inserting an arc for a site event.
pub(crate) struct Insertion {
    pub new_arc: ArcKey,
    /// The Delaunay edge between the new site and the focus of the arc
    /// it landed on. `None` for the very first arc.
    pub delaunay_edge: Option<(Site, Site)>,
}

/// Outcome of removing an arc at a circle event.
pub(crate) struct Removal {
    pub left: Option<ArcKey>,
    pub right: Option<ArcKey>,
    pub delaunay_edge: Option<(Site, Site)>,
    pub voronoi_edges: [Option<VoronoiEdge>; 2],
}

#[derive(Debug, Default)]
pub(crate) struct Beachline {
    arcs: SlotMap<ArcKey, Arc>,
    breaks: SlotMap<BreakKey, Breakpoint>,
    root_arc: Option<ArcKey>,
    tree_root: Option<BreakKey>,
}

impl Beachline {
    pub fn new() -> Self {
        Self {
            arcs: SlotMap::with_key(),
            breaks: SlotMap::with_key(),
            root_arc: None,
            tree_root: None,
        }
    }

    pub fn contains(&self, arc: ArcKey) -> bool {
        self.arcs.contains_key(arc)
    }

    pub fn site(&self, arc: ArcKey) -> Site {
        self.arcs[arc].site
    }

    pub fn generation(&self, arc: ArcKey) -> u64 {
        self.arcs[arc].generation
    }

    /// Invalidates the arc's pending circle event (if any) and returns the
    /// new generation value for the next event to snapshot.
    pub fn bump_generation(&mut self, arc: ArcKey) -> u64 {
        let g = &mut self.arcs[arc].generation;
        *g += 1;
        *g
    }

    pub fn left_neighbor(&self, arc: ArcKey) -> Option<ArcKey> {
        self.arcs[arc]
            .left_break
            .map(|b| self.breaks[b].left_arc)
    }

    pub fn right_neighbor(&self, arc: ArcKey) -> Option<ArcKey> {
        self.arcs[arc]
            .right_break
            .map(|b| self.breaks[b].right_arc)
    }

    /// The arcs immediately left and right of `arc`, when both exist.
    pub fn neighborhood(&self, arc: ArcKey) -> Option<(ArcKey, ArcKey)> {
        let a = self.arcs.get(arc)?;
        let lb = a.left_break?;
        let rb = a.right_break?;
        Some((self.breaks[lb].left_arc, self.breaks[rb].right_arc))
    }

    /// Inserts an arc for a site event at the current sweep value.
    pub fn insert_arc(&mut self, site: Site, sweep: f64) -> Insertion {
        let Some(root) = self.root_arc else {
            let key = self.arcs.insert(Arc::new(site));
            self.root_arc = Some(key);
            return Insertion {
                new_arc: key,
                delaunay_edge: None,
            };
        };

        let broken = if self.tree_root.is_none() {
            root
        } else {
            self.arc_at(site.x, sweep)
        };
        self.bump_generation(broken);
        let broken_site = self.arcs[broken].site;

        let new_arc = self.arcs.insert(Arc::new(site));

        if site.y == broken_site.y {
            // The new site sits at the exact focus height of the broken
            // arc; the two arcs meet in a single breakpoint.
            if site.x < broken_site.x {
                let bp = self.new_breakpoint(new_arc, broken, sweep);
                self.arcs[new_arc].right_break = Some(bp);
                self.arcs[broken].left_break = Some(bp);
                self.tree_insert(bp, sweep);
            } else {
                let bp = self.new_breakpoint(broken, new_arc, sweep);
                self.arcs[new_arc].left_break = Some(bp);
                self.arcs[broken].right_break = Some(bp);
                self.tree_insert(bp, sweep);
            }
        } else {
            // Split the broken arc; it keeps the left half, a fresh arc
            // with the same focus becomes the right half.
            let right_half = self.arcs.insert(Arc::new(broken_site));
            let left_bp = self.new_breakpoint(broken, new_arc, sweep);
            let right_bp = self.new_breakpoint(new_arc, right_half, sweep);

            self.arcs[new_arc].left_break = Some(left_bp);
            self.arcs[new_arc].right_break = Some(right_bp);

            let old_right = self.arcs[broken].right_break;
            self.arcs[right_half].right_break = old_right;
            if let Some(orb) = old_right {
                self.breaks[orb].left_arc = right_half;
            }
            self.arcs[right_half].left_break = Some(right_bp);
            self.arcs[broken].right_break = Some(left_bp);

            self.tree_insert(left_bp, sweep);
            self.tree_insert(right_bp, sweep);
        }

        Insertion {
            new_arc,
            delaunay_edge: Some((broken_site, site)),
        }
    }

    /// Removes an arc at a circle event ending in `end`. Finishes the two
    /// surrounding breakpoints into Voronoi edges and replaces them with
    /// the merged breakpoint of the former neighbors.
    pub fn remove_arc(&mut self, arc: ArcKey, end: Point2<f64>, sweep: f64) -> Removal {
        let left_break = self.arcs[arc].left_break;
        let right_break = self.arcs[arc].right_break;
        let left = left_break.map(|b| self.breaks[b].left_arc);
        let right = right_break.map(|b| self.breaks[b].right_arc);

        self.bump_generation(arc);
        if let Some(l) = left {
            self.bump_generation(l);
        }
        if let Some(r) = right {
            self.bump_generation(r);
        }

        let mut removal = Removal {
            left,
            right,
            delaunay_edge: None,
            voronoi_edges: [None, None],
        };

        match (left, right) {
            (Some(l), Some(r)) => {
                let lb = left_break.expect("left neighbor implies left breakpoint");
                let rb = right_break.expect("right neighbor implies right breakpoint");

                removal.voronoi_edges[0] = Some((self.breaks[rb].start, end));
                removal.voronoi_edges[1] = Some((self.breaks[lb].start, end));
                removal.delaunay_edge = Some((self.arcs[l].site, self.arcs[r].site));

                self.tree_remove(rb);
                self.tree_remove(lb);
                self.breaks.remove(rb);
                self.breaks.remove(lb);

                // The merged breakpoint is born in the circle center.
                let merged = self.breaks.insert(Breakpoint {
                    left_arc: l,
                    right_arc: r,
                    start: end,
                    parent: None,
                    left_child: None,
                    right_child: None,
                    cached_sweep: sweep,
                    cached_pos: end,
                });
                self.arcs[l].right_break = Some(merged);
                self.arcs[r].left_break = Some(merged);
                self.tree_insert(merged, sweep);
            }
            (Some(l), None) => {
                let lb = left_break.expect("left neighbor implies left breakpoint");
                self.tree_remove(lb);
                self.breaks.remove(lb);
                self.arcs[l].right_break = None;
            }
            (None, Some(r)) => {
                let rb = right_break.expect("right neighbor implies right breakpoint");
                self.tree_remove(rb);
                self.breaks.remove(rb);
                self.arcs[r].left_break = None;
            }
            (None, None) => {}
        }

        self.arcs.remove(arc);
        removal
    }

    /// Finishes all surviving breakpoints into Voronoi edges, extrapolated
    /// along their direction of motion to a box slightly beyond `bounds`.
    pub fn finish(
        &mut self,
        bounds: (Point2<f64>, Point2<f64>),
        sweep: f64,
        edges: &mut Vec<VoronoiEdge>,
    ) {
        let span_x = (bounds.1.x - bounds.0.x).abs().max(1e-3);
        let span_y = (bounds.1.y - bounds.0.y).abs().max(1e-3);
        let lo = Point2::new(bounds.0.x - 0.1 * span_x, bounds.0.y - 0.2 * span_y);
        let hi = Point2::new(bounds.1.x + 0.1 * span_x, bounds.1.y + 0.1 * span_y);

        let keys: Vec<BreakKey> = self.breaks.keys().collect();
        for key in keys {
            let p0 = self.break_position(key, sweep);
            let p1 = self.break_position(key, sweep - span_y);
            let dir = p1 - p0;
            let end = clip_ray(p0, dir, lo, hi);
            edges.push((self.breaks[key].start, end));
        }
    }

    /// Returns the arc directly above `x` at the current sweep value.
    /// Must not be called while the breakpoint tree is empty.
    pub fn arc_at(&mut self, x: f64, sweep: f64) -> ArcKey {
        let mut node = self.tree_root.expect("arc_at needs breakpoints");
        loop {
            let pos = self.break_position(node, sweep);
            if x < pos.x {
                match self.breaks[node].left_child {
                    Some(c) => node = c,
                    None => return self.breaks[node].left_arc,
                }
            } else {
                match self.breaks[node].right_child {
                    Some(c) => node = c,
                    None => return self.breaks[node].right_arc,
                }
            }
        }
    }

    /// Current position of a breakpoint, recomputed only when the sweep
    /// has advanced since the last query.
    pub fn break_position(&mut self, key: BreakKey, sweep: f64) -> Point2<f64> {
        let bp = &self.breaks[key];
        if bp.cached_sweep == sweep {
            return bp.cached_pos;
        }
        let p = self.arcs[bp.left_arc].site;
        let q = self.arcs[bp.right_arc].site;
        let pos = breakpoint_position(p, q, sweep);
        let bp = &mut self.breaks[key];
        bp.cached_sweep = sweep;
        bp.cached_pos = pos;
        pos
    }

    fn new_breakpoint(&mut self, left: ArcKey, right: ArcKey, sweep: f64) -> BreakKey {
        let pos = breakpoint_position(self.arcs[left].site, self.arcs[right].site, sweep);
        self.breaks.insert(Breakpoint {
            left_arc: left,
            right_arc: right,
            start: pos,
            parent: None,
            left_child: None,
            right_child: None,
            cached_sweep: sweep,
            cached_pos: pos,
        })
    }

    fn tree_insert(&mut self, key: BreakKey, sweep: f64) {
        let Some(mut node) = self.tree_root else {
            self.tree_root = Some(key);
            return;
        };
        let x = self.break_position(key, sweep).x;
        loop {
            let node_x = self.break_position(node, sweep).x;
            if x < node_x {
                match self.breaks[node].left_child {
                    Some(c) => node = c,
                    None => {
                        self.breaks[node].left_child = Some(key);
                        self.breaks[key].parent = Some(node);
                        return;
                    }
                }
            } else {
                match self.breaks[node].right_child {
                    Some(c) => node = c,
                    None => {
                        self.breaks[node].right_child = Some(key);
                        self.breaks[key].parent = Some(node);
                        return;
                    }
                }
            }
        }
    }

    fn tree_remove(&mut self, key: BreakKey) {
        let left = self.breaks[key].left_child;
        let right = self.breaks[key].right_child;

        match (left, right) {
            (None, None) => self.transplant(key, None),
            (Some(c), None) | (None, Some(c)) => self.transplant(key, Some(c)),
            (Some(l), Some(r)) => {
                // Replace by the in-order successor, the leftmost node of
                // the right subtree.
                let mut s = r;
                while let Some(c) = self.breaks[s].left_child {
                    s = c;
                }
                if s != r {
                    let s_right = self.breaks[s].right_child;
                    self.transplant(s, s_right);
                    self.breaks[s].right_child = Some(r);
                    self.breaks[r].parent = Some(s);
                }
                self.transplant(key, Some(s));
                self.breaks[s].left_child = Some(l);
                self.breaks[l].parent = Some(s);
            }
        }

        let bp = &mut self.breaks[key];
        bp.parent = None;
        bp.left_child = None;
        bp.right_child = None;
    }

    fn transplant(&mut self, old: BreakKey, new: Option<BreakKey>) {
        let parent = self.breaks[old].parent;
        match parent {
            None => self.tree_root = new,
            Some(p) => {
                if self.breaks[p].left_child == Some(old) {
                    self.breaks[p].left_child = new;
                } else {
                    self.breaks[p].right_child = new;
                }
            }
        }
        if let Some(n) = new {
            self.breaks[n].parent = parent;
        }
    }
}

/// Height of the parabola with the given focus above `x`.
fn parabola_y(focus: Site, sweep: f64, x: f64) -> f64 {
    ((x - focus.x) * (x - focus.x) + focus.y * focus.y - sweep * sweep)
        / (2.0 * (focus.y - sweep))
}

/// Intersection of the parabolas of `p` (left arc) and `q` (right arc)
/// at the given sweep value.
pub(crate) fn breakpoint_position(p: Site, q: Site, sweep: f64) -> Point2<f64> {
    let dp = p.y - sweep;
    let dq = q.y - sweep;

    if dp.abs() <= DEGENERATE_EPS && dq.abs() <= DEGENERATE_EPS {
        return Point2::new(0.5 * (p.x + q.x), sweep);
    }
    if dp.abs() <= DEGENERATE_EPS {
        return Point2::new(p.x, parabola_y(q, sweep, p.x));
    }
    if dq.abs() <= DEGENERATE_EPS {
        return Point2::new(q.x, parabola_y(p, sweep, q.x));
    }
    if (dp - dq).abs() <= DEGENERATE_EPS {
        // Equal focus heights intersect once, on the midline.
        let x = 0.5 * (p.x + q.x);
        return Point2::new(x, parabola_y(p, sweep, x));
    }

    let d1 = 1.0 / (2.0 * dp);
    let d2 = 1.0 / (2.0 * dq);
    let a = d1 - d2;
    let b = 2.0 * (d2 * q.x - d1 * p.x);
    let c = d1 * p.x * p.x - d2 * q.x * q.x + 0.5 * (p.y - q.y);
    let disc = (b * b - 4.0 * a * c).max(0.0);
    // This root is the breakpoint with `p` left and `q` right, for either
    // ordering of the focus heights.
    let x = (-b + disc.sqrt()) / (2.0 * a);
    let stable = if dp.abs() > dq.abs() { p } else { q };
    Point2::new(x, parabola_y(stable, sweep, x))
}

/// Walks from `p0` along `dir` until the boundary of the box, returning
/// `p0` itself for degenerate directions or points already outside.
fn clip_ray(p0: Point2<f64>, dir: Vector2<f64>, lo: Point2<f64>, hi: Point2<f64>) -> Point2<f64> {
    let mut t = f64::INFINITY;
    if dir.x > DEGENERATE_EPS {
        t = t.min((hi.x - p0.x) / dir.x);
    } else if dir.x < -DEGENERATE_EPS {
        t = t.min((lo.x - p0.x) / dir.x);
    }
    if dir.y > DEGENERATE_EPS {
        t = t.min((hi.y - p0.y) / dir.y);
    } else if dir.y < -DEGENERATE_EPS {
        t = t.min((lo.y - p0.y) / dir.y);
    }
    if !t.is_finite() || t < 0.0 {
        return p0;
    }
    p0 + dir * t
}
