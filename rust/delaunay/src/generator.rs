// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The sweep driver.
//!
//! [`VoronoiGenerator::parse`] consumes a set of sites from top to bottom
//! and produces the finished Voronoi edges, the dual Delaunay edges and
//! triangles, and a per-site neighbor map. Site events and circle events
//! live in two max-heaps keyed by sweep height; stale circle events stay
//! queued and are skipped when popped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::Point2;
use rustc_hash::FxHashMap;

use crate::beachline::{Beachline, VoronoiEdge};
use crate::circle::{circumcircle, CircleEvent};
use crate::keys::ArcKey;
use crate::site::Site;

/// An undirected Delaunay edge between two sites.
pub type DelaunayEdge = (Site, Site);

/// A Delaunay triangle recorded when its dual Voronoi vertex appears.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle(pub Site, pub Site, pub Site);

impl Triangle {
    pub fn sites(&self) -> [Site; 3] {
        [self.0, self.1, self.2]
    }

    pub fn centroid(&self) -> Point2<f64> {
        Point2::new(
            (self.0.x + self.1.x + self.2.x) / 3.0,
            (self.0.y + self.1.y + self.2.y) / 3.0,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct SiteEvent(Site);

impl PartialEq for SiteEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SiteEvent {}

impl PartialOrd for SiteEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SiteEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.sweep_cmp(&other.0)
    }
}

/// Fortune's sweep over a finite planar site set.
///
/// A generator is good for any number of `parse` calls; every call owns a
/// fresh beach line and replaces all previous output.
#[derive(Debug)]
pub struct VoronoiGenerator {
    beachline: Beachline,
    sweepline: f64,
    min: Point2<f64>,
    max: Point2<f64>,

    sites: Vec<Site>,
    voronoi_edges: Vec<VoronoiEdge>,
    delaunay_edges: Vec<DelaunayEdge>,
    triangles: Vec<Triangle>,
    neighbors: FxHashMap<u16, Vec<Site>>,

    circle_events: BinaryHeap<CircleEvent>,
    next_seq: u64,
}

impl Default for VoronoiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VoronoiGenerator {
    pub fn new() -> Self {
        Self {
            beachline: Beachline::new(),
            sweepline: 0.0,
            min: Point2::origin(),
            max: Point2::origin(),
            sites: Vec::new(),
            voronoi_edges: Vec::new(),
            delaunay_edges: Vec::new(),
            triangles: Vec::new(),
            neighbors: FxHashMap::default(),
            circle_events: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Runs the sweep over `sites`. Exact duplicates (same coordinates)
    /// are dropped; the caller is expected to have deduplicated its input
    /// and assigned distinct addresses.
    pub fn parse(&mut self, sites: &[Site]) {
        self.reset();
        if sites.is_empty() {
            return;
        }

        self.sites = sites.to_vec();
        self.min = Point2::new(f64::INFINITY, f64::INFINITY);
        self.max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for s in sites {
            self.min.x = self.min.x.min(s.x);
            self.min.y = self.min.y.min(s.y);
            self.max.x = self.max.x.max(s.x);
            self.max.y = self.max.y.max(s.y);
        }

        let mut site_queue: BinaryHeap<SiteEvent> =
            sites.iter().copied().map(SiteEvent).collect();
        let mut last: Option<Site> = None;

        loop {
            // Drop dead circle events so the ordering decision below sees
            // a live one.
            while let Some(&top) = self.circle_events.peek() {
                if self.is_live(&top) {
                    break;
                }
                self.circle_events.pop();
            }

            let take_site = match (site_queue.peek(), self.circle_events.peek()) {
                (Some(s), Some(c)) => s.0.y >= c.y,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };

            if take_site {
                let site = site_queue.pop().expect("peeked site").0;
                // Duplicates pop back to back in sweep order.
                if let Some(prev) = last {
                    if prev.x == site.x && prev.y == site.y {
                        continue;
                    }
                }
                last = Some(site);
                self.process_site(site);
            } else {
                let ev = self.circle_events.pop().expect("peeked event");
                self.process_circle(ev);
            }
        }

        self.finish_edges();
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Finished Voronoi edges, including the ones clipped at `finish`.
    pub fn voronoi_edges(&self) -> &[VoronoiEdge] {
        &self.voronoi_edges
    }

    /// The dual Delaunay edges, one per pair of arcs that ever met.
    pub fn delaunay_edges(&self) -> &[DelaunayEdge] {
        &self.delaunay_edges
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// For every site address, the sites it shares a Delaunay edge with.
    pub fn neighbors(&self) -> &FxHashMap<u16, Vec<Site>> {
        &self.neighbors
    }

    pub fn sweepline(&self) -> f64 {
        self.sweepline
    }

    fn reset(&mut self) {
        self.beachline = Beachline::new();
        self.sweepline = 0.0;
        self.sites.clear();
        self.voronoi_edges.clear();
        self.delaunay_edges.clear();
        self.triangles.clear();
        self.neighbors.clear();
        self.circle_events.clear();
        self.next_seq = 0;
    }

    fn is_live(&self, ev: &CircleEvent) -> bool {
        self.beachline.contains(ev.arc) && self.beachline.generation(ev.arc) == ev.generation
    }

    fn process_site(&mut self, site: Site) {
        self.sweepline = site.y;
        let insertion = self.beachline.insert_arc(site, site.y);
        if let Some((a, b)) = insertion.delaunay_edge {
            self.add_delaunay_edge(a, b);
        }

        // The halves of the split arc may vanish next; the fresh arc
        // itself cannot, its breakpoints still move apart.
        let left = self.beachline.left_neighbor(insertion.new_arc);
        let right = self.beachline.right_neighbor(insertion.new_arc);
        if let Some(l) = left {
            self.try_queue_circle(l);
        }
        if let Some(r) = right {
            self.try_queue_circle(r);
        }
    }

    fn process_circle(&mut self, ev: CircleEvent) {
        self.sweepline = ev.y;

        let Some((lk, rk)) = self.beachline.neighborhood(ev.arc) else {
            return;
        };
        self.triangles.push(Triangle(
            self.beachline.site(lk),
            self.beachline.site(ev.arc),
            self.beachline.site(rk),
        ));

        let removal = self.beachline.remove_arc(ev.arc, ev.center, ev.y);
        for edge in removal.voronoi_edges.into_iter().flatten() {
            self.voronoi_edges.push(edge);
        }
        if let Some((a, b)) = removal.delaunay_edge {
            self.add_delaunay_edge(a, b);
        }

        if let Some(l) = removal.left {
            self.try_queue_circle(l);
        }
        if let Some(r) = removal.right {
            self.try_queue_circle(r);
        }
    }

    fn try_queue_circle(&mut self, arc: ArcKey) {
        let Some((lk, rk)) = self.beachline.neighborhood(arc) else {
            return;
        };
        let l = self.beachline.site(lk);
        let m = self.beachline.site(arc);
        let r = self.beachline.site(rk);

        let Some((center, radius)) = circumcircle(l, m, r) else {
            return;
        };
        let y = center.y - radius;
        if !y.is_finite() || y > self.sweepline {
            return;
        }

        let generation = self.beachline.bump_generation(arc);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.circle_events.push(CircleEvent {
            center,
            y,
            arc,
            generation,
            seq,
        });
    }

    fn finish_edges(&mut self) {
        let bounds = (self.min, self.max);
        let sweep = self.sweepline.min(self.min.y);
        self.beachline
            .finish(bounds, sweep, &mut self.voronoi_edges);
    }

    fn add_delaunay_edge(&mut self, a: Site, b: Site) {
        self.delaunay_edges.push((a, b));
        self.neighbors.entry(a.addr).or_default().push(b);
        self.neighbors.entry(b.addr).or_default().push(a);
    }
}
