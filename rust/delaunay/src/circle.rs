// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circle events: the predicted death of an arc.

use std::cmp::Ordering;

use nalgebra::Point2;

use crate::keys::ArcKey;
use crate::site::Site;

/// A predicted moment at which three adjacent arcs meet and the middle
/// one vanishes. The event keeps `(arc, generation)` instead of a
/// validity flag; it is dead once the arc is gone or has moved on to a
/// newer pending event.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CircleEvent {
    pub center: Point2<f64>,
    /// Sweep value at which the event fires: `center.y - radius`.
    pub y: f64,
    pub arc: ArcKey,
    pub generation: u64,
    /// Enqueue order, the tie breaker for events at identical heights.
    pub seq: u64,
}

impl PartialEq for CircleEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CircleEvent {}

impl PartialOrd for CircleEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CircleEvent {
    /// Max-heap order: higher `y` first, earlier enqueue first on ties.
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Circumcircle of the left/middle/right beach-line neighborhood.
///
/// Returns `None` when the breakpoints of the middle arc diverge (the
/// middle site turns the wrong way) or the three sites are collinear,
/// in which case no circle event exists.
pub(crate) fn circumcircle(l: Site, m: Site, r: Site) -> Option<(Point2<f64>, f64)> {
    let ax = m.x - r.x;
    let ay = m.y - r.y;
    let cx = l.x - r.x;
    let cy = l.y - r.y;

    // Breakpoints converge only if l, m, r make a right turn.
    if ax * cy - ay * cx <= 0.0 {
        return None;
    }

    // Circumcenter after O'Rourke, Computational Geometry in C, p. 189.
    let e = ax * (r.x + m.x) + ay * (r.y + m.y);
    let f = cx * (r.x + l.x) + cy * (r.y + l.y);
    let g = 2.0 * (ax * (l.y - m.y) - ay * (l.x - m.x));
    if g.abs() <= f64::EPSILON {
        return None;
    }

    let center = Point2::new((cy * e - ay * f) / g, (ax * f - cx * e) / g);
    let radius = (center - r.position()).norm();
    if !radius.is_finite() {
        return None;
    }
    Some((center, radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn right_turn_has_event() {
        let l = Site::new(-1.0, 0.0, 0);
        let m = Site::new(0.0, 1.0, 1);
        let r = Site::new(1.0, 0.0, 2);
        let (center, radius) = circumcircle(l, m, r).expect("converging neighborhood");
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(radius, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn left_turn_has_no_event() {
        let l = Site::new(-1.0, 0.0, 0);
        let m = Site::new(0.0, -1.0, 1);
        let r = Site::new(1.0, 0.0, 2);
        assert!(circumcircle(l, m, r).is_none());
    }

    #[test]
    fn collinear_sites_have_no_event() {
        let l = Site::new(-1.0, 0.0, 0);
        let m = Site::new(0.0, 0.0, 1);
        let r = Site::new(1.0, 0.0, 2);
        assert!(circumcircle(l, m, r).is_none());
    }

    #[test]
    fn heap_order_is_high_y_then_enqueue_order() {
        let key = ArcKey::default();
        let ev = |y: f64, seq: u64| CircleEvent {
            center: Point2::origin(),
            y,
            arc: key,
            generation: 0,
            seq,
        };
        assert!(ev(1.0, 5) > ev(0.5, 0));
        assert!(ev(1.0, 0) > ev(1.0, 1));
    }
}
