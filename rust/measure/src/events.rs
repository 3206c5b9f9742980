// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed messages from tool sessions to their embedder.
//!
//! Tools never call back into the surrounding application. Every update
//! pushes messages into an [`EventQueue`] owned by the session; whoever
//! drives the tools drains the queue and routes the messages to text
//! fields, overlays or wherever else they belong.

use std::collections::VecDeque;

use nalgebra::Point3;

use crate::convert::LngLatBounds;

/// One (distance, height) sample of a path profile. Distances are
/// cumulative meters along the unexaggerated terrain, heights raw oracle
/// meters.
pub type ProfilePoint = (f64, f64);

/// A message produced by a tool update.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    /// The measured surface area changed (square meters).
    AreaChanged(f64),
    /// The measured volumes changed (cubic meters, negative part <= 0).
    VolumeChanged { positive: f64, negative: f64 },
    /// The geographic bounds of the tool changed.
    BoundsChanged(LngLatBounds),
    /// A path tool produced a new distance/height profile.
    ProfileChanged(Vec<ProfilePoint>),
    /// A dip and strike tool produced new angles (degrees).
    DipStrikeChanged { dip_deg: f64, strike_deg: f64 },
    /// The anchor of a tool moved.
    PositionChanged(Point3<f64>),
    /// The label text of a tool changed.
    TextChanged(String),
    /// The tool was minimized or restored.
    MinimizedChanged(bool),
}

/// A per-session queue of tool events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<ToolEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ToolEvent) {
        self.events.push_back(event);
    }

    /// Removes and returns all queued events in order.
    pub fn drain(&mut self) -> impl Iterator<Item = ToolEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order() {
        let mut q = EventQueue::new();
        q.push(ToolEvent::AreaChanged(1.0));
        q.push(ToolEvent::MinimizedChanged(true));
        let drained: Vec<_> = q.drain().collect();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], ToolEvent::AreaChanged(1.0));
        assert!(q.is_empty());
    }
}
