// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The flag tool: a single labeled marker anchored to the terrain.

use nalgebra::Point3;

use crate::body::Body;
use crate::convert::{to_cartesian, LngLat};
use crate::events::{EventQueue, ToolEvent};
use crate::settings::Settings;

/// A named marker at a geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagTool {
    pub center: String,
    pub frame: String,
    pub lng_lat: LngLat,
    pub color: [f64; 3],
    pub scale_distance: f64,
    pub text: String,
    pub minimized: bool,
}

impl Default for FlagTool {
    fn default() -> Self {
        Self {
            center: String::new(),
            frame: String::new(),
            lng_lat: LngLat::new(0.0, 0.0),
            color: [1.0, 1.0, 1.0],
            scale_distance: -1.0,
            text: String::new(),
            minimized: false,
        }
    }
}

impl FlagTool {
    pub fn new(center: impl Into<String>, frame: impl Into<String>, lng_lat: LngLat) -> Self {
        Self {
            center: center.into(),
            frame: frame.into(),
            lng_lat,
            ..Self::default()
        }
    }

    /// The heighted cartesian anchor of the flag.
    pub fn anchor_position(&self, body: &dyn Body, settings: &Settings) -> Point3<f64> {
        let h = body.height(self.lng_lat) * settings.height_scale;
        to_cartesian(self.lng_lat, body.radius(), h)
    }

    /// Moves the flag and reports the new anchor.
    pub fn set_position(
        &mut self,
        lng_lat: LngLat,
        body: &dyn Body,
        settings: &Settings,
        events: &mut EventQueue,
    ) {
        self.lng_lat = lng_lat;
        events.push(ToolEvent::PositionChanged(
            self.anchor_position(body, settings),
        ));
    }

    pub fn set_text(&mut self, text: impl Into<String>, events: &mut EventQueue) {
        self.text = text.into();
        events.push(ToolEvent::TextChanged(self.text.clone()));
    }

    pub fn set_minimized(&mut self, minimized: bool, events: &mut EventQueue) {
        if self.minimized != minimized {
            self.minimized = minimized;
            events.push(ToolEvent::MinimizedChanged(minimized));
        }
    }

    /// Recomputes the anchor, e.g. after a height scale change.
    pub fn update(&self, body: &dyn Body, settings: &Settings, events: &mut EventQueue) {
        events.push(ToolEvent::PositionChanged(
            self.anchor_position(body, settings),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::UniformBody;
    use approx::assert_relative_eq;

    #[test]
    fn anchor_sits_on_the_heighted_surface() {
        let body = UniformBody {
            radius: 10.0,
            height: 2.0,
        };
        let flag = FlagTool::new("mars", "iau_mars", LngLat::new(0.4, 0.3));
        let pos = flag.anchor_position(&body, &Settings::default());
        assert_relative_eq!(pos.coords.norm(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn setters_emit_events() {
        let body = UniformBody::with_radius(1.0);
        let mut flag = FlagTool::default();
        let mut events = EventQueue::new();

        flag.set_text("base camp", &mut events);
        flag.set_minimized(true, &mut events);
        flag.set_minimized(true, &mut events);
        flag.set_position(LngLat::new(0.1, 0.1), &body, &Settings::default(), &mut events);

        let drained: Vec<_> = events.drain().collect();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0], ToolEvent::TextChanged("base camp".into()));
        assert_eq!(drained[1], ToolEvent::MinimizedChanged(true));
    }
}
