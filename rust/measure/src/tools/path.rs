// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The path tool: a polyline over the terrain with a height profile.
//!
//! Every segment between two handles is sampled by interpolating in
//! cartesian space and re-projecting each sample onto the terrain. The
//! distance/height profile measures distances on the unexaggerated
//! terrain so it stays stable under height-scale changes.

use nalgebra::Point3;

use crate::body::Body;
use crate::convert::{to_cartesian, to_lng_lat_height, LngLat, LngLatBounds};
use crate::events::{EventQueue, ProfilePoint, ToolEvent};
use crate::settings::Settings;

/// One terrain-following sample between two handles.
///
/// Interpolates the heighted cartesian positions of `l0` and `l1` at
/// parameter `t`, drops the interpolated point back onto the body and
/// heights it through the oracle. Returns the surface position and its
/// height in oracle meters times `scale`.
pub(crate) fn interpolated_position(
    l0: LngLat,
    l1: LngLat,
    t: f64,
    scale: f64,
    body: &dyn Body,
) -> (Point3<f64>, f64) {
    let radius = body.radius();
    let h0 = body.height(l0) * scale;
    let h1 = body.height(l1) * scale;
    let p0 = to_cartesian(l0, radius, h0);
    let p1 = to_cartesian(l1, radius, h1);
    let mid = p0 + (p1 - p0) * t;
    let (ll, _) = to_lng_lat_height(&mid, radius);
    let height = body.height(ll) * scale;
    (to_cartesian(ll, radius, height), height)
}

/// The sampled polyline and its profile.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSamples {
    /// Terrain-following positions, `num_samples` per segment.
    pub positions: Vec<Point3<f64>>,
    /// Cumulative distance (unexaggerated meters) and raw oracle height
    /// per sample.
    pub profile: Vec<ProfilePoint>,
}

/// An ordered list of handles connected by terrain-following segments.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTool {
    pub center: String,
    pub frame: String,
    pub positions: Vec<LngLat>,
    pub color: [f64; 3],
    pub scale_distance: f64,
    pub text: String,
}

impl Default for PathTool {
    fn default() -> Self {
        Self {
            center: String::new(),
            frame: String::new(),
            positions: Vec::new(),
            color: [1.0, 1.0, 1.0],
            scale_distance: -1.0,
            text: String::new(),
        }
    }
}

impl PathTool {
    pub fn new(center: impl Into<String>, frame: impl Into<String>) -> Self {
        Self {
            center: center.into(),
            frame: frame.into(),
            ..Self::default()
        }
    }

    pub fn add_point(&mut self, pos: LngLat) {
        self.positions.push(pos);
    }

    pub fn bounds(&self) -> Option<LngLatBounds> {
        LngLatBounds::of(&self.positions)
    }

    /// Samples all segments over the terrain.
    pub fn sample(&self, body: &dyn Body, settings: &Settings) -> PathSamples {
        let scale = settings.height_scale;
        let num = settings.num_samples;

        let mut positions = Vec::new();
        let mut profile = Vec::new();
        if self.positions.len() < 2 {
            return PathSamples { positions, profile };
        }

        let mut distance = -1.0;
        let mut last = Point3::origin();

        for pair in self.positions.windows(2) {
            for k in 0..num {
                let t = k as f64 / num as f64;
                let (pos, height) = interpolated_position(pair[0], pair[1], t, scale, body);
                positions.push(pos);

                // Distances come from the unexaggerated geometry so the
                // profile does not stretch with the height scale.
                let norm_pos = if scale != 1.0 {
                    interpolated_position(pair[0], pair[1], t, 1.0, body).0
                } else {
                    pos
                };
                if distance < 0.0 {
                    distance = 0.0;
                } else {
                    distance += (norm_pos - last).norm();
                }
                profile.push((distance, height / scale));
                last = norm_pos;
            }
        }

        PathSamples { positions, profile }
    }

    /// Resamples the path and reports the new profile.
    pub fn update(&self, body: &dyn Body, settings: &Settings, events: &mut EventQueue) {
        let samples = self.sample(body, settings);
        events.push(ToolEvent::ProfileChanged(samples.profile));
        if let Some(bounds) = self.bounds() {
            events.push(ToolEvent::BoundsChanged(bounds));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::UniformBody;
    use approx::assert_relative_eq;

    #[test]
    fn short_paths_sample_to_nothing() {
        let body = UniformBody::with_radius(1.0);
        let mut path = PathTool::default();
        path.add_point(LngLat::new(0.0, 0.0));
        let samples = path.sample(&body, &Settings::default());
        assert!(samples.positions.is_empty());
    }

    #[test]
    fn profile_distance_is_monotone() {
        let body = UniformBody::with_radius(100.0);
        let mut path = PathTool::default();
        path.add_point(LngLat::new(0.0, 0.0));
        path.add_point(LngLat::new(0.1, 0.0));
        path.add_point(LngLat::new(0.1, 0.1));

        let mut settings = Settings::default();
        settings.num_samples = 16;
        let samples = path.sample(&body, &settings);

        assert_eq!(samples.positions.len(), 32);
        assert_eq!(samples.profile.len(), 32);
        assert_eq!(samples.profile[0].0, 0.0);
        for pair in samples.profile.windows(2) {
            assert!(pair[1].0 >= pair[0].0);
        }
        // Roughly two arcs of 0.1 rad on a sphere of radius 100.
        let total = samples.profile.last().unwrap().0;
        assert!(total > 15.0 && total < 25.0, "total distance {total}");
    }

    #[test]
    fn profile_heights_are_raw_oracle_meters() {
        let body = UniformBody {
            radius: 100.0,
            height: 3.0,
        };
        let mut path = PathTool::default();
        path.add_point(LngLat::new(0.0, 0.0));
        path.add_point(LngLat::new(0.05, 0.0));

        let mut settings = Settings::default();
        settings.num_samples = 4;
        settings.height_scale = 7.0;
        let samples = path.sample(&body, &settings);

        for (_, h) in &samples.profile {
            assert_relative_eq!(*h, 3.0, epsilon = 1e-9);
        }
        // The sampled positions themselves carry the exaggerated height.
        for p in &samples.positions {
            assert_relative_eq!(p.coords.norm(), 121.0, epsilon = 1e-6);
        }
    }
}
