// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ellipse tool: two axis handles around a center, rasterized over
//! the terrain.

use nalgebra::{Point3, Vector3};

use crate::body::Body;
use crate::convert::{lng_lat_to_normal, to_cartesian, to_lng_lat_height, LngLat};
use crate::events::{EventQueue, ToolEvent};
use crate::settings::Settings;

/// An ellipse described by its center handle and two axis handles.
///
/// The axes are the cartesian offsets of the handles from the center;
/// the outline is sampled pointwise and dropped onto the terrain. Until
/// the first update the handles are unset and are seeded from the
/// center and a default axis length.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseTool {
    pub center: String,
    pub frame: String,
    /// Center handle position.
    pub origin: LngLat,
    /// The two axis handles. `None` until seeded or deserialized.
    pub handles: Option<[LngLat; 2]>,
    pub color: [f64; 3],
    pub scale_distance: f64,
    pub text: String,
    pub minimized: bool,
}

impl Default for EllipseTool {
    fn default() -> Self {
        Self {
            center: String::new(),
            frame: String::new(),
            origin: LngLat::new(0.0, 0.0),
            handles: None,
            color: [1.0, 1.0, 1.0],
            scale_distance: -1.0,
            text: String::new(),
            minimized: false,
        }
    }
}

impl EllipseTool {
    pub fn new(center: impl Into<String>, frame: impl Into<String>, origin: LngLat) -> Self {
        Self {
            center: center.into(),
            frame: frame.into(),
            origin,
            ..Self::default()
        }
    }

    /// Seeds the two axis handles east and north of the center, a tenth
    /// of the body radius out.
    fn seed_handles(&mut self, body: &dyn Body, settings: &Settings) {
        let radius = body.radius();
        let h = body.height(self.origin) * settings.height_scale;
        let center = to_cartesian(self.origin, radius, h);
        let normal = lng_lat_to_normal(self.origin);

        let mut east = Vector3::y().cross(&normal);
        if east.norm_squared() < 1e-12 {
            // Centered on a pole; pick an arbitrary tangent frame.
            east = Vector3::x();
        }
        let east = east.normalize();
        let north = normal.cross(&east).normalize();

        let len = radius * 0.1;
        let seed = |axis: Vector3<f64>| {
            let (ll, _) = to_lng_lat_height(&Point3::from(center.coords + axis * len), radius);
            ll
        };
        self.handles = Some([seed(east), seed(north)]);
    }

    /// The outline over the terrain, `num_samples` positions from angle
    /// 0 to two pi inclusive.
    pub fn vertices(&mut self, body: &dyn Body, settings: &Settings) -> Vec<Point3<f64>> {
        let radius = body.radius();
        let scale = settings.height_scale;

        if self.handles.is_none() {
            self.seed_handles(body, settings);
        }
        let handles = self.handles.expect("seeded above");

        let h = body.height(self.origin) * scale;
        let center = to_cartesian(self.origin, radius, h);

        let handle_pos = |ll: LngLat| {
            let h = body.height(ll) * scale;
            to_cartesian(ll, radius, h)
        };
        let axes = [handle_pos(handles[0]) - center, handle_pos(handles[1]) - center];

        let num = settings.num_samples;
        let mut vertices = Vec::with_capacity(num);
        for i in 0..num {
            let phi = 2.0 * std::f64::consts::PI * i as f64 / (num - 1) as f64;
            let pos = center + axes[0] * phi.sin() + axes[1] * phi.cos();
            let (ll, _) = to_lng_lat_height(&pos, radius);
            let height = body.height(ll) * scale;
            vertices.push(to_cartesian(ll, radius, height));
        }
        vertices
    }

    /// Resamples the outline and reports the center anchor.
    pub fn update(
        &mut self,
        body: &dyn Body,
        settings: &Settings,
        events: &mut EventQueue,
    ) -> Vec<Point3<f64>> {
        let vertices = self.vertices(body, settings);
        let h = body.height(self.origin) * settings.height_scale;
        events.push(ToolEvent::PositionChanged(to_cartesian(
            self.origin,
            body.radius(),
            h,
        )));
        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::UniformBody;
    use approx::assert_relative_eq;

    #[test]
    fn outline_hugs_the_terrain() {
        let body = UniformBody {
            radius: 50.0,
            height: 1.5,
        };
        let mut settings = Settings::default();
        settings.num_samples = 32;

        let mut ellipse = EllipseTool::new("moon", "iau_moon", LngLat::new(0.2, -0.1));
        let vertices = ellipse.vertices(&body, &settings);

        assert_eq!(vertices.len(), 32);
        for v in &vertices {
            assert_relative_eq!(v.coords.norm(), 51.5, epsilon = 1e-6);
        }
        // First and last sample close the outline.
        assert_relative_eq!((vertices[0] - vertices[31]).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn handles_are_seeded_once() {
        let body = UniformBody::with_radius(10.0);
        let settings = Settings::default();
        let mut ellipse = EllipseTool::new("", "", LngLat::new(0.0, 0.0));
        assert!(ellipse.handles.is_none());

        ellipse.vertices(&body, &settings);
        let seeded = ellipse.handles.expect("seeded by first rasterization");

        // Roughly a tenth of the radius away from the center.
        let center = to_cartesian(ellipse.origin, 10.0, 0.0);
        for ll in seeded {
            let d = (to_cartesian(ll, 10.0, 0.0) - center).norm();
            assert!(d > 0.9 && d < 1.1, "handle distance {d}");
        }
    }

    #[test]
    fn polar_center_still_has_a_frame() {
        let body = UniformBody::with_radius(5.0);
        let mut ellipse = EllipseTool::new(
            "",
            "",
            LngLat::new(0.0, std::f64::consts::FRAC_PI_2),
        );
        let vertices = ellipse.vertices(&body, &Settings::default());
        assert!(vertices.iter().all(|v| v.coords.norm().is_finite()));
    }
}
