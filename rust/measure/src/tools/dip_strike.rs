// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The dip and strike tool.
//!
//! Fits the least-squares plane through a set of surface points and
//! derives the geologist's two angles: dip, the steepest slope of the
//! plane against the horizontal, and strike, the compass direction of
//! the horizontal line within the plane.

use nalgebra::Vector3;

use crate::body::Body;
use crate::convert::{to_cartesian, LngLat, LngLatBounds};
use crate::events::{EventQueue, ToolEvent};
use crate::plane::FittedPlane;
use crate::settings::Settings;

/// The fitted plane and its derived angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipStrike {
    pub dip_deg: f64,
    pub strike_deg: f64,
    /// Unit normal of the fitted plane.
    pub normal: Vector3<f64>,
    /// Steepest descent direction within the plane.
    pub mip: Vector3<f64>,
    /// Largest point distance from the centroid, for display sizing.
    pub size: f64,
    /// Plane offset along the normal, in units of the body radius.
    pub offset: f64,
}

impl Default for DipStrike {
    fn default() -> Self {
        Self {
            dip_deg: 0.0,
            strike_deg: 0.0,
            normal: Vector3::z(),
            mip: Vector3::x(),
            size: 0.0,
            offset: 0.0,
        }
    }
}

/// A plane fit through three or more surface points.
#[derive(Debug, Clone, PartialEq)]
pub struct DipStrikeTool {
    pub center: String,
    pub frame: String,
    pub positions: Vec<LngLat>,
    pub color: [f64; 3],
    pub scale_distance: f64,
    pub text: String,
    pub minimized: bool,
}

impl Default for DipStrikeTool {
    fn default() -> Self {
        Self {
            center: String::new(),
            frame: String::new(),
            positions: Vec::new(),
            color: [1.0, 1.0, 1.0],
            scale_distance: -1.0,
            text: String::new(),
            minimized: false,
        }
    }
}

impl DipStrikeTool {
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

    /// Fits the plane and derives dip and strike. Fewer than three
    /// points yield the zeroed default.
    pub fn solve(&self, body: &dyn Body) -> DipStrike {
        if self.positions.is_empty() {
            return DipStrike::default();
        }
        let radius = body.radius();

        // Heighted cartesian positions; dip and strike describe the real
        // terrain, the height exaggeration stays out of it.
        let positions: Vec<_> = self
            .positions
            .iter()
            .map(|ll| to_cartesian(*ll, radius, body.height(*ll)))
            .collect();

        let mut centroid = Vector3::zeros();
        for p in &positions {
            centroid += p.coords / positions.len() as f64;
        }
        let ideal = centroid.normalize();

        if positions.len() < 3 || !ideal.x.is_finite() {
            return DipStrike::default();
        }

        let plane = FittedPlane::fit(&positions, ideal, radius);

        let strike = plane.normal.cross(&ideal);
        if strike.norm_squared() < 1e-18 {
            // The plane is horizontal; strike is undefined and dip zero.
            return DipStrike {
                size: plane.size,
                offset: plane.offset,
                normal: plane.normal,
                ..DipStrike::default()
            };
        }
        let strike = strike.normalize();
        let dip_direction = ideal.cross(&strike).normalize();
        let mip = plane.normal.cross(&strike).normalize();

        let dip_deg = mip
            .dot(&dip_direction)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees();
        let mut strike_deg = Vector3::y().dot(&strike).clamp(-1.0, 1.0).acos().to_degrees();
        if strike.x < 0.0 {
            strike_deg = 360.0 - strike_deg;
        }

        DipStrike {
            dip_deg,
            strike_deg,
            normal: plane.normal,
            mip,
            size: plane.size,
            offset: plane.offset,
        }
    }

    /// Refits the plane and reports the angles.
    pub fn update(
        &self,
        body: &dyn Body,
        _settings: &Settings,
        events: &mut EventQueue,
    ) -> DipStrike {
        let solution = self.solve(body);
        events.push(ToolEvent::DipStrikeChanged {
            dip_deg: solution.dip_deg,
            strike_deg: solution.strike_deg,
        });
        solution
    }
}
