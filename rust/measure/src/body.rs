// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The celestial body a measurement runs against.

use crate::convert::LngLat;

/// A spherical body with a terrain height oracle.
///
/// The oracle must be pure, synchronous and deterministic. A `NaN`
/// height marks missing terrain data; affected geometry contributes
/// nothing to areas or volumes.
pub trait Body {
    /// The body radius in meters. Must be positive.
    fn radius(&self) -> f64;

    /// Terrain height in meters above the sphere at the given position.
    fn height(&self, pos: LngLat) -> f64;
}

/// A sphere with constant terrain height. Handy as a stand-in body and
/// for tests.
#[derive(Debug, Clone, Copy)]
pub struct UniformBody {
    pub radius: f64,
    pub height: f64,
}

impl UniformBody {
    pub fn with_radius(radius: f64) -> Self {
        Self { radius, height: 0.0 }
    }
}

impl Body for UniformBody {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn height(&self, _pos: LngLat) -> f64 {
        self.height
    }
}
