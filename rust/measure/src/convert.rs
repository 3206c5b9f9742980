// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversions between geographic and cartesian coordinates.
//!
//! All conversions use a sphere; ellipsoidal bodies are approximated by
//! their equatorial radius. The y axis is the polar axis: latitude 0,
//! longitude 0 maps to the positive z axis.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A geographic position in radians.
///
/// Longitude spans `[-pi, pi]`, latitude `[-pi/2, pi/2]`. Serialized as
/// a `[lng, lat]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self { lng: v[0], lat: v[1] }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(v: LngLat) -> Self {
        [v.lng, v.lat]
    }
}

/// A longitude/latitude bounding box in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLatBounds {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl LngLatBounds {
    /// The tight bounds of a non-empty set of positions.
    pub fn of(positions: &[LngLat]) -> Option<Self> {
        let first = positions.first()?;
        let mut b = LngLatBounds {
            min_lng: first.lng,
            max_lng: first.lng,
            min_lat: first.lat,
            max_lat: first.lat,
        };
        for p in &positions[1..] {
            b.min_lng = b.min_lng.min(p.lng);
            b.max_lng = b.max_lng.max(p.lng);
            b.min_lat = b.min_lat.min(p.lat);
            b.max_lat = b.max_lat.max(p.lat);
        }
        Some(b)
    }
}

/// Cartesian position of a geographic point at `height` meters above the
/// sphere of the given radius.
pub fn to_cartesian(ll: LngLat, radius: f64, height: f64) -> Point3<f64> {
    let r = radius + height;
    Point3::new(
        ll.lat.cos() * ll.lng.sin() * r,
        ll.lat.sin() * r,
        ll.lat.cos() * ll.lng.cos() * r,
    )
}

/// Geographic position and height of a cartesian point.
pub fn to_lng_lat_height(p: &Point3<f64>, radius: f64) -> (LngLat, f64) {
    let len = p.coords.norm();
    if len == 0.0 {
        return (LngLat::new(0.0, 0.0), -radius);
    }
    let lat = (p.y / len).clamp(-1.0, 1.0).asin();
    let lng = p.x.atan2(p.z);
    (LngLat::new(lng, lat), len - radius)
}

/// The outward unit normal of the sphere at a geographic position.
pub fn lng_lat_to_normal(ll: LngLat) -> Vector3<f64> {
    to_cartesian(ll, 1.0, 0.0).coords
}

pub fn to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn poles_and_equator() {
        let origin = to_cartesian(LngLat::new(0.0, 0.0), 2.0, 0.0);
        assert_relative_eq!(origin.z, 2.0, epsilon = 1e-12);

        let pole = to_cartesian(LngLat::new(0.3, std::f64::consts::FRAC_PI_2), 2.0, 0.0);
        assert_relative_eq!(pole.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(pole.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn round_trip_with_height() {
        let ll = LngLat::new(0.7, -0.4);
        let p = to_cartesian(ll, 6371.0, 12.5);
        let (back, h) = to_lng_lat_height(&p, 6371.0);
        assert_relative_eq!(back.lng, ll.lng, epsilon = 1e-12);
        assert_relative_eq!(back.lat, ll.lat, epsilon = 1e-12);
        assert_relative_eq!(h, 12.5, epsilon = 1e-9);
    }

    #[test]
    fn zero_vector_is_guarded() {
        let (ll, h) = to_lng_lat_height(&Point3::origin(), 1.0);
        assert_eq!(ll, LngLat::new(0.0, 0.0));
        assert_eq!(h, -1.0);
    }

    #[test]
    fn lng_lat_serializes_as_pair() {
        let ll = LngLat::new(0.25, -0.5);
        let json = serde_json::to_string(&ll).unwrap();
        assert_eq!(json, "[0.25,-0.5]");
        let back: LngLat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ll);
    }
}
