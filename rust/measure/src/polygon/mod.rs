// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The polygon area and volume engine.
//!
//! A polygon is an ordered ring of geographic corners on the body. One
//! [`compute`] call projects the corners into a tangent plane, builds a
//! Delaunay triangulation containing every boundary edge, adaptively
//! refines the interior triangles against the terrain, and integrates
//! surface area and signed volumes over the refined mesh. The volume
//! reference is the least-squares plane through the heighted corners;
//! material above it counts positive, material below negative.
//!
//! Nothing in here panics on malformed measurements: degenerate rings,
//! oversize polygons and missing terrain data zero the affected outputs
//! and set a [`Diagnostics`] flag instead.

pub(crate) mod integrate;
pub(crate) mod mesh;
pub(crate) mod refine;

use planet_measure_delaunay::{Site, Triangle, VoronoiGenerator};

use crate::body::Body;
use crate::convert::{to_cartesian, LngLat, LngLatBounds};
use crate::error::{Error, Result};
use crate::events::{EventQueue, ToolEvent};
use crate::plane::FittedPlane;
use crate::settings::Settings;

use integrate::Integrator;
pub use integrate::MeshSegment;
use mesh::Projection;

/// Flags describing how a computation went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Fewer than three distinct corners, or no interior triangles.
    pub degenerate_input: bool,
    /// The polygon spans a hemisphere or more; all outputs are zero.
    pub polygon_too_large: bool,
    /// A corner position was NaN or zero; all outputs are zero.
    pub non_finite_input: bool,
    /// Edge recovery hit its iteration cap with boundary edges still
    /// missing; the result is a best effort.
    pub edge_recovery_exhausted: bool,
    /// Sweeps spent on edge recovery.
    pub edge_recovery_iterations: u32,
    /// Refinement attempts spent.
    pub attempts: u32,
    /// Total refined sites over all interior triangles.
    pub refined_points: usize,
    /// Number of NaN terrain heights encountered; affected geometry
    /// contributed nothing.
    pub oracle_failures: u32,
}

/// The outcome of one polygon computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonResult {
    /// Terrain surface area in square meters.
    pub area: f64,
    /// Volume above the reference plane, cubic meters, >= 0.
    pub positive_volume: f64,
    /// Volume below the reference plane, cubic meters, <= 0.
    pub negative_volume: f64,
    /// Refined mesh edges on the terrain, for display.
    pub mesh_segments: Vec<MeshSegment>,
    /// Geographic bounds of the input corners.
    pub bounds: Option<LngLatBounds>,
    pub diagnostics: Diagnostics,
}

/// Computes area and signed volumes of a polygon drawn on `body`.
///
/// `corners` is the ring of polygon corners in cyclic order. Returns an
/// error only for contract violations (invalid settings, non-positive
/// radius); every measurement-level failure comes back as a zeroed
/// result with diagnostics set.
pub fn compute(corners: &[LngLat], body: &dyn Body, settings: &Settings) -> Result<PolygonResult> {
    settings.validate()?;
    let radius = body.radius();
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(Error::InvalidRadius(radius));
    }

    let mut result = PolygonResult {
        bounds: LngLatBounds::of(corners),
        ..PolygonResult::default()
    };

    if corners.len() < 3 {
        result.diagnostics.degenerate_input = true;
        return Ok(result);
    }
    if settings.max_points < corners.len() {
        return Err(Error::InvalidSetting {
            name: "maxPoints",
            value: settings.max_points as f64,
            allowed: ">= corner count",
        });
    }

    // Heighted cartesian corner positions.
    let mut positions = Vec::with_capacity(corners.len());
    for ll in corners {
        let h = body.height(*ll) * settings.height_scale;
        let p = to_cartesian(*ll, radius, h);
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
            || p.coords.norm_squared() == 0.0
        {
            result.diagnostics.non_finite_input = true;
            return Ok(result);
        }
        positions.push(p);
    }

    let Some(projection) = Projection::new(&positions, radius) else {
        result.diagnostics.polygon_too_large = true;
        log::warn!("polygon spans more than a hemisphere, area and volume calculation disabled");
        return Ok(result);
    };

    // The volume reference plane through the heighted corners.
    let plane = FittedPlane::fit(&positions, projection.normal, radius);

    let Some(mut ring) = mesh::project_corners(&projection, &positions) else {
        result.diagnostics.non_finite_input = true;
        return Ok(result);
    };
    if ring.len() < 3 {
        result.diagnostics.degenerate_input = true;
        return Ok(result);
    }

    let outcome = mesh::build_mesh(&mut ring);
    result.diagnostics.edge_recovery_exhausted = !outcome.edges_ok;
    result.diagnostics.edge_recovery_iterations = outcome.iterations;

    // Keep the triangles whose plane centroid lies inside the ring.
    let interior: Vec<Triangle> = outcome
        .triangles
        .iter()
        .filter(|t| mesh::point_in_polygon(&ring, t.centroid()))
        .copied()
        .collect();
    if interior.is_empty() {
        result.diagnostics.degenerate_input = true;
        return Ok(result);
    }

    // Per-triangle site lists, seeded with the triangle corners and
    // grown by the refinement passes.
    let mut corners_fine: Vec<Vec<Site>> = interior
        .iter()
        .map(|t| {
            let [a, b, c] = t.sites();
            vec![
                Site::new(a.x, a.y, 0),
                Site::new(b.x, b.y, 1),
                Site::new(c.x, c.y, 2),
            ]
        })
        .collect();

    let min_angle = f64::from(settings.sleekness).to_radians();
    let mut fine = false;
    let mut attempt = 0u32;
    let mut point_count = 0usize;

    let mut area = 0.0;
    let mut positive_volume = 0.0;
    let mut negative_volume = 0.0;
    let mut segments = Vec::new();
    let mut oracle_failures = 0;

    let mut local = VoronoiGenerator::new();
    while !fine && attempt < settings.max_attempt && point_count < settings.max_points {
        attempt += 1;
        fine = true;
        point_count = 0;

        let mut integrator = Integrator::new(&projection, &plane, body, settings.height_scale);

        for sites in corners_fine.iter_mut() {
            let overflow = refine::check_sleekness(sites, min_angle);
            local.parse(sites);

            for edge in local.delaunay_edges() {
                let (h1, h2) = integrator.mesh_segment(edge);

                // All sub-edges are inside the triangle and the polygon,
                // no interior test needed here.
                if !overflow && point_count < settings.max_points && attempt < settings.max_attempt
                {
                    refine::refine_edge(
                        (&edge.0, &edge.1),
                        h1,
                        h2,
                        &mut integrator,
                        settings.height_diff,
                        sites,
                        &mut fine,
                    );
                }
            }

            for t in local.triangles() {
                integrator.add_triangle(t);
            }
            point_count += sites.len();
        }

        area = integrator.area;
        positive_volume = integrator.positive_volume;
        negative_volume = integrator.negative_volume;
        oracle_failures = integrator.oracle_failures;
        segments = std::mem::take(&mut integrator.segments);
    }

    result.area = if area.is_finite() { area } else { 0.0 };
    result.positive_volume = if positive_volume.is_finite() {
        positive_volume
    } else {
        0.0
    };
    result.negative_volume = if negative_volume.is_finite() {
        negative_volume
    } else {
        0.0
    };
    result.mesh_segments = segments;
    result.diagnostics.attempts = attempt;
    result.diagnostics.refined_points = point_count;
    result.diagnostics.oracle_failures = oracle_failures;
    Ok(result)
}

/// A placed polygon tool: the corner ring plus its display state.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonTool {
    /// Name of the body the tool is anchored to.
    pub center: String,
    /// Reference frame of the anchor.
    pub frame: String,
    /// Polygon corners in cyclic order.
    pub positions: Vec<LngLat>,
    pub color: [f64; 3],
    pub scale_distance: f64,
    pub text: String,
    pub minimized: bool,
}

impl Default for PolygonTool {
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

impl PolygonTool {
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

    /// Recomputes the measurement and reports the outcome as events.
    pub fn update(
        &self,
        body: &dyn Body,
        settings: &Settings,
        events: &mut EventQueue,
    ) -> Result<PolygonResult> {
        let result = compute(&self.positions, body, settings)?;

        events.push(ToolEvent::AreaChanged(result.area));
        events.push(ToolEvent::VolumeChanged {
            positive: result.positive_volume,
            negative: result.negative_volume,
        });
        if let Some(bounds) = result.bounds {
            events.push(ToolEvent::BoundsChanged(bounds));
        }
        Ok(result)
    }
}
