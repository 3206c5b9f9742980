// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # planet-measure-delaunay
//!
//! Sweep-line (Fortune) Voronoi and Delaunay construction over a finite
//! set of planar sites.
//!
//! The sweep proceeds from the largest `y` to the smallest. The beach
//! line is the lower envelope of the parabolas traced by the processed
//! sites; its arcs and breakpoints live in per-sweep arenas and reference
//! each other through generational keys, so a stale circle event is
//! detected by a key or generation mismatch rather than a validity flag.
//!
//! ```
//! use planet_measure_delaunay::{Site, VoronoiGenerator};
//!
//! let mut gen = VoronoiGenerator::new();
//! gen.parse(&[
//!     Site::new(0.0, 0.0, 0),
//!     Site::new(1.0, 0.0, 1),
//!     Site::new(0.5, 1.0, 2),
//! ]);
//! assert_eq!(gen.triangles().len(), 1);
//! ```

mod beachline;
mod circle;
pub mod generator;
pub mod keys;
pub mod site;

pub use beachline::VoronoiEdge;
pub use generator::{DelaunayEdge, Triangle, VoronoiGenerator};
pub use site::Site;
