// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # planet-measure
//!
//! Surface measurements on planetary bodies: point flags, terrain
//! profiles along paths, ellipses, dip and strike planes, and the
//! polygon engine computing surface area and signed volume of an
//! arbitrary user-drawn polygon.
//!
//! The toolkit is pure computation. Rendering, input handling and UI
//! belong to the embedder; tools report their derived data through a
//! typed [`events::EventQueue`] and everything else returns by value.
//!
//! ```
//! use planet_measure::body::UniformBody;
//! use planet_measure::convert::LngLat;
//! use planet_measure::polygon;
//! use planet_measure::settings::Settings;
//!
//! let body = UniformBody::with_radius(1.0);
//! let corners = [
//!     LngLat::new(0.0, 0.0),
//!     LngLat::new(0.1, 0.0),
//!     LngLat::new(0.1, 0.1),
//!     LngLat::new(0.0, 0.1),
//! ];
//! let result = polygon::compute(&corners, &body, &Settings::default()).unwrap();
//! assert!((result.area - 0.01).abs() < 1e-4);
//! ```

pub mod body;
pub mod convert;
pub mod error;
pub mod events;
pub mod persistence;
pub mod plane;
pub mod polygon;
pub mod settings;
pub mod tools;

pub use body::{Body, UniformBody};
pub use convert::{LngLat, LngLatBounds};
pub use error::{Error, Result};
pub use events::{EventQueue, ToolEvent};
pub use polygon::{compute, Diagnostics, PolygonResult, PolygonTool};
pub use settings::Settings;
pub use tools::Tool;
