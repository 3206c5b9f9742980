// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the measurement toolkit.

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the measurement toolkit.
///
/// Recoverable measurement conditions (degenerate polygons, oversize
/// polygons, exhausted edge recovery, oracle failures) are not errors;
/// they surface as [`crate::polygon::Diagnostics`] flags on an otherwise
/// zeroed result. Only contract violations end up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A settings field is outside its documented range.
    #[error("invalid setting {name}: {value} (allowed: {allowed})")]
    InvalidSetting {
        name: &'static str,
        value: f64,
        allowed: &'static str,
    },

    /// The body radius must be a positive length in meters.
    #[error("body radius must be positive, got {0}")]
    InvalidRadius(f64),

    /// Serialization of tool placements failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization of tool placements failed.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}
