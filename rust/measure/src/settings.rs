// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Toolkit settings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables for all measurement tools.
///
/// Every field has a documented range checked by [`Settings::validate`];
/// construction itself never fails so partially configured settings can
/// be deserialized and fixed up before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Maximum tolerated multiplicative terrain variation along a refined
    /// edge. Must be at least 1.
    pub height_diff: f64,

    /// Outer refinement iterations per polygon computation. At least 1.
    pub max_attempt: u32,

    /// Global refinement point budget. Must cover at least the polygon
    /// corner count.
    pub max_points: usize,

    /// Minimum triangle angle in degrees, strictly between 0 and 60.
    pub sleekness: u32,

    /// Samples per segment for the path and ellipse tools.
    pub num_samples: usize,

    /// Multiplier applied to every height the terrain oracle returns.
    pub height_scale: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            height_diff: 1.002,
            max_attempt: 10,
            max_points: 1000,
            sleekness: 15,
            num_samples: 256,
            height_scale: 1.0,
        }
    }
}

impl Settings {
    /// Checks every field against its documented range.
    pub fn validate(&self) -> Result<()> {
        if !(self.height_diff >= 1.0) {
            return Err(Error::InvalidSetting {
                name: "heightDiff",
                value: self.height_diff,
                allowed: ">= 1.0",
            });
        }
        if self.max_attempt < 1 {
            return Err(Error::InvalidSetting {
                name: "maxAttempt",
                value: f64::from(self.max_attempt),
                allowed: ">= 1",
            });
        }
        if self.max_points == 0 || self.max_points > usize::from(u16::MAX) {
            return Err(Error::InvalidSetting {
                name: "maxPoints",
                value: self.max_points as f64,
                allowed: "1..=65535",
            });
        }
        if self.sleekness == 0 || self.sleekness >= 60 {
            return Err(Error::InvalidSetting {
                name: "sleekness",
                value: f64::from(self.sleekness),
                allowed: "1..=59 degrees",
            });
        }
        if self.num_samples < 2 {
            return Err(Error::InvalidSetting {
                name: "numSamples",
                value: self.num_samples as f64,
                allowed: ">= 2",
            });
        }
        if !(self.height_scale.is_finite() && self.height_scale > 0.0) {
            return Err(Error::InvalidSetting {
                name: "heightScale",
                value: self.height_scale,
                allowed: "finite and positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let mut s = Settings::default();
        s.height_diff = 0.9;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.sleekness = 60;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.max_attempt = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn nan_height_diff_is_rejected() {
        let mut s = Settings::default();
        s.height_diff = f64::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let s: Settings =
            serde_json::from_str(r#"{"heightDiff": 1.01, "somethingElse": true}"#).unwrap();
        assert_eq!(s.height_diff, 1.01);
        assert_eq!(s.max_attempt, 10);
    }
}
