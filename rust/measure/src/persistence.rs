// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persistence of tool placements.
//!
//! Placements serialize into one JSON document: toolkit-wide settings
//! keys plus one array per tool kind. Unknown keys are ignored, missing
//! keys fall back to defaults supplied through an explicit
//! [`DeserializationContext`]. Round-trips preserve every recognized
//! key.

use serde::{Deserialize, Serialize};

use crate::convert::LngLat;
use crate::error::{Error, Result};
use crate::polygon::PolygonTool;
use crate::settings::Settings;
use crate::tools::{DipStrikeTool, EllipseTool, FlagTool, PathTool, Tool};

/// Defaults applied wherever the serialized document is silent.
#[derive(Debug, Clone, Default)]
pub struct DeserializationContext {
    pub settings: Settings,
}

/// The deserialized toolkit state.
#[derive(Debug, Clone, PartialEq)]
pub struct Placements {
    pub settings: Settings,
    pub tools: Vec<Tool>,
}

/// Reads placements from a JSON document.
pub fn from_json(json: &str, ctx: &DeserializationContext) -> Result<Placements> {
    let file: PlacementsFile =
        serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))?;

    let mut settings = ctx.settings;
    if let Some(v) = file.polygon_height_diff {
        settings.height_diff = v;
    }
    if let Some(v) = file.polygon_max_attempt {
        settings.max_attempt = v;
    }
    if let Some(v) = file.polygon_max_points {
        settings.max_points = v;
    }
    if let Some(v) = file.polygon_sleekness {
        settings.sleekness = v;
    }
    if let Some(v) = file.path_samples.or(file.ellipse_samples) {
        settings.num_samples = v;
    }

    let mut tools = Vec::new();
    tools.extend(file.flags.into_iter().map(|p| Tool::Flag(p.into())));
    tools.extend(file.paths.into_iter().map(|p| Tool::Path(p.into())));
    tools.extend(file.ellipses.into_iter().map(|p| Tool::Ellipse(p.into())));
    tools.extend(
        file.dip_strikes
            .into_iter()
            .map(|p| Tool::DipStrike(p.into())),
    );
    tools.extend(file.polygons.into_iter().map(|p| Tool::Polygon(p.into())));

    Ok(Placements { settings, tools })
}

/// Writes placements to a pretty-printed JSON document.
pub fn to_json(settings: &Settings, tools: &[Tool]) -> Result<String> {
    let mut file = PlacementsFile {
        polygon_height_diff: Some(settings.height_diff),
        polygon_max_attempt: Some(settings.max_attempt),
        polygon_max_points: Some(settings.max_points),
        polygon_sleekness: Some(settings.sleekness),
        ellipse_samples: Some(settings.num_samples),
        path_samples: Some(settings.num_samples),
        ..PlacementsFile::default()
    };

    for tool in tools {
        match tool {
            Tool::Flag(t) => file.flags.push(t.clone().into()),
            Tool::Path(t) => file.paths.push(t.clone().into()),
            Tool::Ellipse(t) => file.ellipses.push(t.clone().into()),
            Tool::DipStrike(t) => file.dip_strikes.push(t.clone().into()),
            Tool::Polygon(t) => file.polygons.push(t.clone().into()),
        }
    }

    serde_json::to_string_pretty(&file).map_err(|e| Error::Serialization(e.to_string()))
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlacementsFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    polygon_height_diff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    polygon_max_attempt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    polygon_max_points: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    polygon_sleekness: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ellipse_samples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path_samples: Option<usize>,

    flags: Vec<FlagPlacement>,
    paths: Vec<PathPlacement>,
    ellipses: Vec<EllipsePlacement>,
    dip_strikes: Vec<DipStrikePlacement>,
    polygons: Vec<PolygonPlacement>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FlagPlacement {
    center: String,
    frame: String,
    lng_lat: LngLat,
    color: [f64; 3],
    scale_distance: f64,
    text: String,
    minimized: bool,
}

impl Default for FlagPlacement {
    fn default() -> Self {
        FlagTool::default().into()
    }
}

impl From<FlagTool> for FlagPlacement {
    fn from(t: FlagTool) -> Self {
        Self {
            center: t.center,
            frame: t.frame,
            lng_lat: t.lng_lat,
            color: t.color,
            scale_distance: t.scale_distance,
            text: t.text,
            minimized: t.minimized,
        }
    }
}

impl From<FlagPlacement> for FlagTool {
    fn from(p: FlagPlacement) -> Self {
        Self {
            center: p.center,
            frame: p.frame,
            lng_lat: p.lng_lat,
            color: p.color,
            scale_distance: p.scale_distance,
            text: p.text,
            minimized: p.minimized,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PathPlacement {
    center: String,
    frame: String,
    positions: Vec<LngLat>,
    color: [f64; 3],
    scale_distance: f64,
    text: String,
}

impl Default for PathPlacement {
    fn default() -> Self {
        PathTool::default().into()
    }
}

impl From<PathTool> for PathPlacement {
    fn from(t: PathTool) -> Self {
        Self {
            center: t.center,
            frame: t.frame,
            positions: t.positions,
            color: t.color,
            scale_distance: t.scale_distance,
            text: t.text,
        }
    }
}

impl From<PathPlacement> for PathTool {
    fn from(p: PathPlacement) -> Self {
        Self {
            center: p.center,
            frame: p.frame,
            positions: p.positions,
            color: p.color,
            scale_distance: p.scale_distance,
            text: p.text,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EllipsePlacement {
    center: String,
    frame: String,
    /// The center handle.
    handle0: LngLat,
    #[serde(skip_serializing_if = "Option::is_none")]
    handle1: Option<LngLat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    handle2: Option<LngLat>,
    color: [f64; 3],
    scale_distance: f64,
    text: String,
    minimized: bool,
}

impl Default for EllipsePlacement {
    fn default() -> Self {
        EllipseTool::default().into()
    }
}

impl From<EllipseTool> for EllipsePlacement {
    fn from(t: EllipseTool) -> Self {
        Self {
            center: t.center,
            frame: t.frame,
            handle0: t.origin,
            handle1: t.handles.map(|h| h[0]),
            handle2: t.handles.map(|h| h[1]),
            color: t.color,
            scale_distance: t.scale_distance,
            text: t.text,
            minimized: t.minimized,
        }
    }
}

impl From<EllipsePlacement> for EllipseTool {
    fn from(p: EllipsePlacement) -> Self {
        Self {
            center: p.center,
            frame: p.frame,
            origin: p.handle0,
            handles: match (p.handle1, p.handle2) {
                (Some(a), Some(b)) => Some([a, b]),
                _ => None,
            },
            color: p.color,
            scale_distance: p.scale_distance,
            text: p.text,
            minimized: p.minimized,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DipStrikePlacement {
    center: String,
    frame: String,
    positions: Vec<LngLat>,
    color: [f64; 3],
    scale_distance: f64,
    text: String,
    minimized: bool,
}

impl Default for DipStrikePlacement {
    fn default() -> Self {
        DipStrikeTool::default().into()
    }
}

impl From<DipStrikeTool> for DipStrikePlacement {
    fn from(t: DipStrikeTool) -> Self {
        Self {
            center: t.center,
            frame: t.frame,
            positions: t.positions,
            color: t.color,
            scale_distance: t.scale_distance,
            text: t.text,
            minimized: t.minimized,
        }
    }
}

impl From<DipStrikePlacement> for DipStrikeTool {
    fn from(p: DipStrikePlacement) -> Self {
        Self {
            center: p.center,
            frame: p.frame,
            positions: p.positions,
            color: p.color,
            scale_distance: p.scale_distance,
            text: p.text,
            minimized: p.minimized,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PolygonPlacement {
    center: String,
    frame: String,
    positions: Vec<LngLat>,
    color: [f64; 3],
    scale_distance: f64,
    text: String,
    minimized: bool,
}

impl Default for PolygonPlacement {
    fn default() -> Self {
        PolygonTool::default().into()
    }
}

impl From<PolygonTool> for PolygonPlacement {
    fn from(t: PolygonTool) -> Self {
        Self {
            center: t.center,
            frame: t.frame,
            positions: t.positions,
            color: t.color,
            scale_distance: t.scale_distance,
            text: t.text,
            minimized: t.minimized,
        }
    }
}

impl From<PolygonPlacement> for PolygonTool {
    fn from(p: PolygonPlacement) -> Self {
        Self {
            center: p.center,
            frame: p.frame,
            positions: p.positions,
            color: p.color,
            scale_distance: p.scale_distance,
            text: p.text,
            minimized: p.minimized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_context_defaults() {
        let ctx = DeserializationContext::default();
        let placements = from_json("{}", &ctx).unwrap();
        assert_eq!(placements.settings, Settings::default());
        assert!(placements.tools.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let ctx = DeserializationContext::default();
        let placements = from_json(
            r#"{"polygonSleekness": 20, "futureFeature": {"a": 1}}"#,
            &ctx,
        )
        .unwrap();
        assert_eq!(placements.settings.sleekness, 20);
    }

    #[test]
    fn partial_flag_entries_are_filled_in() {
        let ctx = DeserializationContext::default();
        let placements = from_json(
            r#"{"flags": [{"lngLat": [0.5, 0.25], "text": "landing site"}]}"#,
            &ctx,
        )
        .unwrap();
        assert_eq!(placements.tools.len(), 1);
        let Tool::Flag(flag) = &placements.tools[0] else {
            panic!("expected a flag");
        };
        assert_eq!(flag.lng_lat, LngLat::new(0.5, 0.25));
        assert_eq!(flag.text, "landing site");
        assert_eq!(flag.color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let ctx = DeserializationContext::default();
        assert!(from_json("{not json", &ctx).is_err());
    }
}
