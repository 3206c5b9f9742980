// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Round-trip tests for the tool placement format.

use planet_measure::convert::LngLat;
use planet_measure::persistence::{from_json, to_json, DeserializationContext};
use planet_measure::polygon::PolygonTool;
use planet_measure::settings::Settings;
use planet_measure::tools::{DipStrikeTool, EllipseTool, FlagTool, PathTool, Tool};

fn sample_tools() -> Vec<Tool> {
    let mut flag = FlagTool::new("mars", "iau_mars", LngLat::new(0.3, -0.2));
    flag.text = "landing site".into();
    flag.color = [0.9, 0.2, 0.2];
    flag.minimized = true;

    let mut path = PathTool::new("mars", "iau_mars");
    path.add_point(LngLat::new(0.0, 0.0));
    path.add_point(LngLat::new(0.1, 0.05));
    path.text = "traverse".into();

    let mut ellipse = EllipseTool::new("mars", "iau_mars", LngLat::new(0.5, 0.1));
    ellipse.handles = Some([LngLat::new(0.52, 0.1), LngLat::new(0.5, 0.12)]);

    let mut dip_strike = DipStrikeTool::new("mars", "iau_mars");
    dip_strike.add_point(LngLat::new(0.0, 0.0));
    dip_strike.add_point(LngLat::new(0.01, 0.0));
    dip_strike.add_point(LngLat::new(0.0, 0.01));

    let mut polygon = PolygonTool::new("mars", "iau_mars");
    polygon.add_point(LngLat::new(0.0, 0.0));
    polygon.add_point(LngLat::new(0.1, 0.0));
    polygon.add_point(LngLat::new(0.05, 0.1));
    polygon.color = [0.1, 0.8, 0.4];

    vec![
        Tool::Flag(flag),
        Tool::Path(path),
        Tool::Ellipse(ellipse),
        Tool::DipStrike(dip_strike),
        Tool::Polygon(polygon),
    ]
}

#[test]
fn every_tool_kind_round_trips() {
    let mut settings = Settings::default();
    settings.height_diff = 1.01;
    settings.sleekness = 25;
    settings.num_samples = 128;

    let tools = sample_tools();
    let json = to_json(&settings, &tools).unwrap();

    let ctx = DeserializationContext::default();
    let placements = from_json(&json, &ctx).unwrap();

    assert_eq!(placements.tools, tools);
    assert_eq!(placements.settings.height_diff, 1.01);
    assert_eq!(placements.settings.sleekness, 25);
    assert_eq!(placements.settings.num_samples, 128);
}

#[test]
fn serialization_is_stable() {
    let settings = Settings::default();
    let tools = sample_tools();
    let first = to_json(&settings, &tools).unwrap();
    let second = to_json(&settings, &tools).unwrap();
    assert_eq!(first, second);
}

#[test]
fn recognized_keys_survive_in_the_document() {
    let json = to_json(&Settings::default(), &sample_tools()).unwrap();
    for key in [
        "polygonHeightDiff",
        "polygonMaxAttempt",
        "polygonMaxPoints",
        "polygonSleekness",
        "ellipseSamples",
        "pathSamples",
        "flags",
        "paths",
        "ellipses",
        "dipStrikes",
        "polygons",
        "lngLat",
        "scaleDistance",
        "handle0",
        "handle1",
        "handle2",
        "positions",
        "minimized",
        "center",
        "frame",
        "color",
        "text",
    ] {
        assert!(json.contains(key), "missing key {key}");
    }
}

#[test]
fn foreign_documents_deserialize_with_defaults() {
    let ctx = DeserializationContext::default();
    let placements = from_json(
        r#"{
            "polygonMaxPoints": 500,
            "flags": [{"center": "moon", "lngLat": [1.0, 0.5]}],
            "polygons": [{"positions": [[0.0, 0.0], [0.1, 0.0], [0.1, 0.1]]}],
            "futureTool": [{"whatever": true}]
        }"#,
        &ctx,
    )
    .unwrap();

    assert_eq!(placements.settings.max_points, 500);
    assert_eq!(placements.tools.len(), 2);

    let Tool::Flag(flag) = &placements.tools[0] else {
        panic!("expected a flag first");
    };
    assert_eq!(flag.center, "moon");
    assert_eq!(flag.scale_distance, -1.0);

    let Tool::Polygon(polygon) = &placements.tools[1] else {
        panic!("expected a polygon");
    };
    assert_eq!(polygon.positions.len(), 3);
}
