// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The measurement tools.
//!
//! Every tool kind is one variant of [`Tool`]; whoever owns the tool
//! list matches on the variant where the behavior differs. Updates are
//! uniform: each tool recomputes its derived data against the body and
//! reports the outcome through the session's event queue.

pub mod dip_strike;
pub mod ellipse;
pub mod flag;
pub mod path;

pub use dip_strike::{DipStrike, DipStrikeTool};
pub use ellipse::EllipseTool;
pub use flag::FlagTool;
pub use path::{PathSamples, PathTool};

use crate::body::Body;
use crate::error::Result;
use crate::events::EventQueue;
use crate::polygon::PolygonTool;
use crate::settings::Settings;

/// Any placed measurement tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    Flag(FlagTool),
    Path(PathTool),
    Ellipse(EllipseTool),
    DipStrike(DipStrikeTool),
    Polygon(PolygonTool),
}

impl Tool {
    /// The tool kind as a stable lowercase name.
    pub fn kind(&self) -> &'static str {
        match self {
            Tool::Flag(_) => "flag",
            Tool::Path(_) => "path",
            Tool::Ellipse(_) => "ellipse",
            Tool::DipStrike(_) => "dipStrike",
            Tool::Polygon(_) => "polygon",
        }
    }

    /// Name of the body the tool is anchored to.
    pub fn center(&self) -> &str {
        match self {
            Tool::Flag(t) => &t.center,
            Tool::Path(t) => &t.center,
            Tool::Ellipse(t) => &t.center,
            Tool::DipStrike(t) => &t.center,
            Tool::Polygon(t) => &t.center,
        }
    }

    /// Recomputes the tool's derived data and queues its events.
    pub fn update(
        &mut self,
        body: &dyn Body,
        settings: &Settings,
        events: &mut EventQueue,
    ) -> Result<()> {
        match self {
            Tool::Flag(t) => t.update(body, settings, events),
            Tool::Path(t) => t.update(body, settings, events),
            Tool::Ellipse(t) => {
                t.update(body, settings, events);
            }
            Tool::DipStrike(t) => {
                t.update(body, settings, events);
            }
            Tool::Polygon(t) => {
                t.update(body, settings, events)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::UniformBody;
    use crate::convert::LngLat;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(Tool::Flag(FlagTool::default()).kind(), "flag");
        assert_eq!(Tool::Polygon(PolygonTool::default()).kind(), "polygon");
    }

    #[test]
    fn update_dispatches_over_all_variants() {
        let body = UniformBody::with_radius(10.0);
        let settings = Settings::default();
        let mut events = EventQueue::new();

        let mut tools = vec![
            Tool::Flag(FlagTool::new("", "", LngLat::new(0.1, 0.2))),
            Tool::Path(PathTool::default()),
            Tool::Ellipse(EllipseTool::new("", "", LngLat::new(0.0, 0.0))),
            Tool::DipStrike(DipStrikeTool::default()),
        ];
        for tool in &mut tools {
            tool.update(&body, &settings, &mut events).unwrap();
        }
        assert!(!events.is_empty());
    }
}
