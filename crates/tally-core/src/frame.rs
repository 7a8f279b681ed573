//! Renderable output of one animation step.

use rust_decimal::Decimal;
use serde::Serialize;
use tally_types::RecordId;

use crate::reconcile::{InstanceId, Phase};

/// Everything needed to draw the chart at one moment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    /// Monotonic frame counter, starting at 1 for the first published frame.
    pub sequence: u64,
    /// Arc shapes in creation order (later shapes paint over earlier ones).
    pub shapes: Vec<ArcShape>,
}

impl Frame {
    /// Whether the frame draws nothing.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// The shape drawn for the live element of `record_id`, if any.
    pub fn shape_for(&self, record_id: &RecordId) -> Option<&ArcShape> {
        self.shapes
            .iter()
            .find(|s| &s.record_id == record_id && s.phase != Phase::Exiting)
    }
}

/// One drawn arc.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcShape {
    /// Record the arc belongs to.
    pub record_id: RecordId,
    /// Disambiguates a re-added record from its still-exiting predecessor.
    pub instance: InstanceId,
    /// Lifecycle phase of the element.
    pub phase: Phase,
    /// SVG path `d` attribute.
    pub path: String,
    /// Fill colour, already swapped for the highlight fill when hovered.
    pub fill: String,
    /// Stroke colour.
    pub stroke: String,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Whether the arc is under the pointer.
    pub highlighted: bool,
    /// Record name, for tooltips.
    pub name: String,
    /// Record cost, for tooltips.
    pub cost: Decimal,
}
