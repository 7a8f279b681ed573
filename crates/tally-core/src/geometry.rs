//! Slice geometry for the expense pie chart.
//!
//! Pure functions only. [`compute_slices`] lays records out as contiguous
//! angular spans starting at angle 0, in snapshot order, and [`path_for`]
//! turns a span into an annular-sector outline.
//!
//! Angles are radians measured clockwise from 12 o'clock, so a point at
//! angle `a` and radius `r` sits at `(r * sin a, -r * cos a)` in SVG
//! coordinates (y grows downward).
//!
//! # Degenerate input
//!
//! Costs that are negative or not representable as a finite `f64` weigh
//! nothing. When the total weight is zero every slice is zero-width at
//! angle 0; no input makes these functions fail.

use std::f64::consts::{PI, TAU};
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tally_types::{Record, RecordId};

/// Widths closer than this to zero or a full turn are treated as such.
const ANGLE_EPSILON: f64 = 1e-9;

/// A start/end angle pair in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AngleSpan {
    /// Angle where the span begins.
    pub start: f64,
    /// Angle where the span ends.
    pub end: f64,
}

impl AngleSpan {
    /// Create a span from its two angles.
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A zero-width span sitting at `angle`.
    pub const fn collapsed(angle: f64) -> Self {
        Self {
            start: angle,
            end: angle,
        }
    }

    /// Signed angular width (`end - start`).
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// One record's share of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    /// The record this slice was computed from.
    pub record: Record,
    /// Position of the record in the snapshot.
    pub index: usize,
    /// Weight used for layout (the clamped cost as `f64`).
    pub value: f64,
    /// Angular extent of the slice.
    pub span: AngleSpan,
}

impl Slice {
    /// Key of the record this slice represents.
    pub const fn record_id(&self) -> &RecordId {
        &self.record.id
    }

    /// Angle where the slice begins.
    pub const fn start_angle(&self) -> f64 {
        self.span.start
    }

    /// Angle where the slice ends.
    pub const fn end_angle(&self) -> f64 {
        self.span.end
    }
}

/// Lay out `records` as consecutive slices whose widths are proportional to
/// cost and sum to a full turn.
pub fn compute_slices(records: &[Record]) -> Vec<Slice> {
    let weights: Vec<f64> = records.iter().map(weight_of).collect();
    let total: f64 = weights.iter().sum();
    let scale = if total > 0.0 && total.is_finite() {
        TAU / total
    } else {
        0.0
    };

    let mut angle = 0.0;
    records
        .iter()
        .zip(weights)
        .enumerate()
        .map(|(index, (record, value))| {
            let start = angle;
            let end = value.mul_add(scale, start);
            angle = end;
            Slice {
                record: record.clone(),
                index,
                value,
                span: AngleSpan::new(start, end),
            }
        })
        .collect()
}

/// Layout weight of a record: its cost, or 0 when the cost is negative or
/// not finite.
fn weight_of(record: &Record) -> f64 {
    record
        .cost
        .to_f64()
        .filter(|w| w.is_finite() && *w > 0.0)
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Path outlines
// ---------------------------------------------------------------------------

/// A single SVG path instruction, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Start a new sub-path at the point.
    MoveTo {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// Straight line to the point.
    LineTo {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// Circular arc of `radius` to the point.
    Arc {
        /// Circle radius.
        radius: f64,
        /// Take the longer of the two possible arcs.
        large_arc: bool,
        /// Sweep clockwise on screen.
        sweep: bool,
        /// Horizontal coordinate of the end point.
        x: f64,
        /// Vertical coordinate of the end point.
        y: f64,
    },
    /// Close the current sub-path.
    Close,
}

/// Renderable outline of an annular sector.
///
/// `Display` produces the SVG `d` attribute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArcPath {
    commands: Vec<PathCommand>,
}

impl ArcPath {
    /// The path instructions in drawing order.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Whether the path draws nothing at all.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo { x, y } => write!(f, "M{},{}", Coord(x), Coord(y))?,
                PathCommand::LineTo { x, y } => write!(f, "L{},{}", Coord(x), Coord(y))?,
                PathCommand::Arc {
                    radius,
                    large_arc,
                    sweep,
                    x,
                    y,
                } => write!(
                    f,
                    "A{r},{r},0,{},{},{},{}",
                    u8::from(large_arc),
                    u8::from(sweep),
                    Coord(x),
                    Coord(y),
                    r = Coord(radius),
                )?,
                PathCommand::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}

/// Coordinate formatter: three decimals, trailing zeros and negative zero
/// dropped.
struct Coord(f64);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = (self.0 * 1000.0).round() / 1000.0;
        if rounded.abs() < f64::EPSILON {
            f.write_str("0")
        } else {
            write!(f, "{rounded}")
        }
    }
}

/// Point on a circle of `radius` at `angle`.
fn polar(radius: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (radius * sin, -radius * cos)
}

/// Outline of `span` between `inner_radius` and `outer_radius`.
///
/// A zero inner radius produces a wedge closed through the centre; a span
/// of a full turn or more produces a complete ring. Non-finite input
/// yields an empty path.
pub fn path_for(span: &AngleSpan, inner_radius: f64, outer_radius: f64) -> ArcPath {
    let mut commands = Vec::new();
    let finite = [span.start, span.end, inner_radius, outer_radius]
        .iter()
        .all(|v| v.is_finite());
    if !finite || outer_radius <= 0.0 {
        return ArcPath { commands };
    }

    let outer = outer_radius;
    let inner = inner_radius.clamp(0.0, outer);
    let delta = span.width();
    let width = delta.abs();
    let sweep = delta >= 0.0;

    if width >= TAU - ANGLE_EPSILON {
        full_ring(&mut commands, inner, outer);
        return ArcPath { commands };
    }

    let (x0, y0) = polar(outer, span.start);
    commands.push(PathCommand::MoveTo { x: x0, y: y0 });

    if width > ANGLE_EPSILON {
        let (x1, y1) = polar(outer, span.end);
        commands.push(PathCommand::Arc {
            radius: outer,
            large_arc: width > PI,
            sweep,
            x: x1,
            y: y1,
        });
    }

    if inner > 0.0 {
        let (x2, y2) = polar(inner, span.end);
        commands.push(PathCommand::LineTo { x: x2, y: y2 });
        if width > ANGLE_EPSILON {
            let (x3, y3) = polar(inner, span.start);
            commands.push(PathCommand::Arc {
                radius: inner,
                large_arc: width > PI,
                sweep: !sweep,
                x: x3,
                y: y3,
            });
        }
    } else {
        commands.push(PathCommand::LineTo { x: 0.0, y: 0.0 });
    }

    commands.push(PathCommand::Close);
    ArcPath { commands }
}

/// Two half-circle arcs per radius; the inner ring is drawn
/// counter-clockwise so the even-odd and non-zero fill rules agree.
fn full_ring(commands: &mut Vec<PathCommand>, inner: f64, outer: f64) {
    commands.push(PathCommand::MoveTo { x: 0.0, y: -outer });
    for y in [outer, -outer] {
        commands.push(PathCommand::Arc {
            radius: outer,
            large_arc: true,
            sweep: true,
            x: 0.0,
            y,
        });
    }
    if inner > 0.0 {
        commands.push(PathCommand::MoveTo { x: 0.0, y: -inner });
        for y in [inner, -inner] {
            commands.push(PathCommand::Arc {
                radius: inner,
                large_arc: true,
                sweep: false,
                x: 0.0,
                y,
            });
        }
    }
    commands.push(PathCommand::Close);
}
