//! Angle interpolation between slice spans.
//!
//! A tween maps progress in `[0, 1]` to an intermediate span. Interpolation
//! is linear in angle space and written as `a * (1 - t) + b * t`, so
//! progress 0 yields exactly the `from` span and progress 1 exactly the
//! `to` span with no rounding drift.
//!
//! Three shapes of tween drive the chart:
//!
//! | Case | From | To |
//! |------|------|----|
//! | Enter | `{end, end}` of the target | target span |
//! | Persist | span currently drawn | newly computed span |
//! | Exit | span currently drawn | `{end, end}` of the drawn span |
//!
//! Entering slices therefore sweep open from their own end angle and
//! exiting slices collapse onto theirs.
//!
//! [`Easing`] reshapes elapsed time into progress before interpolation; it
//! never moves the end points.

use serde::{Deserialize, Serialize};

use crate::geometry::AngleSpan;

/// Linear mix of `a` and `b`, exact at both ends.
fn mix(a: f64, b: f64, t: f64) -> f64 {
    a.mul_add(1.0 - t, b * t)
}

/// Clamp progress into `[0, 1]`; NaN counts as not started.
fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Interpolator between two angle spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanTween {
    from: AngleSpan,
    to: AngleSpan,
}

impl SpanTween {
    /// Interpolate from `from` to `to`.
    pub const fn new(from: AngleSpan, to: AngleSpan) -> Self {
        Self { from, to }
    }

    /// Enter case: grow `target` open from its own end angle.
    pub const fn enter(target: AngleSpan) -> Self {
        Self {
            from: AngleSpan::collapsed(target.end),
            to: target,
        }
    }

    /// Exit case: collapse `current` onto its own end angle.
    pub const fn exit(current: AngleSpan) -> Self {
        Self {
            from: current,
            to: AngleSpan::collapsed(current.end),
        }
    }

    /// Span at `progress`.
    pub fn at(&self, progress: f64) -> AngleSpan {
        let t = clamp_progress(progress);
        AngleSpan::new(
            mix(self.from.start, self.to.start, t),
            mix(self.from.end, self.to.end, t),
        )
    }

    /// Span at progress 0.
    pub const fn from(&self) -> AngleSpan {
        self.from
    }

    /// Span at progress 1.
    pub const fn to(&self) -> AngleSpan {
        self.to
    }
}

/// Time-to-progress curve applied before interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Progress equals normalized elapsed time.
    Linear,
    /// Slow start and finish, fastest at the midpoint.
    #[default]
    CubicInOut,
}

impl Easing {
    /// Map normalized elapsed time `t` to progress. Both ends are fixed:
    /// `apply(0) == 0` and `apply(1) == 1`.
    pub fn apply(self, t: f64) -> f64 {
        let t = clamp_progress(t);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                let doubled = t * 2.0;
                if doubled <= 1.0 {
                    doubled * doubled * doubled / 2.0
                } else {
                    let shifted = doubled - 2.0;
                    shifted.mul_add(shifted * shifted, 2.0) / 2.0
                }
            }
        }
    }
}
