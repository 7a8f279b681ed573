//! Timed span transitions.
//!
//! A [`Transition`] pairs a [`SpanTween`] with a clock: it accumulates
//! elapsed time, eases it into progress, and reports the span to draw.
//!
//! # Invariants
//!
//! - Progress is always in `[0, 1]`.
//! - A zero-duration transition is complete as soon as it is advanced.
//! - A complete transition reports exactly its target span.

use std::time::Duration;

use serde::Serialize;

use crate::geometry::AngleSpan;
use crate::interpolate::{Easing, SpanTween};

/// Which of the three animation classes a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// A new element sweeping open.
    Enter,
    /// A surviving element moving to its new span.
    Persist,
    /// A departing element collapsing before removal.
    Exit,
}

/// An in-flight animation of one element's span.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    kind: TransitionKind,
    tween: SpanTween,
    easing: Easing,
    duration: Duration,
    elapsed: Duration,
}

impl Transition {
    /// Start a transition with no time elapsed.
    pub const fn new(
        kind: TransitionKind,
        tween: SpanTween,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            kind,
            tween,
            easing,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Step the clock by `dt` and return the span to draw.
    pub fn advance(&mut self, dt: Duration) -> AngleSpan {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        self.current()
    }

    /// Span at the current elapsed time.
    pub fn current(&self) -> AngleSpan {
        self.tween.at(self.easing.apply(self.linear_progress()))
    }

    /// Normalized elapsed time in `[0, 1]`, before easing.
    pub fn linear_progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Whether the full duration has elapsed.
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// The animation class.
    pub const fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Span the transition ends on.
    pub const fn target(&self) -> AngleSpan {
        self.tween.to()
    }
}
