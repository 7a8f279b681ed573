//! Visual reconciliation of the snapshot against drawn elements.
//!
//! The [`Reconciler`] keeps one [`Element`] per drawn arc in an explicit
//! keyed map. Each [`Reconciler::reconcile`] pass diffs the snapshot's ids
//! against the live elements and starts transitions:
//!
//! - ids new to the chart **enter**, sweeping open from their end angle;
//! - ids still present **persist**, moving from whatever span is drawn now
//!   to their new slice (this also retargets an in-flight transition);
//! - live elements whose id vanished **exit**, collapsing onto their end
//!   angle, and are dropped once [`Reconciler::advance`] completes the exit.
//!
//! An id removed and re-added while its old element is still exiting gets a
//! fresh [`InstanceId`], so both elements coexist until the exit finishes.
//! At most one non-exiting element exists per record id.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tally_types::{Record, RecordId};
use tracing::{debug, trace};

use crate::config::{AnimationConfig, ChartConfig};
use crate::frame::{ArcShape, Frame};
use crate::geometry::{AngleSpan, Slice, compute_slices, path_for};
use crate::interpolate::{Easing, SpanTween};
use crate::palette::Palette;
use crate::transition::{Transition, TransitionKind};

/// Creation counter distinguishing successive elements of the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a drawn element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElementKey {
    /// Record the element draws.
    pub record_id: RecordId,
    /// Which incarnation of that record.
    pub instance: InstanceId,
}

/// Lifecycle phase of a drawn element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Sweeping open after being added.
    Entering,
    /// Live in the snapshot, possibly moving to a new span.
    Present,
    /// Collapsing before removal.
    Exiting,
}

/// Per-element rendering state.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    key: ElementKey,
    retained: Slice,
    drawn: AngleSpan,
    fill: String,
    phase: Phase,
    transition: Option<Transition>,
    highlighted: bool,
}

impl Element {
    /// Identity of the element.
    pub const fn key(&self) -> &ElementKey {
        &self.key
    }

    /// Slice most recently targeted for this element.
    pub const fn retained(&self) -> &Slice {
        &self.retained
    }

    /// Span drawn right now.
    pub const fn drawn(&self) -> AngleSpan {
        self.drawn
    }

    /// Fill assigned when the element entered.
    pub fn fill(&self) -> &str {
        &self.fill
    }

    /// Lifecycle phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Kind of the running transition, if one is in flight.
    pub fn transition_kind(&self) -> Option<TransitionKind> {
        self.transition.as_ref().map(Transition::kind)
    }

    /// Whether a transition is in flight.
    pub const fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Whether the element is hovered.
    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub(crate) const fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    fn to_shape(&self, chart: &ChartConfig) -> ArcShape {
        let fill = if self.highlighted {
            chart.highlight_fill.clone()
        } else {
            self.fill.clone()
        };
        ArcShape {
            record_id: self.key.record_id.clone(),
            instance: self.key.instance,
            phase: self.phase,
            path: path_for(&self.drawn, chart.inner_radius, chart.radius).to_string(),
            fill,
            stroke: chart.stroke.clone(),
            stroke_width: chart.stroke_width,
            highlighted: self.highlighted,
            name: self.retained.record.name.clone(),
            cost: self.retained.record.cost,
        }
    }
}

/// What one reconcile pass started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Elements created.
    pub entered: usize,
    /// Elements retargeted.
    pub persisted: usize,
    /// Elements that began exiting.
    pub exited: usize,
}

/// What one animation step did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Elements still animating after the step.
    pub animating: usize,
    /// Elements dropped because their exit completed.
    pub removed: Vec<ElementKey>,
    /// Whether any drawn span moved or an element was dropped.
    pub changed: bool,
}

/// Keyed element state and transition driver.
#[derive(Debug, Clone)]
pub struct Reconciler {
    elements: BTreeMap<InstanceId, Element>,
    live: BTreeMap<RecordId, InstanceId>,
    next_instance: u64,
    duration: Duration,
    easing: Easing,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

impl Reconciler {
    /// Create an empty reconciler with the given transition timing.
    pub const fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            elements: BTreeMap::new(),
            live: BTreeMap::new(),
            next_instance: 0,
            duration,
            easing,
        }
    }

    /// Create an empty reconciler from animation settings.
    pub const fn from_config(config: &AnimationConfig) -> Self {
        Self::new(config.duration(), config.easing)
    }

    /// Diff `records` against the drawn elements and start transitions.
    ///
    /// The palette's domain is reset to the snapshot's names; fills are
    /// assigned only to entering elements.
    pub fn reconcile(&mut self, records: &[Record], palette: &mut Palette) -> ReconcileReport {
        let slices = compute_slices(records);
        palette.set_domain(records.iter().map(|r| r.name.as_str()));

        let mut report = ReconcileReport::default();
        let mut seen: BTreeSet<&RecordId> = BTreeSet::new();

        for slice in &slices {
            seen.insert(slice.record_id());
            let existing = self.live.get(slice.record_id()).copied();
            match existing.and_then(|instance| self.elements.get_mut(&instance)) {
                Some(element) => {
                    element.transition = Some(Transition::new(
                        TransitionKind::Persist,
                        SpanTween::new(element.drawn, slice.span),
                        self.duration,
                        self.easing,
                    ));
                    element.retained = slice.clone();
                    element.phase = Phase::Present;
                    report.persisted = report.persisted.saturating_add(1);
                }
                None => {
                    self.enter(slice.clone(), palette);
                    report.entered = report.entered.saturating_add(1);
                }
            }
        }

        let departed: Vec<RecordId> = self
            .live
            .keys()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();
        for id in departed {
            let Some(instance) = self.live.remove(&id) else {
                continue;
            };
            if let Some(element) = self.elements.get_mut(&instance) {
                element.transition = Some(Transition::new(
                    TransitionKind::Exit,
                    SpanTween::exit(element.drawn),
                    self.duration,
                    self.easing,
                ));
                element.phase = Phase::Exiting;
                element.highlighted = false;
                report.exited = report.exited.saturating_add(1);
                debug!(%id, %instance, "element exiting");
            }
        }

        debug!(
            entered = report.entered,
            persisted = report.persisted,
            exited = report.exited,
            elements = self.elements.len(),
            "reconciled"
        );
        report
    }

    fn enter(&mut self, slice: Slice, palette: &mut Palette) {
        let instance = InstanceId(self.next_instance);
        self.next_instance = self.next_instance.saturating_add(1);
        let key = ElementKey {
            record_id: slice.record_id().clone(),
            instance,
        };
        let tween = SpanTween::enter(slice.span);
        let element = Element {
            fill: palette.colour(&slice.record.name),
            drawn: tween.from(),
            transition: Some(Transition::new(
                TransitionKind::Enter,
                tween,
                self.duration,
                self.easing,
            )),
            retained: slice,
            phase: Phase::Entering,
            highlighted: false,
            key,
        };
        debug!(id = %element.key.record_id, %instance, "element entering");
        self.live.insert(element.key.record_id.clone(), instance);
        self.elements.insert(instance, element);
    }

    /// Step every in-flight transition by `dt`.
    ///
    /// Completed enters become present; completed exits are dropped.
    pub fn advance(&mut self, dt: Duration) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        for element in self.elements.values_mut() {
            let Some(transition) = element.transition.as_mut() else {
                continue;
            };
            let drawn = transition.advance(dt);
            if drawn != element.drawn {
                element.drawn = drawn;
                report.changed = true;
            }
            if !transition.is_complete() {
                report.animating = report.animating.saturating_add(1);
                continue;
            }
            element.transition = None;
            match element.phase {
                Phase::Entering => element.phase = Phase::Present,
                Phase::Exiting => report.removed.push(element.key.clone()),
                Phase::Present => {}
            }
        }

        for key in &report.removed {
            self.elements.remove(&key.instance);
            report.changed = true;
            trace!(id = %key.record_id, instance = %key.instance, "element removed");
        }
        report
    }

    /// Renderable shapes in creation order.
    pub fn frame(&self, sequence: u64, chart: &ChartConfig) -> Frame {
        Frame {
            sequence,
            shapes: self.elements.values().map(|e| e.to_shape(chart)).collect(),
        }
    }

    /// The live (non-exiting) element for `record_id`.
    pub fn element(&self, record_id: &RecordId) -> Option<&Element> {
        self.live
            .get(record_id)
            .and_then(|instance| self.elements.get(instance))
    }

    pub(crate) fn live_element_mut(&mut self, record_id: &RecordId) -> Option<&mut Element> {
        let instance = self.live.get(record_id).copied()?;
        self.elements.get_mut(&instance)
    }

    /// Every element, exiting ones included, in creation order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Phase of the live element for `record_id`.
    pub fn phase_of(&self, record_id: &RecordId) -> Option<Phase> {
        self.element(record_id).map(Element::phase)
    }

    /// Whether any transition is in flight.
    pub fn is_animating(&self) -> bool {
        self.elements.values().any(Element::is_animating)
    }

    /// Number of drawn elements, exiting ones included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
