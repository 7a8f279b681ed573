//! The chart's owned state, bundled for the driver.

use std::time::Duration;

use tally_types::{ChangeBatch, Record, RecordId};
use tracing::debug;

use crate::config::{ChartConfig, TallyConfig};
use crate::frame::Frame;
use crate::interaction::{self, DeleteRequest, Tooltip};
use crate::palette::Palette;
use crate::reconcile::{AdvanceReport, ReconcileReport, Reconciler};
use crate::snapshot::{ApplySummary, SnapshotStore};

/// Snapshot, element state and colour scale of one chart.
///
/// Not shared: a single task owns the session and serializes every change
/// batch, animation step and interaction through it.
#[derive(Debug, Clone)]
pub struct ChartSession {
    snapshot: SnapshotStore,
    reconciler: Reconciler,
    palette: Palette,
    chart: ChartConfig,
    sequence: u64,
}

impl ChartSession {
    /// Create an empty session.
    pub fn new(config: &TallyConfig) -> Self {
        Self {
            snapshot: SnapshotStore::new(),
            reconciler: Reconciler::from_config(&config.animation),
            palette: Palette::new(config.chart.palette.clone()),
            chart: config.chart.clone(),
            sequence: 0,
        }
    }

    /// Apply every change in `batch`, then reconcile once.
    ///
    /// A batch that changes nothing does not reconcile, so in-flight
    /// transitions keep their timing.
    pub fn apply_batch(&mut self, batch: ChangeBatch) -> (ApplySummary, ReconcileReport) {
        let sequence = batch.sequence;
        let changes = batch.len();
        let summary = self.snapshot.apply_batch(batch);
        debug!(
            sequence,
            changes,
            added = summary.added,
            modified = summary.modified,
            removed = summary.removed,
            ignored = summary.ignored,
            "batch applied"
        );
        if !summary.changed() {
            return (summary, ReconcileReport::default());
        }
        let report = self
            .reconciler
            .reconcile(self.snapshot.current(), &mut self.palette);
        (summary, report)
    }

    /// Step animations by `dt`.
    pub fn advance(&mut self, dt: Duration) -> AdvanceReport {
        self.reconciler.advance(dt)
    }

    /// Build the next frame, bumping the frame sequence.
    pub fn frame(&mut self) -> Frame {
        self.sequence = self.sequence.saturating_add(1);
        self.reconciler.frame(self.sequence, &self.chart)
    }

    /// Highlight `record_id` and describe it.
    pub fn hover_enter(&mut self, record_id: &RecordId) -> Option<Tooltip> {
        interaction::hover_enter(&mut self.reconciler, record_id)
    }

    /// Clear the highlight on `record_id`.
    pub fn hover_exit(&mut self, record_id: &RecordId) -> bool {
        interaction::hover_exit(&mut self.reconciler, record_id)
    }

    /// Turn a click into a delete request.
    pub fn click(&self, record_id: &RecordId) -> Option<DeleteRequest> {
        interaction::click(&self.reconciler, record_id)
    }

    /// The current snapshot.
    pub fn records(&self) -> &[Record] {
        self.snapshot.current()
    }

    /// The element state.
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Chart styling in use.
    pub const fn chart(&self) -> &ChartConfig {
        &self.chart
    }

    /// Whether any transition is in flight.
    pub fn is_animating(&self) -> bool {
        self.reconciler.is_animating()
    }
}
