//! Pointer interaction with drawn arcs.
//!
//! Hovering swaps an arc's fill for the highlight fill and yields a tooltip;
//! leaving restores it. Clicking never touches local state: it only yields a
//! [`DeleteRequest`] for the store, and the arc exits once the resulting
//! `removed` event comes back through the change stream.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tally_types::RecordId;
use tracing::debug;

use crate::reconcile::Reconciler;

/// Details shown while an arc is hovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    /// Hovered record.
    pub record_id: RecordId,
    /// Record name.
    pub name: String,
    /// Record cost.
    pub cost: Decimal,
}

impl fmt::Display for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.cost)
    }
}

/// A request to delete a record from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteRequest {
    /// Record to delete.
    pub record_id: RecordId,
}

/// Highlight the live arc of `record_id` and describe it.
///
/// Returns `None` when no live arc exists for the id (exiting arcs do not
/// react to the pointer).
pub fn hover_enter(reconciler: &mut Reconciler, record_id: &RecordId) -> Option<Tooltip> {
    let element = reconciler.live_element_mut(record_id)?;
    element.set_highlighted(true);
    let record = &element.retained().record;
    debug!(%record_id, "hover enter");
    Some(Tooltip {
        record_id: record.id.clone(),
        name: record.name.clone(),
        cost: record.cost,
    })
}

/// Restore the original fill of `record_id`'s arc.
///
/// Returns `true` if the arc was highlighted.
pub fn hover_exit(reconciler: &mut Reconciler, record_id: &RecordId) -> bool {
    let Some(element) = reconciler.live_element_mut(record_id) else {
        return false;
    };
    let was = element.is_highlighted();
    element.set_highlighted(false);
    if was {
        debug!(%record_id, "hover exit");
    }
    was
}

/// Turn a click on `record_id`'s arc into a delete request.
pub fn click(reconciler: &Reconciler, record_id: &RecordId) -> Option<DeleteRequest> {
    reconciler.element(record_id).map(|element| DeleteRequest {
        record_id: element.key().record_id.clone(),
    })
}
