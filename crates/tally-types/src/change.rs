//! Change-stream payloads delivered by the document store.
//!
//! The store pushes batches of document changes. Each change is resolved
//! into a [`ChangeEvent`] once, at the stream boundary, so the rest of the
//! workspace never handles untyped document data.
//!
//! On the wire a change is an internally tagged object:
//!
//! ```json
//! { "type": "added", "record": { "id": "a", "name": "rent", "cost": "500" } }
//! { "type": "removed", "id": "a" }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::RecordId;
use crate::record::Record;

/// One document change, in the order the store emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ChangeEvent {
    /// A document appeared in the collection.
    Added {
        /// Full document payload.
        record: Record,
    },
    /// An existing document's payload changed.
    Modified {
        /// Full document payload after the change.
        record: Record,
    },
    /// A document was deleted.
    Removed {
        /// Key of the deleted document.
        id: RecordId,
    },
}

/// A batch of changes delivered together by one store notification.
///
/// All changes in a batch are applied before the chart reconciles once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChangeBatch {
    /// Per-subscription delivery counter, starting at 1.
    pub sequence: u64,
    /// When the store emitted the batch.
    pub emitted_at: DateTime<Utc>,
    /// Changes in emission order.
    pub changes: Vec<ChangeEvent>,
}

impl ChangeBatch {
    /// Build a batch stamped with the current time.
    pub fn new(sequence: u64, changes: Vec<ChangeEvent>) -> Self {
        Self {
            sequence,
            emitted_at: Utc::now(),
            changes,
        }
    }

    /// Whether the batch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes in the batch.
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
