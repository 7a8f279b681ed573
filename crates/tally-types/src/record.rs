//! Expense record payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::RecordId;

/// A single expense as stored in the document collection.
///
/// Identity is [`Record::id`]; `name` and `cost` are mutable payload that
/// may change through `modified` events. Cost is kept as a [`Decimal`] and
/// only converted to floating point when chart geometry is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Record {
    /// Store-assigned document key.
    pub id: RecordId,
    /// What the money was spent on.
    pub name: String,
    /// Amount spent. Non-negative by convention; not validated here.
    #[ts(as = "String")]
    pub cost: Decimal,
}

impl Record {
    /// Build a record from its parts.
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, cost: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
        }
    }
}

/// An expense submitted by the form, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewRecord {
    /// What the money was spent on.
    pub name: String,
    /// Amount spent.
    #[ts(as = "String")]
    pub cost: Decimal,
}

impl NewRecord {
    /// Attach a store-assigned id, producing a full [`Record`].
    pub fn with_id(self, id: RecordId) -> Record {
        Record {
            id,
            name: self.name,
            cost: self.cost,
        }
    }
}
