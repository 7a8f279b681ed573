//! Type-safe identifier for expense records.
//!
//! Record identifiers are assigned by the document store, not by the chart.
//! They are opaque strings on the wire so that any backend's document keys
//! can flow through unchanged. The in-memory store generates UUID v7 strings
//! via [`RecordId::generate`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique, stable identifier of an expense record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct RecordId(pub String);

impl RecordId {
    /// Wrap an externally assigned document key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier using UUID v7 (time-ordered).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = RecordId::new("doc-42");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"doc-42\""));
    }

    #[test]
    fn id_display_matches_inner() {
        let id = RecordId::from("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(String::from(id), "abc");
    }
}
