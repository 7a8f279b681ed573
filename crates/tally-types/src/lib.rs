//! Shared wire types for the Tally expense chart.
//!
//! This crate is the single source of truth for the payloads exchanged
//! between the document store, the chart engine, and the browser. Types
//! defined here flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- The [`RecordId`] document key
//! - [`record`] -- [`Record`] and [`NewRecord`] expense payloads
//! - [`change`] -- [`ChangeEvent`] and [`ChangeBatch`] change-stream payloads

pub mod change;
pub mod ids;
pub mod record;

// Re-export all public types at crate root for convenience.
pub use change::{ChangeBatch, ChangeEvent};
pub use ids::RecordId;
pub use record::{NewRecord, Record};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings to the `bindings/` directory relative to
        // the crate root when `export_all` is called.
        use ts_rs::TS;

        let _ = crate::ids::RecordId::export_all();
        let _ = crate::record::Record::export_all();
        let _ = crate::record::NewRecord::export_all();
        let _ = crate::change::ChangeEvent::export_all();
        let _ = crate::change::ChangeBatch::export_all();
    }
}
