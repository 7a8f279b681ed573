//! Snapshot store, slice geometry, and animated arc reconciliation for the
//! Tally expense chart.
//!
//! Records arrive as change batches from a document store. They are applied
//! to a [`SnapshotStore`], laid out as angular slices, and reconciled
//! against the drawn arcs so that every change animates: new expenses sweep
//! open, changed ones glide to their new span, deleted ones collapse away.
//!
//! # Modules
//!
//! - [`geometry`] -- Slice layout and annular-sector path outlines.
//! - [`interpolate`] -- Span and slice tweens plus easing curves.
//! - [`transition`] -- Timed tweens driven by elapsed time.
//! - [`snapshot`] -- The authoritative ordered record collection.
//! - [`palette`] -- Ordinal colour scale over record names.
//! - [`reconcile`] -- Keyed element state and enter/persist/exit diffing.
//! - [`interaction`] -- Hover highlight, tooltips, click-to-delete.
//! - [`frame`] / [`svg`] -- Renderable frames and their SVG form.
//! - [`store`] -- [`ExpenseStore`] trait and the in-memory [`MemoryStore`].
//! - [`session`] / [`driver`] -- The single task that owns chart state.
//! - [`form`] -- Expense form validation and submission.
//! - [`config`] -- Configuration loading from `tally-config.yaml`.
//!
//! [`SnapshotStore`]: snapshot::SnapshotStore
//! [`ExpenseStore`]: store::ExpenseStore
//! [`MemoryStore`]: store::MemoryStore

pub mod config;
pub mod driver;
pub mod form;
pub mod frame;
pub mod geometry;
pub mod interaction;
pub mod interpolate;
pub mod palette;
pub mod reconcile;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod svg;
pub mod transition;

pub use config::{ConfigError, TallyConfig};
pub use driver::{ChartCommand, DriverExit, FrameSink, NoOpSink, run_chart};
pub use frame::{ArcShape, Frame};
pub use session::ChartSession;
pub use store::{ChangeStream, ExpenseStore, MemoryStore, StoreError};
