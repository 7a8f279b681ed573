//! HTTP and `WebSocket` surface for the Tally expense chart.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Chart page** (`GET /`) with the expense form, the current chart as
//!   inline SVG, and a small script that follows the frame stream
//! - **`WebSocket` endpoint** (`/ws/frames`) streaming every published
//!   [`Frame`](tally_core::Frame) via [`tokio::sync::broadcast`]
//! - **Expense REST endpoints** that write through the document store
//! - **Arc interaction endpoints** (hover, click) forwarded to the chart
//!   driver over its command channel
//!
//! # Architecture
//!
//! The server never owns chart state. The driver task publishes frames
//! into [`AppState`], REST reads are served from that published
//! [`ChartView`], and interactions travel back to the driver as
//! [`ChartCommand`](tally_core::ChartCommand)s.
//!
//! [`ChartView`]: state::ChartView

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, ChartView};
