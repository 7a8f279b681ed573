//! Shared application state for the chart server.
//!
//! [`AppState`] holds the broadcast channel for frames, the most recently
//! published [`ChartView`], the document store handlers write through, and
//! the command channel into the chart driver.

use std::sync::Arc;

use tally_core::config::ChartConfig;
use tally_core::svg::render_svg;
use tally_core::{ChartCommand, Frame, MemoryStore};
use tally_types::Record;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::debug;

/// Capacity of the broadcast channel for frames.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest frame.
const BROADCAST_CAPACITY: usize = 256;

/// The chart as last published by the driver.
#[derive(Debug, Clone, Default)]
pub struct ChartView {
    /// Latest frame.
    pub frame: Frame,
    /// Snapshot the frame was drawn from.
    pub records: Vec<Record>,
    /// The frame rendered as SVG.
    pub svg: String,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for frames.
    pub tx: broadcast::Sender<Frame>,
    /// The latest published chart.
    ///
    /// Readers call `borrow()` and copy what they need out; the guard is
    /// never held across an `.await`.
    pub view: watch::Sender<ChartView>,
    /// Document store that expense writes go to.
    pub store: Arc<MemoryStore>,
    /// Command channel into the chart driver.
    pub commands: mpsc::Sender<ChartCommand>,
    /// Chart styling, for SVG rendering.
    pub chart: ChartConfig,
}

impl AppState {
    /// Create a new application state with an empty chart.
    pub fn new(
        store: Arc<MemoryStore>,
        commands: mpsc::Sender<ChartCommand>,
        chart: ChartConfig,
    ) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let view = ChartView {
            svg: render_svg(&Frame::default(), &chart),
            ..ChartView::default()
        };
        Self {
            tx,
            view: watch::Sender::new(view),
            store,
            commands,
            chart,
        }
    }

    /// Subscribe to the frame broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.tx.subscribe()
    }

    /// Publish a frame to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, frame: &Frame) -> usize {
        self.tx.send(frame.clone()).unwrap_or(0)
    }

    /// Store `frame` as the current view, then broadcast it.
    ///
    /// The view is replaced unconditionally: the driver goes quiet once
    /// animations settle, so a skipped update would never be repaired.
    /// Clients that react to the broadcast always read this frame or a
    /// newer one.
    pub fn publish(&self, frame: &Frame, records: &[Record]) {
        let view = ChartView {
            frame: frame.clone(),
            records: records.to_vec(),
            svg: render_svg(frame, &self.chart),
        };
        self.view.send_replace(view);
        let receivers = self.broadcast(frame);
        debug!(sequence = frame.sequence, receivers, "frame published");
    }
}
