//! The chart driver loop.
//!
//! [`run_chart`] is the single task that owns a [`ChartSession`]. It
//! multiplexes three inputs with `tokio::select!`:
//!
//! - **Change batches** from the store's stream: applied in full, then
//!   reconciled once, before anything else is handled.
//! - **Frame ticks** at the configured interval: advance in-flight
//!   transitions by the real time elapsed since the previous tick.
//! - **Commands** from the HTTP layer: hover, click, and shutdown.
//!
//! Every visible change is handed to a [`FrameSink`]. Clicks never change
//! local state; they spawn a store delete whose `removed` event later
//! arrives on the change stream like any other.

use std::sync::Arc;

use tally_types::{Record, RecordId};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::TallyConfig;
use crate::frame::Frame;
use crate::interaction::Tooltip;
use crate::session::ChartSession;
use crate::store::ExpenseStore;

/// A request from the interaction surface to the driver.
#[derive(Debug)]
pub enum ChartCommand {
    /// The pointer entered an arc.
    HoverEnter {
        /// Arc under the pointer.
        record_id: RecordId,
        /// Receives the tooltip, or `None` if no live arc has the id.
        reply: oneshot::Sender<Option<Tooltip>>,
    },
    /// The pointer left an arc.
    HoverExit {
        /// Arc the pointer left.
        record_id: RecordId,
    },
    /// An arc was clicked.
    Click {
        /// Arc that was clicked.
        record_id: RecordId,
    },
    /// Stop the driver.
    Shutdown,
}

/// Receives every frame the driver publishes.
pub trait FrameSink: Send {
    /// Called with the new frame and the snapshot it was drawn from.
    fn on_frame(&mut self, frame: &Frame, records: &[Record]);
}

/// A frame sink that discards everything, for tests.
pub struct NoOpSink;

impl FrameSink for NoOpSink {
    fn on_frame(&mut self, _frame: &Frame, _records: &[Record]) {}
}

/// Why [`run_chart`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The store's change stream ended.
    StreamClosed,
    /// A [`ChartCommand::Shutdown`] was received.
    Shutdown,
    /// Every command sender was dropped.
    CommandsClosed,
}

fn publish(session: &mut ChartSession, sink: &mut dyn FrameSink) {
    let frame = session.frame();
    sink.on_frame(&frame, session.records());
}

/// Run the chart until the store stream closes or shutdown is requested.
///
/// An initial empty frame is published before any input is handled.
pub async fn run_chart<S: ExpenseStore + 'static>(
    store: Arc<S>,
    config: &TallyConfig,
    mut commands: mpsc::Receiver<ChartCommand>,
    sink: &mut dyn FrameSink,
) -> DriverExit {
    let mut session = ChartSession::new(config);
    let mut stream = store.subscribe();
    let mut ticker = tokio::time::interval(config.animation.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    info!(
        duration_ms = config.animation.duration_ms,
        frame_interval_ms = config.animation.frame_interval_ms,
        "chart driver started"
    );
    publish(&mut session, sink);

    let exit = loop {
        tokio::select! {
            batch = stream.next() => {
                let Some(batch) = batch else {
                    break DriverExit::StreamClosed;
                };
                let (summary, _) = session.apply_batch(batch);
                if summary.changed() {
                    publish(&mut session, sink);
                }
            }
            now = ticker.tick() => {
                let dt = now.saturating_duration_since(last_tick);
                last_tick = now;
                if session.is_animating() && session.advance(dt).changed {
                    publish(&mut session, sink);
                }
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    break DriverExit::CommandsClosed;
                };
                match command {
                    ChartCommand::HoverEnter { record_id, reply } => {
                        let tooltip = session.hover_enter(&record_id);
                        let highlighted = tooltip.is_some();
                        let _ = reply.send(tooltip);
                        if highlighted {
                            publish(&mut session, sink);
                        }
                    }
                    ChartCommand::HoverExit { record_id } => {
                        if session.hover_exit(&record_id) {
                            publish(&mut session, sink);
                        }
                    }
                    ChartCommand::Click { record_id } => {
                        let Some(request) = session.click(&record_id) else {
                            debug!(%record_id, "click on unknown arc ignored");
                            continue;
                        };
                        let store = Arc::clone(&store);
                        tokio::spawn(async move {
                            if let Err(error) = store.delete_by_id(&request.record_id).await {
                                warn!(id = %request.record_id, %error, "delete request failed");
                            }
                        });
                    }
                    ChartCommand::Shutdown => break DriverExit::Shutdown,
                }
            }
        }
    };

    info!(?exit, records = session.records().len(), "chart driver stopped");
    exit
}
