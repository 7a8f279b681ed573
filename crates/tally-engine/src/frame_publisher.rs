//! Frame sink that publishes to the chart server state.
//!
//! Each frame the driver produces is stored as the server's current
//! [`ChartView`](tally_server::ChartView) and broadcast to every connected
//! `WebSocket` client.

use std::sync::Arc;

use tally_core::{Frame, FrameSink};
use tally_server::AppState;
use tally_types::Record;

/// Sink that bridges the chart driver to the server.
pub struct FramePublisher {
    state: Arc<AppState>,
}

impl FramePublisher {
    /// Create a new publisher backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl FrameSink for FramePublisher {
    fn on_frame(&mut self, frame: &Frame, records: &[Record]) {
        self.state.publish(frame, records);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tally_core::MemoryStore;
    use tally_core::config::ChartConfig;
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn frames_reach_view_and_subscribers() {
        let (tx, _rx) = mpsc::channel(1);
        let state = Arc::new(AppState::new(
            Arc::new(MemoryStore::new()),
            tx,
            ChartConfig::default(),
        ));
        let mut subscriber = state.subscribe();
        let mut publisher = FramePublisher::new(Arc::clone(&state));

        let frame = Frame {
            sequence: 9,
            shapes: Vec::new(),
        };
        let records = vec![Record::new("a", "rent", Decimal::new(5, 0))];
        publisher.on_frame(&frame, &records);

        assert_eq!(subscriber.recv().await.unwrap().sequence, 9);
        let view = state.view.borrow();
        assert_eq!(view.frame.sequence, 9);
        assert_eq!(view.records, records);
        assert!(view.svg.contains("data-frame=\"9\""));
    }
}
