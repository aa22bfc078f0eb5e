//! Dashboard event bus
//!
//! Cross-component notifications go through a broadcast channel instead of a
//! globally reachable mutation callback. The row-model owner applies the
//! change; interested parties subscribe.

use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Something the dashboard state changed
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    RowsRefreshed { row_count: usize },
    CorrectionApplied { symbol: String },
    ExtractionCorrectionApplied { filename: String, field: String },
    ExtractionsChanged,
}

/// Broadcast bus for dashboard events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event; having no subscribers is not an error
    pub fn publish(&self, event: DashboardEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No subscribers for dashboard event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(DashboardEvent::CorrectionApplied {
            symbol: "2010".to_string(),
        });

        match rx.recv().await.unwrap() {
            DashboardEvent::CorrectionApplied { symbol } => assert_eq!(symbol, "2010"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        EventBus::new().publish(DashboardEvent::ExtractionsChanged);
    }
}
