//! Ticket Notifier - 工单事件广播
//!
//! Fan-out of ticket lifecycle events to every connected observer
//! (kiosk, counter dashboard, display screens).
//!
//! ```text
//! ticket handlers
//!        │ emit (fire-and-forget)
//!        └── TicketNotifier (broadcast)
//!               ├──► /ws connection #1
//!               ├──► /ws connection #2
//!               └──► ...
//! ```
//!
//! Delivery is best-effort: a send with no subscribers is normal, a
//! lagging subscriber skips events, and no emit can ever fail the
//! mutation it follows.

use serde::Serialize;
use shared::models::Ticket;
use shared::util::now_millis;
use tokio::sync::broadcast;

/// Event names on the wire
pub const EVENT_CREATED: &str = "ticket:created";
pub const EVENT_CALLED: &str = "ticket:called";
pub const EVENT_COMPLETED: &str = "ticket:completed";
pub const EVENT_UPDATED: &str = "ticket:updated";
pub const EVENT_REANNOUNCE: &str = "ticket:reannounce";

/// Default broadcast buffer; slow observers past this lag skip events
const CHANNEL_CAPACITY: usize = 256;

/// One ticket lifecycle event, carrying the full ticket with its category
#[derive(Debug, Clone, Serialize)]
pub struct TicketEvent {
    pub event_id: String,
    pub event: &'static str,
    pub timestamp: i64,
    pub ticket: Ticket,
}

/// Broadcast handle, cheap to clone into handlers and sockets
#[derive(Debug, Clone)]
pub struct TicketNotifier {
    tx: broadcast::Sender<TicketEvent>,
}

impl TicketNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe a new observer (one per WebSocket connection)
    pub fn subscribe(&self) -> broadcast::Receiver<TicketEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn created(&self, ticket: Ticket) {
        self.emit(EVENT_CREATED, ticket);
    }

    pub fn called(&self, ticket: Ticket) {
        self.emit(EVENT_CALLED, ticket);
    }

    pub fn completed(&self, ticket: Ticket) {
        self.emit(EVENT_COMPLETED, ticket);
    }

    pub fn updated(&self, ticket: Ticket) {
        self.emit(EVENT_UPDATED, ticket);
    }

    pub fn reannounce(&self, ticket: Ticket) {
        self.emit(EVENT_REANNOUNCE, ticket);
    }

    fn emit(&self, event: &'static str, ticket: Ticket) {
        let payload = TicketEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            event,
            timestamp: now_millis(),
            ticket,
        };

        match self.tx.send(payload) {
            Ok(receivers) => {
                tracing::debug!(event, receivers, "Ticket event broadcast");
            }
            Err(_) => {
                // No observers connected; nothing to deliver
                tracing::debug!(event, "Ticket event dropped (no subscribers)");
            }
        }
    }
}

impl Default for TicketNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Category, TicketStatus};

    fn ticket() -> Ticket {
        Ticket {
            id: 1,
            number: 1,
            display_number: "A-001".into(),
            category_id: 1,
            category: Category {
                id: 1,
                name: "General".into(),
                prefix: "A".into(),
                description: None,
                is_active: true,
                sort_order: 0,
                created_at: 0,
            },
            status: TicketStatus::Waiting,
            called_at: None,
            completed_at: None,
            counter_number: None,
            created_at: "2025-08-06T00:00:00.000Z".into(),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_named_events() {
        let notifier = TicketNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.created(ticket());
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, EVENT_CREATED);
        assert_eq!(event.ticket.display_number, "A-001");

        notifier.called(ticket());
        assert_eq!(rx.recv().await.unwrap().event, EVENT_CALLED);
    }

    #[test]
    fn emitting_without_subscribers_is_not_an_error() {
        let notifier = TicketNotifier::new();
        // Must not panic or fail
        notifier.completed(ticket());
        notifier.reannounce(ticket());
        assert_eq!(notifier.receiver_count(), 0);
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let notifier = TicketNotifier::new();
        let mut rx1 = notifier.subscribe();
        let mut rx2 = notifier.subscribe();

        notifier.updated(ticket());

        assert_eq!(rx1.recv().await.unwrap().event, EVENT_UPDATED);
        assert_eq!(rx2.recv().await.unwrap().event, EVENT_UPDATED);
    }
}
