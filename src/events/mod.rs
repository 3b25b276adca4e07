//! Domain events.
//!
//! Services emit events over an mpsc channel after their transaction
//! commits; a spawned consumer logs them. Event delivery is best-effort
//! and never fails the originating request.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    BuyerCreated(Uuid),
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    PurchaseCreated(Uuid),
    PurchaseStatusChanged {
        purchase_id: Uuid,
        old_status: String,
        new_status: String,
    },
    StoreEntryCreated {
        store_entry_id: Uuid,
        purchase_id: Uuid,
    },
    StoreEntryUpdated(Uuid),
    StoreLogCreated {
        store_log_id: Uuid,
        store_entry_id: Uuid,
    },
    StoreLogStatusChanged {
        store_log_id: Uuid,
        old_status: String,
        new_status: String,
    },
    ProductionRecorded {
        production_id: Uuid,
        order_id: Uuid,
    },
    MachineRegistered(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event; a full or closed channel is logged, not surfaced.
    pub async fn send(&self, event: Event) {
        if let Err(err) = self.sender.send(event).await {
            warn!(error = %err, "dropping domain event, channel closed");
        }
    }
}

/// Creates a connected sender/receiver pair with a bounded buffer.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Consumes events until every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "domain event");
    }
    info!("event channel closed, processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_the_channel() {
        let (sender, mut rx) = channel(4);
        let id = Uuid::new_v4();
        sender.send(Event::PurchaseCreated(id)).await;

        match rx.recv().await {
            Some(Event::PurchaseCreated(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_does_not_fail_when_receiver_dropped() {
        let (sender, rx) = channel(1);
        drop(rx);
        // Must not panic or error out.
        sender.send(Event::MachineRegistered(Uuid::new_v4())).await;
    }
}
