use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Events emitted by the receiving flows after their transaction commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ShipmentReceived {
        shipment_id: i64,
        staff_id: i64,
        updated: u32,
        pending: u32,
        complete: bool,
    },
    ShipmentUnlocked {
        shipment_id: i64,
        staff_id: i64,
    },
    ClaimUpdated {
        claim_id: i64,
        shipment_id: i64,
        line_count: usize,
    },
    InventorySyncDispatched {
        product_id: String,
        outlet_id: String,
        new_level: i32,
    },
    EditLockAcquired {
        shipment_id: i64,
        staff_id: i64,
    },
    EditLockReleased {
        shipment_id: i64,
        staff_id: i64,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging on failure instead of propagating. Event
    /// delivery must never fail a committed request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

/// Async event processing loop. Consumers that need more than logging
/// (dashboards, notifications) hang off this.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::ShipmentReceived {
                shipment_id,
                updated,
                pending,
                complete,
                ..
            } => {
                info!(
                    shipment_id,
                    updated, pending, complete, "shipment receive processed"
                );
            }
            Event::ShipmentUnlocked {
                shipment_id,
                staff_id,
            } => {
                info!(shipment_id, staff_id, "shipment unlocked for re-editing");
            }
            Event::ClaimUpdated {
                claim_id,
                shipment_id,
                line_count,
            } => {
                info!(claim_id, shipment_id, line_count, "claim lines rewritten");
            }
            Event::InventorySyncDispatched {
                product_id,
                outlet_id,
                new_level,
            } => {
                info!(%product_id, %outlet_id, new_level, "inventory sync dispatched");
            }
            Event::EditLockAcquired {
                shipment_id,
                staff_id,
            }
            | Event::EditLockReleased {
                shipment_id,
                staff_id,
            } => {
                info!(shipment_id, staff_id, "edit lock state changed");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::ShipmentUnlocked {
                shipment_id: 7,
                staff_id: 3,
            })
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::ShipmentUnlocked {
                shipment_id,
                staff_id,
            }) => {
                assert_eq!(shipment_id, 7);
                assert_eq!(staff_id, 3);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error.
        sender
            .send_or_log(Event::EditLockReleased {
                shipment_id: 1,
                staff_id: 1,
            })
            .await;
    }
}
