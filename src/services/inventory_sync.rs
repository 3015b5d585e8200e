use std::time::Duration;

use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{
    entities::{
        inventory_level::{self, Entity as InventoryLevelEntity},
        inventory_movement,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

const POS_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Absolute-level update pushed to the POS after a receive commits.
#[derive(Debug, Clone, Serialize)]
pub struct PosLevelUpdate {
    /// Per-dispatch id so the POS side can deduplicate redeliveries.
    pub dispatch_id: uuid::Uuid,
    pub product_id: String,
    pub outlet_id: String,
    pub new_level: i32,
    pub reason_code: String,
    pub context_tag: String,
}

/// Maintains destination on-hand levels during receiving and pushes the
/// resulting absolute levels to the POS. Level writes are transactional with
/// the receive; the POS push is fire-and-forget after commit.
#[derive(Clone)]
pub struct InventorySyncService {
    http: reqwest::Client,
    pos_endpoint: Option<String>,
    event_sender: Option<EventSender>,
}

impl InventorySyncService {
    pub fn new(pos_endpoint: Option<String>, event_sender: Option<EventSender>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(POS_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            pos_endpoint,
            event_sender,
        }
    }

    /// Current on-hand for a product at an outlet; 0 when no row exists yet.
    pub async fn on_hand<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: &str,
        outlet_id: &str,
    ) -> Result<i32, ServiceError> {
        let level = InventoryLevelEntity::find()
            .filter(inventory_level::Column::ProductId.eq(product_id))
            .filter(inventory_level::Column::OutletId.eq(outlet_id))
            .one(conn)
            .await?;
        Ok(level.map(|l| l.on_hand).unwrap_or(0))
    }

    /// Sets the absolute on-hand level and writes the movement audit row.
    /// Runs inside the caller's receive transaction.
    #[instrument(skip(self, conn))]
    pub async fn apply_receipt<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: &str,
        outlet_id: &str,
        new_level: i32,
        shipment_id: i64,
        staff_id: i64,
    ) -> Result<(), ServiceError> {
        let existing = InventoryLevelEntity::find()
            .filter(inventory_level::Column::ProductId.eq(product_id))
            .filter(inventory_level::Column::OutletId.eq(outlet_id))
            .one(conn)
            .await?;

        let previous = match existing {
            Some(level) => {
                let previous = level.on_hand;
                let mut active: inventory_level::ActiveModel = level.into();
                active.on_hand = Set(new_level);
                active.update(conn).await?;
                previous
            }
            None => {
                inventory_level::ActiveModel {
                    product_id: Set(product_id.to_string()),
                    outlet_id: Set(outlet_id.to_string()),
                    on_hand: Set(new_level),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                0
            }
        };

        inventory_movement::ActiveModel {
            product_id: Set(product_id.to_string()),
            outlet_id: Set(outlet_id.to_string()),
            qty_change: Set(new_level - previous),
            previous_level: Set(previous),
            new_level: Set(new_level),
            reason: Set("GOODS_IN".to_string()),
            shipment_id: Set(Some(shipment_id)),
            created_by: Set(staff_id),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(())
    }

    /// Fire-and-forget push of an absolute level to the POS. Failures are
    /// logged and counted, never surfaced; the receive has already
    /// committed and must not be undone by a sync hiccup.
    pub fn dispatch_pos_update(&self, update: PosLevelUpdate) {
        let Some(endpoint) = self.pos_endpoint.clone() else {
            debug!(
                product_id = %update.product_id,
                "POS endpoint not configured; skipping sync dispatch"
            );
            return;
        };

        let http = self.http.clone();
        let event_sender = self.event_sender.clone();
        tokio::spawn(async move {
            match http.post(&endpoint).json(&update).send().await {
                Ok(resp) if resp.status().is_success() => {
                    if let Some(sender) = &event_sender {
                        sender
                            .send_or_log(Event::InventorySyncDispatched {
                                product_id: update.product_id.clone(),
                                outlet_id: update.outlet_id.clone(),
                                new_level: update.new_level,
                            })
                            .await;
                    }
                }
                Ok(resp) => {
                    counter!("goodsin_pos_sync_failures", 1);
                    warn!(
                        product_id = %update.product_id,
                        outlet_id = %update.outlet_id,
                        status = %resp.status(),
                        "POS sync rejected"
                    );
                }
                Err(e) => {
                    counter!("goodsin_pos_sync_failures", 1);
                    warn!(
                        product_id = %update.product_id,
                        outlet_id = %update.outlet_id,
                        error = %e,
                        "POS sync dispatch failed"
                    );
                }
            }
        });
    }
}
