use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{
        discrepancy_case::{self, Entity as DiscrepancyCaseEntity},
        shipment::{self, Entity as ShipmentEntity},
        shipment_line::{self, Entity as ShipmentLineEntity, LINE_ACTIVE},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{classify, ReceiveStats, ShipmentStatus, SubmittedLine},
    services::{
        claims::{ClaimDelta, ClaimService},
        inventory_sync::{InventorySyncService, PosLevelUpdate},
    },
};

/// Upper bound on waiting for the shipment row lock before reporting the
/// shipment as busy. Callers may retry; the service never does.
const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(8);

/// One receive submission for a shipment.
#[derive(Debug, Clone)]
pub struct ReceiveShipmentCommand {
    pub shipment_id: i64,
    pub staff_id: i64,
    pub lines: Vec<SubmittedLine>,
    pub notes: Option<String>,
    pub expected_source: Option<String>,
    pub expected_destination: Option<String>,
    /// A submission with zero counted lines is rejected unless the caller
    /// explicitly confirms the intent with this flag.
    pub allow_empty: bool,
}

/// Result of a receive submission.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiveOutcome {
    pub updated: u32,
    pub pending: u32,
    pub complete: bool,
    pub confidence: u8,
    pub stats: ReceiveStats,
}

/// Reconciles submitted quantities for a shipment inside one transaction:
/// row-locks the header, applies each counted line, classifies
/// discrepancies, rewrites the claim, updates inventory and moves the
/// shipment between draft, partial and complete.
#[derive(Clone)]
pub struct ReceivingService {
    db: Arc<DatabaseConnection>,
    inventory_sync: Arc<InventorySyncService>,
    claims: ClaimService,
    event_sender: Option<EventSender>,
    lock_wait: Duration,
}

impl ReceivingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        inventory_sync: Arc<InventorySyncService>,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            db,
            inventory_sync,
            claims: ClaimService::new(),
            event_sender,
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }

    pub fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
        self.lock_wait = lock_wait;
        self
    }

    /// Runs one receive submission. All persistence happens in a single
    /// transaction; on any error the whole submission rolls back. POS sync
    /// and events fire only after a successful commit.
    #[instrument(skip(self, cmd), fields(shipment_id = cmd.shipment_id, staff_id = cmd.staff_id))]
    pub async fn receive(
        &self,
        cmd: ReceiveShipmentCommand,
    ) -> Result<ReceiveOutcome, ServiceError> {
        let txn = self.db.begin().await?;

        let (outcome, sync_batch, claim_update) = match self.receive_in_txn(&txn, &cmd).await {
            Ok(result) => result,
            Err(e) => {
                let _ = txn.rollback().await;
                error!(
                    shipment_id = cmd.shipment_id,
                    staff_id = cmd.staff_id,
                    error = %e,
                    "receive submission rolled back"
                );
                return Err(e);
            }
        };

        txn.commit().await?;

        // Post-commit side effects: best-effort, never undo the commit.
        for update in sync_batch {
            self.inventory_sync.dispatch_pos_update(update);
        }
        if let Some(sender) = &self.event_sender {
            if let Some((claim_id, line_count)) = claim_update {
                sender
                    .send_or_log(Event::ClaimUpdated {
                        claim_id,
                        shipment_id: cmd.shipment_id,
                        line_count,
                    })
                    .await;
            }
            sender
                .send_or_log(Event::ShipmentReceived {
                    shipment_id: cmd.shipment_id,
                    staff_id: cmd.staff_id,
                    updated: outcome.updated,
                    pending: outcome.pending,
                    complete: outcome.complete,
                })
                .await;
        }

        info!(
            shipment_id = cmd.shipment_id,
            updated = outcome.updated,
            pending = outcome.pending,
            complete = outcome.complete,
            "receive submission committed"
        );

        Ok(outcome)
    }

    async fn receive_in_txn(
        &self,
        txn: &DatabaseTransaction,
        cmd: &ReceiveShipmentCommand,
    ) -> Result<
        (
            ReceiveOutcome,
            Vec<PosLevelUpdate>,
            Option<(i64, usize)>,
        ),
        ServiceError,
    > {
        let header = self.lock_header(txn, cmd.shipment_id).await?;

        let status = ShipmentStatus::parse(&header.status).ok_or_else(|| {
            ServiceError::Internal(format!(
                "shipment {} has unknown status {:?}",
                header.id, header.status
            ))
        })?;
        match status {
            ShipmentStatus::Void => return Err(ServiceError::ShipmentGone),
            ShipmentStatus::Complete => return Err(ServiceError::AlreadyComplete),
            ShipmentStatus::Draft | ShipmentStatus::PartialReceived => {}
        }

        if let Some(expected) = &cmd.expected_source {
            if header.source_outlet.as_deref() != Some(expected.as_str()) {
                return Err(ServiceError::Validation("Source mismatch".into()));
            }
        }
        if let Some(expected) = &cmd.expected_destination {
            if header.destination_outlet != *expected {
                return Err(ServiceError::Validation("Destination mismatch".into()));
            }
        }

        let active = self.lock_active_lines(txn, cmd.shipment_id).await?;
        if active.is_empty() {
            return Err(ServiceError::NoActiveItems);
        }

        let mut active_map: HashMap<&str, &shipment_line::Model> = HashMap::new();
        for line in &active {
            active_map.insert(line.product_id.as_str(), line);
        }

        let items_total = active_map.len() as u32;
        let mut accounted: u32 = 0;
        let mut updated: u32 = 0;
        let mut stats = ReceiveStats::default();
        let mut deltas: Vec<ClaimDelta> = Vec::new();
        let mut sync_batch: Vec<PosLevelUpdate> = Vec::new();
        let now = Utc::now();

        for submitted in &cmd.lines {
            let Some(received) = submitted.received.value() else {
                continue; // blank: stays pending
            };
            accounted += 1;

            if submitted.readonly {
                // Finalized in an earlier partial round: accounted for, but
                // never rewritten.
                continue;
            }
            if received < 0 || submitted.damaged_qty < 0 {
                return Err(ServiceError::Validation(format!(
                    "Negative quantity for product {}",
                    submitted.product_id
                )));
            }
            let Some(line) = active_map.get(submitted.product_id.as_str()) else {
                continue; // not part of this shipment's active set
            };

            let snapshot = self
                .inventory_sync
                .on_hand(txn, &submitted.product_id, &header.destination_outlet)
                .await?;

            let mut active_line: shipment_line::ActiveModel = (*line).clone().into();
            active_line.slip_qty = Set(submitted.slip_qty);
            active_line.received_qty = Set(Some(received));
            active_line.damaged_qty = Set(submitted.damaged_qty);
            active_line.discrepancy_type = Set(submitted.discrepancy.as_str().to_string());
            active_line.unit_cost = Set(submitted.unit_cost);
            active_line.line_note = Set(submitted.note.clone());
            active_line.substitution_product_id = Set(submitted.substitution_product_id.clone());
            active_line.stock_snapshot = Set(Some(snapshot));
            active_line.received_at = Set(Some(now));
            active_line.update(txn).await?;

            stats.record_line(
                line.ordered_qty,
                submitted.slip_qty,
                received,
                submitted.damaged_qty,
            );

            DiscrepancyCaseEntity::delete_many()
                .filter(discrepancy_case::Column::ShipmentId.eq(cmd.shipment_id))
                .filter(discrepancy_case::Column::ProductId.eq(submitted.product_id.as_str()))
                .exec(txn)
                .await?;

            if let Some(case) = classify(
                line.ordered_qty,
                Some(received),
                submitted.damaged_qty,
                submitted.discrepancy,
            ) {
                stats.record_issue();
                discrepancy_case::ActiveModel {
                    shipment_id: Set(cmd.shipment_id),
                    product_id: Set(submitted.product_id.clone()),
                    case_type: Set(case.case_type.as_str().to_string()),
                    delta_qty: Set(case.delta_qty),
                    note: Set(submitted.note.clone()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                deltas.push(ClaimDelta {
                    product_id: submitted.product_id.clone(),
                    case,
                });
            }

            // Destination level becomes snapshot + counted units; damaged
            // stock never enters sellable inventory.
            if received != 0 {
                let new_level = snapshot + received;
                self.inventory_sync
                    .apply_receipt(
                        txn,
                        &submitted.product_id,
                        &header.destination_outlet,
                        new_level,
                        cmd.shipment_id,
                        cmd.staff_id,
                    )
                    .await?;
                sync_batch.push(PosLevelUpdate {
                    dispatch_id: Uuid::new_v4(),
                    product_id: submitted.product_id.clone(),
                    outlet_id: header.destination_outlet.clone(),
                    new_level,
                    reason_code: "goods_in_received".to_string(),
                    context_tag: format!("shipment:{}", cmd.shipment_id),
                });
            }

            updated += 1;
        }

        if accounted == 0 && !cmd.allow_empty {
            return Err(ServiceError::NoQuantitiesEntered);
        }

        let pending = items_total.saturating_sub(accounted);
        let complete = accounted == items_total;

        let claim_update = self
            .claims
            .upsert_claim(txn, &header, &deltas, cmd.staff_id)
            .await?
            .map(|claim_id| (claim_id, deltas.len()));

        let target = if complete {
            ShipmentStatus::Complete
        } else {
            ShipmentStatus::PartialReceived
        };
        debug_assert!(status.can_transition_to(target));

        let mut active_header: shipment::ActiveModel = header.clone().into();
        if let Some(notes) = cmd.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            let combined = match header.received_notes.as_deref().filter(|n| !n.is_empty()) {
                Some(prev) => format!("{}\n{}", prev, notes),
                None => notes.to_string(),
            };
            active_header.received_notes = Set(Some(combined));
        }
        active_header.status = Set(target.as_str().to_string());
        if complete {
            active_header.completed_by = Set(Some(cmd.staff_id));
            active_header.completed_at = Set(Some(now));
            active_header.partial_staff = Set(None);
            active_header.partial_at = Set(None);
        } else {
            active_header.partial_staff = Set(Some(cmd.staff_id));
            active_header.partial_at = Set(Some(now));
        }
        active_header.update(txn).await?;

        let confidence = stats.confidence();
        Ok((
            ReceiveOutcome {
                updated,
                pending,
                complete,
                confidence,
                stats,
            },
            sync_batch,
            claim_update,
        ))
    }

    /// Reopens a completed shipment for correction. Status and completion
    /// fields reset; every line's received quantities survive untouched.
    #[instrument(skip(self))]
    pub async fn unlock(&self, shipment_id: i64, staff_id: i64) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let result = self.unlock_in_txn(&txn, shipment_id, staff_id).await;
        if let Err(e) = result {
            let _ = txn.rollback().await;
            error!(shipment_id, staff_id, error = %e, "unlock rolled back");
            return Err(e);
        }

        txn.commit().await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ShipmentUnlocked {
                    shipment_id,
                    staff_id,
                })
                .await;
        }

        info!(shipment_id, staff_id, "shipment unlocked");
        Ok(())
    }

    async fn unlock_in_txn(
        &self,
        txn: &DatabaseTransaction,
        shipment_id: i64,
        staff_id: i64,
    ) -> Result<(), ServiceError> {
        let header = self.lock_header(txn, shipment_id).await?;

        let status = ShipmentStatus::parse(&header.status).ok_or_else(|| {
            ServiceError::Internal(format!(
                "shipment {} has unknown status {:?}",
                header.id, header.status
            ))
        })?;
        match status {
            ShipmentStatus::Void => return Err(ServiceError::ShipmentGone),
            ShipmentStatus::Complete => {}
            _ => {
                return Err(ServiceError::Validation(
                    "Only completed shipments can be unlocked".into(),
                ))
            }
        }

        let mut active: shipment::ActiveModel = header.into();
        active.status = Set(ShipmentStatus::Draft.as_str().to_string());
        active.completed_by = Set(None);
        active.completed_at = Set(None);
        active.partial_staff = Set(None);
        active.partial_at = Set(None);
        active.unlocked_by = Set(Some(staff_id));
        active.unlocked_at = Set(Some(Utc::now()));
        active.update(txn).await?;

        Ok(())
    }

    /// Header plus active lines, for the counting UI.
    pub async fn get_shipment(
        &self,
        shipment_id: i64,
    ) -> Result<(shipment::Model, Vec<shipment_line::Model>), ServiceError> {
        let db = &*self.db;
        let header = ShipmentEntity::find_by_id(shipment_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Shipment {} not found", shipment_id))
            })?;
        let lines = ShipmentLineEntity::find()
            .filter(shipment_line::Column::ShipmentId.eq(shipment_id))
            .filter(shipment_line::Column::Status.eq(LINE_ACTIVE))
            .all(db)
            .await?;
        Ok((header, lines))
    }

    async fn lock_header(
        &self,
        txn: &DatabaseTransaction,
        shipment_id: i64,
    ) -> Result<shipment::Model, ServiceError> {
        let mut query = ShipmentEntity::find_by_id(shipment_id);
        if row_locks_supported(txn.get_database_backend()) {
            query = query.lock_exclusive();
        }

        let found = tokio::time::timeout(self.lock_wait, query.one(txn))
            .await
            .map_err(|_| {
                warn!(shipment_id, "timed out waiting for shipment row lock");
                ServiceError::LockTimeout
            })??;

        found.ok_or_else(|| ServiceError::NotFound(format!("Shipment {} not found", shipment_id)))
    }

    async fn lock_active_lines(
        &self,
        txn: &DatabaseTransaction,
        shipment_id: i64,
    ) -> Result<Vec<shipment_line::Model>, ServiceError> {
        let mut query = ShipmentLineEntity::find()
            .filter(shipment_line::Column::ShipmentId.eq(shipment_id))
            .filter(shipment_line::Column::Status.eq(LINE_ACTIVE));
        if row_locks_supported(txn.get_database_backend()) {
            query = query.lock_exclusive();
        }
        Ok(query.all(txn).await?)
    }
}

/// SQLite has no `FOR UPDATE`; its single-writer transaction model already
/// serializes submissions on that backend.
fn row_locks_supported(backend: DbBackend) -> bool {
    matches!(backend, DbBackend::Postgres | DbBackend::MySql)
}
