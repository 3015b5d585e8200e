use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use tracing::{info, instrument};

use crate::{
    entities::{
        claim::{self, Entity as ClaimEntity},
        claim_line::{self, Entity as ClaimLineEntity},
        shipment,
    },
    errors::ServiceError,
    models::discrepancy::CaseDelta,
};

/// One claimable line-level discrepancy, ready for aggregation.
#[derive(Debug, Clone)]
pub struct ClaimDelta {
    pub product_id: String,
    pub case: CaseDelta,
}

/// Collapses per-line discrepancies into the shipment's single outstanding
/// claim. Runs inside the caller's transaction; never commits on its own.
#[derive(Clone, Default)]
pub struct ClaimService;

impl ClaimService {
    pub fn new() -> Self {
        Self
    }

    /// Idempotent full replace: reuse (or create) the shipment's claim, then
    /// delete and re-insert all of its lines from `deltas`. Re-running with
    /// identical input yields identical claim state. An emptied claim keeps
    /// zero lines and stays PENDING; its presence is the audit record.
    #[instrument(skip(self, conn, shipment, deltas), fields(shipment_id = shipment.id))]
    pub async fn upsert_claim<C: ConnectionTrait>(
        &self,
        conn: &C,
        shipment: &shipment::Model,
        deltas: &[ClaimDelta],
        staff_id: i64,
    ) -> Result<Option<i64>, ServiceError> {
        let existing = ClaimEntity::find()
            .filter(claim::Column::ShipmentId.eq(shipment.id))
            .one(conn)
            .await?;

        let claim_id = match existing {
            Some(existing) => {
                let id = existing.id;
                let mut active: claim::ActiveModel = existing.into();
                active.status = Set(claim::STATUS_PENDING.to_string());
                active.update(conn).await?;
                id
            }
            None => {
                if deltas.is_empty() {
                    return Ok(None);
                }
                let created = claim::ActiveModel {
                    shipment_id: Set(shipment.id),
                    counterparty_id: Set(shipment.counterparty_id.clone()),
                    status: Set(claim::STATUS_PENDING.to_string()),
                    created_by: Set(staff_id),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                created.id
            }
        };

        ClaimLineEntity::delete_many()
            .filter(claim_line::Column::ClaimId.eq(claim_id))
            .exec(conn)
            .await?;

        for delta in deltas {
            claim_line::ActiveModel {
                claim_id: Set(claim_id),
                product_id: Set(delta.product_id.clone()),
                reason: Set(delta.case.case_type.as_str().to_string()),
                qty: Set(delta.case.claim_qty),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }

        info!(
            claim_id,
            line_count = deltas.len(),
            "claim lines replaced"
        );

        Ok(Some(claim_id))
    }
}
