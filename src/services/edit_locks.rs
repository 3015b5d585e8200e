use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use tracing::{info, instrument};

use crate::{
    entities::shipment_lock::{self, Entity as ShipmentLockEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Advisory lock lifetime. Activity refreshes it; expiry makes the lock
/// claimable by the next editor.
const LOCK_TTL_MINUTES: i64 = 15;

/// Result of an acquire call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockGrant {
    Created,
    Extended,
}

/// Advisory per-shipment edit locks. These stop a second human from
/// *starting* a counting session; the row lock inside the receive
/// transaction is what stops two simultaneous commits.
#[derive(Clone)]
pub struct EditLockService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl EditLockService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Acquires or refreshes the edit lock for a shipment. A live lock held
    /// by someone else is a conflict carrying the holder and expiry so the
    /// UI can say who has it.
    #[instrument(skip(self))]
    pub async fn acquire(
        &self,
        shipment_id: i64,
        staff_id: i64,
        session_id: &str,
    ) -> Result<LockGrant, ServiceError> {
        let db = &*self.db;
        let now = Utc::now();

        let existing = ShipmentLockEntity::find()
            .filter(shipment_lock::Column::ShipmentId.eq(shipment_id))
            .filter(shipment_lock::Column::ExpiresAt.gt(now))
            .order_by_desc(shipment_lock::Column::LockedAt)
            .one(db)
            .await?;

        if let Some(lock) = existing {
            if lock.is_held_by(staff_id, session_id) {
                let mut active: shipment_lock::ActiveModel = lock.into();
                active.expires_at = Set(now + Duration::minutes(LOCK_TTL_MINUTES));
                active.last_activity = Set(now);
                active.update(db).await?;
                return Ok(LockGrant::Extended);
            }
            return Err(ServiceError::LockHeld {
                holder: lock.locked_by,
                expires_at: lock.expires_at.to_rfc3339(),
            });
        }

        shipment_lock::ActiveModel {
            shipment_id: Set(shipment_id),
            locked_by: Set(staff_id),
            session_id: Set(session_id.to_string()),
            locked_at: Set(now),
            expires_at: Set(now + Duration::minutes(LOCK_TTL_MINUTES)),
            last_activity: Set(now),
            released_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::EditLockAcquired {
                    shipment_id,
                    staff_id,
                })
                .await;
        }

        info!(shipment_id, staff_id, "edit lock created");
        Ok(LockGrant::Created)
    }

    /// Pushes the expiry out by the TTL. Returns false when no live lock
    /// matched the caller's identity.
    #[instrument(skip(self))]
    pub async fn extend(
        &self,
        shipment_id: i64,
        staff_id: i64,
        session_id: &str,
    ) -> Result<bool, ServiceError> {
        let db = &*self.db;
        let now = Utc::now();

        let result = ShipmentLockEntity::update_many()
            .col_expr(
                shipment_lock::Column::ExpiresAt,
                Expr::value(now + Duration::minutes(LOCK_TTL_MINUTES)),
            )
            .col_expr(shipment_lock::Column::LastActivity, Expr::value(now))
            .filter(shipment_lock::Column::ShipmentId.eq(shipment_id))
            .filter(shipment_lock::Column::LockedBy.eq(staff_id))
            .filter(shipment_lock::Column::SessionId.eq(session_id))
            .filter(shipment_lock::Column::ExpiresAt.gt(now))
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Expires the caller's lock immediately.
    #[instrument(skip(self))]
    pub async fn release(
        &self,
        shipment_id: i64,
        staff_id: i64,
        session_id: &str,
    ) -> Result<(), ServiceError> {
        let db = &*self.db;
        let now = Utc::now();

        ShipmentLockEntity::update_many()
            .col_expr(shipment_lock::Column::ExpiresAt, Expr::value(now))
            .col_expr(shipment_lock::Column::ReleasedAt, Expr::value(Some(now)))
            .filter(shipment_lock::Column::ShipmentId.eq(shipment_id))
            .filter(shipment_lock::Column::LockedBy.eq(staff_id))
            .filter(shipment_lock::Column::SessionId.eq(session_id))
            .exec(db)
            .await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::EditLockReleased {
                    shipment_id,
                    staff_id,
                })
                .await;
        }

        Ok(())
    }
}
