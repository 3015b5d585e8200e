use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Status value marking a line as live for receiving; other values are
/// soft-delete markers set by the ordering flows.
pub const LINE_ACTIVE: i16 = 0;

/// One product within a shipment.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipment_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub shipment_id: i64,
    pub product_id: String,
    pub ordered_qty: i32,
    pub slip_qty: Option<i32>,
    pub received_qty: Option<i32>,
    pub damaged_qty: i32,
    pub discrepancy_type: String,
    pub unit_cost: Option<Decimal>,
    pub line_note: Option<String>,
    pub substitution_product_id: Option<String>,
    pub stock_snapshot: Option<i32>,
    pub status: i16,
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Actual received total: counted units plus damaged arrivals.
    pub fn actual_received(&self) -> i32 {
        self.received_qty.unwrap_or(0) + self.damaged_qty
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shipment::Entity",
        from = "Column::ShipmentId",
        to = "super::shipment::Column::Id"
    )]
    Shipment,
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        let mut active = self;
        let now = Utc::now();
        if insert {
            if let ActiveValue::NotSet = active.created_at {
                active.created_at = Set(now);
            }
        }
        active.updated_at = Set(now);
        Ok(active)
    }
}

/// Sum of expected quantities across a line set.
pub fn total_ordered(lines: &[Model]) -> i64 {
    lines.iter().map(|l| i64::from(l.ordered_qty)).sum()
}

/// Sum of actual received totals (counted + damaged) across a line set.
pub fn total_received(lines: &[Model]) -> i64 {
    lines.iter().map(|l| i64::from(l.actual_received())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ordered: i32, received: Option<i32>, damaged: i32) -> Model {
        Model {
            id: 0,
            shipment_id: 1,
            product_id: "p".into(),
            ordered_qty: ordered,
            slip_qty: None,
            received_qty: received,
            damaged_qty: damaged,
            discrepancy_type: "OK".into(),
            unit_cost: None,
            line_note: None,
            substitution_product_id: None,
            stock_snapshot: None,
            status: LINE_ACTIVE,
            received_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn actual_received_includes_damaged() {
        assert_eq!(line(10, Some(7), 2).actual_received(), 9);
        assert_eq!(line(10, None, 2).actual_received(), 2);
    }

    #[test]
    fn totals_aggregate_over_lines() {
        let lines = vec![line(10, Some(10), 0), line(5, Some(3), 1), line(8, None, 0)];
        assert_eq!(total_ordered(&lines), 23);
        assert_eq!(total_received(&lines), 14);
    }
}
