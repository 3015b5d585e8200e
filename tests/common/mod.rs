#![allow(dead_code)]

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use goodsin_api::entities::{shipment, shipment_line};
use goodsin_api::services::inventory_sync::InventorySyncService;
use goodsin_api::services::receiving::ReceivingService;

/// Fresh in-memory database with the full schema applied. A single pooled
/// connection keeps every query on the same in-memory instance.
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("sqlite connect");
    migrations::Migrator::up(&db, None).await.expect("migrations");
    Arc::new(db)
}

/// Receiving service wired without POS sync or events, as the reconciliation
/// tests need it.
pub fn receiving_service(db: Arc<DatabaseConnection>) -> ReceivingService {
    let inventory_sync = Arc::new(InventorySyncService::new(None, None));
    ReceivingService::new(db, inventory_sync, None)
}

/// Seeds a draft shipment with active lines `(product_id, ordered_qty)`.
pub async fn seed_shipment(
    db: &DatabaseConnection,
    kind: &str,
    destination: &str,
    lines: &[(&str, i32)],
) -> i64 {
    let header = shipment::ActiveModel {
        kind: Set(kind.to_string()),
        reference: Set(format!("{}-TEST", kind.to_uppercase())),
        status: Set("draft".to_string()),
        source_outlet: Set(Some("outlet-src".to_string())),
        destination_outlet: Set(destination.to_string()),
        counterparty_id: Set(Some("supplier-1".to_string())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert shipment");

    for (product_id, ordered) in lines {
        shipment_line::ActiveModel {
            shipment_id: Set(header.id),
            product_id: Set(product_id.to_string()),
            ordered_qty: Set(*ordered),
            damaged_qty: Set(0),
            discrepancy_type: Set("OK".to_string()),
            status: Set(shipment_line::LINE_ACTIVE),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert line");
    }

    header.id
}
