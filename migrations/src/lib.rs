pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_shipments_table;
mod m20240301_000002_create_shipment_lines_table;
mod m20240301_000003_create_claims_tables;
mod m20240301_000004_create_shipment_locks_table;
mod m20240301_000005_create_inventory_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_shipments_table::Migration),
            Box::new(m20240301_000002_create_shipment_lines_table::Migration),
            Box::new(m20240301_000003_create_claims_tables::Migration),
            Box::new(m20240301_000004_create_shipment_locks_table::Migration),
            Box::new(m20240301_000005_create_inventory_tables::Migration),
        ]
    }
}
