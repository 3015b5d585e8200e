use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShipmentLocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShipmentLocks::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentLocks::ShipmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentLocks::LockedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShipmentLocks::SessionId).string().not_null())
                    .col(
                        ColumnDef::new(ShipmentLocks::LockedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentLocks::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentLocks::LastActivity)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShipmentLocks::ReleasedAt).timestamp().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipment_locks_shipment_expiry")
                    .table(ShipmentLocks::Table)
                    .col(ShipmentLocks::ShipmentId)
                    .col(ShipmentLocks::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShipmentLocks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShipmentLocks {
    Table,
    Id,
    ShipmentId,
    LockedBy,
    SessionId,
    LockedAt,
    ExpiresAt,
    LastActivity,
    ReleasedAt,
}
