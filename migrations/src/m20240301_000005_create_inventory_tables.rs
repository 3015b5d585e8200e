use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryLevels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryLevels::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryLevels::ProductId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryLevels::OutletId).string().not_null())
                    .col(
                        ColumnDef::new(InventoryLevels::OnHand)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryLevels::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_levels_product_outlet")
                    .table(InventoryLevels::Table)
                    .col(InventoryLevels::ProductId)
                    .col(InventoryLevels::OutletId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryMovements::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::ProductId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::OutletId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::QtyChange)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::PreviousLevel)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::NewLevel)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryMovements::Reason).string().not_null())
                    .col(
                        ColumnDef::new(InventoryMovements::ShipmentId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryLevels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InventoryLevels {
    Table,
    Id,
    ProductId,
    OutletId,
    OnHand,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InventoryMovements {
    Table,
    Id,
    ProductId,
    OutletId,
    QtyChange,
    PreviousLevel,
    NewLevel,
    Reason,
    ShipmentId,
    CreatedBy,
    CreatedAt,
}
