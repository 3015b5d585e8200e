use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShipmentLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShipmentLines::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentLines::ShipmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShipmentLines::ProductId).string().not_null())
                    .col(
                        ColumnDef::new(ShipmentLines::OrderedQty)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ShipmentLines::SlipQty).integer().null())
                    .col(ColumnDef::new(ShipmentLines::ReceivedQty).integer().null())
                    .col(
                        ColumnDef::new(ShipmentLines::DamagedQty)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ShipmentLines::DiscrepancyType)
                            .string()
                            .not_null()
                            .default("OK"),
                    )
                    .col(
                        ColumnDef::new(ShipmentLines::UnitCost)
                            .decimal_len(12, 4)
                            .null(),
                    )
                    .col(ColumnDef::new(ShipmentLines::LineNote).text().null())
                    .col(
                        ColumnDef::new(ShipmentLines::SubstitutionProductId)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentLines::StockSnapshot)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentLines::Status)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ShipmentLines::ReceivedAt).timestamp().null())
                    .col(
                        ColumnDef::new(ShipmentLines::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentLines::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipment_lines_shipment")
                            .from(ShipmentLines::Table, ShipmentLines::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipment_lines_shipment_product")
                    .table(ShipmentLines::Table)
                    .col(ShipmentLines::ShipmentId)
                    .col(ShipmentLines::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShipmentLines::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShipmentLines {
    Table,
    Id,
    ShipmentId,
    ProductId,
    OrderedQty,
    SlipQty,
    ReceivedQty,
    DamagedQty,
    DiscrepancyType,
    UnitCost,
    LineNote,
    SubstitutionProductId,
    StockSnapshot,
    Status,
    ReceivedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Shipments {
    Table,
    Id,
}
