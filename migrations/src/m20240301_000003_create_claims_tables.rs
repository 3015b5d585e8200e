use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Claims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Claims::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Claims::ShipmentId).big_integer().not_null())
                    .col(ColumnDef::new(Claims::CounterpartyId).string().null())
                    .col(
                        ColumnDef::new(Claims::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Claims::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Claims::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Claims::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claims_shipment")
                            .from(Claims::Table, Claims::ShipmentId)
                            .to(Shipments::Table, Shipments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_claims_shipment")
                    .table(Claims::Table)
                    .col(Claims::ShipmentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClaimLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClaimLines::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClaimLines::ClaimId).big_integer().not_null())
                    .col(ColumnDef::new(ClaimLines::ProductId).string().not_null())
                    .col(ColumnDef::new(ClaimLines::Reason).string().not_null())
                    .col(ColumnDef::new(ClaimLines::Qty).integer().not_null())
                    .col(ColumnDef::new(ClaimLines::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claim_lines_claim")
                            .from(ClaimLines::Table, ClaimLines::ClaimId)
                            .to(Claims::Table, Claims::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DiscrepancyCases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiscrepancyCases::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscrepancyCases::ShipmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscrepancyCases::ProductId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscrepancyCases::CaseType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscrepancyCases::DeltaQty)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DiscrepancyCases::Note).text().null())
                    .col(
                        ColumnDef::new(DiscrepancyCases::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_discrepancy_cases_shipment_product")
                    .table(DiscrepancyCases::Table)
                    .col(DiscrepancyCases::ShipmentId)
                    .col(DiscrepancyCases::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscrepancyCases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClaimLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Claims::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Claims {
    Table,
    Id,
    ShipmentId,
    CounterpartyId,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClaimLines {
    Table,
    Id,
    ClaimId,
    ProductId,
    Reason,
    Qty,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DiscrepancyCases {
    Table,
    Id,
    ShipmentId,
    ProductId,
    CaseType,
    DeltaQty,
    Note,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Shipments {
    Table,
    Id,
}
