use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shipments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shipments::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Shipments::Kind).string().not_null())
                    .col(ColumnDef::new(Shipments::Reference).string().not_null())
                    .col(ColumnDef::new(Shipments::Status).string().not_null())
                    .col(ColumnDef::new(Shipments::SourceOutlet).string().null())
                    .col(
                        ColumnDef::new(Shipments::DestinationOutlet)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Shipments::CounterpartyId).string().null())
                    .col(ColumnDef::new(Shipments::CompletedBy).big_integer().null())
                    .col(ColumnDef::new(Shipments::CompletedAt).timestamp().null())
                    .col(ColumnDef::new(Shipments::PartialStaff).big_integer().null())
                    .col(ColumnDef::new(Shipments::PartialAt).timestamp().null())
                    .col(ColumnDef::new(Shipments::UnlockedBy).big_integer().null())
                    .col(ColumnDef::new(Shipments::UnlockedAt).timestamp().null())
                    .col(ColumnDef::new(Shipments::ReceivedNotes).text().null())
                    .col(ColumnDef::new(Shipments::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Shipments::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipments_status")
                    .table(Shipments::Table)
                    .col(Shipments::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipments_destination")
                    .table(Shipments::Table)
                    .col(Shipments::DestinationOutlet)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shipments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Shipments {
    Table,
    Id,
    Kind,
    Reference,
    Status,
    SourceOutlet,
    DestinationOutlet,
    CounterpartyId,
    CompletedBy,
    CompletedAt,
    PartialStaff,
    PartialAt,
    UnlockedBy,
    UnlockedAt,
    ReceivedNotes,
    CreatedAt,
    UpdatedAt,
}
