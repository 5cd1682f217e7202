use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Codes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Codes::Code).string().not_null().primary_key())
                    .col(ColumnDef::new(Codes::Family).string().not_null())
                    .col(ColumnDef::new(Codes::Country).string())
                    .col(
                        ColumnDef::new(Codes::State)
                            .string()
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .col(
                        ColumnDef::new(Codes::Seq)
                            .big_integer()
                            .not_null()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(Codes::AvailableSince)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Codes::HolderId).big_integer())
                    .col(ColumnDef::new(Codes::HolderName).string())
                    .col(ColumnDef::new(Codes::TesterName).string())
                    .col(ColumnDef::new(Codes::ReservedCountry).string())
                    .col(ColumnDef::new(Codes::RequestedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Codes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Codes::Table, Codes::HolderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::Family)
                    .col(Codes::State)
                    .col(Codes::Country)
                    .name("idx_codes_family_state_country")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::HolderId)
                    .name("idx_codes_holder_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Codes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Codes {
    Table,
    Code,
    Family,
    Country,
    State,
    Seq,
    AvailableSince,
    HolderId,
    HolderName,
    TesterName,
    ReservedCountry,
    RequestedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
