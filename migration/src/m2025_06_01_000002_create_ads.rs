//! Migration to create the ads table.
//!
//! One row per business listing, owned by exactly one tenant. The primary key
//! is an opaque generated string identifier; lat/lng are nullable doubles that
//! are only ever set as a pair.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ads::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(Ads::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Ads::BusinessName).text().not_null())
                    .col(
                        ColumnDef::new(Ads::Type)
                            .text()
                            .not_null()
                            .default("BASIC"),
                    )
                    .col(ColumnDef::new(Ads::Slug).text().not_null())
                    .col(
                        ColumnDef::new(Ads::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Ads::Phone).text().not_null().default(""))
                    .col(ColumnDef::new(Ads::Email).text().not_null().default(""))
                    .col(ColumnDef::new(Ads::Web).text().not_null().default(""))
                    .col(ColumnDef::new(Ads::Address).text().not_null().default(""))
                    .col(ColumnDef::new(Ads::Tags).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Ads::AdminNotes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Ads::Lat).double().null())
                    .col(ColumnDef::new(Ads::Lng).double().null())
                    .col(ColumnDef::new(Ads::ImageSrc).text().not_null())
                    .col(
                        ColumnDef::new(Ads::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Ads::DisplayPhone)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Ads::DisplayEmail)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Ads::DisplayOnMap)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Ads::GridW).integer().not_null().default(1))
                    .col(ColumnDef::new(Ads::GridH).integer().not_null().default(1))
                    .col(
                        ColumnDef::new(Ads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Ads::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ads_tenant")
                            .from(Ads::Table, Ads::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ads_tenant_slug")
                    .table(Ads::Table)
                    .col(Ads::TenantId)
                    .col(Ads::Slug)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Ads {
    Table,
    Id,
    TenantId,
    BusinessName,
    Type,
    Slug,
    Description,
    Phone,
    Email,
    Web,
    Address,
    Tags,
    AdminNotes,
    Lat,
    Lng,
    ImageSrc,
    IsActive,
    DisplayPhone,
    DisplayEmail,
    DisplayOnMap,
    GridW,
    GridH,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
