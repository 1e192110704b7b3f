//! Migration to create the ad_images table.
//!
//! Ordered gallery images for an ad. Display order is creation order, so the
//! table only needs a created_at timestamp and an index on the owning ad.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdImages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdImages::AdId).text().not_null())
                    .col(ColumnDef::new(AdImages::Url).text().not_null())
                    .col(ColumnDef::new(AdImages::Alt).text().null())
                    .col(
                        ColumnDef::new(AdImages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ad_images_ad")
                            .from(AdImages::Table, AdImages::AdId)
                            .to(Ads::Table, Ads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ad_images_ad_id")
                    .table(AdImages::Table)
                    .col(AdImages::AdId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdImages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdImages {
    Table,
    Id,
    AdId,
    Url,
    Alt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Ads {
    Table,
    Id,
}
