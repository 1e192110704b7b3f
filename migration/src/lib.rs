//! Database migrations for the LocalList directory platform.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_06_01_000001_create_tenants;
mod m2025_06_01_000002_create_ads;
mod m2025_06_01_000003_create_ad_images;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_01_000001_create_tenants::Migration),
            Box::new(m2025_06_01_000002_create_ads::Migration),
            Box::new(m2025_06_01_000003_create_ad_images::Migration),
        ]
    }
}
