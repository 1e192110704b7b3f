//! Tenant entity model
//!
//! This module contains the SeaORM entity model for the tenants table.
//! One tenant is one directory deployment, keyed by its custom domain.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::ad::Entity as Ad;

/// Tenant entity representing one directory deployment
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    /// Unique identifier for the tenant (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Custom domain serving this tenant's directory (unique routing key)
    #[sea_orm(unique)]
    pub domain: String,

    /// Display name shown in the directory header
    pub name: String,

    /// Display title shown on the directory home page (optional)
    pub title: Option<String>,

    /// Timestamp when the tenant was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "Ad")]
    Ad,
}

impl Related<Ad> for Entity {
    fn to() -> RelationDef {
        Relation::Ad.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
