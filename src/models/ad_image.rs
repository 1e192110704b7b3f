//! Ad image entity model
//!
//! Gallery images attached to an ad, ordered by creation time.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::ad::Entity as Ad;

/// Image entity attached to one ad
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ad_images")]
pub struct Model {
    /// Unique identifier for the image (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning ad
    pub ad_id: String,

    /// Image URL in object storage
    pub url: String,

    /// Alt text for accessibility (optional)
    pub alt: Option<String>,

    /// Timestamp when the image was created; also the display order key
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Ad",
        from = "Column::AdId",
        to = "super::ad::Column::Id"
    )]
    Ad,
}

impl Related<Ad> for Entity {
    fn to() -> RelationDef {
        Relation::Ad.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
