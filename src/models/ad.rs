//! Ad entity model
//!
//! This module contains the SeaORM entity model for the ads table, which
//! stores one business listing per row, owned by exactly one tenant.
//!
//! The primary key is an opaque generated string (UUID simple form, 32
//! characters). The spreadsheet reconciler relies on generated ids being
//! longer than 10 characters to tell updates apart from creates.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ad_image::Entity as AdImage;
use super::tenant::Entity as Tenant;

/// Cover image URL used when a listing has no uploaded photos.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.png";

/// Listing tier controlling which directory UI features apply
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AdTier {
    #[default]
    #[sea_orm(string_value = "BASIC")]
    Basic,
    #[sea_orm(string_value = "PREMIUM")]
    Premium,
}

impl AdTier {
    /// Sheet/API representation of the tier
    pub fn as_str(&self) -> &'static str {
        match self {
            AdTier::Basic => "BASIC",
            AdTier::Premium => "PREMIUM",
        }
    }

    /// Parse a sheet cell into a tier, defaulting to `Basic` for anything
    /// blank or unrecognized.
    pub fn from_cell(value: &str) -> Self {
        match value.trim() {
            "PREMIUM" => AdTier::Premium,
            _ => AdTier::Basic,
        }
    }
}

/// Ad entity representing one business listing
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ads")]
pub struct Model {
    /// Opaque stable identifier, generated on creation (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// Business display name
    pub business_name: String,

    /// Listing tier (`BASIC` | `PREMIUM`)
    #[sea_orm(column_name = "type")]
    pub tier: AdTier,

    /// URL slug for the detail page, unique within a tenant
    pub slug: String,

    /// Free-text description
    pub description: String,

    /// Contact phone number (empty string when absent)
    pub phone: String,

    /// Contact email address (empty string when absent)
    pub email: String,

    /// Website URL (empty string when absent)
    pub web: String,

    /// Street address (empty string when absent)
    pub address: String,

    /// Comma-joined category labels; consumers trim each segment
    pub tags: String,

    /// Freeform notes visible to admins only
    pub admin_notes: String,

    /// Latitude; present iff `lng` is present
    pub lat: Option<f64>,

    /// Longitude; present iff `lat` is present
    pub lng: Option<f64>,

    /// Cover image URL (first gallery image or a placeholder)
    pub image_src: String,

    /// Only active ads are eligible for public display
    pub is_active: bool,

    /// Show the phone number on the listing
    pub display_phone: bool,

    /// Show the email address on the listing
    pub display_email: bool,

    /// Show a marker for this ad on the tenant map
    pub display_on_map: bool,

    /// Grid-sizing hint: width in columns
    pub grid_w: i32,

    /// Grid-sizing hint: height in rows
    pub grid_h: i32,

    /// Timestamp when the ad was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the ad was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Tenant",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id"
    )]
    Tenant,
    #[sea_orm(has_many = "AdImage")]
    AdImage,
}

impl Related<Tenant> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<AdImage> for Entity {
    fn to() -> RelationDef {
        Relation::AdImage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Generate a fresh opaque ad identifier.
///
/// UUID v4 in simple form: 32 hex characters, comfortably past the sheet's
/// 10-character identity threshold.
pub fn generate_ad_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_clear_the_sheet_identity_threshold() {
        let id = generate_ad_id();
        assert_eq!(id.len(), 32);
        assert!(id.len() > 10);
    }

    #[test]
    fn tier_parses_case_sensitively_with_basic_fallback() {
        assert_eq!(AdTier::from_cell("PREMIUM"), AdTier::Premium);
        assert_eq!(AdTier::from_cell(" PREMIUM "), AdTier::Premium);
        assert_eq!(AdTier::from_cell("BASIC"), AdTier::Basic);
        assert_eq!(AdTier::from_cell(""), AdTier::Basic);
        assert_eq!(AdTier::from_cell("premium"), AdTier::Basic);
    }
}
