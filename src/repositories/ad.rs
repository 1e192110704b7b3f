//! # Ad Repository
//!
//! Repository implementation for Ad entities and their image galleries.
//! Create and update both replace the image list atomically with the scalar
//! fields, in one transaction per ad; the spreadsheet reconciler relies on
//! that per-row atomicity.

use crate::error::RepositoryError;
use crate::models::ad::{
    self, ActiveModel as AdActiveModel, AdTier, Entity as Ad, Model as AdModel, PLACEHOLDER_IMAGE,
};
use crate::models::ad_image::{
    self, ActiveModel as AdImageActiveModel, Entity as AdImage, Model as AdImageModel,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// Scalar field values for creating or overwriting an ad.
///
/// Shared by the signup flow and the spreadsheet pull so both paths apply the
/// same defaults: inactive until reviewed, display toggles on, 1x1 grid.
#[derive(Debug, Clone)]
pub struct AdFields {
    pub business_name: String,
    pub tier: AdTier,
    pub slug: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub web: String,
    pub address: String,
    pub tags: String,
    pub admin_notes: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub image_src: String,
    pub is_active: bool,
    pub display_phone: bool,
    pub display_email: bool,
    pub display_on_map: bool,
    pub grid_w: i32,
    pub grid_h: i32,
}

impl Default for AdFields {
    fn default() -> Self {
        Self {
            business_name: String::new(),
            tier: AdTier::Basic,
            slug: String::new(),
            description: String::new(),
            phone: String::new(),
            email: String::new(),
            web: String::new(),
            address: String::new(),
            tags: String::new(),
            admin_notes: String::new(),
            lat: None,
            lng: None,
            image_src: PLACEHOLDER_IMAGE.to_string(),
            is_active: false,
            display_phone: true,
            display_email: true,
            display_on_map: true,
            grid_w: 1,
            grid_h: 1,
        }
    }
}

/// Repository for Ad database operations
pub struct AdRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AdRepository<'a> {
    /// Create a new AdRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Load every ad (any tenant, any status) with its ordered image gallery,
    /// newest ad first. This is the working set for the spreadsheet push.
    pub async fn list_with_images(
        &self,
    ) -> Result<Vec<(AdModel, Vec<AdImageModel>)>, RepositoryError> {
        let ads = Ad::find()
            .order_by_desc(ad::Column::CreatedAt)
            .find_with_related(AdImage)
            .order_by_asc(ad_image::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(ads)
    }

    /// Active ads for one tenant, newest first
    pub async fn list_active_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<AdModel>, RepositoryError> {
        let ads = Ad::find()
            .filter(ad::Column::TenantId.eq(tenant_id))
            .filter(ad::Column::IsActive.eq(true))
            .order_by_desc(ad::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(ads)
    }

    /// Look up one ad by its tenant and detail-page slug
    pub async fn find_by_slug(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<AdModel>, RepositoryError> {
        let ad = Ad::find()
            .filter(ad::Column::TenantId.eq(tenant_id))
            .filter(ad::Column::Slug.eq(slug))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(ad)
    }

    /// Ordered image gallery for one ad
    pub async fn images_for(&self, ad_id: &str) -> Result<Vec<AdImageModel>, RepositoryError> {
        let images = AdImage::find()
            .filter(ad_image::Column::AdId.eq(ad_id))
            .order_by_asc(ad_image::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(images)
    }

    /// Create an ad with its image gallery in one transaction.
    ///
    /// The caller supplies the generated identifier so it can be reported
    /// back (signup response, sheet id write-back).
    pub async fn create_with_images(
        &self,
        id: String,
        tenant_id: Uuid,
        fields: AdFields,
        image_urls: &[String],
    ) -> Result<AdModel, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let now = Utc::now();
        let ad = AdActiveModel {
            id: Set(id.clone()),
            tenant_id: Set(tenant_id),
            business_name: Set(fields.business_name),
            tier: Set(fields.tier),
            slug: Set(fields.slug),
            description: Set(fields.description),
            phone: Set(fields.phone),
            email: Set(fields.email),
            web: Set(fields.web),
            address: Set(fields.address),
            tags: Set(fields.tags),
            admin_notes: Set(fields.admin_notes),
            lat: Set(fields.lat),
            lng: Set(fields.lng),
            image_src: Set(fields.image_src),
            is_active: Set(fields.is_active),
            display_phone: Set(fields.display_phone),
            display_email: Set(fields.display_email),
            display_on_map: Set(fields.display_on_map),
            grid_w: Set(fields.grid_w),
            grid_h: Set(fields.grid_h),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = ad
            .insert(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        insert_images(&txn, &id, image_urls).await?;

        txn.commit().await.map_err(RepositoryError::database_error)?;
        Ok(created)
    }

    /// Overwrite an existing ad's scalar fields and fully replace its image
    /// gallery (delete-all then recreate in the given order), in one
    /// transaction.
    pub async fn update_with_images(
        &self,
        id: &str,
        tenant_id: Uuid,
        fields: AdFields,
        image_urls: &[String],
    ) -> Result<AdModel, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let existing = Ad::find_by_id(id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound(format!("Ad not found: {}", id)))?;

        let mut active = existing.into_active_model();
        active.tenant_id = Set(tenant_id);
        active.business_name = Set(fields.business_name);
        active.tier = Set(fields.tier);
        active.slug = Set(fields.slug);
        active.description = Set(fields.description);
        active.phone = Set(fields.phone);
        active.email = Set(fields.email);
        active.web = Set(fields.web);
        active.address = Set(fields.address);
        active.tags = Set(fields.tags);
        active.admin_notes = Set(fields.admin_notes);
        active.lat = Set(fields.lat);
        active.lng = Set(fields.lng);
        active.image_src = Set(fields.image_src);
        active.is_active = Set(fields.is_active);
        active.display_phone = Set(fields.display_phone);
        active.display_email = Set(fields.display_email);
        active.display_on_map = Set(fields.display_on_map);
        active.grid_w = Set(fields.grid_w);
        active.grid_h = Set(fields.grid_h);
        active.updated_at = Set(Utc::now().into());

        let updated = active
            .update(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        AdImage::delete_many()
            .filter(ad_image::Column::AdId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        insert_images(&txn, id, image_urls).await?;

        txn.commit().await.map_err(RepositoryError::database_error)?;
        Ok(updated)
    }
}

/// Insert gallery rows with staggered creation timestamps so the sheet's
/// image order survives the round trip.
async fn insert_images(
    txn: &DatabaseTransaction,
    ad_id: &str,
    image_urls: &[String],
) -> Result<(), RepositoryError> {
    if image_urls.is_empty() {
        return Ok(());
    }

    let now = Utc::now();
    let rows: Vec<AdImageActiveModel> = image_urls
        .iter()
        .enumerate()
        .map(|(index, url)| AdImageActiveModel {
            id: Set(Uuid::new_v4()),
            ad_id: Set(ad_id.to_string()),
            url: Set(url.clone()),
            alt: Set(None),
            created_at: Set((now + Duration::microseconds(index as i64)).into()),
        })
        .collect();

    AdImage::insert_many(rows)
        .exec(txn)
        .await
        .map_err(RepositoryError::database_error)?;

    Ok(())
}
