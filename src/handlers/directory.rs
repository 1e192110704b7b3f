//! # Directory Page Handlers
//!
//! Handlers for the tenant-facing directory pages. These are the routes the
//! tenant router rewrites to: the shared landing page, a tenant's directory
//! home, ad detail pages, and the signup flow pages. Each returns the JSON
//! payload the corresponding page renders from.

use crate::error::{ApiError, not_found};
use crate::models::ServiceInfo;
use crate::models::ad::Model as AdModel;
use crate::models::ad_image::Model as AdImageModel;
use crate::models::tenant::Model as TenantModel;
use crate::repositories::{AdRepository, TenantRepository};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public view of a tenant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantDto {
    /// Custom domain serving this tenant's directory
    #[schema(example = "plumbers.example.com")]
    pub domain: String,
    /// Display name
    #[schema(example = "Example Plumbers Directory")]
    pub name: String,
    /// Optional page title for the directory home
    pub title: Option<String>,
}

impl From<TenantModel> for TenantDto {
    fn from(tenant: TenantModel) -> Self {
        Self {
            domain: tenant.domain,
            name: tenant.name,
            title: tenant.title,
        }
    }
}

/// Public view of one business listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdDto {
    pub id: String,
    #[schema(example = "Joe's Cafe")]
    pub business_name: String,
    /// Listing tier (`BASIC` | `PREMIUM`)
    #[serde(rename = "type")]
    pub tier: crate::models::ad::AdTier,
    #[schema(example = "joes-cafe-1234")]
    pub slug: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub web: String,
    pub address: String,
    /// Comma-joined category labels
    pub tags: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Cover image URL (first gallery image or a placeholder)
    pub image_src: String,
    pub display_phone: bool,
    pub display_email: bool,
    pub display_on_map: bool,
    pub grid_w: i32,
    pub grid_h: i32,
}

impl From<AdModel> for AdDto {
    fn from(ad: AdModel) -> Self {
        Self {
            id: ad.id,
            business_name: ad.business_name,
            tier: ad.tier,
            slug: ad.slug,
            description: ad.description,
            phone: ad.phone,
            email: ad.email,
            web: ad.web,
            address: ad.address,
            tags: ad.tags,
            lat: ad.lat,
            lng: ad.lng,
            image_src: ad.image_src,
            display_phone: ad.display_phone,
            display_email: ad.display_email,
            display_on_map: ad.display_on_map,
            grid_w: ad.grid_w,
            grid_h: ad.grid_h,
        }
    }
}

/// One gallery image
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdImageDto {
    pub url: String,
    pub alt: Option<String>,
}

impl From<AdImageModel> for AdImageDto {
    fn from(image: AdImageModel) -> Self {
        Self {
            url: image.url,
            alt: image.alt,
        }
    }
}

/// Payload for the shared landing page on the platform's own domain
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    /// The platform's marketing domain
    #[schema(example = "locallist.uk")]
    pub platform_domain: String,
    pub service: ServiceInfo,
}

/// Payload for a tenant's directory home page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DirectoryResponse {
    pub tenant: TenantDto,
    /// Active listings, newest first
    pub ads: Vec<AdDto>,
}

/// Payload for an ad detail page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdDetailResponse {
    pub tenant: TenantDto,
    pub ad: AdDto,
    /// Gallery images in display order
    pub images: Vec<AdImageDto>,
}

/// Payload for a tenant's signup page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupPageResponse {
    pub tenant: TenantDto,
    /// hCaptcha site key the signup form embeds, when configured
    pub captcha_site_key: Option<String>,
}

/// Payload for the post-signup thank-you page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThankYouResponse {
    pub tenant: TenantDto,
    pub message: String,
}

/// Shared landing page for the platform's own domain
#[utoipa::path(
    get,
    path = "/landing",
    responses(
        (status = 200, description = "Landing page payload", body = LandingResponse)
    ),
    tag = "directory"
)]
pub async fn landing(State(state): State<AppState>) -> Json<LandingResponse> {
    Json(LandingResponse {
        platform_domain: state.config.platform_domain.clone(),
        service: ServiceInfo::default(),
    })
}

/// A tenant's directory home: the tenant plus its active listings
#[utoipa::path(
    get,
    path = "/{domain}",
    params(
        ("domain" = String, Path, description = "Tenant routing domain")
    ),
    responses(
        (status = 200, description = "Directory home payload", body = DirectoryResponse),
        (status = 404, description = "Unknown tenant", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "directory"
)]
pub async fn directory_home(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<DirectoryResponse>, ApiError> {
    let tenant = find_tenant(&state, &domain).await?;
    let ads = AdRepository::new(&state.db)
        .list_active_for_tenant(tenant.id)
        .await?;

    Ok(Json(DirectoryResponse {
        tenant: tenant.into(),
        ads: ads.into_iter().map(AdDto::from).collect(),
    }))
}

/// Detail page for one active listing
#[utoipa::path(
    get,
    path = "/{domain}/{slug}",
    params(
        ("domain" = String, Path, description = "Tenant routing domain"),
        ("slug" = String, Path, description = "Listing slug")
    ),
    responses(
        (status = 200, description = "Ad detail payload", body = AdDetailResponse),
        (status = 404, description = "Unknown tenant, unknown slug, or inactive ad", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "directory"
)]
pub async fn ad_detail(
    State(state): State<AppState>,
    Path((domain, slug)): Path<(String, String)>,
) -> Result<Json<AdDetailResponse>, ApiError> {
    let tenant = find_tenant(&state, &domain).await?;
    let repo = AdRepository::new(&state.db);

    let ad = repo
        .find_by_slug(tenant.id, &slug)
        .await?
        // Inactive ads stay invisible, indistinguishable from missing ones.
        .filter(|ad| ad.is_active)
        .ok_or_else(|| not_found(Some("Listing not found")))?;

    let images = repo.images_for(&ad.id).await?;

    Ok(Json(AdDetailResponse {
        tenant: tenant.into(),
        ad: ad.into(),
        images: images.into_iter().map(AdImageDto::from).collect(),
    }))
}

/// Signup page payload for one tenant
#[utoipa::path(
    get,
    path = "/{domain}/signup",
    params(
        ("domain" = String, Path, description = "Tenant routing domain")
    ),
    responses(
        (status = 200, description = "Signup page payload", body = SignupPageResponse),
        (status = 404, description = "Unknown tenant", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "directory"
)]
pub async fn signup_page(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<SignupPageResponse>, ApiError> {
    let tenant = find_tenant(&state, &domain).await?;

    Ok(Json(SignupPageResponse {
        tenant: tenant.into(),
        captcha_site_key: state.config.captcha.site_key.clone(),
    }))
}

/// Thank-you page shown after a successful signup
#[utoipa::path(
    get,
    path = "/{domain}/thank-you-signup",
    params(
        ("domain" = String, Path, description = "Tenant routing domain")
    ),
    responses(
        (status = 200, description = "Thank-you page payload", body = ThankYouResponse),
        (status = 404, description = "Unknown tenant", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "directory"
)]
pub async fn thank_you_page(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<ThankYouResponse>, ApiError> {
    let tenant = find_tenant(&state, &domain).await?;

    Ok(Json(ThankYouResponse {
        tenant: tenant.into(),
        message: "Thank you! Your listing has been submitted and will appear once approved."
            .to_string(),
    }))
}

/// Resolve the tenant for a routing domain or fail with 404.
async fn find_tenant(state: &AppState, domain: &str) -> Result<TenantModel, ApiError> {
    TenantRepository::new(&state.db)
        .find_by_domain(&domain.to_lowercase())
        .await?
        .ok_or_else(|| {
            let mut api_err = ApiError::new(
                StatusCode::NOT_FOUND,
                "TENANT_NOT_FOUND",
                "No directory is served on this domain",
            );
            api_err.details = Some(Box::new(serde_json::json!({ "domain": domain })));
            api_err
        })
}
