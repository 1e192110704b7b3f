//! # Public Signup Handler
//!
//! `POST /api/signup` creates a new listing from the public signup form. The
//! request must carry a CAPTCHA token; the created ad starts inactive and
//! only appears in the directory once an admin approves it (by flipping
//! `isActive` in the spreadsheet and pulling). An admin notification email is
//! sent on a best-effort basis.

use crate::error::{ApiError, upstream_error, validation_error};
use crate::mail::OutboundMail;
use crate::models::ad::{PLACEHOLDER_IMAGE, generate_ad_id};
use crate::repositories::{AdFields, AdRepository, TenantRepository};
use crate::server::AppState;
use crate::sync::schema::generate_slug;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request payload from the public signup form
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestDto {
    /// hCaptcha token minted by the signup form
    pub captcha_token: String,
    /// Routing domain of the directory being signed up to
    #[schema(example = "plumbers.example.com")]
    pub tenant_domain: String,
    /// Business display name (required)
    #[schema(example = "Joe's Cafe")]
    pub business_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub web: String,
    #[serde(default)]
    pub address: String,
    /// Comma-joined category labels
    #[serde(default)]
    pub tags: String,
    /// Gallery image URLs in display order, uploaded beforehand via
    /// `/api/prepare-upload`
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Response payload for a successful signup
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponseDto {
    pub success: bool,
    pub message: String,
    /// Identifier of the created listing
    pub ad_id: String,
}

/// Create a listing from the public signup form
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequestDto,
    responses(
        (status = 201, description = "Listing created, pending approval", body = SignupResponseDto),
        (status = 400, description = "Missing fields or failed CAPTCHA", body = ApiError),
        (status = 404, description = "Unknown tenant domain", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "signup"
)]
pub async fn submit_signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequestDto>,
) -> Result<(StatusCode, Json<SignupResponseDto>), ApiError> {
    if request.business_name.trim().is_empty() {
        return Err(validation_error(
            "Business name is required",
            serde_json::json!({ "field": "businessName" }),
        ));
    }

    verify_captcha(&state, &request.captcha_token).await?;

    let tenant = TenantRepository::new(&state.db)
        .find_by_domain(&request.tenant_domain.to_lowercase())
        .await?
        .ok_or_else(|| {
            let mut api_err = ApiError::new(
                StatusCode::NOT_FOUND,
                "TENANT_NOT_FOUND",
                "No directory is served on this domain",
            );
            api_err.details = Some(Box::new(
                serde_json::json!({ "tenantDomain": request.tenant_domain }),
            ));
            api_err
        })?;

    let business_name = request.business_name.trim().to_string();
    let fields = AdFields {
        slug: generate_slug(&business_name),
        business_name,
        description: request.description,
        phone: request.phone,
        email: request.email,
        web: request.web,
        address: request.address,
        tags: request.tags,
        image_src: request
            .image_urls
            .first()
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        // New signups stay hidden until approved.
        ..AdFields::default()
    };

    let ad_id = generate_ad_id();
    let ad = AdRepository::new(&state.db)
        .create_with_images(ad_id, tenant.id, fields, &request.image_urls)
        .await?;

    metrics::counter!("signup_ads_created").increment(1);
    tracing::info!(
        ad_id = %ad.id,
        tenant = %tenant.domain,
        "Created listing from signup form"
    );

    notify_admin(&state, &tenant.domain, &ad.business_name, &ad.id).await;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponseDto {
            success: true,
            message: "Listing submitted. It will appear once approved.".to_string(),
            ad_id: ad.id,
        }),
    ))
}

/// Reject the request unless the CAPTCHA service confirms the token.
async fn verify_captcha(state: &AppState, token: &str) -> Result<(), ApiError> {
    if token.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "CAPTCHA_FAILED",
            "CAPTCHA token is required",
        ));
    }

    let verified = state
        .captcha
        .verify(token)
        .await
        .map_err(|e| upstream_error("captcha", &e.to_string()))?;

    if !verified {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "CAPTCHA_FAILED",
            "CAPTCHA verification failed",
        ));
    }

    Ok(())
}

/// Send the admin a notification about the new listing. Failures are logged
/// and never fail the signup.
async fn notify_admin(state: &AppState, tenant_domain: &str, business_name: &str, ad_id: &str) {
    let Some(recipient) = state.config.mail.contact_recipient.clone() else {
        return;
    };

    let mail = OutboundMail {
        to: recipient,
        subject: format!("New signup on {}: {}", tenant_domain, business_name),
        html: format!(
            "<p>A new listing was submitted on <strong>{}</strong>.</p>\
             <p>Business: {}<br>Ad id: {}</p>\
             <p>Set <code>isActive</code> to TRUE in the sheet and pull to publish it.</p>",
            tenant_domain, business_name, ad_id
        ),
    };

    if let Err(err) = state.mailer.send(mail).await {
        tracing::warn!(%err, "Failed to send signup notification email");
    }
}
