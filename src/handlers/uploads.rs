//! # Upload Preparation Handler
//!
//! `POST /api/prepare-upload` hands the signup form a signed URL it can PUT
//! an ad photo to, so image bytes never pass through this service.

use crate::error::{ApiError, upstream_error};
use crate::server::AppState;
use crate::storage::{StorageClient, StorageError};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request payload for a signed upload URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUploadRequestDto {
    /// Original file name; it is sanitized before use
    #[schema(example = "storefront photo.jpg")]
    pub file_name: String,
    /// Routing domain the upload is namespaced under
    #[schema(example = "plumbers.example.com")]
    pub tenant_domain: String,
}

/// Response payload carrying the signed upload grant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUploadResponseDto {
    /// URL the browser PUTs the file to
    pub signed_url: String,
    /// Storage path of the uploaded object
    #[schema(example = "plumbers.example.com/1723456789-storefront-photo.jpg")]
    pub path: String,
}

/// Create a signed upload URL for one ad photo
#[utoipa::path(
    post,
    path = "/api/prepare-upload",
    request_body = PrepareUploadRequestDto,
    responses(
        (status = 200, description = "Signed upload grant", body = PrepareUploadResponseDto),
        (status = 400, description = "Missing file name or tenant domain", body = ApiError),
        (status = 500, description = "Storage unavailable or misconfigured", body = ApiError)
    ),
    tag = "signup"
)]
pub async fn prepare_upload(
    State(state): State<AppState>,
    Json(request): Json<PrepareUploadRequestDto>,
) -> Result<Json<PrepareUploadResponseDto>, ApiError> {
    if request.file_name.trim().is_empty() || request.tenant_domain.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "fileName and tenantDomain are required",
        ));
    }

    let storage =
        StorageClient::from_config(state.http.clone(), &state.config.storage).map_err(storage_error)?;

    let upload = storage
        .prepare_upload(&request.tenant_domain, &request.file_name)
        .await
        .map_err(storage_error)?;

    Ok(Json(PrepareUploadResponseDto {
        signed_url: upload.signed_url,
        path: upload.path,
    }))
}

fn storage_error(error: StorageError) -> ApiError {
    upstream_error("storage", &error.to_string())
}
