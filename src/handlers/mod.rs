//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the LocalList API.

pub mod contact;
pub mod directory;
pub mod signup;
pub mod sync;
pub mod uploads;

use crate::error::ApiError;
use crate::models::ServiceInfo;
use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall service status
    #[schema(example = "ok")]
    pub status: String,
    /// Service name and version
    pub service: ServiceInfo,
}

/// Liveness and database health probe
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    crate::db::health_check(&state.db).await.map_err(|e| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            &format!("Database health check failed: {}", e),
        )
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        service: ServiceInfo::default(),
    }))
}

#[cfg(test)]
mod tests;
