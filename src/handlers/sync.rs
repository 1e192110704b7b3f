//! # Admin Sync Handler
//!
//! `POST /api/admin/sync` runs the spreadsheet reconciler in either
//! direction. The endpoint is guarded by a shared admin secret carried in the
//! `Authorization` header and compared in constant time.

use crate::error::{ApiError, unauthorized, upstream_error, validation_error};
use crate::server::AppState;
use crate::sheets::{SheetsClient, SheetsError};
use crate::sync::{PullOutcome, Reconciler, RowSkip, SyncError};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::Json,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

/// Request payload selecting the sync direction
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SyncRequestDto {
    /// Either `push` (database to sheet) or `pull` (sheet to database)
    #[schema(example = "pull")]
    pub action: String,
}

/// Response payload for a completed sync
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponseDto {
    pub success: bool,
    /// Human-readable summary of what the sync did
    pub message: String,
    /// Rows skipped during a pull, with 1-based row numbers and reasons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRowDto>,
    /// Column letters that received id write-backs during a pull
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub written_columns: Vec<String>,
}

/// One skipped pull row
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SkippedRowDto {
    /// 1-based sheet row number
    pub row: usize,
    pub reason: String,
}

impl From<RowSkip> for SkippedRowDto {
    fn from(skip: RowSkip) -> Self {
        Self {
            row: skip.row,
            reason: skip.reason,
        }
    }
}

/// Run a spreadsheet push or pull
#[utoipa::path(
    post,
    path = "/api/admin/sync",
    security(("admin_secret" = [])),
    request_body = SyncRequestDto,
    responses(
        (status = 200, description = "Sync completed", body = SyncResponseDto),
        (status = 400, description = "Unknown action or empty sheet", body = ApiError),
        (status = 401, description = "Missing or wrong admin secret", body = ApiError),
        (status = 500, description = "Sheets or database failure", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn run_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SyncRequestDto>,
) -> Result<Json<SyncResponseDto>, ApiError> {
    authorize(&state, &headers)?;

    if request.action != "push" && request.action != "pull" {
        return Err(validation_error(
            "Unknown sync action; expected 'push' or 'pull'",
            serde_json::json!({ "action": request.action }),
        ));
    }

    let sheets = SheetsClient::from_config(state.http.clone(), &state.config.sheets)
        .map_err(sheets_error)?;
    let reconciler = Reconciler::new(&state.db, &sheets, &state.config.sheets.sheet_range);

    match request.action.as_str() {
        "push" => {
            let outcome = reconciler.push().await.map_err(sync_error)?;
            Ok(Json(SyncResponseDto {
                success: true,
                message: format!(
                    "Pushed {} ads. Headers generated: {}",
                    outcome.rows_written,
                    outcome.headers.join(", ")
                ),
                skipped: Vec::new(),
                written_columns: Vec::new(),
            }))
        }
        _ => {
            let outcome = reconciler.pull().await.map_err(sync_error)?;
            Ok(Json(pull_response(outcome)))
        }
    }
}

/// Compare the Authorization header against the configured admin secret in
/// constant time.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state.config.require_admin_secret().map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            &e.to_string(),
        )
    })?;

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let authorized: bool = provided.as_bytes().ct_eq(expected.as_bytes()).into();
    if !authorized {
        return Err(unauthorized(Some("Invalid admin secret")));
    }

    Ok(())
}

fn pull_response(outcome: PullOutcome) -> SyncResponseDto {
    SyncResponseDto {
        success: true,
        message: format!(
            "Sync complete. Created: {}, Updated: {}, Skipped: {}",
            outcome.created,
            outcome.updated,
            outcome.skipped.len()
        ),
        skipped: outcome.skipped.into_iter().map(SkippedRowDto::from).collect(),
        written_columns: outcome.write_back_columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_response_reports_write_back_columns() {
        let outcome = PullOutcome {
            created: 2,
            updated: 1,
            skipped: vec![RowSkip {
                row: 4,
                reason: "missing businessName".to_string(),
            }],
            write_back_columns: vec!["A".to_string()],
        };

        let response = pull_response(outcome);
        assert_eq!(
            response.message,
            "Sync complete. Created: 2, Updated: 1, Skipped: 1"
        );
        assert_eq!(response.written_columns, vec!["A".to_string()]);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["writtenColumns"][0], "A");
        assert_eq!(json["skipped"][0]["row"], 4);
    }
}

fn sheets_error(error: SheetsError) -> ApiError {
    upstream_error("sheets", &error.to_string())
}

fn sync_error(error: SyncError) -> ApiError {
    match error {
        SyncError::EmptySheet => ApiError::new(
            StatusCode::BAD_REQUEST,
            "EMPTY_SHEET",
            "Sheet is empty or missing data rows",
        ),
        other => upstream_error("sync", &other.to_string()),
    }
}
