//! # Contact Form Handler
//!
//! `POST /api/contact` forwards a contact-form submission to the configured
//! recipient via the outbound mail provider.

use crate::error::{ApiError, upstream_error};
use crate::mail::{MailError, OutboundMail};
use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request payload from the contact form
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestDto {
    /// Sender's name
    pub name: String,
    /// Sender's business name, when relevant
    #[serde(default)]
    pub business_name: String,
    /// Reply-to email address
    pub email: String,
    /// Message body
    pub message: String,
}

/// Response payload for a forwarded contact message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponseDto {
    pub success: bool,
    pub message: String,
}

/// Forward a contact-form message to the platform admin
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequestDto,
    responses(
        (status = 200, description = "Message forwarded", body = ContactResponseDto),
        (status = 400, description = "Missing fields or provider rejection", body = ApiError),
        (status = 500, description = "Mail not configured or provider failure", body = ApiError)
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequestDto>,
) -> Result<Json<ContactResponseDto>, ApiError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.message.trim().is_empty()
    {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "name, email and message are required",
        ));
    }

    let recipient = state.config.mail.contact_recipient.clone().ok_or_else(|| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            &MailError::MissingRecipient.to_string(),
        )
    })?;

    let mail = OutboundMail {
        to: recipient,
        subject: format!("Contact form: {}", request.name),
        html: format!(
            "<p><strong>Name:</strong> {}</p>\
             <p><strong>Business:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p>{}</p>",
            request.name, request.business_name, request.email, request.message
        ),
    };

    state.mailer.send(mail).await.map_err(|err| match err {
        // Provider-side rejections (bad address, unverified sender) come back
        // to the form as 400, anything else as 500.
        MailError::Api { status, .. } if status < 500 => {
            ApiError::new(StatusCode::BAD_REQUEST, "MAIL_REJECTED", "Error sending email.")
        }
        other => upstream_error("mail", &other.to_string()),
    })?;

    Ok(Json(ContactResponseDto {
        success: true,
        message: "Message sent.".to_string(),
    }))
}
