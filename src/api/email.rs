use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::service::{EmailAttachment, OutgoingEmail};

/// `POST /api/send-email`: multipart form with `email`, `subject`,
/// `message` and a `file` sent as the attachment. Errors come back as
/// `{"error": text}`.
pub async fn send_email(State(state): State<AppState>, multipart: Multipart) -> Response {
    match deliver(&state, multipart).await {
        Ok(()) => Json(json!({ "status": "sent" })).into_response(),
        Err(e) => e.into_plain_response(),
    }
}

async fn deliver(state: &AppState, mut multipart: Multipart) -> AppResult<()> {
    let mut recipient = None;
    let mut subject = String::new();
    let mut body = String::new();
    let mut attachment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("attachment").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
                    .to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                attachment = Some(EmailAttachment {
                    filename,
                    content_type,
                    content: content.to_vec(),
                });
            }
            "email" | "subject" | "message" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                match name.as_str() {
                    "email" => recipient = Some(value.trim().to_string()).filter(|v| !v.is_empty()),
                    "subject" => subject = value,
                    _ => body = value,
                }
            }
            other => tracing::debug!("Ignoring multipart field {}", other),
        }
    }

    let (Some(recipient), Some(attachment)) = (recipient, attachment) else {
        return Err(AppError::Validation("Email and file are required".to_string()));
    };

    state
        .mailer
        .send(OutgoingEmail {
            recipient,
            subject,
            body,
            attachment,
        })
        .await
}
