use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    /// Malformed or missing field; nothing was persisted.
    #[error("validation error: {0}")]
    Validation(String),

    /// Line item ids that do not belong to the parent being written.
    #[error("line items {0:?} do not belong to this record")]
    NotOwnedReference(Vec<i64>),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("mail error: {0}")]
    Mail(String),

    #[error("database error: {0}")]
    Persistence(sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound { resource, id }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Self::NotOwnedReference(_) => {
                (StatusCode::BAD_REQUEST, "not_owned_reference", self.to_string())
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            Self::Mail(msg) => {
                tracing::error!("Mail error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "mail_error", msg.clone())
            }
            Self::Persistence(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict(db.message().to_string());
            }
            if db.is_foreign_key_violation() {
                return Self::Validation(format!("referenced record does not exist: {}", db.message()));
            }
            if db.is_check_violation() {
                return Self::Validation(db.message().to_string());
            }
            // numeric_value_out_of_range
            if db.code().as_deref() == Some("22003") {
                return Self::Validation(db.message().to_string());
            }
        }
        Self::Persistence(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

/// `{"error": text}` body kept for the email endpoint, whose clients read
/// the message from `error`.
#[derive(Debug, Serialize)]
pub struct PlainErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn into_plain_response(self) -> Response {
        let (status, _, message) = self.parts();
        (status, Json(PlainErrorResponse { error: message })).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();
        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::not_found("quotation", 3).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("sl_no".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotOwnedReference(vec![999]).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("duplicate".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Persistence(sqlx::Error::PoolTimedOut).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn plain_response_keeps_status_and_puts_text_in_error() {
        let response = AppError::Validation("Email and file are required".into()).into_plain_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn row_not_found_stays_a_persistence_error() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Persistence(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn not_found_message_names_resource() {
        assert_eq!(AppError::not_found("invoice", 7).to_string(), "invoice 7 not found");
    }
}
