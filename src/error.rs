//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::quotation::responses::ErrorResponse;
use crate::quotation::{MailError, ValidationErrors};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} not found", what),
                None,
            ),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Please correct the errors below".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Mail(e) => {
                tracing::error!("Mail error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "mail_error",
                    "Email could not be sent".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::FieldError;

    #[test]
    fn test_status_codes() {
        let validation: AppError =
            ValidationErrors::from(FieldError::new("client", "Please select a client")).into();
        assert_eq!(validation.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            AppError::Conflict("not a draft".to_string()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::NotFound("Quotation").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Mail(MailError("smtp down".to_string())).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
