//! Error taxonomy shared by services and HTTP handlers / 错误类型
//!
//! Every failure is caller-correctable except `Internal`; nothing is retried.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One message per failed field rule
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    /// Missing, malformed, forged or expired bearer token
    #[error("invalid credential: {0}")]
    Credential(String),

    #[error("password not matched")]
    PasswordMismatch,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Duplicate(_)
            | AppError::NotFound(_)
            | AppError::PasswordMismatch => StatusCode::BAD_REQUEST,
            AppError::Credential(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation(messages) => json!({ "error": messages }),
            AppError::Credential(reason) => {
                tracing::debug!("Rejected credential: {}", reason);
                json!({ "error": "Unauthorized" })
            }
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                json!({ "error": "internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
