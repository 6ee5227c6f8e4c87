use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rejected by the auth provider (bad credentials, unconfirmed email, ...).
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// Rejected by the data API.
    #[error("{message}")]
    Store {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Failed to decode {entity}: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0} is not set")]
    Config(String),

    #[error("{key} is not valid: {value}")]
    InvalidConfig { key: &'static str, value: String },
}

impl AppError {
    pub fn decode(entity: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| AppError::Decode { entity, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database connection failed".to_string(),
                )
            }
            other => {
                error!("request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
