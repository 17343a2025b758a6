use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::{EngineError, ErrorKind};

/// Central error type for the Gateway application
///
/// Every variant renders as `{"detail": "<message>"}`; the status code is the
/// only machine-readable distinction clients get.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Body, path or query that could not be parsed into the expected shape
    #[error("{0}")]
    Unprocessable(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Unprocessable(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(err) => match err.kind() {
                ErrorKind::InvalidArgument | ErrorKind::InsufficientInventory => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::MarketClosed => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::InvariantViolation => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
