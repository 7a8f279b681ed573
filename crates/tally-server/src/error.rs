//! Error types for the chart API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tally_core::StoreError;
use tally_core::form::FormError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The submitted form was rejected.
    #[error(transparent)]
    Form(#[from] FormError),

    /// The document store rejected the request.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The chart driver is not running.
    #[error("chart driver unavailable")]
    DriverUnavailable,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Form(FormError::Store(e)) | Self::Store(e) => store_status(e),
            Self::Form(_) => StatusCode::BAD_REQUEST,
            Self::DriverUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

const fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
        StoreError::Unavailable { .. } | StoreError::Closed => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
