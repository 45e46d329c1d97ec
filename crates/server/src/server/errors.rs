use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mutuo_core::AppError;
use thiserror::Error;

/// Failure to produce a page at all.
///
/// Question-level errors are rendered inside the page; only template
/// failures end up here.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PageError(#[from] pub AppError);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!("Failed to render page: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}
