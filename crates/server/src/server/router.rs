use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{ask, health};
use crate::state::AppState;

/// Creates the application router.
///
/// - `GET /` renders the question form
/// - `POST /` answers one question
/// - `GET /health` reports whether startup succeeded
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ask::show_form).post(ask::submit))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
