pub mod handler;
pub mod verification;

use crate::app_state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handler::handle_task_request))
        .route("/health", get(handler::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
