use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::sessions;
use crate::state::AppState;

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/routes", post(sessions::create_route))
        .route(
            "/v1/routes/:id",
            get(sessions::get_route).delete(sessions::delete_route),
        )
        .route("/v1/routes/:id/intents", post(sessions::submit_intent))
        .route("/v1/routes/:id/undo", post(sessions::undo))
        .route("/v1/routes/:id/redo", post(sessions::redo))
        .route("/v1/routes/:id/cursor", get(sessions::cursor))
        .route("/v1/routes/:id/nearest", get(sessions::nearest))
        .route("/v1/routes/:id/markers", get(sessions::markers))
        .route("/v1/routes/:id/chart", get(sessions::chart_pointer))
}
