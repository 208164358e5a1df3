//! HTTP API for route editing sessions.

mod routes;
pub mod sessions;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}
