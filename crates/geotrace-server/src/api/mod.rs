//! API routes for the geotrace server.

pub mod access_log;
pub mod error;
mod routes;
pub mod ws;

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub use error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

/// Full application: routes, access log, CORS and state.
pub fn app(state: Arc<AppState>) -> Router {
    routes()
        .layer(middleware::from_fn(access_log::access_log))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
