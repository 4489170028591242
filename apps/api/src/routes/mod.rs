pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::search::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/documents/search", post(handlers::handle_search))
        .route("/api/v1/documents/skills", get(handlers::handle_list_skills))
        .with_state(state)
}
