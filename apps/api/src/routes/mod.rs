pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Streaming generation
        .route("/api/newCoverLetter", post(handlers::handle_new_cover_letter))
        .route(
            "/api/refineCoverLetter",
            post(handlers::handle_refine_cover_letter),
        )
        .route("/api/interview", post(handlers::handle_interview))
        .route(
            "/api/validateTestResponse",
            post(handlers::handle_validate_test_response),
        )
        // Test questions (JSON)
        .route("/api/getQuestion", post(handlers::handle_get_question))
        .with_state(state)
}
