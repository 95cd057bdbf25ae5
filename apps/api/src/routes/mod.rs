pub mod health;
pub mod interview;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route(
            "/api/v1/interview/simulate",
            post(interview::handle_simulate),
        )
        .route("/api/v1/interview/begin", post(interview::handle_begin))
        .route("/api/v1/interview/answer", post(interview::handle_answer))
        .route("/api/v1/interview/cancel", post(interview::handle_cancel))
        .route("/api/v1/interview/export", post(interview::handle_export))
        .with_state(state)
}
