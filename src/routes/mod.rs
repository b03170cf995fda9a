//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The portal front end talks to this service over JSON. Chat widgets are
//! mounted, driven and torn down through `/api/chat/sessions`; the exam
//! directory and calendar are read-only views over the catalog merged with
//! live dates.

pub mod auth;
pub mod chat;
pub mod exams;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat/sessions", post(chat::mount_session))
        .route("/api/chat/sessions/{id}", get(chat::get_session).delete(chat::unmount_session))
        .route("/api/chat/sessions/{id}/messages", post(chat::send_message))
        .route("/api/chat/sessions/{id}/history", get(chat::session_history))
        .route("/api/chat/layout", get(chat::layout))
        .route("/api/exams", get(exams::list_exams))
        .route("/api/exams/{id}", get(exams::get_exam))
        .route("/api/calendar/{year}/{month}", get(exams::calendar_month))
        .route("/api/calendar/day/{date}", get(exams::calendar_day))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
