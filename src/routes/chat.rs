//! Chat widget routes — mount, send, history, teardown.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::layout::{PresentationMode, View};
use crate::chat::{self, ChatError, ChatMessage, ChatWidget, RenderedMessage, SendOutcome, SendPhase};
use crate::error::ErrorCode;
use crate::routes::auth::MaybeUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ViewportQuery {
    #[serde(default)]
    pub view: View,
    /// Viewport width in CSS pixels. Unknown width is treated as desktop.
    pub width: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub mode: PresentationMode,
    pub pushes_content: bool,
    pub shows_backdrop: bool,
}

impl LayoutResponse {
    fn for_query(query: &ViewportQuery) -> Self {
        let mode = match query.width {
            Some(width) => PresentationMode::for_viewport(query.view, width),
            None => PresentationMode::select(query.view, false),
        };
        Self { mode, pushes_content: mode.pushes_content(), shows_backdrop: mode.shows_backdrop() }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub mounted: bool,
    pub ready: bool,
    pub input_enabled: bool,
    pub phase: SendPhase,
    pub placeholder: &'static str,
    pub transcript: Vec<RenderedMessage>,
}

fn session_view(widget: &ChatWidget) -> SessionView {
    SessionView {
        session_id: widget.session_id(),
        mounted: widget.is_mounted(),
        ready: widget.is_ready(),
        input_enabled: widget.input_enabled(),
        phase: widget.phase(),
        placeholder: widget.placeholder(),
        transcript: widget.transcript().iter().map(RenderedMessage::from).collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct MountResponse {
    #[serde(flatten)]
    pub session: SessionView,
    pub layout: LayoutResponse,
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    #[serde(flatten)]
    pub outcome: SendOutcome,
    pub session: SessionView,
}

pub(crate) fn chat_error_to_status(err: &ChatError) -> StatusCode {
    tracing::warn!(code = err.error_code(), error = %err, "chat request failed");
    match err {
        ChatError::KeysUnavailable => StatusCode::CONFLICT,
        ChatError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::Inference(_) => StatusCode::BAD_GATEWAY,
        ChatError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/chat/sessions` — mount a widget with a fresh session key.
pub async fn mount_session(
    State(state): State<AppState>,
    Query(query): Query<ViewportQuery>,
) -> (StatusCode, Json<MountResponse>) {
    let shared = state.chats.mount(ChatWidget::mount()).await;
    let session = session_view(&*shared.lock().await);
    (StatusCode::CREATED, Json(MountResponse { session, layout: LayoutResponse::for_query(&query) }))
}

/// `GET /api/chat/sessions/:id` — status and rendered transcript.
pub async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>, StatusCode> {
    let shared = state.chats.get(id).await.ok_or(StatusCode::NOT_FOUND)?;
    let view = session_view(&*shared.lock().await);
    Ok(Json(view))
}

/// `POST /api/chat/sessions/:id/messages` — send one message.
pub async fn send_message(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SendBody>,
) -> Result<Json<SendResponse>, StatusCode> {
    let shared = state.chats.get(id).await.ok_or(StatusCode::NOT_FOUND)?;
    let outcome = chat::send(&shared, &state.chat_deps, user_id, &body.text).await;
    let session = session_view(&*shared.lock().await);
    Ok(Json(SendResponse { outcome, session }))
}

/// `GET /api/chat/sessions/:id/history` — stored rows, decrypted.
pub async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, StatusCode> {
    let shared = state.chats.get(id).await.ok_or(StatusCode::NOT_FOUND)?;
    let messages = chat::history(&shared, state.chat_deps.store.as_ref())
        .await
        .map_err(|e| chat_error_to_status(&e))?;
    Ok(Json(messages))
}

/// `DELETE /api/chat/sessions/:id` — unload: drop the key, purge rows.
pub async fn unmount_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.chats.unmount(id, state.chat_deps.store.clone()).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// `GET /api/chat/layout` — drawer or popup for a viewport.
pub async fn layout(Query(query): Query<ViewportQuery>) -> Json<LayoutResponse> {
    Json(LayoutResponse::for_query(&query))
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
