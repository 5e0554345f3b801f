use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::auth::AuthUser;
use super::error::ApiError;
use super::responses::*;
use super::state::AppState;
use crate::clients::WireMessage;
use crate::database::enums::ChatRole;
use crate::database::models::{ChatSession, NewChatMessage, NewChatSession, User};

/// Send a message to the sales assistant
///
/// Without a session_id a new session is opened, titled after the first
/// message. The conversation history plus a compact market/CRM context
/// block go to the vendor; the fallback chain picks the model.
#[utoipa::path(
    post,
    path = "/api/v1/assistant/chat",
    tag = "assistant",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 502, description = "All models failed", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = request.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    let session = resolve_session(&state, &user, request.session_id, &message)?;

    state
        .chat
        .append_message(NewChatMessage::user(session.id, message.clone()))?;

    // Conversation so far, prefixed with the grounding context
    let mut wire = vec![WireMessage::new(ChatRole::System, build_context(&state, &user)?)];
    for stored in state.chat.get_messages(session.id)? {
        wire.push(WireMessage::new(stored.role, stored.content));
    }
    let wire = state.assistant.clamp_history(wire);

    let reply = state
        .assistant
        .chat(&wire)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    state.chat.append_message(NewChatMessage::assistant(
        session.id,
        reply.content.clone(),
        reply.model.clone(),
    ))?;

    Ok(Json(ChatResponse {
        session_id: session.id,
        reply: reply.content,
        model: reply.model,
    }))
}

/// List the caller's sessions
#[utoipa::path(
    get,
    path = "/api/v1/assistant/sessions",
    tag = "assistant",
    responses(
        (status = 200, description = "Sessions, most recent first", body = SessionListResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.chat.list_sessions_for_user(user.id)?;
    let count = sessions.len();

    Ok(Json(SessionListResponse { sessions, count }))
}

/// Get one session with its messages
#[utoipa::path(
    get,
    path = "/api/v1/assistant/sessions/{id}",
    tag = "assistant",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session and messages", body = SessionDetailResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_session(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionDetailResponse>, ApiError> {
    let session = owned_session(&state, &user, id)?;
    let messages = state.chat.get_messages(id)?;

    Ok(Json(SessionDetailResponse { session, messages }))
}

/// Delete a session
#[utoipa::path(
    delete,
    path = "/api/v1/assistant/sessions/{id}",
    tag = "assistant",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_session(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    owned_session(&state, &user, id)?;
    state.chat.delete_session(id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Compact grounding block injected as the system message
///
/// Keeps the vendor payload small: latest RDN date, pipeline counts, and
/// who is asking.
fn build_context(state: &AppState, user: &User) -> Result<String, ApiError> {
    let mut context = String::from(
        "You are the sales assistant of an energy retailer. Answer in the \
         language of the question, briefly and concretely.\n",
    );

    context.push_str(&format!("Signed-in rep: {}.\n", user.display_name));

    if let Some(latest) = state.energy_prices.latest_date()? {
        context.push_str(&format!("Latest RDN delivery date in store: {}.\n", latest));
    }

    let pipeline = state.leads.count_by_status()?;
    if !pipeline.is_empty() {
        let summary: Vec<String> = pipeline
            .iter()
            .map(|(status, count)| format!("{}: {}", status, count))
            .collect();
        context.push_str(&format!("Lead pipeline: {}.\n", summary.join(", ")));
    }

    Ok(context)
}

fn resolve_session(
    state: &AppState,
    user: &User,
    session_id: Option<Uuid>,
    first_message: &str,
) -> Result<ChatSession, ApiError> {
    match session_id {
        Some(id) => owned_session(state, user, id),
        None => {
            let title: String = first_message.chars().take(80).collect();
            Ok(state
                .chat
                .create_session(NewChatSession::new(user.id, Some(title)))?)
        }
    }
}

/// Sessions are private: a foreign session id reads as not-found
fn owned_session(state: &AppState, user: &User, id: Uuid) -> Result<ChatSession, ApiError> {
    state
        .chat
        .find_session(id)?
        .filter(|session| session.user_id == user.id)
        .ok_or_else(|| ApiError::NotFound(format!("session {}", id)))
}
