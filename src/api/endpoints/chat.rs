//! Chat endpoints.
//!
//! - `POST /api/chat/start` — open a session, returns id + greeting
//! - `POST /api/chat/send` — run one turn
//! - `GET  /api/chat/sessions/:id` — full turn history
//! - `DELETE /api/chat/sessions/:id` — end a session
//! - `GET  /api/chat/suggestions` — canned opening prompts

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config;
use crate::triage::Resolution;

#[derive(Serialize)]
pub struct ChatStartResponse {
    pub session_id: Uuid,
    pub greeting: String,
}

/// `POST /api/chat/start` — open a new chat session.
pub async fn start(State(ctx): State<ApiContext>) -> Result<Json<ChatStartResponse>, ApiError> {
    let handle = ctx.open_session();
    let greeting = {
        let state = handle.turn.lock().await;
        state.history()[0].text.clone()
    };
    Ok(Json(ChatStartResponse {
        session_id: handle.id,
        greeting,
    }))
}

#[derive(Deserialize)]
pub struct ChatSendRequest {
    pub session_id: Uuid,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatReplyResponse {
    pub session_id: Uuid,
    pub reply: String,
    pub ends_with_question: bool,
    pub recognized_symptoms: Vec<String>,
}

/// `POST /api/chat/send` — run one turn of the session.
///
/// Turns are serialized per session by the handle's turn mutex. If the
/// session is ended while the generation fallback is outstanding, the
/// result is discarded rather than written into torn-down state.
pub async fn send(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatSendRequest>,
) -> Result<Json<ChatReplyResponse>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if message.chars().count() > config::MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message too long (max {} chars)",
            config::MAX_MESSAGE_CHARS
        )));
    }

    let handle = ctx
        .session(&req.session_id)
        .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;

    let mut state = handle.turn.lock().await;
    let reply = match ctx.engine.resolve(&state, message) {
        // Blank input is caught above; this arm is unreachable in practice.
        Resolution::Ignored => {
            return Err(ApiError::BadRequest("Message cannot be empty".into()))
        }
        Resolution::Reply { reply, symptoms } => {
            state.apply_turn(message, &reply.text, symptoms);
            reply
        }
        Resolution::Fallback { prompt, symptoms } => {
            let reply = ctx.engine.run_fallback(&prompt).await;
            if handle.is_closed() {
                tracing::debug!(session_id = %handle.id, "discarding reply for ended session");
                return Err(ApiError::NotFound("Session ended".into()));
            }
            state.apply_turn(message, &reply.text, symptoms);
            reply
        }
    };

    Ok(Json(ChatReplyResponse {
        session_id: handle.id,
        reply: reply.text,
        ends_with_question: reply.ends_with_question,
        recognized_symptoms: state.recognized().iter().cloned().collect(),
    }))
}

#[derive(Serialize)]
pub struct SessionMessage {
    pub role: String,
    pub text: String,
    pub at: String,
}

#[derive(Serialize)]
pub struct SessionDetailResponse {
    pub session_id: Uuid,
    pub title: String,
    pub started_at: String,
    pub recognized_symptoms: Vec<String>,
    pub messages: Vec<SessionMessage>,
}

/// `GET /api/chat/sessions/:id` — full session history.
pub async fn session_detail(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionDetailResponse>, ApiError> {
    let handle = ctx
        .session(&session_id)
        .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;

    let state = handle.turn.lock().await;
    let messages = state
        .history()
        .iter()
        .map(|u| SessionMessage {
            role: u.role.as_str().to_string(),
            text: u.text.clone(),
            at: u.at.to_string(),
        })
        .collect();

    Ok(Json(SessionDetailResponse {
        session_id: handle.id,
        title: state.title(),
        started_at: handle.started_at.to_string(),
        recognized_symptoms: state.recognized().iter().cloned().collect(),
        messages,
    }))
}

#[derive(Serialize)]
pub struct SessionEndResponse {
    pub ended: bool,
}

/// `DELETE /api/chat/sessions/:id` — end a session.
pub async fn end_session(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionEndResponse>, ApiError> {
    if ctx.end_session(&session_id) {
        Ok(Json(SessionEndResponse { ended: true }))
    } else {
        Err(ApiError::NotFound("Session not found".into()))
    }
}

/// Prompt suggestion for an empty chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSuggestion {
    pub text: String,
    pub category: String,
}

/// Default prompt suggestions shown before the first message.
pub fn default_prompt_suggestions() -> Vec<PromptSuggestion> {
    vec![
        PromptSuggestion {
            text: "I have a headache that won't go away".into(),
            category: "symptoms".into(),
        },
        PromptSuggestion {
            text: "What can I take for a sore throat?".into(),
            category: "medicines".into(),
        },
        PromptSuggestion {
            text: "I've had a fever since yesterday".into(),
            category: "symptoms".into(),
        },
        PromptSuggestion {
            text: "My stomach hurts after eating".into(),
            category: "symptoms".into(),
        },
        PromptSuggestion {
            text: "How do I book a consultation?".into(),
            category: "scheduling".into(),
        },
    ]
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<PromptSuggestion>,
}

/// `GET /api/chat/suggestions`
pub async fn suggestions(State(_ctx): State<ApiContext>) -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        suggestions: default_prompt_suggestions(),
    })
}
