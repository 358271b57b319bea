//! Chat handlers: send a message, list history.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::metrics;
use crate::providers::completion::{ChatTurn, CompletionProvider, UpcomingEvent};
use crate::providers::emotion::EmotionReading;
use crate::store::ChatMessage;

use super::{default_user_id, AppState};

/// Fixed XP awarded per chat exchange.
const CHAT_XP_AWARD: i64 = 15;

/// POST /api/chat body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message. Required.
    #[serde(default)]
    pub message: String,
    /// Caller-supplied user id.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Upcoming events woven into the reply's context.
    #[serde(default)]
    pub calendar_events: Vec<UpcomingEvent>,
}

/// POST /api/chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Assistant reply.
    pub response: String,
    /// Emotion reading for the user message.
    pub emotion: EmotionReading,
    /// RFC-3339 time the exchange was recorded.
    pub timestamp: String,
}

/// GET /api/chat/history query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// User whose history to return. Required.
    pub user_id: Option<String>,
}

/// GET /api/chat/history response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Stored exchanges, timestamp ascending.
    pub messages: Vec<ChatMessage>,
}

/// Handle one chat turn: classify tone, generate a reply, persist, award XP.
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(ApiError::MissingField("message"));
    }

    metrics::inc_chat_requests();

    // Prior exchanges are context only; a read failure degrades to none.
    let mut history: Vec<ChatTurn> = Vec::new();
    match state
        .store
        .recent_chats(&request.user_id, state.chat_history_limit)
        .await
    {
        Ok(chats) => {
            for chat in chats {
                if !chat.user_message.is_empty() {
                    history.push(ChatTurn::user(chat.user_message));
                }
                if !chat.ai_response.is_empty() {
                    history.push(ChatTurn::assistant(chat.ai_response));
                }
            }
        }
        Err(e) => {
            warn!(error = %e, user_id = %request.user_id, "history read failed, continuing without context");
            metrics::inc_store_errors();
        }
    }
    history.push(ChatTurn::user(request.message.clone()));

    let emotion = state.emotion.detect(&request.message).await;
    let system_prompt = CompletionProvider::system_prompt(&emotion, &request.calendar_events);
    let ai_response = state.completion.complete(&system_prompt, &history).await;

    let timestamp = Utc::now().to_rfc3339();
    state
        .store
        .append_chat(
            &request.user_id,
            ChatMessage {
                user_message: request.message,
                ai_response: ai_response.clone(),
                emotion: emotion.clone(),
                timestamp: timestamp.clone(),
            },
        )
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;

    state
        .store
        .add_xp_and_move(&request.user_id, CHAT_XP_AWARD)
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;
    metrics::record_xp_awarded(CHAT_XP_AWARD);

    Ok(Json(ChatResponse {
        response: ai_response,
        emotion,
        timestamp,
    }))
}

/// List every stored exchange for a user, oldest first.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>> {
    let user_id = params
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingField("user_id"))?;

    let mut messages = state
        .store
        .list_chats(&user_id)
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    Ok(Json(HistoryResponse { messages }))
}
