//! Journal handlers: create, list, delete.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, Result, StoreError};
use crate::metrics;
use crate::store::JournalEntry;

use super::AppState;

/// Fixed XP awarded per journal entry.
const JOURNAL_XP_AWARD: i64 = 10;

/// Listings default to entries from the last this-many days.
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// POST /api/journal body.
#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    /// Owner of the entry. Required.
    pub user_id: Option<String>,
    /// Mood label.
    pub mood: Option<String>,
    /// Free-form mood description.
    #[serde(default)]
    pub mood_text: String,
    /// Entry date (YYYY-MM-DD); defaults to today.
    pub date: Option<String>,
}

/// POST /api/journal response.
#[derive(Debug, Serialize)]
pub struct CreateJournalResponse {
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Store-generated entry id.
    pub id: String,
    /// The persisted entry.
    pub entry: JournalEntry,
}

/// GET /api/journal query parameters.
#[derive(Debug, Deserialize)]
pub struct ListJournalParams {
    /// Owner of the entries. Required.
    pub user_id: Option<String>,
    /// Window size in days.
    pub days: Option<i64>,
}

/// GET /api/journal response.
#[derive(Debug, Serialize)]
pub struct ListJournalResponse {
    /// Entries within the window, newest first.
    pub entries: Vec<JournalEntry>,
    /// Number of entries returned.
    pub count: usize,
}

/// DELETE /api/journal/{id} query parameters.
#[derive(Debug, Deserialize)]
pub struct DeleteJournalParams {
    /// Owner of the entry. Required.
    pub user_id: Option<String>,
}

/// Create a journal entry and award XP.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateJournalRequest>,
) -> Result<Json<CreateJournalResponse>> {
    let user_id = request
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingField("user_id"))?;

    let now = Utc::now();
    let mut entry = JournalEntry {
        id: String::new(),
        mood: request.mood,
        mood_text: request.mood_text,
        date: request
            .date
            .filter(|date| !date.is_empty())
            .unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
        timestamp: now.to_rfc3339(),
    };

    let id = state
        .store
        .add_journal(&user_id, entry.clone())
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;
    entry.id = id.clone();
    metrics::inc_journal_writes();

    state
        .store
        .add_xp_and_move(&user_id, JOURNAL_XP_AWARD)
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;
    metrics::record_xp_awarded(JOURNAL_XP_AWARD);

    Ok(Json(CreateJournalResponse {
        message: "Journal entry saved",
        id,
        entry,
    }))
}

/// List entries from the last `days` days, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListJournalParams>,
) -> Result<Json<ListJournalResponse>> {
    let user_id = params
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingField("user_id"))?;

    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS).max(0);
    let cutoff = Utc::now() - Duration::days(days);

    let mut entries = state
        .store
        .list_journals(&user_id)
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;
    entries.retain(|entry| within_window(&entry.timestamp, cutoff));
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let count = entries.len();
    Ok(Json(ListJournalResponse { entries, count }))
}

/// Delete one entry by id. 404 when the id is unknown.
pub async fn remove(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Query(params): Query<DeleteJournalParams>,
) -> Result<Json<serde_json::Value>> {
    let user_id = params
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingField("user_id"))?;

    match state.store.delete_journal(&user_id, &entry_id).await {
        Ok(()) => Ok(Json(json!({ "success": true, "deleted_id": entry_id }))),
        Err(StoreError::NotFound(_)) => Err(ApiError::EntryNotFound(entry_id)),
        Err(e) => {
            metrics::inc_store_errors();
            Err(e.into())
        }
    }
}

/// Entries with unparseable timestamps stay visible.
fn within_window(timestamp: &str, cutoff: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc) >= cutoff)
        .unwrap_or(true)
}
