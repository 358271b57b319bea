//! Firestore-backed store speaking the Firestore REST API.
//!
//! Documents live under per-user subcollections (`users/{id}/chats`,
//! `users/{id}/journals`) with profile and gamification counters on the
//! `users/{id}` document itself, mirroring the layout the mobile client
//! already reads.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::StoreError;
use crate::providers::emotion::EmotionReading;

use super::types::{BoardState, ChatMessage, JournalEntry, UserProfile};
use super::{apply_xp, Store, BOARD_TILES};

/// Upper bound on documents fetched per collection listing.
const LIST_PAGE_SIZE: &str = "300";

/// Firestore REST client.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    api_key: String,
    documents_root: String,
}

impl FirestoreStore {
    /// Build from configuration; `None` when credentials are absent.
    pub fn from_config(config: &Config) -> Option<Self> {
        let project_id = config.firestore_project_id.as_deref()?;
        let api_key = config.firestore_api_key.as_deref()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.store_timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        let documents_root = format!(
            "{}/projects/{}/databases/(default)/documents",
            config.firestore_url.trim_end_matches('/'),
            project_id
        );

        Some(Self {
            http,
            api_key: api_key.to_string(),
            documents_root,
        })
    }

    #[instrument(skip(self, fields))]
    async fn create_document(&self, path: &str, fields: Value) -> Result<String, StoreError> {
        let url = format!("{}/{}", self.documents_root, path);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Unexpected(format!(
                "create {path}: HTTP {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        body.get("name")
            .and_then(Value::as_str)
            .and_then(|name| name.rsplit('/').next())
            .map(str::to_string)
            .ok_or_else(|| {
                StoreError::Unexpected("document name missing from create response".to_string())
            })
    }

    #[instrument(skip(self))]
    async fn list_documents(&self, path: &str) -> Result<Vec<Value>, StoreError> {
        let url = format!("{}/{}", self.documents_root, path);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("pageSize", LIST_PAGE_SIZE)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Unexpected(format!(
                "list {path}: HTTP {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let documents = body
            .get("documents")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        debug!(path, count = documents.len(), "listed documents");
        Ok(documents)
    }

    #[instrument(skip(self))]
    async fn get_document(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let url = format!("{}/{}", self.documents_root, path);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Unexpected(format!(
                "get {path}: HTTP {}",
                response.status()
            )));
        }

        Ok(Some(response.json().await?))
    }

    #[instrument(skip(self, fields))]
    async fn patch_document(
        &self,
        path: &str,
        fields: Value,
        mask: &[&str],
    ) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.documents_root, path);
        let mut query: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        for field in mask.iter().copied() {
            query.push(("updateMask.fieldPaths", field));
        }

        let response = self
            .http
            .patch(&url)
            .query(&query)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Unexpected(format!(
                "patch {path}: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, path: &str) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.documents_root, path);
        let response = self
            .http
            .delete(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Unexpected(format!(
                "delete {path}: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn user_board(&self, user_id: &str) -> Result<BoardState, StoreError> {
        let document = self.get_document(&format!("users/{user_id}")).await?;
        Ok(document
            .as_ref()
            .and_then(|doc| doc.get("fields"))
            .map(board_from_fields)
            .unwrap_or_default())
    }

    async fn write_board(&self, user_id: &str, state: BoardState) -> Result<(), StoreError> {
        let fields = json!({
            "xp": int_field(state.xp as i64),
            "board_pos": int_field(state.board_pos as i64),
        });
        self.patch_document(&format!("users/{user_id}"), fields, &["xp", "board_pos"])
            .await
    }
}

#[async_trait]
impl Store for FirestoreStore {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    async fn append_chat(&self, user_id: &str, message: ChatMessage) -> Result<(), StoreError> {
        self.create_document(&format!("users/{user_id}/chats"), chat_to_fields(&message))
            .await?;
        Ok(())
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let documents = self.list_documents(&format!("users/{user_id}/chats")).await?;
        let mut chats: Vec<ChatMessage> = documents
            .iter()
            .filter_map(|doc| doc.get("fields"))
            .map(chat_from_fields)
            .collect();
        chats.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(chats)
    }

    async fn recent_chats(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let all = self.list_chats(user_id).await?;
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn add_journal(&self, user_id: &str, entry: JournalEntry) -> Result<String, StoreError> {
        self.create_document(
            &format!("users/{user_id}/journals"),
            journal_to_fields(&entry),
        )
        .await
    }

    async fn list_journals(&self, user_id: &str) -> Result<Vec<JournalEntry>, StoreError> {
        let documents = self
            .list_documents(&format!("users/{user_id}/journals"))
            .await?;
        Ok(documents.iter().filter_map(journal_from_document).collect())
    }

    async fn delete_journal(&self, user_id: &str, entry_id: &str) -> Result<(), StoreError> {
        let path = format!("users/{user_id}/journals/{entry_id}");
        if self.get_document(&path).await?.is_none() {
            return Err(StoreError::NotFound(entry_id.to_string()));
        }
        self.delete_document(&path).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let document = self.get_document(&format!("users/{user_id}")).await?;
        let Some(fields) = document.as_ref().and_then(|doc| doc.get("fields")) else {
            return Ok(None);
        };

        // A user document may exist with only gamification counters on it.
        let Some(name) = read_str(fields, "name") else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            name,
            school: read_str(fields, "school").unwrap_or_default(),
            updated_at: read_str(fields, "updated_at").unwrap_or_default(),
        }))
    }

    async fn upsert_profile(&self, user_id: &str, profile: UserProfile) -> Result<(), StoreError> {
        let fields = json!({
            "name": str_field(&profile.name),
            "school": str_field(&profile.school),
            "updated_at": str_field(&profile.updated_at),
        });
        self.patch_document(
            &format!("users/{user_id}"),
            fields,
            &["name", "school", "updated_at"],
        )
        .await
    }

    async fn add_xp(&self, user_id: &str, amount: i64) -> Result<BoardState, StoreError> {
        let mut state = self.user_board(user_id).await?;
        apply_xp(&mut state, amount, false);
        self.write_board(user_id, state).await?;
        Ok(state)
    }

    async fn add_xp_and_move(
        &self,
        user_id: &str,
        amount: i64,
    ) -> Result<BoardState, StoreError> {
        let mut state = self.user_board(user_id).await?;
        apply_xp(&mut state, amount, true);
        self.write_board(user_id, state).await?;
        Ok(state)
    }

    async fn board_state(&self, user_id: &str) -> Result<BoardState, StoreError> {
        self.user_board(user_id).await
    }

    async fn probe(&self) -> Result<(), StoreError> {
        let fields = json!({
            "message": str_field("Hello from unimind-server"),
            "timestamp": str_field(&chrono::Utc::now().to_rfc3339()),
        });
        self.create_document("test_connection", fields).await?;
        Ok(())
    }
}

// === Firestore value mapping ===
//
// The REST API wraps every value in a typed envelope; integerValue is
// transported as a string.

fn str_field(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn int_field(value: i64) -> Value {
    json!({ "integerValue": value.to_string() })
}

fn double_field(value: f64) -> Value {
    json!({ "doubleValue": value })
}

fn read_str(fields: &Value, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

fn read_int(fields: &Value, key: &str) -> Option<i64> {
    let value = fields.get(key)?;
    if let Some(raw) = value.get("integerValue").and_then(Value::as_str) {
        return raw.parse().ok();
    }
    value.get("doubleValue")?.as_f64().map(|f| f as i64)
}

fn read_double(fields: &Value, key: &str) -> Option<f64> {
    let value = fields.get(key)?;
    if let Some(double) = value.get("doubleValue").and_then(Value::as_f64) {
        return Some(double);
    }
    value
        .get("integerValue")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
}

fn chat_to_fields(message: &ChatMessage) -> Value {
    let mut emotion = json!({
        "emotion": str_field(&message.emotion.emotion),
        "intensity": double_field(message.emotion.intensity),
        "confidence": double_field(message.emotion.confidence),
    });
    if let Some(note) = &message.emotion.note {
        emotion["note"] = str_field(note);
    }

    json!({
        "user_message": str_field(&message.user_message),
        "ai_response": str_field(&message.ai_response),
        "emotion": json!({ "mapValue": { "fields": emotion } }),
        "timestamp": str_field(&message.timestamp),
    })
}

fn chat_from_fields(fields: &Value) -> ChatMessage {
    let empty = json!({});
    let emotion_fields = fields
        .pointer("/emotion/mapValue/fields")
        .unwrap_or(&empty);

    ChatMessage {
        user_message: read_str(fields, "user_message").unwrap_or_default(),
        ai_response: read_str(fields, "ai_response").unwrap_or_default(),
        emotion: EmotionReading {
            emotion: read_str(emotion_fields, "emotion")
                .unwrap_or_else(|| "neutral".to_string()),
            intensity: read_double(emotion_fields, "intensity").unwrap_or(0.5),
            confidence: read_double(emotion_fields, "confidence").unwrap_or(0.7),
            note: read_str(emotion_fields, "note"),
        },
        timestamp: read_str(fields, "timestamp").unwrap_or_default(),
    }
}

fn journal_to_fields(entry: &JournalEntry) -> Value {
    let mut fields = json!({
        "mood_text": str_field(&entry.mood_text),
        "date": str_field(&entry.date),
        "timestamp": str_field(&entry.timestamp),
    });
    if let Some(mood) = &entry.mood {
        fields["mood"] = str_field(mood);
    }
    fields
}

fn journal_from_document(document: &Value) -> Option<JournalEntry> {
    let fields = document.get("fields")?;
    let id = document
        .get("name")
        .and_then(Value::as_str)
        .and_then(|name| name.rsplit('/').next())?
        .to_string();

    Some(JournalEntry {
        id,
        mood: read_str(fields, "mood"),
        mood_text: read_str(fields, "mood_text").unwrap_or_default(),
        date: read_str(fields, "date").unwrap_or_default(),
        timestamp: read_str(fields, "timestamp").unwrap_or_default(),
    })
}

fn board_from_fields(fields: &Value) -> BoardState {
    BoardState {
        xp: read_int(fields, "xp").unwrap_or(0).max(0) as u64,
        board_pos: read_int(fields, "board_pos")
            .unwrap_or(0)
            .rem_euclid(BOARD_TILES as i64) as u32,
    }
}
