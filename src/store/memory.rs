//! In-memory store backend for unconfigured deployments and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::error::StoreError;

use super::types::{BoardState, ChatMessage, JournalEntry, UserProfile};
use super::{apply_xp, Store};

/// Process-local store backed by concurrent maps.
///
/// Per-key entry locks make the XP read-modify-write atomic, so concurrent
/// awards for the same user cannot lose updates.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chats: DashMap<String, Vec<ChatMessage>>,
    journals: DashMap<String, Vec<JournalEntry>>,
    profiles: DashMap<String, UserProfile>,
    boards: DashMap<String, BoardState>,
    diagnostics: DashMap<String, String>,
    next_entry_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        let n = self.next_entry_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("mem-{n:06}")
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn append_chat(&self, user_id: &str, message: ChatMessage) -> Result<(), StoreError> {
        self.chats.entry(user_id.to_string()).or_default().push(message);
        Ok(())
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self
            .chats
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
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
        let id = self.next_id();
        let mut stored = entry;
        stored.id = id.clone();
        self.journals
            .entry(user_id.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn list_journals(&self, user_id: &str) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(self
            .journals
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn delete_journal(&self, user_id: &str, entry_id: &str) -> Result<(), StoreError> {
        let mut entries = self
            .journals
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(entry_id.to_string()))?;

        let position = entries
            .iter()
            .position(|entry| entry.id == entry_id)
            .ok_or_else(|| StoreError::NotFound(entry_id.to_string()))?;

        entries.remove(position);
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn upsert_profile(&self, user_id: &str, profile: UserProfile) -> Result<(), StoreError> {
        self.profiles.insert(user_id.to_string(), profile);
        Ok(())
    }

    async fn add_xp(&self, user_id: &str, amount: i64) -> Result<BoardState, StoreError> {
        let mut state = self.boards.entry(user_id.to_string()).or_default();
        apply_xp(&mut state, amount, false);
        Ok(*state)
    }

    async fn add_xp_and_move(
        &self,
        user_id: &str,
        amount: i64,
    ) -> Result<BoardState, StoreError> {
        let mut state = self.boards.entry(user_id.to_string()).or_default();
        apply_xp(&mut state, amount, true);
        Ok(*state)
    }

    async fn board_state(&self, user_id: &str) -> Result<BoardState, StoreError> {
        Ok(self
            .boards
            .get(user_id)
            .map(|entry| *entry.value())
            .unwrap_or_default())
    }

    async fn probe(&self) -> Result<(), StoreError> {
        self.diagnostics
            .insert("last_probe".to_string(), Utc::now().to_rfc3339());
        Ok(())
    }
}
