//! Storage interface and backends.
//!
//! All persisted entities go through the [`Store`] trait. The backend is
//! chosen once at startup: Firestore when credentials are configured, a
//! process-local concurrent map otherwise. Handlers hold an `Arc<dyn Store>`
//! and never know which one they got.

pub mod firestore;
pub mod memory;
pub mod types;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use types::{BoardState, ChatMessage, JournalEntry, UserProfile};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::StoreError;

/// Number of board tiles; positions wrap after this many moves.
pub const BOARD_TILES: u32 = 20;

/// Storage operations for all persisted entities.
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend label used in diagnostics.
    fn backend(&self) -> &'static str;

    /// Append one chat exchange to the user's log.
    async fn append_chat(&self, user_id: &str, message: ChatMessage) -> Result<(), StoreError>;

    /// All chat messages for the user, timestamp ascending.
    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError>;

    /// The most recent `limit` chat messages, timestamp ascending.
    async fn recent_chats(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError>;

    /// Persist a journal entry, returning its generated id.
    async fn add_journal(&self, user_id: &str, entry: JournalEntry) -> Result<String, StoreError>;

    /// All journal entries for the user, unsorted.
    async fn list_journals(&self, user_id: &str) -> Result<Vec<JournalEntry>, StoreError>;

    /// Delete one entry by id. `StoreError::NotFound` when the id is unknown.
    async fn delete_journal(&self, user_id: &str, entry_id: &str) -> Result<(), StoreError>;

    /// Stored profile, or `None` when the user never saved one.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Create or replace the user's profile.
    async fn upsert_profile(&self, user_id: &str, profile: UserProfile) -> Result<(), StoreError>;

    /// Add XP without advancing the board. Negative amounts apply as zero.
    async fn add_xp(&self, user_id: &str, amount: i64) -> Result<BoardState, StoreError>;

    /// Add XP and advance the board position by one tile (mod 20).
    async fn add_xp_and_move(&self, user_id: &str, amount: i64)
        -> Result<BoardState, StoreError>;

    /// Current gamification counters, zeroed for unknown users.
    async fn board_state(&self, user_id: &str) -> Result<BoardState, StoreError>;

    /// Write a throwaway document to verify connectivity.
    async fn probe(&self) -> Result<(), StoreError>;
}

/// Build the store selected by configuration.
pub fn from_config(config: &Config) -> Arc<dyn Store> {
    match FirestoreStore::from_config(config) {
        Some(store) => {
            info!("Firestore persistence enabled");
            Arc::new(store)
        }
        None => {
            warn!("Firestore not configured, falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

/// XP arithmetic shared by both backends.
///
/// Clamps negative awards to zero so the stored total never decreases.
pub(crate) fn apply_xp(state: &mut BoardState, amount: i64, advance_board: bool) {
    state.xp = state.xp.saturating_add(amount.max(0) as u64);
    if advance_board {
        state.board_pos = (state.board_pos + 1) % BOARD_TILES;
    }
}
