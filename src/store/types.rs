//! Persisted entity types.

use serde::{Deserialize, Serialize};

use crate::providers::emotion::EmotionReading;

/// One stored chat exchange. Appended to a per-user log, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// What the user sent.
    pub user_message: String,
    /// What the assistant replied.
    pub ai_response: String,
    /// Emotion reading taken from the user message.
    pub emotion: EmotionReading,
    /// RFC-3339 creation time.
    pub timestamp: String,
}

/// One stored journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Store-generated identifier. Empty until persisted.
    #[serde(default)]
    pub id: String,
    /// Mood label chosen by the user.
    pub mood: Option<String>,
    /// Free-form mood description.
    #[serde(default)]
    pub mood_text: String,
    /// Calendar date the entry refers to (YYYY-MM-DD).
    pub date: String,
    /// RFC-3339 creation time.
    pub timestamp: String,
}

/// Stored user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// School name, free text.
    pub school: String,
    /// RFC-3339 time of the last write.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updated_at: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Emily".to_string(),
            school: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Gamification counters for one user.
///
/// `xp` only ever grows; `board_pos` stays within [0, 20).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoardState {
    /// Accumulated experience points.
    pub xp: u64,
    /// Current tile on the board.
    pub board_pos: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_emily() {
        let profile = UserProfile::default();
        assert_eq!(profile.name, "Emily");
        assert!(profile.school.is_empty());
    }

    #[test]
    fn fresh_board_state_is_zeroed() {
        let state = BoardState::default();
        assert_eq!(state.xp, 0);
        assert_eq!(state.board_pos, 0);
    }
}
