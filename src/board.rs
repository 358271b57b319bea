//! XP-to-progress math behind the UniBoard view.

use serde::Serialize;

/// XP target shown alongside the running total.
pub const XP_GOAL: u64 = 600;

/// One badge is earned per this much XP.
const XP_PER_BADGE: u64 = 100;

/// Each category fills at its own rate; values cap at this level.
const MAX_LEVEL: u64 = 5;

/// Per-category progress derived from total XP, each value in [0, 5].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    /// Academic progress, one level per 120 XP.
    pub academics: u64,
    /// Mental health progress, one level per 100 XP.
    pub mental_health: u64,
    /// Life balance progress, one level per 140 XP.
    pub life_balance: u64,
    /// Social connection progress, one level per 150 XP.
    pub connection: u64,
    /// Creativity progress, one level per 160 XP.
    pub creativity: u64,
}

/// Derive capped category progress from total XP.
pub fn progress_from_xp(xp: u64) -> CategoryProgress {
    CategoryProgress {
        academics: MAX_LEVEL.min(xp / 120),
        mental_health: MAX_LEVEL.min(xp / 100),
        life_balance: MAX_LEVEL.min(xp / 140),
        connection: MAX_LEVEL.min(xp / 150),
        creativity: MAX_LEVEL.min(xp / 160),
    }
}

/// Badge count from total XP.
pub fn badges_from_xp(xp: u64) -> u64 {
    xp / XP_PER_BADGE
}

/// Encouragement line for the current tile.
pub fn move_message(board_pos: u32) -> String {
    format!("You\u{2019}re on tile {board_pos}. Keep it up! \u{1F331}")
}
