//! Gamification handlers: XP awards and the UniBoard progress view.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::board::{self, CategoryProgress};
use crate::error::Result;
use crate::metrics;

use super::{default_user_id, AppState};

/// XP granted when the caller does not name an amount.
const DEFAULT_XP_AWARD: i64 = 10;

/// GET /api/xp query parameters.
#[derive(Debug, Deserialize)]
pub struct XpParams {
    /// Recipient of the award.
    pub user_id: Option<String>,
    /// XP to add. Negative amounts apply as zero.
    pub amount: Option<i64>,
}

/// POST /api/xp body.
#[derive(Debug, Deserialize)]
pub struct XpBody {
    /// Recipient of the award.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// XP to add. Negative amounts apply as zero.
    #[serde(default = "default_xp_award")]
    pub amount: i64,
}

fn default_xp_award() -> i64 {
    DEFAULT_XP_AWARD
}

/// POST/GET /api/xp response.
#[derive(Debug, Serialize)]
pub struct XpResponse {
    /// Total XP after the award.
    pub xp: u64,
}

/// GET /api/uniboard query parameters.
#[derive(Debug, Deserialize)]
pub struct UniboardParams {
    /// User whose board to render.
    pub user_id: Option<String>,
}

/// XP totals in the board view.
#[derive(Debug, Serialize)]
pub struct XpSummary {
    /// Accumulated XP.
    pub total: u64,
    /// Display goal.
    pub goal: u64,
}

/// GET /api/uniboard response.
#[derive(Debug, Serialize)]
pub struct UniboardResponse {
    /// Encouragement line for the current tile.
    pub move_message: String,
    /// Per-category progress, capped at 5.
    pub progress: CategoryProgress,
    /// XP totals.
    pub xp: XpSummary,
    /// One badge per 100 XP.
    pub badges: u64,
    /// Current tile, in [0, 20).
    pub board_pos: u32,
}

/// Award XP via query parameters.
pub async fn add_xp_query(
    State(state): State<AppState>,
    Query(params): Query<XpParams>,
) -> Result<Json<XpResponse>> {
    let user_id = params.user_id.unwrap_or_else(default_user_id);
    let amount = params.amount.unwrap_or(DEFAULT_XP_AWARD);
    award(state, user_id, amount).await
}

/// Award XP via a JSON body.
pub async fn add_xp_json(
    State(state): State<AppState>,
    Json(body): Json<XpBody>,
) -> Result<Json<XpResponse>> {
    award(state, body.user_id, body.amount).await
}

async fn award(state: AppState, user_id: String, amount: i64) -> Result<Json<XpResponse>> {
    let board = state
        .store
        .add_xp(&user_id, amount)
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;
    metrics::record_xp_awarded(amount);

    Ok(Json(XpResponse { xp: board.xp }))
}

/// Render the gamified progress view.
pub async fn uniboard(
    State(state): State<AppState>,
    Query(params): Query<UniboardParams>,
) -> Result<Json<UniboardResponse>> {
    let user_id = params.user_id.unwrap_or_else(default_user_id);
    let board = state
        .store
        .board_state(&user_id)
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;

    Ok(Json(UniboardResponse {
        move_message: board::move_message(board.board_pos),
        progress: board::progress_from_xp(board.xp),
        xp: XpSummary {
            total: board.xp,
            goal: board::XP_GOAL,
        },
        badges: board::badges_from_xp(board.xp),
        board_pos: board.board_pos,
    }))
}
