//! Profile handlers: save and fetch.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics;
use crate::store::UserProfile;

use super::{default_user_id, AppState};

/// POST /api/profile body. Nothing is validated by design of the client.
#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    /// Owner of the profile.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// School name, free text.
    #[serde(default)]
    pub school: String,
}

/// POST /api/profile response.
#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    /// Human-readable confirmation.
    pub message: &'static str,
    /// The persisted profile.
    pub profile: UserProfile,
}

/// GET /api/profile query parameters.
#[derive(Debug, Deserialize)]
pub struct FetchProfileParams {
    /// Owner of the profile.
    pub user_id: Option<String>,
}

/// Upsert the caller's profile.
pub async fn save(
    State(state): State<AppState>,
    Json(request): Json<SaveProfileRequest>,
) -> Result<Json<SaveProfileResponse>> {
    let profile = UserProfile {
        name: request.name,
        school: request.school,
        updated_at: Utc::now().to_rfc3339(),
    };

    state
        .store
        .upsert_profile(&request.user_id, profile.clone())
        .await
        .inspect_err(|_| metrics::inc_store_errors())?;

    Ok(Json(SaveProfileResponse {
        message: "Profile saved",
        profile,
    }))
}

/// Fetch the caller's profile, or the stock default when none is stored.
pub async fn fetch(
    State(state): State<AppState>,
    Query(params): Query<FetchProfileParams>,
) -> Result<Json<UserProfile>> {
    let user_id = params.user_id.unwrap_or_else(default_user_id);

    let profile = state
        .store
        .get_profile(&user_id)
        .await
        .inspect_err(|_| metrics::inc_store_errors())?
        .unwrap_or_default();

    Ok(Json(profile))
}
