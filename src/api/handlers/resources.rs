//! Crisis-resource directory with optional school-local lookups.

use axum::extract::{Query, State};
use axum::Json;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::providers::places::{LocalLookup, SupportResource};

use super::AppState;

/// National crisis and support resources, always returned.
pub static GLOBAL_RESOURCES: Lazy<Vec<SupportResource>> = Lazy::new(|| {
    vec![
        SupportResource {
            name: "988 Suicide & Crisis Lifeline".to_string(),
            description: "24/7 free & confidential".to_string(),
            url: Some("https://988lifeline.org".to_string()),
        },
        SupportResource {
            name: "Crisis Text Line".to_string(),
            description: "Text HOME to 741741 (US/CA)".to_string(),
            url: Some("https://www.crisistextline.org".to_string()),
        },
        SupportResource {
            name: "7 Cups".to_string(),
            description: "Free emotional support & affordable therapy".to_string(),
            url: Some("https://www.7cups.com".to_string()),
        },
        SupportResource {
            name: "SAMHSA National Helpline".to_string(),
            description: "Treatment referral & info".to_string(),
            url: Some("https://findtreatment.gov".to_string()),
        },
    ]
});

/// GET /api/resources query parameters.
#[derive(Debug, Deserialize)]
pub struct ResourcesParams {
    /// School name to search around. Optional.
    #[serde(default)]
    pub school: String,
}

/// GET /api/resources response.
#[derive(Debug, Serialize)]
pub struct ResourcesResponse {
    /// The fixed national list.
    pub global: Vec<SupportResource>,
    /// Venues near the school, or a placeholder entry.
    pub school_specific: Vec<SupportResource>,
    /// Set when the local lookup was skipped or degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Resource directory. Upstream failures degrade the local list; the
/// response status stays 200 either way.
pub async fn directory(
    State(state): State<AppState>,
    Query(params): Query<ResourcesParams>,
) -> Json<ResourcesResponse> {
    let school = params.school.trim();

    if school.is_empty() {
        return Json(ResourcesResponse {
            global: GLOBAL_RESOURCES.clone(),
            school_specific: vec![SupportResource::unlinked(
                "Select your school",
                "Choose your school to see nearby support options.",
            )],
            note: None,
        });
    }

    let (school_specific, note) = match state.places.find_nearby_support(school).await {
        Ok(LocalLookup::Unconfigured) => (
            Vec::new(),
            Some("Local lookup unavailable - add GOOGLE_PLACES_API_KEY to environment".to_string()),
        ),
        Ok(LocalLookup::SchoolNotFound) => (
            vec![SupportResource::unlinked(
                school,
                "Not found. Try full college name.",
            )],
            None,
        ),
        Ok(LocalLookup::Venues(venues)) if venues.is_empty() => (
            vec![SupportResource::unlinked(
                school,
                "No nearby resources found.",
            )],
            None,
        ),
        Ok(LocalLookup::Venues(venues)) => (venues, None),
        Err(e) => {
            warn!(error = %e, school, "school-local lookup failed");
            (
                vec![SupportResource::unlinked("Lookup failed", e.to_string())],
                Some("Local lookup failed; showing global resources".to_string()),
            )
        }
    };

    Json(ResourcesResponse {
        global: GLOBAL_RESOURCES.clone(),
        school_specific,
        note,
    })
}
