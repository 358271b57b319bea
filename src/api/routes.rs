//! HTTP API route definitions.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers::{board, calendar, chat, health, journal, profile, resources, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Diagnostics
        .route("/api/health", get(health::health))
        .route("/api/firebase-test", get(health::store_probe))
        // Chat
        .route("/api/chat", post(chat::send_message))
        .route("/api/chat/history", get(chat::history))
        // Journal
        .route("/api/journal", post(journal::create).get(journal::list))
        .route("/api/journal/:entry_id", delete(journal::remove))
        // Resources and calendar
        .route("/api/resources", get(resources::directory))
        .route("/api/calendar/events", get(calendar::events))
        // Gamification
        .route("/api/xp", get(board::add_xp_query).post(board::add_xp_json))
        .route("/api/uniboard", get(board::uniboard))
        // Profile
        .route("/api/profile", post(profile::save).get(profile::fetch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer scoped to the configured frontend origin.
///
/// An unparseable origin falls back to a mirror policy so local development
/// keeps working.
pub fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let allow_origin = match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            warn!(error = %e, frontend_origin, "invalid FRONTEND_ORIGIN, mirroring request origin");
            AllowOrigin::mirror_request()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}
