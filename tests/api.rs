//! Integration tests driving the full router against the in-memory store.
//!
//! Providers are left unconfigured, so every third-party dependency serves
//! its documented fallback and no network access is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use unimind_server::api::{create_router, AppState};
use unimind_server::config::Config;
use unimind_server::store::{JournalEntry, MemoryStore, Store};

fn test_config() -> Config {
    envy::from_iter::<_, Config>(std::iter::empty::<(String, String)>())
        .expect("empty env yields default config")
}

/// Router plus a handle on the backing store for seeding and inspection.
fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_store(&test_config(), store.clone());
    (create_router(state), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request builds"))
        .await
        .expect("request succeeds");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };

    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

#[tokio::test]
async fn health_reports_healthy() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn chat_requires_message_and_persists_nothing() {
    let (app, store) = test_app();

    let (status, body) = post_json(&app, "/api/chat", json!({ "user_id": "u1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("message"));

    let (status, _) = post_json(&app, "/api/chat", json!({ "message": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(store.list_chats("u1").await.unwrap().is_empty());
    assert!(store.list_chats("demo_user").await.unwrap().is_empty());
}

#[tokio::test]
async fn chat_degrades_to_canned_reply_with_neutral_emotion() {
    let (app, _) = test_app();
    let before = Utc::now();

    let (status, body) = post_json(
        &app,
        "/api/chat",
        json!({
            "message": "I feel overwhelmed by finals",
            "user_id": "u1",
            "calendar_events": [
                { "title": "History Exam", "date": "April 25" }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "I'm here for you.");
    assert_eq!(body["emotion"]["emotion"], "neutral");
    assert_eq!(body["emotion"]["intensity"], 0.5);
    assert_eq!(body["emotion"]["confidence"], 0.7);

    let timestamp = DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap())
        .expect("timestamp is RFC-3339")
        .with_timezone(&Utc);
    assert!(timestamp >= before);
    assert!(timestamp <= Utc::now());
}

#[tokio::test]
async fn chat_persists_history_and_awards_xp() {
    let (app, _) = test_app();

    for message in ["first message", "second message"] {
        let (status, _) =
            post_json(&app, "/api/chat", json!({ "message": message, "user_id": "u2" })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&app, "/api/chat/history?user_id=u2").await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["user_message"], "first message");
    assert_eq!(messages[1]["user_message"], "second message");

    // 15 XP and one board move per exchange.
    let (_, board) = get(&app, "/api/uniboard?user_id=u2").await;
    assert_eq!(board["xp"]["total"], 30);
    assert_eq!(board["board_pos"], 2);
    assert_eq!(board["badges"], 0);
}

#[tokio::test]
async fn chat_history_requires_user_id() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/chat/history").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("user_id"));
}

#[tokio::test]
async fn journal_creation_requires_user_id() {
    let (app, _) = test_app();

    let (status, body) = post_json(&app, "/api/journal", json!({ "mood": "happy" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("user_id"));
}

#[tokio::test]
async fn journal_creation_defaults_date_to_today() {
    let (app, _) = test_app();

    let today_before = Utc::now().format("%Y-%m-%d").to_string();
    let (status, body) = post_json(
        &app,
        "/api/journal",
        json!({ "user_id": "u1", "mood": "happy" }),
    )
    .await;
    let today_after = Utc::now().format("%Y-%m-%d").to_string();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["mood"], "happy");
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["id"], body["entry"]["id"]);

    let date = body["entry"]["date"].as_str().unwrap();
    assert!(date == today_before || date == today_after);
}

#[tokio::test]
async fn journal_listing_is_newest_first_with_count() {
    let (app, _) = test_app();

    for mood in ["calm", "happy"] {
        post_json(&app, "/api/journal", json!({ "user_id": "u1", "mood": mood })).await;
    }

    let (status, body) = get(&app, "/api/journal?user_id=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let first = entries[0]["timestamp"].as_str().unwrap();
    let second = entries[1]["timestamp"].as_str().unwrap();
    assert!(first >= second);
}

#[tokio::test]
async fn journal_listing_filters_by_window() {
    let (app, store) = test_app();

    let old = JournalEntry {
        id: String::new(),
        mood: Some("tired".to_string()),
        mood_text: String::new(),
        date: "2026-05-01".to_string(),
        timestamp: (Utc::now() - Duration::days(90)).to_rfc3339(),
    };
    let recent = JournalEntry {
        id: String::new(),
        mood: Some("happy".to_string()),
        mood_text: String::new(),
        date: "2026-08-05".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    store.add_journal("u3", old).await.unwrap();
    store.add_journal("u3", recent).await.unwrap();

    // Default window hides the 90-day-old entry.
    let (_, body) = get(&app, "/api/journal?user_id=u3").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["entries"][0]["mood"], "happy");

    // A wider window shows both.
    let (_, body) = get(&app, "/api/journal?user_id=u3&days=365").await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn journal_deletion_removes_exactly_one_entry() {
    let (app, _) = test_app();

    let (_, created) = post_json(
        &app,
        "/api/journal",
        json!({ "user_id": "u1", "mood": "happy" }),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/journal/{id}?user_id=u1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted_id"], id.as_str());

    let (_, body) = get(&app, "/api/journal?user_id=u1").await;
    assert_eq!(body["count"], 0);

    // Deleting again is a 404.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/journal/{id}?user_id=u1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_unknown_entry_leaves_stored_set_unchanged() {
    let (app, _) = test_app();

    post_json(&app, "/api/journal", json!({ "user_id": "u1", "mood": "calm" })).await;

    let (status, _) = send(&app, Method::DELETE, "/api/journal/nope?user_id=u1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&app, "/api/journal?user_id=u1").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn resources_without_school_serve_global_list_and_placeholder() {
    let (app, _) = test_app();

    for uri in ["/api/resources", "/api/resources?school="] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);

        let global = body["global"].as_array().unwrap();
        assert_eq!(global.len(), 4);
        assert_eq!(global[0]["name"], "988 Suicide & Crisis Lifeline");

        let local = body["school_specific"].as_array().unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0]["name"], "Select your school");
    }
}

#[tokio::test]
async fn resources_note_unconfigured_places_provider() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/resources?school=Stanford").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["global"].as_array().unwrap().len(), 4);
    assert!(body["school_specific"].as_array().unwrap().is_empty());
    assert!(body["note"].as_str().unwrap().contains("GOOGLE_PLACES_API_KEY"));
}

#[tokio::test]
async fn calendar_returns_three_static_events() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/calendar/events").await;
    assert_eq!(status, StatusCode::OK);

    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["title"], "History Exam");
}

#[tokio::test]
async fn xp_awards_accumulate_and_never_decrease() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/xp?user_id=u4&amount=25").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["xp"], 25);

    let (_, body) = post_json(&app, "/api/xp", json!({ "user_id": "u4", "amount": 5 })).await;
    assert_eq!(body["xp"], 30);

    // Negative awards apply as zero.
    let (status, body) =
        post_json(&app, "/api/xp", json!({ "user_id": "u4", "amount": -50 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["xp"], 30);

    // Amount defaults to 10.
    let (_, body) = get(&app, "/api/xp?user_id=u4").await;
    assert_eq!(body["xp"], 40);

    // Plain awards never move the board.
    let (_, board) = get(&app, "/api/uniboard?user_id=u4").await;
    assert_eq!(board["board_pos"], 0);
}

#[tokio::test]
async fn uniboard_is_zeroed_for_fresh_users() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/uniboard?user_id=new_user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["xp"]["total"], 0);
    assert_eq!(body["xp"]["goal"], 600);
    assert_eq!(body["board_pos"], 0);
    assert_eq!(body["badges"], 0);
    assert_eq!(body["progress"]["academics"], 0);
    assert_eq!(body["progress"]["mental_health"], 0);
    assert!(body["move_message"].as_str().unwrap().contains("tile 0"));
}

#[tokio::test]
async fn profile_defaults_to_emily() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/profile?user_id=nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Emily");
    assert_eq!(body["school"], "");
}

#[tokio::test]
async fn profile_round_trips() {
    let (app, _) = test_app();

    let (status, body) = post_json(
        &app,
        "/api/profile",
        json!({ "user_id": "u5", "name": "Ada", "school": "Imperial" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["name"], "Ada");

    let (_, body) = get(&app, "/api/profile?user_id=u5").await;
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["school"], "Imperial");
    assert!(!body["updated_at"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn store_probe_reports_memory_backend() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/firebase-test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["backend"], "memory");
}
