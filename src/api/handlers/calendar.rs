//! Calendar mock handler. Not a real calendar integration.

use axum::Json;
use serde::Serialize;

/// One mock event.
#[derive(Debug, Clone, Serialize)]
pub struct MockEvent {
    /// Event title.
    pub title: &'static str,
    /// Display date.
    pub date: &'static str,
    /// Display time.
    pub time: &'static str,
}

/// GET /api/calendar/events response.
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    /// The static example events.
    pub events: Vec<MockEvent>,
}

/// Static example events for the dashboard.
pub async fn events() -> Json<EventsResponse> {
    Json(EventsResponse {
        events: vec![
            MockEvent {
                title: "History Exam",
                date: "April 25",
                time: "10:00 AM",
            },
            MockEvent {
                title: "Presentation Discussion",
                date: "April 20",
                time: "1:00 PM",
            },
            MockEvent {
                title: "Physics Exam",
                date: "April 21",
                time: "10:00 AM",
            },
        ],
    })
}
