//! Test utilities for integration tests
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::Router;
use axum::body::Body;
use chrono::{DateTime, Utc};

use calview::api::AppState;
use calview::api::app;
use calview::core::{CalendarConfig, SourceOverrides, SourceSettings};

/// Creates a test application router over an in-memory configuration.
pub fn test_app(sources: HashMap<String, SourceOverrides>) -> Router {
    let config = CalendarConfig::from_parts(SourceSettings::default(), sources);
    let app_state = AppState::new(config);
    app(Arc::new(RwLock::new(app_state)))
}

/// A configuration with one named alias pointing at the given URL.
pub fn single_source(name: &str, url: &str) -> HashMap<String, SourceOverrides> {
    let mut sources = HashMap::new();
    sources.insert(
        name.to_string(),
        SourceOverrides {
            url: url.to_string(),
            ..Default::default()
        },
    );
    sources
}

/// A minimal single-event feed body.
pub fn ics_feed(summary: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//calview tests//EN\r\nBEGIN:VEVENT\r\nUID:test-1\r\nSUMMARY:{}\r\nDTSTART:{}\r\nDTEND:{}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
        summary,
        start.format("%Y%m%dT%H%M%SZ"),
        end.format("%Y%m%dT%H%M%SZ"),
    )
}

/// Collect a response body into a string.
pub async fn body_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body was not UTF-8")
}
