//! Router for the calendar data API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
};
use axum_extra::extract::Query;
use chrono::Utc;

use super::public;
use crate::api::state::AppState;
use crate::core::{CalError, CalendarConfig, params};
use crate::feed::{self, CalendarEvent};

type SharedState = Arc<RwLock<AppState>>;

/// Resolve a calendar reference and fetch its events in the future
/// window.
async fn load_events(
    config: &CalendarConfig,
    name: &str,
    timezone: Option<&str>,
    days: Option<i64>,
) -> Result<Vec<CalendarEvent>, CalError> {
    let source = config.resolve(name)?;
    let tz = params::resolve_timezone(timezone, source.settings())?;
    let now = Utc::now().with_timezone(&tz);
    let window_end = params::window_end(now, days, source.settings())?;

    feed::fetch_events(source.url(), tz, now, window_end)
        .await
        .map_err(|e| CalError::Feed(format!("{:#}", e)))
}

/// Return the raw filtered event collection as JSON
async fn cal_data(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<public::CalQuery>,
) -> Result<Json<Vec<CalendarEvent>>, crate::api::public::ApiError> {
    let config = {
        let shared_state = state.read().expect("Unable to read shared state");
        shared_state.config.clone()
    };

    let events = load_events(&config, &name, params.timezone.as_deref(), params.days).await?;

    Ok(Json(events))
}

/// Create the calendar data router
pub fn router() -> Router<SharedState> {
    // Wildcard so direct feed URLs with slashes resolve as one name
    Router::new().route("/{*name}", axum::routing::get(cal_data))
}
