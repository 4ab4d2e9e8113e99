//! Router for the iframe widget API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Query;
use http::{HeaderMap, StatusCode};
use serde_json::{Value, json};

use super::public::{IframeQuery, LocalizedEvent};
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::{CalError, CalendarConfig, EffectiveParams, RequestOverrides, localize};
use crate::feed;
use crate::render::Template;

type SharedState = Arc<RwLock<AppState>>;

/// Fetch, sort and localize the events, producing the template context.
async fn build_context(
    config: &CalendarConfig,
    name: &str,
    overrides: &RequestOverrides,
    header_hint: Option<&str>,
) -> Result<Value, CalError> {
    let source = config.resolve(name)?;
    let params = EffectiveParams::resolve(overrides, source.settings(), header_hint)?;

    let mut events = feed::fetch_events(
        source.url(),
        params.timezone,
        params.now,
        params.window_end,
    )
    .await
    .map_err(|e| CalError::Feed(format!("{:#}", e)))?;

    // Chronological, stable for equal starts
    events.sort_by_key(|event| event.start);
    let localized: Vec<LocalizedEvent> = events
        .iter()
        .map(|event| LocalizedEvent {
            summary: event.summary.clone(),
            interval: localize::localize(event, params.locale, params.timezone),
        })
        .collect();

    Ok(json!({
        "events": localized,
        "lang": params.locale_tag,
        "width": params.width,
        "force_scheme": params.scheme.forced.map(|c| c.as_str()),
        "color_scheme": params.scheme.preference.map(|p| p.as_str()),
    }))
}

/// Render the localized events widget, or an error view carrying the
/// failure's message and status instead of propagating it
async fn iframe(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(query): Query<IframeQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let config = {
        let shared_state = state.read().expect("Unable to read shared state");
        shared_state.config.clone()
    };
    let header_hint = headers
        .get("accept-languages")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let overrides: RequestOverrides = query.into();

    let (status, template, context) =
        match build_context(&config, &name, &overrides, header_hint.as_deref()).await {
            Ok(context) => (StatusCode::OK, Template::Iframe, context),
            Err(err) => {
                let err = ApiError::from(err);
                tracing::warn!("Rendering error view: {} {}", err.status(), err.detail());
                let context = json!({
                    "detail": err.detail(),
                    "status_code": err.status().as_u16(),
                });
                (err.status(), Template::Error, context)
            }
        };

    let html = {
        let shared_state = state.read().expect("Unable to read shared state");
        shared_state
            .templates
            .render(&template.to_string(), &context)
            .map_err(|e| ApiError::internal(e.into()))?
    };

    Ok((status, Html(html)).into_response())
}

/// Create the iframe widget router
pub fn router() -> Router<SharedState> {
    Router::new().route("/{*name}", axum::routing::get(iframe))
}
