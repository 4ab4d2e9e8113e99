//! API routes module

pub mod cal;
pub mod iframe;

use std::sync::{Arc, RwLock};

use axum::{Router, response::Json};
use http::StatusCode;
use serde_json::{Value, json};

use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Fixed diagnostic response for the service root
async fn root() -> (StatusCode, Json<Value>) {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "status": "I am a teapot at default" })),
    )
}

/// Create the combined router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::get(root))
        // Raw event data routes
        .nest("/cal", cal::router())
        // Embeddable HTML widget routes
        .nest("/iframe", iframe::router())
}
