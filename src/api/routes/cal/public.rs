//! Public types for the calendar data API

use serde::Deserialize;

/// Query parameters for the raw event data endpoint
#[derive(Debug, Deserialize)]
pub struct CalQuery {
    pub timezone: Option<String>,
    pub days: Option<i64>,
}
