//! Public types for the iframe widget API

use serde::{Deserialize, Serialize};

use crate::core::params::{ColorSchemePref, Colour, RequestOverrides};

/// Query parameters for the iframe widget endpoint
#[derive(Debug, Deserialize)]
pub struct IframeQuery {
    pub timezone: Option<String>,
    pub days: Option<i64>,
    pub locale: Option<String>,
    pub width: Option<u32>,
    /// Deprecated, use `color_scheme` instead
    pub colour: Option<Colour>,
    pub color_scheme: Option<ColorSchemePref>,
}

impl From<IframeQuery> for RequestOverrides {
    fn from(query: IframeQuery) -> Self {
        Self {
            timezone: query.timezone,
            days: query.days,
            locale: query.locale,
            width: query.width,
            colour: query.colour,
            color_scheme: query.color_scheme,
        }
    }
}

/// An event reduced to its display form
#[derive(Debug, Serialize)]
pub struct LocalizedEvent {
    pub summary: String,
    pub interval: String,
}
