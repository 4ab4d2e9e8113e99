//! Request parameter resolution.
//!
//! Merges per-request overrides with the resolved source's settings.
//! Precedence for timezone/days/locale/width is request override, then
//! source setting (which already sits on top of the global defaults).
//! The locale additionally honors an `accept-languages` header hint
//! between the two. Color scheme precedence is `color_scheme`, then
//! the deprecated `colour` flag, then no styling.

use chrono::{DateTime, Duration, Utc};
use chrono::format::Locale;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::config::SourceSettings;
use super::error::CalError;
use super::localize::parse_locale;

/// The deprecated forced-colour flag, also the visual scheme a
/// `color_scheme` preference maps onto.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    White,
    Black,
}

impl Colour {
    pub fn as_str(self) -> &'static str {
        match self {
            Colour::White => "white",
            Colour::Black => "black",
        }
    }
}

/// The client's raw color-scheme preference.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum ColorSchemePref {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "dark")]
    Dark,
    #[serde(rename = "light dark")]
    LightDark,
    #[serde(rename = "dark light")]
    DarkLight,
}

impl ColorSchemePref {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorSchemePref::Normal => "normal",
            ColorSchemePref::Light => "light",
            ColorSchemePref::Dark => "dark",
            ColorSchemePref::LightDark => "light dark",
            ColorSchemePref::DarkLight => "dark light",
        }
    }
}

/// The resolved styling directive: an optionally forced visual scheme
/// plus the raw preference passed through for client-side media-query
/// styling. Together they realize the five observable states (none,
/// light, dark, light-dark-auto, dark-light-auto).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveColorScheme {
    pub forced: Option<Colour>,
    pub preference: Option<ColorSchemePref>,
}

impl EffectiveColorScheme {
    /// `color_scheme` wins over the deprecated `colour` flag; the
    /// auto preferences force nothing and pass through verbatim.
    pub fn resolve(
        color_scheme: Option<ColorSchemePref>,
        colour: Option<Colour>,
    ) -> Self {
        match color_scheme {
            Some(ColorSchemePref::Light) => Self {
                forced: Some(Colour::White),
                preference: color_scheme,
            },
            Some(ColorSchemePref::Dark) => Self {
                forced: Some(Colour::Black),
                preference: color_scheme,
            },
            Some(_) => Self {
                forced: None,
                preference: color_scheme,
            },
            None => Self {
                forced: colour,
                preference: None,
            },
        }
    }
}

/// Optional per-request overrides, one per incoming request.
#[derive(Clone, Debug, Default)]
pub struct RequestOverrides {
    pub timezone: Option<String>,
    pub days: Option<i64>,
    pub locale: Option<String>,
    pub width: Option<u32>,
    pub colour: Option<Colour>,
    pub color_scheme: Option<ColorSchemePref>,
}

/// The final resolved display and filter settings for one request.
#[derive(Clone, Debug)]
pub struct EffectiveParams {
    pub timezone: Tz,
    pub now: DateTime<Tz>,
    pub window_end: DateTime<Tz>,
    pub locale_tag: String,
    pub locale: Locale,
    pub width: u32,
    pub scheme: EffectiveColorScheme,
}

/// Resolve the display timezone. Unknown identifiers fail fast as an
/// invalid parameter rather than propagating an unclassified failure.
pub fn resolve_timezone(
    override_tz: Option<&str>,
    settings: &SourceSettings,
) -> Result<Tz, CalError> {
    let name = override_tz.unwrap_or(&settings.timezone);
    name.parse::<Tz>()
        .map_err(|_| CalError::InvalidParameter(format!("unknown timezone '{}'", name)))
}

/// The end of the future window: now in the display zone plus the
/// requested days ahead. An explicit `days=0` is honored as an empty
/// window rather than falling back to the configured value. Values too
/// large to represent as a timestamp fail as an invalid parameter.
pub fn window_end(
    now: DateTime<Tz>,
    days: Option<i64>,
    settings: &SourceSettings,
) -> Result<DateTime<Tz>, CalError> {
    let days = days.unwrap_or(settings.days_to_future);
    Duration::try_days(days)
        .and_then(|ahead| now.checked_add_signed(ahead))
        .ok_or_else(|| CalError::InvalidParameter(format!("days value '{}' is out of range", days)))
}

/// First entry of an `accept-languages`-style header, hyphens
/// normalized to underscores. Empty entries count as absent.
pub fn locale_hint(header: &str) -> Option<String> {
    let first = header.split(',').next()?.replace('-', "_");
    let first = first.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

impl EffectiveParams {
    pub fn resolve(
        overrides: &RequestOverrides,
        settings: &SourceSettings,
        header_hint: Option<&str>,
    ) -> Result<Self, CalError> {
        let timezone = resolve_timezone(overrides.timezone.as_deref(), settings)?;
        let now = Utc::now().with_timezone(&timezone);
        let window_end = window_end(now, overrides.days, settings)?;

        let locale_tag = overrides
            .locale
            .clone()
            .or_else(|| header_hint.and_then(locale_hint))
            .unwrap_or_else(|| settings.locale.clone());
        let locale = parse_locale(&locale_tag)?;

        Ok(Self {
            timezone,
            now,
            window_end,
            locale_tag,
            locale,
            width: overrides.width.unwrap_or(settings.width),
            scheme: EffectiveColorScheme::resolve(overrides.color_scheme, overrides.colour),
        })
    }
}
