//! Calendar source resolution.
//!
//! A request names its calendar either by a configured alias or by a
//! direct `.ics` reference. Exactly one variant applies; anything else
//! is an invalid reference.

use std::sync::LazyLock;

use regex::Regex;

use super::config::{CalendarConfig, SourceSettings};
use super::error::CalError;

/// Direct feed references: optional http(s) scheme, a domain-like
/// host, an optional 1-5 digit port, an optional path, and a mandatory
/// literal `.ics` suffix. A bare `calendar.ics` is a valid relative
/// reference; the suffix check is case-sensitive.
static ICS_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([a-zA-Z0-9.-]+)(:[0-9]{1,5})?(/.*)?\.ics$")
        .expect("Invalid ics url pattern")
});

/// Check whether the given string is a direct reference to an .ics feed.
pub fn is_ics_url(name: &str) -> bool {
    ICS_URL_PATTERN.is_match(name)
}

/// A resolved calendar source with its effective settings.
#[derive(Clone, Debug)]
pub enum CalendarSource {
    /// A configured alias with its section merged over the defaults.
    Configured { url: String, settings: SourceSettings },
    /// A direct `.ics` reference carrying the global defaults.
    DirectUrl { url: String, settings: SourceSettings },
}

impl CalendarSource {
    pub fn url(&self) -> &str {
        match self {
            CalendarSource::Configured { url, .. } => url,
            CalendarSource::DirectUrl { url, .. } => url,
        }
    }

    pub fn settings(&self) -> &SourceSettings {
        match self {
            CalendarSource::Configured { settings, .. } => settings,
            CalendarSource::DirectUrl { settings, .. } => settings,
        }
    }
}

impl CalendarConfig {
    /// Resolve a calendar name to a feed URL and its settings. Alias
    /// lookup always wins over the direct-reference check.
    pub fn resolve(&self, name: &str) -> Result<CalendarSource, CalError> {
        if let Some(overrides) = self.source(name) {
            return Ok(CalendarSource::Configured {
                url: overrides.url.clone(),
                settings: overrides.merge_over(&self.defaults),
            });
        }

        if is_ics_url(name) {
            return Ok(CalendarSource::DirectUrl {
                url: name.to_string(),
                settings: self.defaults.clone(),
            });
        }

        Err(CalError::InvalidReference)
    }
}
