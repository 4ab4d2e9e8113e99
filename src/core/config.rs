//! Layered calendar configuration.
//!
//! The configuration store is an INI file with a `[DEFAULT]` section
//! overlaying the built-in display defaults and zero or more named
//! sections, each carrying a required feed `url` plus any subset of
//! display overrides. Sections are merged field-by-field over the
//! defaults at resolution time. Loaded once at startup and never
//! mutated afterwards.

use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result, anyhow};
use config::{Config, File, FileFormat};

/// Fully-resolved display settings for a calendar source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceSettings {
    pub timezone: String,
    pub days_to_future: i64,
    pub locale: String,
    pub width: u32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            days_to_future: 40,
            locale: "en_GB".to_string(),
            width: 300,
        }
    }
}

/// A named configuration section: the feed URL plus partial display
/// overrides that shadow the defaults field-by-field.
#[derive(Clone, Debug, Default)]
pub struct SourceOverrides {
    pub url: String,
    pub timezone: Option<String>,
    pub days_to_future: Option<i64>,
    pub locale: Option<String>,
    pub width: Option<u32>,
}

impl SourceOverrides {
    /// Merge these overrides over a base settings record.
    pub fn merge_over(&self, base: &SourceSettings) -> SourceSettings {
        SourceSettings {
            timezone: self.timezone.clone().unwrap_or_else(|| base.timezone.clone()),
            days_to_future: self.days_to_future.unwrap_or(base.days_to_future),
            locale: self.locale.clone().unwrap_or_else(|| base.locale.clone()),
            width: self.width.unwrap_or(base.width),
        }
    }
}

/// The process-wide calendar configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct CalendarConfig {
    pub version: String,
    pub defaults: SourceSettings,
    sources: HashMap<String, SourceOverrides>,
}

impl CalendarConfig {
    /// Load configuration from an INI file. A missing file yields the
    /// built-in defaults and no named sources.
    pub fn load(path: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, String>> = Config::builder()
            .add_source(File::new(path, FileFormat::Ini).required(false))
            .build()
            .with_context(|| format!("Failed to read config file {}", path))?
            .try_deserialize()
            .with_context(|| format!("Malformed config file {}", path))?;

        let mut defaults = SourceSettings::default();
        let mut sources = HashMap::new();

        for (name, section) in raw {
            if name.eq_ignore_ascii_case("default") {
                defaults = overlay_defaults(defaults, &section)
                    .context("Invalid DEFAULT section")?;
            } else {
                let overrides = parse_section(&section)
                    .with_context(|| format!("Invalid config section [{}]", name))?;
                sources.insert(name, overrides);
            }
        }

        Ok(Self {
            version: env::var("VERSION").unwrap_or_else(|_| "DEVEL".to_string()),
            defaults,
            sources,
        })
    }

    /// Build a configuration directly from parts. Used by tests and
    /// anything embedding the service without a config file.
    pub fn from_parts(
        defaults: SourceSettings,
        sources: HashMap<String, SourceOverrides>,
    ) -> Self {
        Self {
            version: env::var("VERSION").unwrap_or_else(|_| "DEVEL".to_string()),
            defaults,
            sources,
        }
    }

    /// Look up a named section.
    pub fn source(&self, name: &str) -> Option<&SourceOverrides> {
        self.sources.get(name)
    }
}

fn overlay_defaults(
    base: SourceSettings,
    section: &HashMap<String, String>,
) -> Result<SourceSettings> {
    let partial = parse_partial(section)?;
    Ok(SourceSettings {
        timezone: partial.timezone.unwrap_or(base.timezone),
        days_to_future: partial.days_to_future.unwrap_or(base.days_to_future),
        locale: partial.locale.unwrap_or(base.locale),
        width: partial.width.unwrap_or(base.width),
    })
}

fn parse_section(section: &HashMap<String, String>) -> Result<SourceOverrides> {
    let url = section
        .get("url")
        .cloned()
        .ok_or_else(|| anyhow!("Missing required key 'url'"))?;
    let partial = parse_partial(section)?;
    Ok(SourceOverrides { url, ..partial })
}

/// Parse the display keys shared by the DEFAULT and named sections.
fn parse_partial(section: &HashMap<String, String>) -> Result<SourceOverrides> {
    let days_to_future = section
        .get("days to future")
        .map(|v| v.parse::<i64>())
        .transpose()
        .context("'days to future' must be an integer")?;
    if let Some(days) = days_to_future
        && days < 0
    {
        return Err(anyhow!("'days to future' must be non-negative"));
    }
    let width = section
        .get("width")
        .map(|v| v.parse::<u32>())
        .transpose()
        .context("'width' must be a positive integer")?;

    Ok(SourceOverrides {
        url: String::new(),
        timezone: section.get("timezone").cloned(),
        days_to_future,
        locale: section.get("locale").cloned(),
        width,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".ini")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn test_missing_file_yields_builtin_defaults() {
        let config = CalendarConfig::load("/nonexistent/calview.ini").unwrap();
        assert_eq!(config.defaults, SourceSettings::default());
        assert!(config.source("anything").is_none());
    }

    #[test]
    fn test_default_section_overlays_builtin_defaults() {
        let file = write_config(
            "[DEFAULT]\ntimezone=Europe/Berlin\ndays to future=7\n",
        );
        let config = CalendarConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.defaults.timezone, "Europe/Berlin");
        assert_eq!(config.defaults.days_to_future, 7);
        // Untouched keys keep the built-in values
        assert_eq!(config.defaults.locale, "en_GB");
        assert_eq!(config.defaults.width, 300);
    }

    #[test]
    fn test_named_section_with_partial_overrides() {
        let file = write_config(
            "[work]\nurl=https://example.com/work.ics\nlocale=de_DE\nwidth=400\n",
        );
        let config = CalendarConfig::load(file.path().to_str().unwrap()).unwrap();
        let source = config.source("work").unwrap();
        assert_eq!(source.url, "https://example.com/work.ics");

        let settings = source.merge_over(&config.defaults);
        assert_eq!(settings.locale, "de_DE");
        assert_eq!(settings.width, 400);
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.days_to_future, 40);
    }

    #[test]
    fn test_named_section_requires_url() {
        let file = write_config("[broken]\ntimezone=UTC\n");
        let result = CalendarConfig::load(file.path().to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_days_rejected() {
        let file = write_config("[DEFAULT]\ndays to future=-1\n");
        assert!(CalendarConfig::load(file.path().to_str().unwrap()).is_err());
    }
}
