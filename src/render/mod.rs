//! Embedded HTML templates using Handlebars. Handlebars adds
//! additional security controls since it can't do much out of the box
//! without registering your own helpers, which suits a fragment that
//! embeds text straight out of third-party calendar feeds.

use std::fmt;

use handlebars::Handlebars;

#[derive(Debug)]
pub enum Template {
    Iframe,
    Error,
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const IFRAME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{lang}}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>
  :root {
    color-scheme: {{#if color_scheme}}{{color_scheme}}{{else}}light dark{{/if}};
  }
  body {
    margin: 0;
    width: {{width}}px;
    font-family: system-ui, sans-serif;
    font-size: 0.9rem;
{{#if (eq force_scheme "white")}}
    background: #ffffff;
    color: #000000;
{{/if}}
{{#if (eq force_scheme "black")}}
    background: #000000;
    color: #ffffff;
{{/if}}
  }
  ul.events { list-style: none; margin: 0; padding: 0; }
  ul.events li { padding: 0.3rem 0.5rem; border-bottom: 1px solid rgba(128, 128, 128, 0.4); }
  .summary { display: block; font-weight: 600; }
  .interval { display: block; opacity: 0.8; }
</style>
</head>
<body>
<ul class="events">
{{#each events}}
  <li><span class="summary">{{summary}}</span><span class="interval">{{interval}}</span></li>
{{/each}}
</ul>
</body>
</html>
"#;

const ERROR_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<style>
  body { font-family: system-ui, sans-serif; font-size: 0.9rem; }
  .error { color: #b00020; }
</style>
</head>
<body>
<p class="error">{{detail}}</p>
<p class="status">HTTP {{status_code}}</p>
</body>
</html>
"#;

/// Build the template registry. Strict mode so a context/template
/// mismatch fails loudly instead of rendering a hole.
pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(&Template::Iframe.to_string(), IFRAME_TEMPLATE)
        .expect("Failed to register template");
    registry
        .register_template_string(&Template::Error.to_string(), ERROR_TEMPLATE)
        .expect("Failed to register template");
    registry
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_iframe_template_renders_events_and_width() {
        let registry = templates();
        let html = registry
            .render(
                &Template::Iframe.to_string(),
                &json!({
                    "events": [{"summary": "Standup", "interval": "Mon 01 Jan 10:00 - 10:15"}],
                    "lang": "en_GB",
                    "width": 300,
                    "force_scheme": null,
                    "color_scheme": null,
                }),
            )
            .unwrap();
        assert!(html.contains("Standup"));
        assert!(html.contains("Mon 01 Jan 10:00 - 10:15"));
        assert!(html.contains("width: 300px"));
        assert!(html.contains("lang=\"en_GB\""));
        // No forced palette without a scheme
        assert!(!html.contains("background: #000000"));
        assert!(!html.contains("background: #ffffff"));
    }

    #[test]
    fn test_iframe_template_forces_black_palette() {
        let registry = templates();
        let html = registry
            .render(
                &Template::Iframe.to_string(),
                &json!({
                    "events": [],
                    "lang": "en_GB",
                    "width": 300,
                    "force_scheme": "black",
                    "color_scheme": "dark",
                }),
            )
            .unwrap();
        assert!(html.contains("background: #000000"));
        assert!(html.contains("color-scheme: dark"));
    }

    #[test]
    fn test_error_template_carries_detail_and_status() {
        let registry = templates();
        let html = registry
            .render(
                &Template::Error.to_string(),
                &json!({"detail": "Invalid calendar name", "status_code": 404}),
            )
            .unwrap();
        assert!(html.contains("Invalid calendar name"));
        assert!(html.contains("404"));
    }
}
