//! HTML templates for page rendering.
//!
//! A template is compiled once into literal text and `{{ name }}` slots
//! (`{{ name? }}` for slots that may be left empty). Syntax errors surface
//! when a template is parsed, not when a page is served. Slot values are
//! inserted verbatim; escape untrusted text with [`escape_html`] first.

use std::collections::HashMap;

use thiserror::Error;

/// Template errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A required slot had no value.
    #[error("template `{template}` needs a value for `{variable}`")]
    MissingVariable { template: String, variable: String },

    /// No template registered under this name.
    #[error("template not found: {0}")]
    NotFound(String),

    /// `{{` without a matching `}}`.
    #[error("template `{template}` has an unclosed slot at byte {offset}")]
    UnclosedSlot { template: String, offset: usize },

    /// `{{ }}` or `{{ ? }}`.
    #[error("template `{template}` has an unnamed slot at byte {offset}")]
    UnnamedSlot { template: String, offset: usize },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Slot values for one render.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    values: HashMap<String, String>,
}

impl TemplateVars {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a slot value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`TemplateVars::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot { name: String, optional: bool },
}

/// A parsed, named template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source` into a template called `name`.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let slot_start = offset + open;
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or_else(|| TemplateError::UnclosedSlot {
                template: name.clone(),
                offset: slot_start,
            })?;

            let inner = after_open[..close].trim();
            let (slot, optional) = match inner.strip_suffix('?') {
                Some(slot) => (slot.trim_end(), true),
                None => (inner, false),
            };
            if slot.is_empty() {
                return Err(TemplateError::UnnamedSlot {
                    template: name,
                    offset: slot_start,
                });
            }
            segments.push(Segment::Slot {
                name: slot.to_string(),
                optional,
            });

            let consumed = open + 2 + close + 2;
            rest = &rest[consumed..];
            offset += consumed;
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { name, segments })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the slots in order of appearance.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Slot { name, .. } => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Fill the slots from `vars`.
    pub fn render(&self, vars: &TemplateVars) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot { name, optional } => match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None if *optional => {}
                    None => {
                        return Err(TemplateError::MissingVariable {
                            template: self.name.clone(),
                            variable: name.clone(),
                        });
                    }
                },
            }
        }
        Ok(out)
    }
}

/// Templates by name, preloaded with the site's built-in templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Registry holding the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        for (name, source) in BUILTIN_TEMPLATES {
            match Template::parse(*name, *source) {
                Ok(template) => registry.register(template),
                Err(err) => tracing::error!(error = %err, "skipping built-in template"),
            }
        }
        registry
    }

    /// Register a template, replacing any with the same name.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Parse `source` and register it as `name`.
    pub fn register_source(&mut self, name: &str, source: &str) -> Result<()> {
        self.register(Template::parse(name, source)?);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Render the template registered as `name`.
    pub fn render(&self, name: &str, vars: &TemplateVars) -> Result<String> {
        self.get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?
            .render(vars)
    }
}

/// Escape text for use in HTML element content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("base", DEFAULT_BASE_TEMPLATE),
    ("home", DEFAULT_HOME_TEMPLATE),
    ("draft_banner", DEFAULT_DRAFT_BANNER_TEMPLATE),
    ("error", DEFAULT_ERROR_TEMPLATE),
];

/// Default document shell.
pub const DEFAULT_BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <style>
        *, *::before, *::after { box-sizing: border-box; }
        body {
            margin: 0;
            font-family: system-ui, -apple-system, sans-serif;
            color: #1E293B;
            background-color: #F8FAFC;
            min-height: 100vh;
        }
        main { padding: 4rem 1.5rem; }
        .headline { font-size: 3rem; line-height: 1; text-align: center; margin: 0; }
        .draft-banner {
            padding: 0.5rem 1rem;
            background-color: #F97316;
            color: #FFFFFF;
            text-align: center;
            font-size: 0.875rem;
        }
        .draft-banner a { color: inherit; font-weight: 600; }
        .error { text-align: center; }
    </style>
</head>
<body>
{{ draft_banner? }}
{{ content }}
</body>
</html>
"#;

/// Home page body.
pub const DEFAULT_HOME_TEMPLATE: &str = r#"<main class="home">
    <h1 class="headline">{{ headline }}</h1>
</main>"#;

/// Banner shown while draft mode is on.
pub const DEFAULT_DRAFT_BANNER_TEMPLATE: &str = r#"<aside class="draft-banner">
    Viewing unpublished drafts. <a href="/api/disable-draft">Exit draft mode</a>
</aside>"#;

/// Error page body.
pub const DEFAULT_ERROR_TEMPLATE: &str = r#"<main class="error">
    <h1>{{ status }}</h1>
    <p>{{ message }}</p>
</main>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_slots() {
        let template = Template::parse("t", "<h1>{{ title }}</h1>{{ extra? }}").expect("parse");
        let vars = TemplateVars::new().with("title", "Welcome");

        assert_eq!(template.render(&vars).expect("render"), "<h1>Welcome</h1>");
        assert_eq!(template.slots().collect::<Vec<_>>(), ["title", "extra"]);
    }

    #[test]
    fn test_missing_variable_names_template() {
        let template = Template::parse("home", "{{ title }}").expect("parse");
        let err = template.render(&TemplateVars::new()).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingVariable { ref template, ref variable }
                if template == "home" && variable == "title"
        ));
        assert_eq!(err.to_string(), "template `home` needs a value for `title`");
    }

    #[test]
    fn test_syntax_errors_fail_at_parse() {
        assert!(matches!(
            Template::parse("t", "ok {{ title"),
            Err(TemplateError::UnclosedSlot { offset: 3, .. })
        ));
        assert!(matches!(
            Template::parse("t", "{{ ? }}"),
            Err(TemplateError::UnnamedSlot { offset: 0, .. })
        ));
    }

    #[test]
    fn test_values_are_not_reinterpolated() {
        let template = Template::parse("t", "{{ a }}|{{ b }}").expect("parse");
        let vars = TemplateVars::new().with("a", "{{ b }}").with("b", "B");
        assert_eq!(template.render(&vars).expect("render"), "{{ b }}|B");
    }

    #[test]
    fn test_text_without_slots() {
        let template = Template::parse("t", "plain } text {").expect("parse");
        assert_eq!(template.render(&TemplateVars::new()).expect("render"), "plain } text {");
        assert_eq!(template.slots().count(), 0);
    }

    #[test]
    fn test_registry_builtins() {
        let registry = TemplateRegistry::new();
        for (name, _) in BUILTIN_TEMPLATES {
            assert!(registry.get(name).is_some(), "missing built-in {name}");
        }
        assert!(matches!(
            registry.render("missing", &TemplateVars::new()),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_register_source_rejects_bad_template() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.register_source("home", "{{ headline").is_err());
        assert!(registry.get("home").is_some());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Welcome"), "Welcome");
    }
}
