// src/core/renderer.rs
//! Jinja2-style rendering of extracted resume data into HTML

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{FormatterError, FormatterResult};

/// Returned instead of rendering when no template content is available
pub const NO_TEMPLATE_PLACEHOLDER: &str = "<p>No template selected</p>";

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// HTML-escape substituted values. Off by default so API-supplied markup
    /// passes through as-is.
    pub autoescape: bool,
}

pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(options: RenderOptions) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        if options.autoescape {
            env.set_auto_escape_callback(|_| AutoEscape::Html);
        } else {
            env.set_auto_escape_callback(|_| AutoEscape::None);
        }
        Self { env }
    }

    /// Render `template` with the top-level keys of `context` bound as variables
    pub fn render(&self, template: &str, context: &Map<String, Value>) -> FormatterResult<String> {
        if template.is_empty() {
            return Ok(NO_TEMPLATE_PLACEHOLDER.to_string());
        }

        debug!(
            "Rendering template ({} bytes) with {} context keys",
            template.len(),
            context.len()
        );

        self.env
            .render_str(template, context)
            .map_err(|e| FormatterError::TemplateSyntax(e.to_string()))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("context must be an object"),
        }
    }

    #[test]
    fn test_empty_template_returns_placeholder() {
        let renderer = TemplateRenderer::default();
        assert_eq!(
            renderer.render("", &ctx(json!({"name": "x"}))).unwrap(),
            NO_TEMPLATE_PLACEHOLDER
        );
        assert_eq!(renderer.render("", &Map::new()).unwrap(), NO_TEMPLATE_PLACEHOLDER);
    }

    #[test]
    fn test_simple_substitution() {
        let renderer = TemplateRenderer::default();
        let out = renderer
            .render("Hello {{name}}", &ctx(json!({"name": "World"})))
            .unwrap();
        assert_eq!(out, "Hello World");
    }

    #[test]
    fn test_undefined_variables_render_empty() {
        let renderer = TemplateRenderer::default();
        let out = renderer
            .render("[{{ missing }}]{% for x in missing %}{{ x }}{% endfor %}", &Map::new())
            .unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_loops_and_conditionals_over_nested_data() {
        let renderer = TemplateRenderer::default();
        let template = "{% if skills %}<ul>{% for s in skills %}<li>{{ s.name }}</li>{% endfor %}</ul>{% endif %}\
                        {% for job in jobs %}x{% else %}none{% endfor %}";
        let data = ctx(json!({
            "skills": [{"name": "Rust"}, {"name": "SQL"}],
        }));
        let out = renderer.render(template, &data).unwrap();
        assert_eq!(out, "<ul><li>Rust</li><li>SQL</li></ul>none");
    }

    #[test]
    fn test_malformed_template_is_syntax_error() {
        let renderer = TemplateRenderer::default();
        let err = renderer.render("{% for x in %}", &Map::new()).unwrap_err();
        assert!(matches!(err, FormatterError::TemplateSyntax(_)));
    }

    #[test]
    fn test_markup_passes_through_unless_autoescaped() {
        let data = ctx(json!({"summary": "<b>lead</b>"}));

        let raw = TemplateRenderer::default().render("{{ summary }}", &data).unwrap();
        assert_eq!(raw, "<b>lead</b>");

        let escaped = TemplateRenderer::new(RenderOptions { autoescape: true })
            .render("{{ summary }}", &data)
            .unwrap();
        assert!(escaped.starts_with("&lt;b&gt;lead"));
        assert!(!escaped.contains('<'));
    }
}
