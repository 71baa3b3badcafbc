//! Prompt template rendering.
//!
//! Templates use `{{path}}` placeholders. A path may walk into nested
//! objects with dots (`{{climate_data.temperature}}`) and may carry an
//! inline default after a pipe (`{{additional_info|None provided}}`).
//! Rendering never fails: a missing value becomes the inline default or,
//! failing that, the configured fallback (`N/A` unless overridden).

use std::borrow::Cow;

use serde_json::{Map, Value};

/// Fallback text for placeholders with no value and no inline default.
pub const MISSING_VALUE: &str = "N/A";

/// Prompt template context for variable replacement.
///
/// Wraps the JSON fields of a request; lookups may traverse nested objects.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    values: Map<String, Value>,
}

impl PromptContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Create a context over an existing field map.
    pub fn from_fields(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Set a context value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a dotted path. `null` counts as absent.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// The top-level fields.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Check if a dotted path resolves to a non-null value.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }
}

/// Renders a JSON value as prompt text.
///
/// Strings are inserted raw, arrays of scalars are joined with `", "`,
/// and anything else structured becomes compact JSON. `None` means the
/// value should be treated as missing (null or an empty array).
pub fn render_value(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) if items.iter().all(is_scalar) => Some(Cow::Owned(
            items
                .iter()
                .map(|item| render_value(item).unwrap_or(Cow::Borrowed(MISSING_VALUE)))
                .collect::<Vec<_>>()
                .join(", "),
        )),
        Value::Array(_) | Value::Object(_) => Some(Cow::Owned(value.to_string())),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: Cow<'static, str>,
}

/// One parsed piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder { path: &'a str, default: Option<&'a str> },
}

impl PromptTemplate {
    /// Create a template from a static string.
    pub const fn from_static(content: &'static str) -> Self {
        Self { content: Cow::Borrowed(content) }
    }

    /// Create a template from a string.
    pub fn from_string(content: impl Into<String>) -> Self {
        Self { content: Cow::Owned(content.into()) }
    }

    /// Get the template content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Render the template with the given context.
    pub fn render(&self, context: &PromptContext) -> String {
        self.render_with_options(context, &RenderOptions::default())
    }

    /// Render the template with custom options.
    pub fn render_with_options(&self, context: &PromptContext, options: &RenderOptions) -> String {
        let mut result = String::with_capacity(self.content.len());

        for segment in Self::segments(&self.content) {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Placeholder { path, default } => {
                    match context.get(path).and_then(render_value) {
                        Some(value) => result.push_str(&value),
                        None => result.push_str(default.unwrap_or(options.missing_value.as_str())),
                    }
                }
            }
        }

        result
    }

    /// Splits the template into literal text and placeholders.
    ///
    /// An unterminated `{{` is kept as literal text; `{{}}` is dropped.
    fn segments(content: &str) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut rest = content;

        while let Some(start) = rest.find("{{") {
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                break;
            };

            if start > 0 {
                segments.push(Segment::Literal(&rest[..start]));
            }

            let inner = &after_open[..end];
            let (path, default) = match inner.split_once('|') {
                Some((path, default)) => (path.trim(), Some(default.trim())),
                None => (inner.trim(), None),
            };
            if !path.is_empty() {
                segments.push(Segment::Placeholder { path, default });
            }

            rest = &after_open[end + 2..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
        segments
    }

    /// List all placeholder paths in the template, without duplicates.
    pub fn list_placeholders(&self) -> Vec<String> {
        let mut placeholders: Vec<String> = Vec::new();
        for segment in Self::segments(&self.content) {
            if let Segment::Placeholder { path, .. } = segment {
                if !placeholders.iter().any(|p| p == path) {
                    placeholders.push(path.to_string());
                }
            }
        }
        placeholders
    }
}

/// Options for template rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Text used for a missing placeholder without an inline default.
    pub missing_value: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { missing_value: MISSING_VALUE.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: Value) -> PromptContext {
        match value {
            Value::Object(map) => PromptContext::from_fields(map),
            _ => panic!("context must be an object"),
        }
    }

    #[test]
    fn test_prompt_context_dotted_lookup() {
        let ctx = context(json!({
            "location": "Londrina",
            "climate_data": {"temperature": 32, "wind": {"speed": 12}},
            "empty": null
        }));

        assert_eq!(ctx.get("location"), Some(&json!("Londrina")));
        assert_eq!(ctx.get("climate_data.temperature"), Some(&json!(32)));
        assert_eq!(ctx.get("climate_data.wind.speed"), Some(&json!(12)));
        assert!(!ctx.contains("climate_data.humidity"));
        assert!(!ctx.contains("location.city"));
        assert!(!ctx.contains("empty"));
    }

    #[test]
    fn test_template_render() {
        let template = PromptTemplate::from_static("Farm in {{location}} at {{climate_data.temperature}}°C");
        let ctx = context(json!({"location": "Londrina", "climate_data": {"temperature": 32}}));
        assert_eq!(template.render(&ctx), "Farm in Londrina at 32°C");
    }

    #[test]
    fn test_missing_values_fail_open() {
        let template = PromptTemplate::from_static("Humidity: {{climate_data.humidity}}%");
        assert_eq!(template.render(&PromptContext::new()), "Humidity: N/A%");

        let options = RenderOptions { missing_value: "unknown".to_string() };
        assert_eq!(
            template.render_with_options(&PromptContext::new(), &options),
            "Humidity: unknown%"
        );
    }

    #[test]
    fn test_inline_default() {
        let template = PromptTemplate::from_static("Context: {{additional_info|None provided}}");
        assert_eq!(template.render(&PromptContext::new()), "Context: None provided");

        let mut ctx = PromptContext::new();
        ctx.set("additional_info", "leaves curling");
        assert_eq!(template.render(&ctx), "Context: leaves curling");
    }

    #[test]
    fn test_value_rendering() {
        assert_eq!(render_value(&json!("Soja")).as_deref(), Some("Soja"));
        assert_eq!(render_value(&json!(-2.5)).as_deref(), Some("-2.5"));
        assert_eq!(render_value(&json!(true)).as_deref(), Some("true"));
        assert_eq!(render_value(&json!(["Soja", "Milho"])).as_deref(), Some("Soja, Milho"));
        assert_eq!(render_value(&json!([])), None);
        assert_eq!(render_value(&json!(null)), None);
        assert_eq!(
            render_value(&json!({"rain": [1, 2]})).as_deref(),
            Some(r#"{"rain":[1,2]}"#)
        );
        assert_eq!(
            render_value(&json!([{"year": 2023}])).as_deref(),
            Some(r#"[{"year":2023}]"#)
        );
    }

    #[test]
    fn test_list_placeholders() {
        let template =
            PromptTemplate::from_static("{{crop_type}} in {{ location }}, {{crop_type|Soja}} {{}}");
        assert_eq!(template.list_placeholders(), vec!["crop_type", "location"]);
    }

    #[test]
    fn test_segments_edge_cases() {
        // Single braces and JSON examples stay literal
        let template = PromptTemplate::from_static(r#"Answer like {"health": "..."} for {{crop}}"#);
        let mut ctx = PromptContext::new();
        ctx.set("crop", "Café");
        assert_eq!(template.render(&ctx), r#"Answer like {"health": "..."} for Café"#);

        // Unterminated placeholder is kept verbatim
        let template = PromptTemplate::from_static("Broken {{crop");
        assert_eq!(template.render(&ctx), "Broken {{crop");

        // Empty placeholder is dropped
        let template = PromptTemplate::from_static("a{{}}b");
        assert_eq!(template.render(&ctx), "ab");
    }

    #[test]
    fn test_from_string_owns_content() {
        let template = PromptTemplate::from_string(format!("{}{{{{x}}}}", "value: "));
        assert_eq!(template.content(), "value: {{x}}");
        assert_eq!(template.render(&PromptContext::new()), "value: N/A");
    }
}
