//! Parameter value resolution: static literal, dynamic reference, or empty.

use serde_json::Value;

use crate::parse::types::{Parameter, ParameterMode};

/// Marker that opens a dynamic reference in backend input values.
pub const DYNAMIC_MARKER: &str = "${";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSource<'a> {
    Static(String),
    Dynamic { path: &'a str, node_id: &'a str },
    Empty,
}

/// Classify a parameter by where its value comes from.
pub fn resolve_parameter(param: &Parameter) -> ParameterSource<'_> {
    match param.mode {
        ParameterMode::Dynamic => match param.dynamic_path.as_deref() {
            Some(path) if !path.trim().is_empty() => ParameterSource::Dynamic {
                path,
                node_id: referenced_node_id(path).unwrap_or_default(),
            },
            _ => ParameterSource::Empty,
        },
        ParameterMode::Static => {
            let text = param.value.as_ref().map(coerce_to_text).unwrap_or_default();
            if text.trim().is_empty() {
                ParameterSource::Empty
            } else {
                ParameterSource::Static(text)
            }
        }
    }
}

pub fn is_configured(param: &Parameter) -> bool {
    !matches!(resolve_parameter(param), ParameterSource::Empty)
}

/// True when the parameter's static value coerces to non-blank text,
/// regardless of its mode.
pub fn has_value(param: &Parameter) -> bool {
    param
        .value
        .as_ref()
        .is_some_and(|v| !coerce_to_text(v).trim().is_empty())
}

pub fn has_dynamic_path(param: &Parameter) -> bool {
    param
        .dynamic_path
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty())
}

/// Render a JSON value the way the builder displays it in a text field.
pub fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_to_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Node id a dynamic path points at: the text before the first `.`, after
/// unwrapping an optional `${ ... }` wrapper.
pub fn referenced_node_id(path: &str) -> Option<&str> {
    let trimmed = path.trim();
    let inner = match trimmed.strip_prefix(DYNAMIC_MARKER) {
        Some(rest) => rest.strip_suffix('}').unwrap_or(rest).trim(),
        None => trimmed,
    };
    let node_id = match inner.find('.') {
        Some(pos) => &inner[..pos],
        None => inner,
    };
    if node_id.is_empty() { None } else { Some(node_id) }
}

/// Wire rule for dynamic values: a string starting with `${`.
pub fn is_dynamic_marker(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.starts_with(DYNAMIC_MARKER))
}
