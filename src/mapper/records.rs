//! Backend wire records (snake_case) and script schema descriptions.
//!
//! Everything defaults when absent: records come from the API client layer
//! and are taken as-is.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parse::types::Branches;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiNode {
    pub id: String,
    pub workflow_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_script_id: Option<String>,
    /// Keyed by parameter id, in the node's parameter order.
    pub input_params: IndexMap<String, ApiParam>,
    pub output_params: IndexMap<String, ApiParam>,
    pub max_retries: u32,
    pub timeout_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Branches>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_body: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiParam {
    #[serde(rename = "type")]
    pub param_type: String,
    pub value: Value,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Control link between two backend nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// =============================================================================
// SCRIPT SCHEMA
// =============================================================================

/// Input fields declared by a script, in document order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct ScriptSchema {
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaField {
    pub name: String,
    /// Declared type name; `None` when the descriptor has none.
    pub field_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub required: bool,
}

impl From<Value> for ScriptSchema {
    fn from(value: Value) -> Self {
        ScriptSchema::from_value(&value)
    }
}

impl ScriptSchema {
    /// Read either a JSON-schema object (`properties` + `required`) or a bare
    /// `{field: descriptor}` map. Any other shape yields no fields.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return ScriptSchema::default();
        };

        let (properties, required) = match obj.get("properties") {
            Some(Value::Object(props)) => (props, required_names(obj.get("required"))),
            Some(_) => return ScriptSchema::default(),
            None if obj.get("type").is_some_and(Value::is_string) => {
                return ScriptSchema::default();
            }
            None => (obj, Vec::new()),
        };

        let fields = properties
            .iter()
            .filter_map(|(name, descriptor)| {
                let descriptor = descriptor.as_object()?;
                Some(field_from_descriptor(name, descriptor, &required))
            })
            .collect();

        ScriptSchema { fields }
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn required_names(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn field_from_descriptor(name: &str, descriptor: &Map<String, Value>, required: &[&str]) -> SchemaField {
    let text = |key: &str| descriptor.get(key).and_then(Value::as_str).map(str::to_string);

    // `"type": ["string", "null"]` declares a nullable string.
    let field_type = match descriptor.get("type") {
        Some(Value::String(t)) => Some(t.clone()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .map(str::to_string),
        _ => None,
    };

    SchemaField {
        name: name.to_string(),
        field_type,
        title: text("title"),
        description: text("description"),
        default: descriptor.get("default").filter(|v| !v.is_null()).cloned(),
        required: required.contains(&name)
            || descriptor.get("required").and_then(Value::as_bool).unwrap_or(false),
    }
}
