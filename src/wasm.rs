//! WASM entry points for browser use.

use wasm_bindgen::prelude::*;

use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::mapper::{self, ApiNode, ScriptSchema};
use crate::parse::types::WorkflowNode;
use crate::validate::{self, ValidationResult};

/// Validate a workflow document JSON or a bare node array.
/// Returns `{status: "success", ...ValidationResult}` or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    to_js(&validate_inner(json, None))
}

/// Same as [`validate_workflow`], with a `CoreConfig` JSON.
#[wasm_bindgen]
pub fn validate_workflow_with_config(json: &str, config_json: &str) -> JsValue {
    to_js(&validate_inner(json, Some(config_json)))
}

fn validate_inner(json: &str, config_json: Option<&str>) -> Outcome<ValidationResult> {
    let config = match config_json.map(CoreConfig::from_json).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => return Outcome::from_errors(vec![e]),
    };

    let nodes = match parse_nodes_or_workflow(json) {
        Ok(nodes) => nodes,
        Err(errors) => return Outcome::from_errors(errors),
    };

    Outcome::Success(validate::validate_with(&nodes, &config.validation))
}

/// The builder sends either a whole document or just its node list.
fn parse_nodes_or_workflow(json: &str) -> Result<Vec<WorkflowNode>, Vec<CoreError>> {
    if json.trim_start().starts_with('[') {
        crate::parse::parse_nodes(json)
    } else {
        crate::parse::parse(json).map(|w| w.nodes)
    }
}

/// Backend record JSON (+ optional script schema JSON) → builder node.
#[wasm_bindgen]
pub fn map_api_node(api_json: &str, schema_json: Option<String>) -> JsValue {
    to_js(&map_api_node_inner(api_json, schema_json.as_deref()))
}

fn map_api_node_inner(api_json: &str, schema_json: Option<&str>) -> Outcome<WorkflowNode> {
    let api = match serde_json::from_str::<ApiNode>(api_json) {
        Ok(api) => api,
        Err(e) => {
            return Outcome::from_errors(vec![CoreError::parse(
                "P001",
                format!("Failed to parse node record JSON: {}", e),
            )]);
        }
    };

    // An unreadable schema maps like an empty one.
    let schema = schema_json.map(|s| {
        serde_json::from_str::<ScriptSchema>(s).unwrap_or_default()
    });

    Outcome::Success(mapper::to_workflow_node(&api, schema.as_ref()))
}

/// Builder node JSON → backend record.
#[wasm_bindgen]
pub fn map_workflow_node(
    node_json: &str,
    workflow_id: &str,
    script_id: Option<String>,
    custom_script_id: Option<String>,
) -> JsValue {
    let result = match serde_json::from_str::<WorkflowNode>(node_json) {
        Ok(node) => Outcome::Success(mapper::to_api_node(
            &node,
            workflow_id,
            script_id.as_deref(),
            custom_script_id.as_deref(),
        )),
        Err(e) => Outcome::from_errors(vec![CoreError::parse(
            "P001",
            format!("Failed to parse node JSON: {}", e),
        )]),
    };
    to_js(&result)
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<String>,
}

impl From<CoreError> for ErrorDto {
    fn from(e: CoreError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum Outcome<T> {
    #[serde(rename = "success")]
    Success(T),
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

impl<T> Outcome<T> {
    fn from_errors(errors: Vec<CoreError>) -> Self {
        Outcome::Errors {
            errors: errors.into_iter().map(ErrorDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_node_array_is_accepted() {
        let nodes = parse_nodes_or_workflow(r#"[{"id": "t", "type": "trigger"}]"#).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn loosely_typed_document_still_validates() {
        let json = r#"[
            {"id": "t", "type": "trigger", "title": null},
            {"id": "w", "type": "webhook", "parameters": [{"id": "p", "required": null}]}
        ]"#;
        match validate_inner(json, None) {
            Outcome::Success(result) => {
                assert!(result.is_valid, "{:?}", result.errors);
                assert_eq!(result.warnings.len(), 1);
            }
            Outcome::Errors { .. } => panic!("expected a validation result"),
        }
    }

    #[test]
    fn bad_config_reports_config_error() {
        match validate_inner("[]", Some("not json")) {
            Outcome::Errors { errors } => assert_eq!(errors[0].code, "C001"),
            Outcome::Success(_) => panic!("expected config error"),
        }
    }

    #[test]
    fn unreadable_schema_maps_to_no_parameters() {
        let api = r#"{"id": "n", "type": "action", "input_params": {"x": {"type": "string", "value": "1"}}}"#;
        match map_api_node_inner(api, Some("{{{")) {
            Outcome::Success(node) => assert!(node.parameters.is_empty()),
            Outcome::Errors { .. } => panic!("expected a node"),
        }
    }
}
