//! Conversion between builder nodes and backend node records.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::records::{ApiEdge, ApiNode, ApiParam, SchemaField, ScriptSchema};
use crate::config::MappingConfig;
use crate::parse::graph::WorkflowGraph;
use crate::parse::types::{NodeType, Parameter, ParameterMode, ParameterType, WorkflowNode};
use crate::resolve;

/// Widget type for a declared schema type.
pub fn parameter_type_for(schema_type: Option<&str>) -> ParameterType {
    match schema_type.map(str::to_ascii_lowercase).as_deref() {
        Some("string") => ParameterType::Text,
        Some("integer" | "number" | "float") => ParameterType::Number,
        Some("boolean") => ParameterType::Toggle,
        Some("array" | "object") => ParameterType::Textarea,
        _ => ParameterType::Text,
    }
}

/// Backend type name for a widget type.
pub fn api_type_for(param_type: ParameterType) -> &'static str {
    match param_type {
        ParameterType::Text | ParameterType::Textarea => "string",
        ParameterType::Number => "integer",
        ParameterType::Toggle => "boolean",
        ParameterType::Dropdown | ParameterType::Credential => "string",
    }
}

/// Build a builder node from a backend record.
///
/// With a schema, parameters follow the schema's fields and take their value
/// from the record's inputs, falling back to the schema default. Without
/// one, parameters are read from the record's own `input_params`.
pub fn to_workflow_node(api: &ApiNode, schema: Option<&ScriptSchema>) -> WorkflowNode {
    let parameters: Vec<Parameter> = match schema {
        Some(schema) => schema
            .fields
            .iter()
            .map(|field| parameter_from_field(field, api.input_params.get(&field.name)))
            .collect(),
        None => api
            .input_params
            .iter()
            .map(|(id, param)| parameter_from_record(id, param))
            .collect(),
    };

    let node_type = NodeType::from_name(&api.node_type);
    debug!(
        node = %api.id,
        node_type = %node_type,
        parameters = parameters.len(),
        "mapped backend node"
    );

    WorkflowNode {
        id: api.id.clone(),
        node_type,
        title: api.name.clone(),
        parameters,
        branches: match node_type {
            NodeType::Conditional => api.branches.clone(),
            _ => None,
        },
        loop_body: match node_type {
            NodeType::Loop => api.loop_body.clone(),
            _ => None,
        },
    }
}

fn parameter_from_field(field: &SchemaField, input: Option<&ApiParam>) -> Parameter {
    let current = input.map(|p| &p.value).filter(|v| !v.is_null());
    let value = current.or(field.default.as_ref()).cloned();

    let mut param = Parameter {
        id: field.name.clone(),
        label: field.title.clone().unwrap_or_else(|| field.name.clone()),
        param_type: parameter_type_for(field.field_type.as_deref()),
        required: field.required,
        description: field.description.clone(),
        ..Default::default()
    };
    assign_value(&mut param, value);
    param
}

fn parameter_from_record(id: &str, record: &ApiParam) -> Parameter {
    let mut param = Parameter {
        id: id.to_string(),
        label: id.to_string(),
        param_type: parameter_type_for(Some(record.param_type.as_str())),
        required: record.required,
        description: record.description.clone(),
        ..Default::default()
    };
    assign_value(&mut param, Some(record.value.clone()).filter(|v| !v.is_null()));
    param
}

fn assign_value(param: &mut Parameter, value: Option<Value>) {
    let dynamic_path = value
        .as_ref()
        .filter(|v| resolve::is_dynamic_marker(v))
        .and_then(Value::as_str)
        .map(str::to_string);

    match dynamic_path {
        Some(path) => {
            param.mode = ParameterMode::Dynamic;
            param.dynamic_path = Some(path);
            param.value = None;
        }
        None => {
            param.mode = ParameterMode::Static;
            param.value = value;
        }
    }
}

/// Build a backend record from a builder node with default retry settings.
pub fn to_api_node(
    node: &WorkflowNode,
    workflow_id: &str,
    script_id: Option<&str>,
    custom_script_id: Option<&str>,
) -> ApiNode {
    to_api_node_with(
        node,
        workflow_id,
        script_id,
        custom_script_id,
        &MappingConfig::default(),
    )
}

pub fn to_api_node_with(
    node: &WorkflowNode,
    workflow_id: &str,
    script_id: Option<&str>,
    custom_script_id: Option<&str>,
    config: &MappingConfig,
) -> ApiNode {
    let input_params: IndexMap<String, ApiParam> = node
        .parameters
        .iter()
        .map(|param| (param.id.clone(), api_param_from(param)))
        .collect();

    debug!(
        node = %node.id,
        workflow = workflow_id,
        inputs = input_params.len(),
        "mapped builder node"
    );

    ApiNode {
        id: node.id.clone(),
        workflow_id: workflow_id.to_string(),
        name: node.title.clone(),
        node_type: node.node_type.as_str().to_string(),
        script_id: script_id.map(str::to_string),
        custom_script_id: custom_script_id.map(str::to_string),
        input_params,
        output_params: IndexMap::new(),
        max_retries: config.max_retries,
        timeout_seconds: config.timeout_seconds,
        branches: node.branches.clone(),
        loop_body: node.loop_body.clone(),
    }
}

fn api_param_from(param: &Parameter) -> ApiParam {
    let value = match param.mode {
        ParameterMode::Dynamic => param.dynamic_path.clone().map(Value::String),
        ParameterMode::Static => param.value.clone(),
    };
    ApiParam {
        param_type: api_type_for(param.param_type).to_string(),
        value: value.unwrap_or(Value::Null),
        // The backend record does not carry the builder's required flag.
        required: true,
        description: param.description.clone(),
    }
}

/// Control links between nodes, for persisting alongside the node records.
pub fn to_api_edges(nodes: &[WorkflowNode]) -> Vec<ApiEdge> {
    let graph = WorkflowGraph::build(nodes);
    graph
        .graph
        .node_indices()
        .flat_map(|idx| {
            let source = graph.graph[idx].as_str();
            graph
                .successors(source)
                .into_iter()
                .map(move |(target, kind)| ApiEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    label: kind.label().map(str::to_string),
                })
        })
        .collect()
}
