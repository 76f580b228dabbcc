//! Integration tests for mapping between builder nodes and backend records.

#[allow(dead_code)]
mod helpers;

use flowcore::config::MappingConfig;
use flowcore::mapper::{self, ApiNode, ScriptSchema};
use flowcore::parse::types::*;
use helpers::*;
use serde_json::json;

fn sample_schema() -> ScriptSchema {
    serde_json::from_value(json!({
        "type": "object",
        "properties": {
            "subject": { "type": "string", "title": "Subject" },
            "count":   { "type": "integer", "default": 10 },
            "ratio":   { "type": "number" },
            "weight":  { "type": "float" },
            "active":  { "type": "boolean" },
            "tags":    { "type": "array" },
            "headers": { "type": "object", "description": "Extra headers" },
            "source":  { "type": "string" }
        },
        "required": ["subject", "source"]
    }))
    .unwrap()
}

fn sample_record() -> ApiNode {
    serde_json::from_value(json!({
        "id": "send-1",
        "workflow_id": "wf-1",
        "name": "Send Report",
        "type": "action",
        "input_params": {
            "subject": { "type": "string", "value": "Daily report", "required": true },
            "ratio":   { "type": "integer", "value": 0.5 },
            "weight":  { "type": "integer", "value": 12 },
            "active":  { "type": "boolean", "value": false },
            "tags":    { "type": "string", "value": ["a", "b"] },
            "headers": { "type": "string", "value": { "x-env": "prod" } },
            "source":  { "type": "string", "value": "${fetch-1.body.rows}" }
        },
        "max_retries": 5,
        "timeout_seconds": 60
    }))
    .unwrap()
}

#[test]
fn schema_fields_become_parameters_in_order() {
    let node = mapper::to_workflow_node(&sample_record(), Some(&sample_schema()));
    assert_eq!(node.id, "send-1");
    assert_eq!(node.title, "Send Report");
    assert_eq!(node.node_type, NodeType::Action);

    let ids: Vec<_> = node.parameters.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["subject", "count", "ratio", "weight", "active", "tags", "headers", "source"]
    );

    let types: Vec<_> = node.parameters.iter().map(|p| p.param_type).collect();
    assert_eq!(
        types,
        vec![
            ParameterType::Text,
            ParameterType::Number,
            ParameterType::Number,
            ParameterType::Number,
            ParameterType::Toggle,
            ParameterType::Textarea,
            ParameterType::Textarea,
            ParameterType::Text,
        ]
    );

    let subject = node.parameter("subject").unwrap();
    assert_eq!(subject.label, "Subject");
    assert!(subject.required);
    assert_eq!(node.parameter("count").unwrap().label, "count");
    assert_eq!(
        node.parameter("headers").unwrap().description.as_deref(),
        Some("Extra headers")
    );
}

#[test]
fn value_falls_back_to_schema_default() {
    let node = mapper::to_workflow_node(&sample_record(), Some(&sample_schema()));
    assert_eq!(node.parameter("count").unwrap().value, Some(json!(10)));
}

#[test]
fn dollar_brace_prefix_marks_dynamic() {
    let node = mapper::to_workflow_node(&sample_record(), Some(&sample_schema()));
    let source = node.parameter("source").unwrap();
    assert_eq!(source.mode, ParameterMode::Dynamic);
    assert_eq!(source.dynamic_path.as_deref(), Some("${fetch-1.body.rows}"));
    assert!(source.value.is_none());

    let subject = node.parameter("subject").unwrap();
    assert_eq!(subject.mode, ParameterMode::Static);
}

#[test]
fn round_trip_preserves_effective_values() {
    let record = sample_record();
    let node = mapper::to_workflow_node(&record, Some(&sample_schema()));
    let back = mapper::to_api_node(&node, "wf-1", Some("script-9"), None);

    for (id, original) in &record.input_params {
        assert_eq!(
            back.input_params[id].value, original.value,
            "value of '{}' changed in round trip",
            id
        );
    }
    assert_eq!(back.input_params["count"].value, json!(10));
}

#[test]
fn wire_round_trip_keeps_parameter_order() {
    let node = action(
        "send",
        vec![
            required_static("zeta", "z"),
            required_static("alpha", "a"),
            required_ref("mid", "fetch.body"),
        ],
    );
    let wire = serde_json::to_string(&mapper::to_api_node(&node, "wf-1", None, None)).unwrap();
    let record: ApiNode = serde_json::from_str(&wire).unwrap();

    let ids: Vec<_> = record.input_params.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["zeta", "alpha", "mid"]);

    let back = mapper::to_workflow_node(&record, None);
    let ids: Vec<_> = back.parameters.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn api_record_defaults() {
    let node = mapper::to_workflow_node(&sample_record(), Some(&sample_schema()));
    let api = mapper::to_api_node(&node, "wf-1", Some("script-9"), Some("custom-2"));
    assert_eq!(api.workflow_id, "wf-1");
    assert_eq!(api.script_id.as_deref(), Some("script-9"));
    assert_eq!(api.custom_script_id.as_deref(), Some("custom-2"));
    assert_eq!(api.node_type, "action");
    assert_eq!(api.max_retries, 3);
    assert_eq!(api.timeout_seconds, 300);
    assert!(api.output_params.is_empty());
    assert!(api.input_params.values().all(|p| p.required));
    assert_eq!(api.input_params["ratio"].param_type, "integer");
    assert_eq!(api.input_params["active"].param_type, "boolean");
    assert_eq!(api.input_params["tags"].param_type, "string");
}

#[test]
fn mapping_config_overrides_defaults() {
    let node = trigger("t");
    let config = MappingConfig {
        max_retries: 0,
        timeout_seconds: 30,
    };
    let api = mapper::to_api_node_with(&node, "wf", None, None, &config);
    assert_eq!(api.max_retries, 0);
    assert_eq!(api.timeout_seconds, 30);
    assert_eq!(api.node_type, "trigger");
}

#[test]
fn no_schema_reads_record_inputs() {
    let node = mapper::to_workflow_node(&sample_record(), None);
    assert_eq!(node.parameters.len(), 7);
    let weight = node.parameter("weight").unwrap();
    assert_eq!(weight.param_type, ParameterType::Number);
    assert_eq!(weight.value, Some(json!(12)));
    assert!(node.parameter("source").unwrap().is_dynamic());
}

#[test]
fn malformed_schema_yields_no_parameters() {
    let schema: ScriptSchema = serde_json::from_value(json!({"properties": "oops"})).unwrap();
    let node = mapper::to_workflow_node(&sample_record(), Some(&schema));
    assert!(node.parameters.is_empty());
}

#[test]
fn structural_fields_follow_node_type() {
    let record: ApiNode = serde_json::from_value(json!({
        "id": "if-1",
        "type": "conditional",
        "branches": { "true": ["a"], "false": [] },
        "loop_body": ["b"]
    }))
    .unwrap();
    let node = mapper::to_workflow_node(&record, None);
    assert_eq!(node.node_type, NodeType::Conditional);
    assert_eq!(node.branches.as_ref().unwrap().on_true, vec!["a".to_string()]);
    assert!(node.loop_body.is_none());
}

#[test]
fn edges_carry_branch_labels() {
    let workflow = load_example();
    let edges = mapper::to_api_edges(&workflow.nodes);
    assert_eq!(edges.len(), 9);

    let labelled: Vec<_> = edges
        .iter()
        .filter(|e| e.source == "check-1")
        .map(|e| (e.target.as_str(), e.label.as_deref()))
        .collect();
    assert_eq!(labelled, vec![("email-1", Some("true")), ("log-1", Some("false"))]);

    let first = &edges[0];
    assert_eq!((first.source.as_str(), first.target.as_str()), ("trigger-1", "fetch-1"));
    assert!(first.label.is_none());
}
