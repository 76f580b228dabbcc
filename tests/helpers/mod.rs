use flowcore::parse::types::*;
use flowcore::validate::{Issue, ValidationResult};

// =============================================================================
// Node builders
// =============================================================================

pub fn trigger(id: &str) -> WorkflowNode {
    WorkflowNode::new(id, NodeType::Trigger, "Trigger")
}

pub fn action(id: &str, parameters: Vec<Parameter>) -> WorkflowNode {
    let mut node = WorkflowNode::new(id, NodeType::Action, id);
    node.parameters = parameters;
    node
}

pub fn conditional(id: &str, condition: &str, on_true: &[&str], on_false: &[&str]) -> WorkflowNode {
    let mut node = WorkflowNode::new(id, NodeType::Conditional, id)
        .with_parameter(Parameter::new("condition", "Condition").with_value(condition));
    node.branches = Some(Branches {
        on_true: on_true.iter().map(|s| s.to_string()).collect(),
        on_false: on_false.iter().map(|s| s.to_string()).collect(),
    });
    node
}

pub fn loop_over(id: &str, source_path: &str, body: &[&str]) -> WorkflowNode {
    let mut node = WorkflowNode::new(id, NodeType::Loop, id).with_parameter(
        Parameter::new("iteration_array", "Items")
            .required(true)
            .with_reference(source_path),
    );
    node.loop_body = Some(body.iter().map(|s| s.to_string()).collect());
    node
}

// =============================================================================
// Parameter builders
// =============================================================================

pub fn required_static(id: &str, value: &str) -> Parameter {
    Parameter::new(id, id).required(true).with_value(value)
}

pub fn required_ref(id: &str, path: &str) -> Parameter {
    Parameter::new(id, id).required(true).with_reference(path)
}

pub fn optional_empty(id: &str) -> Parameter {
    Parameter::new(id, id)
}

// =============================================================================
// Assertions
// =============================================================================

pub fn load_example() -> Workflow {
    flowcore::parse::parse(include_str!("../fixtures/example_workflow.json"))
        .expect("example workflow should parse")
}

pub fn errors_for<'a>(result: &'a ValidationResult, node_id: &str) -> Vec<&'a Issue> {
    result.errors.iter().filter(|e| e.node_id == node_id).collect()
}

pub fn assert_error_containing(result: &ValidationResult, node_id: &str, text: &str) {
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.node_id == node_id && e.message.contains(text)),
        "Expected error on '{}' containing '{}', got: {:?}",
        node_id,
        text,
        result.errors
    );
}
