//! Reference checking against branch and loop structure.

#[allow(dead_code)]
mod helpers;

use flowcore::config::{CoreConfig, ReferenceOrder, ValidationConfig};
use flowcore::validate;
use helpers::*;

fn topology() -> ValidationConfig {
    ValidationConfig {
        reference_order: ReferenceOrder::Topology,
        ..Default::default()
    }
}

#[test]
fn example_is_valid_in_both_modes() {
    let workflow = load_example();
    assert!(validate::validate(&workflow.nodes).is_valid);
    assert!(validate::validate_workflow(&workflow, &topology()).is_valid);
}

#[test]
fn branch_child_may_read_its_conditional_ancestry() {
    let nodes = vec![
        trigger("trig"),
        action("fetch", vec![]),
        conditional("if-1", "fetch.ok", &["yes"], &["no"]),
        action("yes", vec![required_ref("body", "fetch.body")]),
        action("no", vec![required_ref("reason", "trig.reason")]),
    ];
    let result = validate::validate_with(&nodes, &topology());
    assert!(result.is_valid, "{:?}", result.errors);
}

#[test]
fn sibling_arm_is_not_readable() {
    let nodes = vec![
        trigger("trig"),
        conditional("if-1", "trig.flag", &["yes"], &["no"]),
        action("yes", vec![]),
        action("no", vec![required_ref("x", "yes.value")]),
    ];

    // flat order accepts it: "yes" sits earlier in the list
    assert!(validate::validate(&nodes).is_valid);

    let result = validate::validate_with(&nodes, &topology());
    assert_error_containing(&result, "no", "does not run before this node");
}

#[test]
fn node_after_join_cannot_read_arm_nodes() {
    let nodes = vec![
        trigger("trig"),
        conditional("if-1", "trig.flag", &["yes"], &["no"]),
        action("yes", vec![]),
        action("no", vec![]),
        action("after", vec![required_ref("x", "if-1.result"), required_ref("y", "yes.value")]),
    ];
    let result = validate::validate_with(&nodes, &topology());
    // the false outcome never runs "yes"
    assert_eq!(errors_for(&result, "after").len(), 1);
    assert_error_containing(&result, "after", "(\"yes\")");
}

#[test]
fn empty_arm_skips_the_other_arm() {
    let nodes = vec![
        trigger("t"),
        conditional("if-1", "t.flag", &["yes"], &[]),
        action("yes", vec![]),
        action("after", vec![required_ref("y", "yes.value")]),
    ];
    let result = validate::validate_with(&nodes, &topology());
    assert_error_containing(&result, "after", "does not run before this node");
    assert!(validate::validate(&nodes).is_valid);
}

#[test]
fn loop_body_reads_loop_item() {
    let nodes = vec![
        trigger("trig"),
        loop_over("each", "trig.items", &["handle"]),
        action("handle", vec![required_ref("item", "each.item")]),
        action("summary", vec![required_ref("items", "each.results")]),
    ];
    let result = validate::validate_with(&nodes, &topology());
    assert!(result.is_valid, "{:?}", result.errors);
}

#[test]
fn node_after_loop_cannot_read_loop_body() {
    let nodes = vec![
        trigger("trig"),
        loop_over("each", "trig.items", &["handle"]),
        action("handle", vec![]),
        action("summary", vec![required_ref("last", "handle.out")]),
    ];
    // an empty iteration array skips the body
    let result = validate::validate_with(&nodes, &topology());
    assert_error_containing(&result, "summary", "does not run before this node");
}

#[test]
fn self_reference_rejected_in_topology_mode() {
    let nodes = vec![trigger("trig"), action("a", vec![required_ref("x", "a.out")])];
    let result = validate::validate_with(&nodes, &topology());
    assert_error_containing(&result, "a", "does not run before this node");
}

#[test]
fn config_json_selects_mode() {
    let config = CoreConfig::from_json(r#"{"validation": {"referenceOrder": "topology"}}"#).unwrap();
    let nodes = vec![
        trigger("trig"),
        conditional("if-1", "trig.flag", &["yes"], &["no"]),
        action("yes", vec![]),
        action("no", vec![required_ref("x", "yes.value")]),
    ];
    assert!(!validate::validate_with(&nodes, &config.validation).is_valid);
}
