//! Validation rules, applied in order.
//!
//! The empty-graph rule is the only one that stops evaluation. After the
//! trigger check, the per-node rules run node by node so that a node's
//! issues stay grouped together.

use std::collections::HashMap;

use tracing::trace;

use super::{Issue, Severity};
use crate::config::{ReferenceOrder, ValidationConfig};
use crate::parse::graph::WorkflowGraph;
use crate::parse::types::{NodeType, WorkflowNode};
use crate::resolve::{self, ParameterSource};

pub const WORKFLOW_ISSUE_ID: &str = "workflow";
pub const CONDITION_PARAM: &str = "condition";
pub const ITERATION_PARAM: &str = "iteration_array";

/// Run every rule over `nodes`. Returns errors and warnings mixed, in order.
pub fn run_rules(nodes: &[WorkflowNode], config: &ValidationConfig) -> Vec<Issue> {
    let mut issues = Vec::new();

    if nodes.is_empty() {
        issues.push(Issue {
            node_id: WORKFLOW_ISSUE_ID.into(),
            node_name: "Workflow".into(),
            severity: Severity::Error,
            message: "Workflow must have at least one node".into(),
            field: None,
        });
        return issues;
    }

    trigger_first(nodes, &mut issues);

    let order = ReferenceCheck::new(nodes, config.reference_order);
    for (index, node) in nodes.iter().enumerate() {
        trace!(node = %node.id, index, "checking node");
        required_parameters(node, &mut issues);
        dynamic_references(node, index, &order, &mut issues);
        match node.node_type {
            NodeType::Conditional => conditional_rules(node, &mut issues),
            NodeType::Loop => loop_rules(node, &mut issues),
            NodeType::Trigger | NodeType::Action | NodeType::End => {}
        }
        optional_parameters(node, config.optional_warning_limit, &mut issues);
    }

    issues
}

fn trigger_first(nodes: &[WorkflowNode], issues: &mut Vec<Issue>) {
    if let Some(first) = nodes.first() {
        if !first.is_trigger() {
            issues.push(Issue::error(
                first,
                "Workflow must start with a trigger node",
                None,
            ));
        }
    }
}

fn required_parameters(node: &WorkflowNode, issues: &mut Vec<Issue>) {
    for param in node.parameters.iter().filter(|p| p.required) {
        if !resolve::is_configured(param) {
            issues.push(Issue::error(
                node,
                format!(
                    "Required parameter \"{}\" is not configured",
                    param.display_name()
                ),
                Some(param.id.as_str()),
            ));
        }
    }
}

fn dynamic_references(
    node: &WorkflowNode,
    index: usize,
    order: &ReferenceCheck<'_>,
    issues: &mut Vec<Issue>,
) {
    for param in &node.parameters {
        let ParameterSource::Dynamic { node_id: target, .. } = resolve::resolve_parameter(param)
        else {
            continue;
        };

        let Some(target_index) = order.index_of(target) else {
            issues.push(Issue::error(
                node,
                format!(
                    "Parameter \"{}\" references non-existent node \"{}\"",
                    param.display_name(),
                    target
                ),
                Some(param.id.as_str()),
            ));
            continue;
        };

        if let Some(message) = order.violation(target, target_index, &node.id, index) {
            issues.push(Issue::error(
                node,
                format!(
                    "Parameter \"{}\" {} (\"{}\")",
                    param.display_name(),
                    message,
                    target
                ),
                Some(param.id.as_str()),
            ));
        }
    }
}

fn conditional_rules(node: &WorkflowNode, issues: &mut Vec<Issue>) {
    let has_condition = node.parameter(CONDITION_PARAM).is_some_and(resolve::has_value);
    if !has_condition {
        issues.push(Issue::error(
            node,
            "Conditional node must have a condition configured",
            Some(CONDITION_PARAM),
        ));
    }

    if node.branches.as_ref().is_none_or(|b| b.is_empty()) {
        issues.push(Issue::warning(node, "Conditional node has no branches", None));
    }
}

fn loop_rules(node: &WorkflowNode, issues: &mut Vec<Issue>) {
    let has_source = node
        .parameter(ITERATION_PARAM)
        .is_some_and(|p| resolve::has_value(p) || resolve::has_dynamic_path(p));
    if !has_source {
        issues.push(Issue::error(
            node,
            "Loop node must have an iteration array configured",
            Some(ITERATION_PARAM),
        ));
    }
}

fn optional_parameters(node: &WorkflowNode, limit: usize, issues: &mut Vec<Issue>) {
    let unconfigured: Vec<_> = node
        .parameters
        .iter()
        .filter(|p| !p.required && !resolve::is_configured(p))
        .collect();

    // A node with many untouched optional fields is treated as left on defaults.
    if unconfigured.is_empty() || unconfigured.len() >= limit {
        return;
    }

    for param in unconfigured {
        issues.push(Issue::warning(
            node,
            format!(
                "Optional parameter \"{}\" is not configured",
                param.display_name()
            ),
            Some(param.id.as_str()),
        ));
    }
}

/// Position lookups for dynamic reference checks.
struct ReferenceCheck<'a> {
    indices: HashMap<&'a str, usize>,
    graph: Option<WorkflowGraph>,
}

impl<'a> ReferenceCheck<'a> {
    fn new(nodes: &'a [WorkflowNode], mode: ReferenceOrder) -> Self {
        let mut indices = HashMap::new();
        for (i, node) in nodes.iter().enumerate() {
            indices.entry(node.id.as_str()).or_insert(i);
        }
        let graph = match mode {
            ReferenceOrder::Linear => None,
            ReferenceOrder::Topology => Some(WorkflowGraph::build(nodes)),
        };
        ReferenceCheck { indices, graph }
    }

    fn index_of(&self, node_id: &str) -> Option<usize> {
        self.indices.get(node_id).copied()
    }

    /// Describe why `target` may not be read from `owner`, if it may not.
    fn violation(
        &self,
        target: &str,
        target_index: usize,
        owner: &str,
        owner_index: usize,
    ) -> Option<&'static str> {
        match &self.graph {
            None => (target_index >= owner_index)
                .then_some("references a node that comes after this node"),
            Some(graph) => (!graph.runs_before(target, owner))
                .then_some("references a node that does not run before this node"),
        }
    }
}
