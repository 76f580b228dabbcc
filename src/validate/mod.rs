//! Workflow validation phase.
//!
//! Validation is pull-based: the builder may hold any intermediate state and
//! calls [`validate`] on a snapshot when saving, testing or publishing.
//! Problems are returned as data; nothing here fails or panics.

pub mod rules;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ValidationConfig;
use crate::parse::types::{Workflow, WorkflowNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub node_id: String,
    pub node_name: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Issue {
    pub fn error(node: &WorkflowNode, message: impl Into<String>, field: Option<&str>) -> Self {
        Issue::for_node(node, Severity::Error, message.into(), field)
    }

    pub fn warning(node: &WorkflowNode, message: impl Into<String>, field: Option<&str>) -> Self {
        Issue::for_node(node, Severity::Warning, message.into(), field)
    }

    fn for_node(node: &WorkflowNode, severity: Severity, message: String, field: Option<&str>) -> Self {
        let node_name = if node.title.trim().is_empty() {
            node.id.clone()
        } else {
            node.title.clone()
        };
        Issue {
            node_id: node.id.clone(),
            node_name,
            severity,
            message,
            field: field.map(str::to_string),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.field {
            Some(field) => write!(
                f,
                "{} in '{}' ({}): {}",
                level, self.node_name, field, self.message
            ),
            None => write!(f, "{} in '{}': {}", level, self.node_name, self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<Issue>) -> Self {
        let (errors, warnings): (Vec<Issue>, Vec<Issue>) = issues
            .into_iter()
            .partition(|i| i.severity == Severity::Error);
        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Errors and warnings attached to one node, errors first.
    pub fn issues_for<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |i| i.node_id == node_id)
    }
}

/// Validate a node sequence with default settings.
pub fn validate(nodes: &[WorkflowNode]) -> ValidationResult {
    validate_with(nodes, &ValidationConfig::default())
}

pub fn validate_workflow(workflow: &Workflow, config: &ValidationConfig) -> ValidationResult {
    validate_with(&workflow.nodes, config)
}

pub fn validate_with(nodes: &[WorkflowNode], config: &ValidationConfig) -> ValidationResult {
    let result = ValidationResult::from_issues(rules::run_rules(nodes, config));
    debug!(
        nodes = nodes.len(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated workflow"
    );
    result
}
