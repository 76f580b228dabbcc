//! Parse phase: builder JSON → Rust types + execution graph construction.

pub mod graph;
pub mod types;

pub use graph::{EdgeKind, WorkflowGraph};
pub use types::*;

use crate::error::CoreError;

/// Deserialize a workflow document JSON string into a `Workflow`.
pub fn parse(json: &str) -> Result<Workflow, Vec<CoreError>> {
    serde_json::from_str::<Workflow>(json).map_err(|e| {
        vec![CoreError::parse(
            "P001",
            format!("Failed to parse workflow JSON: {}", e),
        )]
    })
}

/// Deserialize a bare JSON array of nodes, as sent by a live-validating editor.
pub fn parse_nodes(json: &str) -> Result<Vec<WorkflowNode>, Vec<CoreError>> {
    serde_json::from_str::<Vec<WorkflowNode>>(json).map_err(|e| {
        vec![CoreError::parse(
            "P001",
            format!("Failed to parse node list JSON: {}", e),
        )]
    })
}

/// Parse a workflow document and build its execution graph in one step.
pub fn parse_and_build(json: &str) -> Result<(Workflow, WorkflowGraph), Vec<CoreError>> {
    let workflow = parse(json)?;
    let graph = WorkflowGraph::build(&workflow.nodes);
    Ok((workflow, graph))
}
