//! Mapping between the builder model and the backend's node records.
//!
//! Mapping never validates and never fails; malformed inputs map to
//! best-effort defaults.

pub mod convert;
pub mod records;

pub use convert::{
    api_type_for, parameter_type_for, to_api_edges, to_api_node, to_api_node_with,
    to_workflow_node,
};
pub use records::{ApiEdge, ApiNode, ApiParam, SchemaField, ScriptSchema};
