//! Rust types mirroring the builder's in-memory workflow model.
//!
//! These types are the serde target for the builder JSON (camelCase).
//! Every field except node and parameter ids defaults when absent or null,
//! and unrecognised type names fall back to their default, so that
//! half-edited documents still load.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Read an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// TOP-LEVEL WORKFLOW
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<WorkflowNode>,
}

// =============================================================================
// NODES
// =============================================================================

/// Deserializes through [`NodeType::from_name`], so any unrecognised or
/// non-string type reads as an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Trigger,
    #[default]
    Action,
    Conditional,
    Loop,
    /// Terminal step. Behaves as an action for every rule.
    End,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Trigger => "trigger",
            NodeType::Action => "action",
            NodeType::Conditional => "conditional",
            NodeType::Loop => "loop",
            NodeType::End => "end",
        }
    }

    /// Lenient lookup shared by builder documents and backend records;
    /// unknown names are actions.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "trigger" => NodeType::Trigger,
            "conditional" | "condition" | "if" => NodeType::Conditional,
            "loop" => NodeType::Loop,
            "end" => NodeType::End,
            _ => NodeType::Action,
        }
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(NodeType::from_name).unwrap_or_default())
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<Parameter>,
    /// Conditional nodes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Branches>,
    /// Loop nodes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_body: Option<Vec<String>>,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, node_type: NodeType, title: impl Into<String>) -> Self {
        WorkflowNode {
            id: id.into(),
            node_type,
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn is_trigger(&self) -> bool {
        self.node_type == NodeType::Trigger
    }

    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    pub fn parameter_mut(&mut self, id: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.id == id)
    }

    /// Ids of every node nested under this one (branch arms, then loop body).
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        let arms = self
            .branches
            .iter()
            .flat_map(|b| b.on_true.iter().chain(b.on_false.iter()));
        let body = self.loop_body.iter().flatten();
        arms.chain(body).map(String::as_str)
    }
}

/// Child node ids of a conditional, keyed by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branches {
    #[serde(rename = "true", default, deserialize_with = "null_as_default")]
    pub on_true: Vec<String>,
    #[serde(rename = "false", default, deserialize_with = "null_as_default")]
    pub on_false: Vec<String>,
}

impl Branches {
    pub fn is_empty(&self) -> bool {
        self.on_true.is_empty() && self.on_false.is_empty()
    }

    pub fn arm_mut(&mut self, arm: BranchArm) -> &mut Vec<String> {
        match arm {
            BranchArm::True => &mut self.on_true,
            BranchArm::False => &mut self.on_false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchArm {
    True,
    False,
}

// =============================================================================
// PARAMETERS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterMode {
    Dynamic,
    #[default]
    #[serde(other)]
    Static,
}

/// Input widget kind shown by the builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Number,
    Toggle,
    Textarea,
    Dropdown,
    Credential,
    #[default]
    #[serde(other)]
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub param_type: ParameterType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mode: ParameterMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// `"<nodeId>.<field...>"`, only meaningful in dynamic mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Parameter {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.mode = ParameterMode::Static;
        self.value = Some(value.into());
        self.dynamic_path = None;
        self
    }

    pub fn with_reference(mut self, path: impl Into<String>) -> Self {
        self.mode = ParameterMode::Dynamic;
        self.dynamic_path = Some(path.into());
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.mode == ParameterMode::Dynamic
    }

    /// Label for messages; falls back to the id when the label is blank.
    pub fn display_name(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}
