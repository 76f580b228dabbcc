//! Builder-facing edits on a workflow document.
//!
//! Edits are unconstrained: a dangling or forward reference is a
//! normal intermediate state and is only reported by validation. The checks
//! here cover what an edit cannot be applied without (the node exists, the
//! node kind has the structural field being edited).

use serde_json::Value;
use tracing::debug;

use crate::error::ModelError;
use crate::parse::types::{
    BranchArm, Branches, NodeType, Parameter, ParameterMode, Workflow, WorkflowNode,
};
use crate::resolve;

impl Workflow {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Workflow {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Append a new node with a generated id of the form `<type>-<n>`.
    pub fn add_node(&mut self, node_type: NodeType, title: impl Into<String>) -> String {
        let id = self.next_id(node_type);
        let mut node = WorkflowNode::new(id.clone(), node_type, title);
        match node_type {
            NodeType::Conditional => node.branches = Some(Branches::default()),
            NodeType::Loop => node.loop_body = Some(Vec::new()),
            NodeType::Trigger | NodeType::Action | NodeType::End => {}
        }
        debug!(node = %id, node_type = %node_type, "added node");
        self.nodes.push(node);
        id
    }

    /// Insert a prepared node at `index` (`index == len` appends).
    pub fn insert_node(&mut self, index: usize, node: WorkflowNode) -> Result<(), ModelError> {
        if self.node(&node.id).is_some() {
            return Err(ModelError::DuplicateId(node.id));
        }
        if index > self.nodes.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.nodes.len(),
            });
        }
        self.nodes.insert(index, node);
        Ok(())
    }

    /// Remove a node. References to it are left in place; see
    /// [`Workflow::scrub_references`].
    pub fn remove_node(&mut self, id: &str) -> Result<WorkflowNode, ModelError> {
        let index = self.require_position(id)?;
        debug!(node = %id, "removed node");
        Ok(self.nodes.remove(index))
    }

    /// Clear every dynamic reference to `id` and drop `id` from every branch
    /// arm and loop body. Returns the number of edits made.
    pub fn scrub_references(&mut self, id: &str) -> usize {
        let mut edits = 0;
        for node in &mut self.nodes {
            for param in &mut node.parameters {
                let points_here = param.mode == ParameterMode::Dynamic
                    && param
                        .dynamic_path
                        .as_deref()
                        .and_then(resolve::referenced_node_id)
                        == Some(id);
                if points_here {
                    param.mode = ParameterMode::Static;
                    param.dynamic_path = None;
                    param.value = None;
                    edits += 1;
                }
            }
            if let Some(branches) = &mut node.branches {
                for arm in [BranchArm::True, BranchArm::False] {
                    edits += remove_all(branches.arm_mut(arm), id);
                }
            }
            if let Some(body) = &mut node.loop_body {
                edits += remove_all(body, id);
            }
        }
        debug!(node = %id, edits, "scrubbed references");
        edits
    }

    pub fn update_node<F>(&mut self, id: &str, edit: F) -> Result<(), ModelError>
    where
        F: FnOnce(&mut WorkflowNode),
    {
        let node = self
            .node_mut(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;
        edit(node);
        Ok(())
    }

    /// Set a static value; switches the parameter to static mode.
    pub fn set_parameter_value(
        &mut self,
        node_id: &str,
        param_id: &str,
        value: impl Into<Value>,
    ) -> Result<(), ModelError> {
        let param = self.require_parameter(node_id, param_id)?;
        param.mode = ParameterMode::Static;
        param.value = Some(value.into());
        param.dynamic_path = None;
        Ok(())
    }

    /// Point a parameter at another node's output. The target is not checked.
    pub fn set_parameter_reference(
        &mut self,
        node_id: &str,
        param_id: &str,
        path: impl Into<String>,
    ) -> Result<(), ModelError> {
        let param = self.require_parameter(node_id, param_id)?;
        param.mode = ParameterMode::Dynamic;
        param.dynamic_path = Some(path.into());
        Ok(())
    }

    pub fn attach_branch_child(
        &mut self,
        conditional_id: &str,
        arm: BranchArm,
        child_id: &str,
    ) -> Result<(), ModelError> {
        self.require_position(child_id)?;
        let node = self.require_kind(conditional_id, NodeType::Conditional)?;
        let children = node.branches.get_or_insert_with(Branches::default).arm_mut(arm);
        if !children.iter().any(|c| c == child_id) {
            children.push(child_id.to_string());
        }
        Ok(())
    }

    /// Returns whether the child was attached.
    pub fn detach_branch_child(
        &mut self,
        conditional_id: &str,
        arm: BranchArm,
        child_id: &str,
    ) -> Result<bool, ModelError> {
        let node = self.require_kind(conditional_id, NodeType::Conditional)?;
        let removed = node
            .branches
            .as_mut()
            .map(|b| remove_all(b.arm_mut(arm), child_id))
            .unwrap_or(0);
        Ok(removed > 0)
    }

    pub fn attach_loop_child(&mut self, loop_id: &str, child_id: &str) -> Result<(), ModelError> {
        self.require_position(child_id)?;
        let node = self.require_kind(loop_id, NodeType::Loop)?;
        let body = node.loop_body.get_or_insert_with(Vec::new);
        if !body.iter().any(|c| c == child_id) {
            body.push(child_id.to_string());
        }
        Ok(())
    }

    pub fn detach_loop_child(&mut self, loop_id: &str, child_id: &str) -> Result<bool, ModelError> {
        let node = self.require_kind(loop_id, NodeType::Loop)?;
        let removed = node
            .loop_body
            .as_mut()
            .map(|body| remove_all(body, child_id))
            .unwrap_or(0);
        Ok(removed > 0)
    }

    /// Move a node so that it ends up at `to_index`.
    pub fn move_node(&mut self, id: &str, to_index: usize) -> Result<(), ModelError> {
        let from = self.require_position(id)?;
        if to_index >= self.nodes.len() {
            return Err(ModelError::IndexOutOfRange {
                index: to_index,
                len: self.nodes.len(),
            });
        }
        let node = self.nodes.remove(from);
        self.nodes.insert(to_index, node);
        debug!(node = %id, from, to = to_index, "moved node");
        Ok(())
    }

    fn next_id(&self, node_type: NodeType) -> String {
        let mut n = self.nodes.len() + 1;
        loop {
            let candidate = format!("{}-{}", node_type.as_str(), n);
            if self.node(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    fn require_position(&self, id: &str) -> Result<usize, ModelError> {
        self.position(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))
    }

    fn require_kind(&mut self, id: &str, expected: NodeType) -> Result<&mut WorkflowNode, ModelError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;
        if node.node_type != expected {
            return Err(ModelError::WrongNodeType {
                node_id: id.to_string(),
                expected: expected.as_str(),
                actual: node.node_type.as_str(),
            });
        }
        Ok(node)
    }

    fn require_parameter(
        &mut self,
        node_id: &str,
        param_id: &str,
    ) -> Result<&mut Parameter, ModelError> {
        let node = self
            .node_mut(node_id)
            .ok_or_else(|| ModelError::NodeNotFound(node_id.to_string()))?;
        node.parameter_mut(param_id)
            .ok_or_else(|| ModelError::ParameterNotFound {
                node_id: node_id.to_string(),
                parameter: param_id.to_string(),
            })
    }
}

fn remove_all(ids: &mut Vec<String>, id: &str) -> usize {
    let before = ids.len();
    ids.retain(|c| c != id);
    before - ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let mut wf = Workflow::new("wf", "Test");
        let a = wf.add_node(NodeType::Action, "A");
        let b = wf.add_node(NodeType::Action, "B");
        assert_eq!(a, "action-1");
        assert_eq!(b, "action-2");
        wf.remove_node(&a).unwrap();
        let c = wf.add_node(NodeType::Action, "C");
        assert_ne!(c, b);
    }

    #[test]
    fn conditional_starts_with_empty_branches() {
        let mut wf = Workflow::new("wf", "Test");
        let id = wf.add_node(NodeType::Conditional, "If");
        assert_eq!(wf.node(&id).unwrap().branches, Some(Branches::default()));
        assert!(wf.node(&id).unwrap().loop_body.is_none());
    }

    #[test]
    fn branch_children_only_on_conditionals() {
        let mut wf = Workflow::new("wf", "Test");
        let action = wf.add_node(NodeType::Action, "A");
        let other = wf.add_node(NodeType::Action, "B");
        let err = wf
            .attach_branch_child(&action, BranchArm::True, &other)
            .unwrap_err();
        assert!(matches!(err, ModelError::WrongNodeType { expected: "conditional", .. }));
    }

    #[test]
    fn move_out_of_range() {
        let mut wf = Workflow::new("wf", "Test");
        let a = wf.add_node(NodeType::Trigger, "T");
        assert!(matches!(
            wf.move_node(&a, 3),
            Err(ModelError::IndexOutOfRange { index: 3, len: 1 })
        ));
    }
}
