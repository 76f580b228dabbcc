//! petgraph-based execution graph for a workflow.
//!
//! The builder stores nodes as a flat ordered list. Nodes listed in a
//! conditional arm or a loop body are nested; the remaining nodes form the
//! top-level flow. Each sequence runs in order, and a nested sequence
//! continues to whatever follows its owner.
//!
//! Ordering questions are answered by dominance from the first top-level
//! node: a node is guaranteed to have run before another only when every
//! path to the later node passes through it.

use std::collections::{HashMap, HashSet};

use petgraph::algo::dominators::{self, Dominators};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use super::types::{NodeType, WorkflowNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Next,
    True,
    False,
    LoopBody,
    LoopExit,
}

impl EdgeKind {
    /// Label carried on backend edge records; plain sequencing has none.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            EdgeKind::Next => None,
            EdgeKind::True => Some("true"),
            EdgeKind::False => Some("false"),
            EdgeKind::LoopBody => Some("loop"),
            EdgeKind::LoopExit => Some("done"),
        }
    }
}

pub struct WorkflowGraph {
    pub graph: DiGraph<String, EdgeKind>,
    pub node_indices: HashMap<String, NodeIndex>,
    /// `None` when there is no top-level node to start from.
    dominators: Option<Dominators<NodeIndex>>,
}

impl WorkflowGraph {
    /// Build the graph. Never fails: duplicate ids keep their first
    /// occurrence, unknown child ids and self-nesting are skipped.
    pub fn build(nodes: &[WorkflowNode]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut by_id: HashMap<&str, &WorkflowNode> = HashMap::new();

        for node in nodes {
            if by_id.contains_key(node.id.as_str()) {
                continue;
            }
            by_id.insert(node.id.as_str(), node);
            let idx = graph.add_node(node.id.clone());
            node_indices.insert(node.id.clone(), idx);
        }

        let nested: HashSet<&str> = nodes
            .iter()
            .flat_map(|n| n.child_ids().filter(move |child| *child != n.id))
            .filter(|id| by_id.contains_key(id))
            .collect();

        let mut seen = HashSet::new();
        let top_level: Vec<&str> = nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| !nested.contains(id) && seen.insert(*id))
            .collect();

        let mut linker = Linker {
            by_id: &by_id,
            node_indices: &node_indices,
            graph: &mut graph,
            active: HashSet::new(),
        };
        linker.link_sequence(&top_level, None);

        let dominators = top_level
            .first()
            .and_then(|head| node_indices.get(*head))
            .map(|&root| dominators::simple_fast(&graph, root));

        WorkflowGraph {
            graph,
            node_indices,
            dominators,
        }
    }

    /// True when `earlier` has completed on every path that reaches `later`.
    /// A node never runs before itself, and nodes unreachable from the start
    /// of the flow run before nothing.
    pub fn runs_before(&self, earlier: &str, later: &str) -> bool {
        if earlier == later {
            return false;
        }
        let (Some(&from), Some(&to)) = (self.node_indices.get(earlier), self.node_indices.get(later))
        else {
            return false;
        };
        let Some(dominators) = &self.dominators else {
            return false;
        };
        dominators
            .strict_dominators(to)
            .is_some_and(|mut chain| chain.any(|d| d == from))
    }

    pub fn successors(&self, node_id: &str) -> Vec<(&str, EdgeKind)> {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return vec![];
        };
        let mut out: Vec<(&str, EdgeKind)> = self
            .graph
            .edges(idx)
            .map(|e| (self.graph[e.target()].as_str(), *e.weight()))
            .collect();
        // petgraph yields edges newest first
        out.reverse();
        out
    }
}

struct Linker<'a, 'g> {
    by_id: &'g HashMap<&'a str, &'a WorkflowNode>,
    node_indices: &'g HashMap<String, NodeIndex>,
    graph: &'g mut DiGraph<String, EdgeKind>,
    /// Owners currently being expanded; guards against a node nesting itself.
    active: HashSet<&'a str>,
}

impl<'a> Linker<'a, '_> {
    fn link_sequence(&mut self, seq: &[&'a str], exit: Option<&'a str>) {
        for (i, &id) in seq.iter().enumerate() {
            let next = seq.get(i + 1).copied().or(exit);
            self.link_node(id, next);
        }
    }

    fn link_node(&mut self, id: &'a str, next: Option<&'a str>) {
        let Some(&node) = self.by_id.get(id) else {
            return;
        };
        if !self.active.insert(id) {
            return;
        }

        match node.node_type {
            NodeType::Conditional => {
                let branches = node.branches.as_ref();
                let arms = [
                    (branches.map(|b| b.on_true.as_slice()), EdgeKind::True),
                    (branches.map(|b| b.on_false.as_slice()), EdgeKind::False),
                ];
                for (arm, kind) in arms {
                    let arm = self.known(arm.unwrap_or_default(), id);
                    match arm.first() {
                        Some(head) => {
                            self.connect(id, head, kind);
                            self.link_sequence(&arm, next);
                        }
                        None => {
                            if let Some(next) = next {
                                self.connect(id, next, kind);
                            }
                        }
                    }
                }
            }
            NodeType::Loop => {
                let body = self.known(node.loop_body.as_deref().unwrap_or_default(), id);
                if let Some(head) = body.first() {
                    self.connect(id, head, EdgeKind::LoopBody);
                    self.link_sequence(&body, next);
                }
                if let Some(next) = next {
                    self.connect(id, next, EdgeKind::LoopExit);
                }
            }
            NodeType::Trigger | NodeType::Action | NodeType::End => {
                if let Some(next) = next {
                    self.connect(id, next, EdgeKind::Next);
                }
            }
        }

        self.active.remove(id);
    }

    fn known(&self, ids: &'a [String], owner: &str) -> Vec<&'a str> {
        ids.iter()
            .map(String::as_str)
            .filter(|id| *id != owner && self.by_id.contains_key(id) && !self.active.contains(id))
            .collect()
    }

    fn connect(&mut self, from: &str, to: &str, kind: EdgeKind) {
        let (Some(&a), Some(&b)) = (self.node_indices.get(from), self.node_indices.get(to)) else {
            return;
        };
        let exists = self.graph.edges_connecting(a, b).any(|e| *e.weight() == kind);
        if !exists {
            self.graph.add_edge(a, b, kind);
        }
    }
}
