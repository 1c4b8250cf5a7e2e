//! Canonical node and edge collections
//!
//! The store is the single source of truth for the live graph. Higher
//! components read through it and mutate by computing the next sequence and
//! replacing it wholesale; there is no in-place element mutation API.

use std::collections::HashMap;

use crate::types::{Edge, Node, NodeId, Workflow};

/// Owns the live workflow plus an id index over its nodes
#[derive(Debug, Default)]
pub struct GraphStore {
    workflow: Workflow,
    /// Node id -> position in `workflow.nodes`
    index: HashMap<NodeId, usize>,
    /// Bumped on every replace
    generation: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.workflow.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.workflow.edges
    }

    /// Borrow the live workflow
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.workflow.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of replaces applied so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Atomically replace the node sequence
    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.workflow.nodes = nodes;
        self.reindex();
        self.generation += 1;
    }

    /// Atomically replace the edge sequence
    pub fn replace_edges(&mut self, edges: Vec<Edge>) {
        self.workflow.edges = edges;
        self.generation += 1;
    }

    /// Replace nodes and edges together
    pub fn replace_workflow(&mut self, workflow: Workflow) {
        self.workflow = workflow;
        self.reindex();
        self.generation += 1;
    }

    fn reindex(&mut self) {
        self.index = self
            .workflow
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }
}
