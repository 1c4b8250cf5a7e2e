//! Fluent builder for workflows
//!
//! Provides a compact API for constructing graphs programmatically,
//! mostly for fixtures and headless hosts.

use serde_json::Value;

use crate::types::{Edge, Node, NodeKind, Workflow};

/// Fluent builder for constructing workflows
///
/// # Example
///
/// ```
/// use smoothwork_engine::{NodeKind, WorkflowBuilder};
///
/// let workflow = WorkflowBuilder::new()
///     .add_node("start", NodeKind::Start, (0.0, 0.0))
///     .add_node("review", NodeKind::Approval, (0.0, 140.0))
///     .with_data(serde_json::json!({"label": "Review", "approver": "cfo"}))
///     .add_edge("start", "review")
///     .build();
/// assert_eq!(workflow.nodes.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct WorkflowBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    edge_counter: usize,
}

impl WorkflowBuilder {
    /// Create a new, empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with the kind's default data
    pub fn add_node(mut self, id: impl Into<String>, kind: NodeKind, position: (f64, f64)) -> Self {
        self.nodes.push(Node::with_id(id, kind, position));
        self
    }

    /// Replace the data of the most recently added node
    ///
    /// Must be called immediately after `add_node`.
    pub fn with_data(mut self, data: Value) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.data = data;
        }
        self
    }

    /// Mark the most recently added node as selected
    pub fn selected(mut self) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.selected = true;
        }
        self
    }

    /// Add an edge between two nodes (auto-generates edge ID)
    pub fn add_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edge_counter += 1;
        let id = format!("edge-{}", self.edge_counter);
        self.add_edge_with_id(id, source, target)
    }

    /// Add an edge with an explicit ID
    pub fn add_edge_with_id(
        mut self,
        edge_id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.edges.push(Edge {
            id: edge_id.into(),
            source: source.into(),
            target: target.into(),
        });
        self
    }

    /// Build the workflow without validation
    pub fn build(self) -> Workflow {
        Workflow::new(self.nodes, self.edges)
    }
}
