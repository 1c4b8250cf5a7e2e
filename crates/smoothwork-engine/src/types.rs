//! Core types for workflow graphs
//!
//! These types define the structure of a workflow: typed nodes, the
//! directed edges between them, and the derived validity annotations.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Mint a fresh, globally unique id for a node or edge
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Canvas position of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same position shifted by `delta` on both axes
    pub fn offset(self, delta: f64) -> Self {
        Self {
            x: self.x + delta,
            y: self.y + delta,
        }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// The closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point; exactly one per valid workflow
    Start,
    /// Human task with an assignee
    Task,
    /// Approval gate
    Approval,
    /// Automated action with action-driven params
    Automated,
    /// Terminal node
    End,
}

impl NodeKind {
    /// Every kind, in palette order
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Start,
        NodeKind::Task,
        NodeKind::Approval,
        NodeKind::Automated,
        NodeKind::End,
    ];

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Task => "task",
            NodeKind::Approval => "approval",
            NodeKind::Automated => "automated",
            NodeKind::End => "end",
        }
    }

    /// Default data payload for a freshly created node of this kind
    pub fn default_data(&self) -> Value {
        match self {
            NodeKind::Start => json!({ "label": "Start", "description": "" }),
            NodeKind::Task => json!({ "label": "Task", "description": "", "assignee": "" }),
            NodeKind::Approval => json!({ "label": "Approval", "approver": "", "condition": "" }),
            NodeKind::Automated => json!({ "label": "Automated", "actionId": "", "params": {} }),
            NodeKind::End => json!({ "label": "End", "summary": "" }),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known node kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node kind: {0}")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// Structural validity verdict for a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Valid,
    Invalid,
}

/// Display hint derived from validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleHint {
    /// Neutral border
    #[default]
    Neutral,
    /// Error border
    Error,
}

/// A node instance in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique, immutable identifier
    pub id: NodeId,
    /// Position on the canvas
    pub position: Position,
    /// Node kind
    pub kind: NodeKind,
    /// Kind-specific key/value data
    #[serde(default)]
    pub data: Value,
    /// Derived by validation
    #[serde(default)]
    pub status: NodeStatus,
    /// Selection flag used by duplicate/delete
    #[serde(default)]
    pub selected: bool,
    /// Derived by validation
    #[serde(default)]
    pub style: StyleHint,
    /// Transient focus flash; never persisted or snapshotted
    #[serde(skip)]
    pub highlighted: bool,
}

impl Node {
    /// Create a node of `kind` with a fresh id and the kind's default data
    pub fn new(kind: NodeKind, position: impl Into<Position>) -> Self {
        Self::with_id(new_id(), kind, position)
    }

    /// Create a node with an explicit id
    pub fn with_id(id: impl Into<NodeId>, kind: NodeKind, position: impl Into<Position>) -> Self {
        Self {
            id: id.into(),
            position: position.into(),
            kind,
            data: kind.default_data(),
            status: NodeStatus::Valid,
            selected: false,
            style: StyleHint::Neutral,
            highlighted: false,
        }
    }

    /// Human-readable label, falling back to the id
    pub fn label(&self) -> &str {
        self.data
            .get("label")
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
            .unwrap_or(&self.id)
    }

    pub fn is_valid(&self) -> bool {
        self.status == NodeStatus::Valid
    }
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
}

impl Edge {
    /// Create an edge with a fresh id
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: new_id(),
            source: source.into(),
            target: target.into(),
        }
    }

    /// Whether either endpoint is `node_id`
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Whether either endpoint is in `ids`
    pub fn touches_any(&self, ids: &HashSet<NodeId>) -> bool {
        ids.contains(&self.source) || ids.contains(&self.target)
    }
}

/// A complete workflow: the unit of persistence, import/export and simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Nodes in insertion order
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges in insertion order
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Workflow {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// IDs of all selected nodes
    pub fn selected_ids(&self) -> HashSet<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id.clone())
            .collect()
    }
}
