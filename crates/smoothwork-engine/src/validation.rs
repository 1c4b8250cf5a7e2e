//! Structural validation for workflow graphs
//!
//! Two views over the same rules:
//!
//! - `validate` annotates every node with a status and display hint; the
//!   editor re-runs it after each committed mutation.
//! - `preflight` reports the problems as human-readable issues; simulation
//!   refuses to start while any exist.
//!
//! Rules, in order:
//! 1. every node starts Valid with a neutral hint
//! 2. if the number of Start nodes is not exactly one, every Start is Invalid
//! 3. a sole Start without an outgoing edge is Invalid
//! 4. any node with no incident edge at all is Invalid
//!
//! A node flagged by several rules is simply Invalid; no rule reverts a verdict.

use std::collections::HashSet;

use crate::types::{Edge, Node, NodeId, NodeKind, NodeStatus, StyleHint, Workflow};

/// A structural problem that blocks simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The graph does not contain exactly one Start node
    StartCount { found: usize },
    /// The sole Start node has no outgoing edge
    StartWithoutOutgoing { node_id: NodeId },
    /// A node has no incoming and no outgoing edge
    IsolatedNode { node_id: NodeId, label: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartCount { .. } => write!(f, "There must be exactly one Start node."),
            Self::StartWithoutOutgoing { .. } => {
                write!(f, "Start node must have an outgoing edge.")
            }
            Self::IsolatedNode { label, .. } => write!(f, "Node \"{}\" is isolated.", label),
        }
    }
}

impl std::error::Error for ValidationIssue {}

impl ValidationIssue {
    /// The node the issue is attached to, if any
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::StartCount { .. } => None,
            Self::StartWithoutOutgoing { node_id } | Self::IsolatedNode { node_id, .. } => {
                Some(node_id)
            }
        }
    }
}

/// Edge endpoints indexed once per pass
struct Incidence<'a> {
    sources: HashSet<&'a str>,
    targets: HashSet<&'a str>,
}

impl<'a> Incidence<'a> {
    fn new(edges: &'a [Edge]) -> Self {
        Self {
            sources: edges.iter().map(|e| e.source.as_str()).collect(),
            targets: edges.iter().map(|e| e.target.as_str()).collect(),
        }
    }

    fn has_outgoing(&self, id: &str) -> bool {
        self.sources.contains(id)
    }

    fn is_isolated(&self, id: &str) -> bool {
        !self.sources.contains(id) && !self.targets.contains(id)
    }
}

/// Annotate every node with its structural verdict
///
/// Pure: returns new nodes, touching only `status` and `style`.
pub fn validate(nodes: &[Node], edges: &[Edge]) -> Vec<Node> {
    let incidence = Incidence::new(edges);

    let mut updated: Vec<Node> = nodes
        .iter()
        .map(|n| {
            let mut node = n.clone();
            node.status = NodeStatus::Valid;
            node.style = StyleHint::Neutral;
            node
        })
        .collect();

    let starts: Vec<usize> = updated
        .iter()
        .enumerate()
        .filter(|(_, n)| n.kind == NodeKind::Start)
        .map(|(i, _)| i)
        .collect();

    if starts.len() != 1 {
        for &i in &starts {
            mark_invalid(&mut updated[i]);
        }
    } else if !incidence.has_outgoing(&updated[starts[0]].id) {
        mark_invalid(&mut updated[starts[0]]);
    }

    for node in &mut updated {
        if incidence.is_isolated(&node.id) {
            mark_invalid(node);
        }
    }

    updated
}

fn mark_invalid(node: &mut Node) {
    node.status = NodeStatus::Invalid;
    node.style = StyleHint::Error;
}

/// Whether applying `validated` would change any status or display hint
///
/// Gates the post-mutation replace so validation reaches a fixed point
/// instead of re-triggering itself.
pub fn needs_update(current: &[Node], validated: &[Node]) -> bool {
    if current.len() != validated.len() {
        return true;
    }
    validated.iter().any(|v| match current.iter().find(|n| n.id == v.id) {
        Some(n) => n.status != v.status || n.style != v.style,
        None => true,
    })
}

/// Report structural problems in the order the rules are evaluated
pub fn preflight(workflow: &Workflow) -> Vec<ValidationIssue> {
    let incidence = Incidence::new(&workflow.edges);
    let mut issues = Vec::new();

    let starts: Vec<&Node> = workflow
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Start)
        .collect();

    if starts.len() != 1 {
        issues.push(ValidationIssue::StartCount { found: starts.len() });
    } else if !incidence.has_outgoing(&starts[0].id) {
        issues.push(ValidationIssue::StartWithoutOutgoing {
            node_id: starts[0].id.clone(),
        });
    }

    for node in &workflow.nodes {
        if incidence.is_isolated(&node.id) {
            issues.push(ValidationIssue::IsolatedNode {
                node_id: node.id.clone(),
                label: node.label().to_string(),
            });
        }
    }

    issues
}

/// IDs of nodes currently marked Invalid
pub fn invalid_node_ids(nodes: &[Node]) -> Vec<NodeId> {
    nodes
        .iter()
        .filter(|n| n.status == NodeStatus::Invalid)
        .map(|n| n.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;

    fn status_of(nodes: &[Node], id: &str) -> NodeStatus {
        nodes.iter().find(|n| n.id == id).unwrap().status
    }

    #[test]
    fn test_valid_linear_graph() {
        let wf = WorkflowBuilder::new()
            .add_node("a", NodeKind::Start, (0.0, 0.0))
            .add_node("b", NodeKind::Task, (0.0, 100.0))
            .add_edge("a", "b")
            .build();

        let validated = validate(&wf.nodes, &wf.edges);
        assert!(validated.iter().all(|n| n.status == NodeStatus::Valid));
        assert!(validated.iter().all(|n| n.style == StyleHint::Neutral));
        assert!(preflight(&wf).is_empty());
    }

    #[test]
    fn test_no_start_is_reported_but_marks_nothing() {
        let wf = WorkflowBuilder::new()
            .add_node("a", NodeKind::Task, (0.0, 0.0))
            .add_node("b", NodeKind::End, (0.0, 100.0))
            .add_edge("a", "b")
            .build();

        let validated = validate(&wf.nodes, &wf.edges);
        assert!(validated.iter().all(Node::is_valid));
        assert_eq!(preflight(&wf), vec![ValidationIssue::StartCount { found: 0 }]);
    }

    #[test]
    fn test_multiple_starts_all_invalid() {
        let wf = WorkflowBuilder::new()
            .add_node("s1", NodeKind::Start, (0.0, 0.0))
            .add_node("s2", NodeKind::Start, (100.0, 0.0))
            .add_node("end", NodeKind::End, (0.0, 100.0))
            .add_edge("s1", "end")
            .add_edge("s2", "end")
            .build();

        let validated = validate(&wf.nodes, &wf.edges);
        assert_eq!(status_of(&validated, "s1"), NodeStatus::Invalid);
        assert_eq!(status_of(&validated, "s2"), NodeStatus::Invalid);
        assert_eq!(status_of(&validated, "end"), NodeStatus::Valid);

        let issues = preflight(&wf);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "There must be exactly one Start node.");
    }

    #[test]
    fn test_start_without_outgoing_edge() {
        let wf = WorkflowBuilder::new()
            .add_node("a", NodeKind::Task, (0.0, 0.0))
            .add_node("s", NodeKind::Start, (0.0, 100.0))
            .add_edge("a", "s")
            .build();

        let validated = validate(&wf.nodes, &wf.edges);
        assert_eq!(status_of(&validated, "s"), NodeStatus::Invalid);
        assert_eq!(status_of(&validated, "a"), NodeStatus::Valid);

        let issues = preflight(&wf);
        assert_eq!(issues[0].to_string(), "Start node must have an outgoing edge.");
        assert_eq!(issues[0].node_id(), Some("s"));
    }

    #[test]
    fn test_isolated_node_invalid_regardless_of_kind() {
        for kind in NodeKind::ALL {
            let wf = WorkflowBuilder::new()
                .add_node("s", NodeKind::Start, (0.0, 0.0))
                .add_node("t", NodeKind::Task, (0.0, 100.0))
                .add_edge("s", "t")
                .add_node("lonely", kind, (300.0, 0.0))
                .build();

            let validated = validate(&wf.nodes, &wf.edges);
            assert_eq!(status_of(&validated, "lonely"), NodeStatus::Invalid);
            assert_eq!(
                validated.iter().find(|n| n.id == "lonely").unwrap().style,
                StyleHint::Error
            );
        }
    }

    #[test]
    fn test_isolated_start_flagged_by_two_rules() {
        let wf = WorkflowBuilder::new()
            .add_node("s", NodeKind::Start, (0.0, 0.0))
            .with_data(serde_json::json!({ "label": "Kickoff" }))
            .build();

        let validated = validate(&wf.nodes, &wf.edges);
        assert_eq!(status_of(&validated, "s"), NodeStatus::Invalid);

        let messages: Vec<String> = preflight(&wf).iter().map(|i| i.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Start node must have an outgoing edge.".to_string(),
                "Node \"Kickoff\" is isolated.".to_string(),
            ]
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let wf = WorkflowBuilder::new()
            .add_node("s1", NodeKind::Start, (0.0, 0.0))
            .add_node("s2", NodeKind::Start, (0.0, 0.0))
            .add_node("t", NodeKind::Task, (0.0, 0.0))
            .add_node("x", NodeKind::End, (0.0, 0.0))
            .add_edge("s1", "t")
            .build();

        let once = validate(&wf.nodes, &wf.edges);
        let twice = validate(&once, &wf.edges);
        assert_eq!(once, twice);
        assert!(!needs_update(&once, &twice));
    }

    #[test]
    fn test_validation_touches_only_status_and_style() {
        let mut wf = WorkflowBuilder::new()
            .add_node("s", NodeKind::Start, (5.0, 6.0))
            .selected()
            .build();
        wf.nodes[0].highlighted = true;

        let validated = validate(&wf.nodes, &wf.edges);
        let node = &validated[0];
        assert_eq!(node.position.x, 5.0);
        assert!(node.selected);
        assert!(node.highlighted);
        assert_eq!(node.data, wf.nodes[0].data);
    }

    #[test]
    fn test_needs_update_detects_changes() {
        let wf = WorkflowBuilder::new()
            .add_node("s", NodeKind::Start, (0.0, 0.0))
            .build();

        let validated = validate(&wf.nodes, &wf.edges);
        assert!(needs_update(&wf.nodes, &validated));
        assert!(!needs_update(&validated, &validated));
        assert!(needs_update(&[], &validated));
        assert_eq!(invalid_node_ids(&validated), vec!["s".to_string()]);
    }
}
