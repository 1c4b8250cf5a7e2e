//! Palette entries for the node kinds

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smoothwork_engine::NodeKind;

/// What a palette shows for one node kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub kind: NodeKind,
    /// Human-readable label
    pub label: String,
    /// One-line description for tooltips
    pub description: String,
    /// Data a freshly dropped node of this kind starts with
    pub default_data: Value,
}

impl NodeDescriptor {
    pub fn for_kind(kind: NodeKind) -> Self {
        let (label, description) = match kind {
            NodeKind::Start => ("Start", "Entry point of the workflow"),
            NodeKind::Task => ("Task", "Work assigned to a person"),
            NodeKind::Approval => ("Approval", "Gate that waits for sign-off"),
            NodeKind::Automated => ("Automated", "Runs a catalog action"),
            NodeKind::End => ("End", "Terminates the workflow"),
        };
        Self {
            kind,
            label: label.to_string(),
            description: description.to_string(),
            default_data: kind.default_data(),
        }
    }
}

/// Every node kind, in palette order
pub fn palette() -> Vec<NodeDescriptor> {
    NodeKind::ALL.into_iter().map(NodeDescriptor::for_kind).collect()
}
