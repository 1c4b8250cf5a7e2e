//! Structural graph transformations
//!
//! Every function here is pure: it computes the complete next node and edge
//! sequences so the caller can replace the live graph in one step. Removing
//! a node always removes every edge touching it.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::types::{new_id, Edge, Node, NodeId};

/// Clones produced by `duplicate_selected`
#[derive(Debug, Clone)]
pub struct Duplication {
    /// Cloned nodes, in the order of their originals
    pub nodes: Vec<Node>,
    /// Cloned edges whose both endpoints were selected
    pub edges: Vec<Edge>,
    /// Original node id -> clone id
    pub id_map: HashMap<NodeId, NodeId>,
}

/// Clone every selected node and the edges running between them
///
/// Clones get fresh ids, are shifted by `offset` on both axes and are not
/// selected. Edges with only one selected endpoint are left alone. Returns
/// `None` when nothing is selected.
pub fn duplicate_selected(nodes: &[Node], edges: &[Edge], offset: f64) -> Option<Duplication> {
    let selected: Vec<&Node> = nodes.iter().filter(|n| n.selected).collect();
    if selected.is_empty() {
        return None;
    }

    let mut id_map = HashMap::with_capacity(selected.len());
    let clones: Vec<Node> = selected
        .into_iter()
        .map(|original| {
            let mut clone = original.clone();
            clone.id = new_id();
            clone.position = original.position.offset(offset);
            clone.selected = false;
            clone.highlighted = false;
            id_map.insert(original.id.clone(), clone.id.clone());
            clone
        })
        .collect();

    let cloned_edges = edges
        .iter()
        .filter_map(|e| {
            let source = id_map.get(&e.source)?;
            let target = id_map.get(&e.target)?;
            Some(Edge {
                id: new_id(),
                source: source.clone(),
                target: target.clone(),
            })
        })
        .collect();

    Some(Duplication {
        nodes: clones,
        edges: cloned_edges,
        id_map,
    })
}

/// Remove `ids` and cascade to every incident edge
pub fn remove_nodes(nodes: &[Node], edges: &[Edge], ids: &HashSet<NodeId>) -> (Vec<Node>, Vec<Edge>) {
    let kept_nodes = nodes
        .iter()
        .filter(|n| !ids.contains(&n.id))
        .cloned()
        .collect();
    let kept_edges = edges
        .iter()
        .filter(|e| !e.touches_any(ids))
        .cloned()
        .collect();
    (kept_nodes, kept_edges)
}

/// Remove every selected node and its incident edges
///
/// Returns `None` when nothing is selected.
pub fn delete_selected(nodes: &[Node], edges: &[Edge]) -> Option<(Vec<Node>, Vec<Edge>)> {
    let selected: HashSet<NodeId> = nodes
        .iter()
        .filter(|n| n.selected)
        .map(|n| n.id.clone())
        .collect();
    if selected.is_empty() {
        return None;
    }
    Some(remove_nodes(nodes, edges, &selected))
}

/// Replace the data payload of one node
///
/// Id, position, kind, status and selection are left as they are. Returns
/// `None` if no node has `id`.
pub fn replace_node_data(nodes: &[Node], id: &str, data: Value) -> Option<Vec<Node>> {
    let index = nodes.iter().position(|n| n.id == id)?;
    let mut next = nodes.to_vec();
    next[index].data = data;
    Some(next)
}

/// Drop edges whose endpoints are not both present in `nodes`
pub fn prune_dangling_edges(nodes: &[Node], edges: Vec<Edge>) -> (Vec<Edge>, usize) {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let before = edges.len();
    let kept: Vec<Edge> = edges
        .into_iter()
        .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// First node id that appears more than once, if any
pub fn find_duplicate_id(nodes: &[Node]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes
        .iter()
        .map(|n| n.id.as_str())
        .find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::types::NodeKind;
    use serde_json::json;

    fn sample() -> crate::types::Workflow {
        // a -> b -> c, a -> c; a and b selected
        WorkflowBuilder::new()
            .add_node("a", NodeKind::Start, (0.0, 0.0))
            .selected()
            .add_node("b", NodeKind::Task, (10.0, 20.0))
            .with_data(json!({ "label": "Review", "metadata": { "team": "ops" } }))
            .selected()
            .add_node("c", NodeKind::End, (0.0, 200.0))
            .add_edge("a", "b")
            .add_edge("b", "c")
            .add_edge("a", "c")
            .build()
    }

    #[test]
    fn test_duplicate_clones_selected_subgraph() {
        let wf = sample();
        let dup = duplicate_selected(&wf.nodes, &wf.edges, 24.0).unwrap();

        assert_eq!(dup.nodes.len(), 2);
        assert_eq!(dup.edges.len(), 1);

        let new_a = &dup.id_map["a"];
        let new_b = &dup.id_map["b"];
        assert_eq!(&dup.edges[0].source, new_a);
        assert_eq!(&dup.edges[0].target, new_b);
        assert!(!wf.edges.iter().any(|e| e.id == dup.edges[0].id));

        let b_clone = dup.nodes.iter().find(|n| &n.id == new_b).unwrap();
        assert_eq!((b_clone.position.x, b_clone.position.y), (34.0, 44.0));
        assert!(!b_clone.selected);
        assert_eq!(b_clone.data["metadata"]["team"], "ops");
        assert_eq!(b_clone.kind, NodeKind::Task);
    }

    #[test]
    fn test_duplicate_ids_are_globally_unique() {
        let wf = sample();
        let dup = duplicate_selected(&wf.nodes, &wf.edges, 24.0).unwrap();

        let mut all: Vec<&str> = wf.nodes.iter().map(|n| n.id.as_str()).collect();
        all.extend(dup.nodes.iter().map(|n| n.id.as_str()));
        let unique: HashSet<&str> = all.iter().copied().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_duplicate_data_is_independent() {
        let wf = sample();
        let mut dup = duplicate_selected(&wf.nodes, &wf.edges, 24.0).unwrap();
        dup.nodes[1].data["metadata"]["team"] = json!("finance");
        assert_eq!(wf.nodes[1].data["metadata"]["team"], "ops");
    }

    #[test]
    fn test_duplicate_without_selection() {
        let wf = WorkflowBuilder::new()
            .add_node("a", NodeKind::Start, (0.0, 0.0))
            .build();
        assert!(duplicate_selected(&wf.nodes, &wf.edges, 24.0).is_none());
    }

    #[test]
    fn test_delete_selected_cascades() {
        let wf = sample();
        let (nodes, edges) = delete_selected(&wf.nodes, &wf.edges).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "c");
        assert!(edges.is_empty());
    }

    #[test]
    fn test_remove_nodes_leaves_no_dangling_edges() {
        let wf = sample();
        let ids: Vec<&str> = vec!["a", "b", "c"];
        // every subset of the three nodes
        for mask in 0u8..8 {
            let removed: HashSet<NodeId> = ids
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, id)| id.to_string())
                .collect();
            let (nodes, edges) = remove_nodes(&wf.nodes, &wf.edges, &removed);
            assert_eq!(nodes.len(), 3 - removed.len());
            assert!(edges.iter().all(|e| !e.touches_any(&removed)));
        }
    }

    #[test]
    fn test_replace_node_data_keeps_identity() {
        let wf = sample();
        let next = replace_node_data(&wf.nodes, "b", json!({ "label": "Renamed" })).unwrap();
        assert_eq!(next[1].id, "b");
        assert_eq!(next[1].position, wf.nodes[1].position);
        assert_eq!(next[1].label(), "Renamed");
        assert!(replace_node_data(&wf.nodes, "missing", json!({})).is_none());
    }

    #[test]
    fn test_prune_dangling_edges() {
        let wf = WorkflowBuilder::new()
            .add_node("a", NodeKind::Start, (0.0, 0.0))
            .add_node("b", NodeKind::End, (0.0, 0.0))
            .add_edge("a", "b")
            .add_edge("a", "ghost")
            .build();
        let (edges, dropped) = prune_dangling_edges(&wf.nodes, wf.edges.clone());
        assert_eq!(edges.len(), 1);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_find_duplicate_id() {
        let wf = WorkflowBuilder::new()
            .add_node("a", NodeKind::Start, (0.0, 0.0))
            .add_node("a", NodeKind::End, (0.0, 0.0))
            .build();
        assert_eq!(find_duplicate_id(&wf.nodes), Some("a"));
        assert_eq!(find_duplicate_id(&wf.nodes[..1]), None);
    }
}
