//! Breadth-first auto-layout
//!
//! Nodes are leveled by BFS from every root (node without an incoming edge)
//! at once; a node takes the level of whichever predecessor reaches it
//! first. Nodes never reached (for example a cycle with no root) sit on
//! level 0. Within a level, nodes keep their order in the node sequence.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::constants::layout::{HORIZONTAL_SPACING, VERTICAL_SPACING, X_OFFSET, Y_OFFSET};
use crate::types::{Edge, Node, Position};

/// Compute the BFS level of every node
pub fn assign_levels<'a>(nodes: &'a [Node], edges: &'a [Edge]) -> HashMap<&'a str, usize> {
    let mut adjacency: HashMap<&str, Vec<&str>> = nodes
        .iter()
        .map(|n| (n.id.as_str(), Vec::new()))
        .collect();
    for edge in edges {
        if let Some(targets) = adjacency.get_mut(edge.source.as_str()) {
            targets.push(edge.target.as_str());
        }
    }

    let has_incoming: HashSet<&str> = edges.iter().map(|e| e.target.as_str()).collect();

    let mut levels: HashMap<&str, usize> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for root in nodes.iter().filter(|n| !has_incoming.contains(n.id.as_str())) {
        levels.insert(&root.id, 0);
        queue.push_back(&root.id);
    }

    while let Some(current) = queue.pop_front() {
        let next_level = levels[current] + 1;
        for &next in adjacency.get(current).into_iter().flatten() {
            if !adjacency.contains_key(next) || levels.contains_key(next) {
                continue;
            }
            levels.insert(next, next_level);
            queue.push_back(next);
        }
    }

    for node in nodes {
        levels.entry(&node.id).or_insert(0);
    }
    levels
}

/// Reposition every node by level; everything but `position` is untouched
pub fn auto_layout(nodes: &[Node], edges: &[Edge]) -> Vec<Node> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let levels = assign_levels(nodes, edges);
    let mut slots: HashMap<usize, usize> = HashMap::new();

    nodes
        .iter()
        .map(|n| {
            let level = levels.get(n.id.as_str()).copied().unwrap_or(0);
            let slot = slots.entry(level).or_insert(0);
            let index = *slot;
            *slot += 1;

            let mut node = n.clone();
            node.position = Position::new(
                index as f64 * HORIZONTAL_SPACING + X_OFFSET,
                level as f64 * VERTICAL_SPACING + Y_OFFSET,
            );
            node
        })
        .collect()
}
