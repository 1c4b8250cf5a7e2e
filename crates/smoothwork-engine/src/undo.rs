//! Undo/redo history using compressed snapshots
//!
//! Every snapshot is the workflow serialized to JSON and compressed with
//! zstd, so a captured entry can never alias a live node or edge.
//!
//! The history keeps two stacks. Pushing a new pre-mutation state clears
//! the redo stack; only the undo stack is bounded, evicting its oldest
//! entry first.
//!
//! While a replay (undo or redo) is being applied, `push` is a no-op. The
//! owner of the history ends the replay with `finish_replay` once every
//! consumer of the replaced state has settled.

use std::collections::VecDeque;

use serde::Serialize;

use crate::constants::history::COMPRESSION_LEVEL;
use crate::error::{EngineError, Result};
use crate::types::{Edge, Node, Workflow};

/// Borrowed view used to encode a snapshot without cloning the graph
#[derive(Serialize)]
struct SnapshotRef<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
}

/// Bounded undo/redo stacks of compressed snapshots
pub struct UndoHistory {
    /// Pre-mutation states, oldest first
    undo: VecDeque<Vec<u8>>,
    /// States undone, most recent last
    redo: Vec<Vec<u8>>,
    /// Maximum number of undo snapshots to keep
    capacity: usize,
    /// Set while a replayed state is being applied
    replaying: bool,
}

impl UndoHistory {
    /// Create a history with the given undo capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
            replaying: false,
        }
    }

    /// Record a pre-mutation state
    ///
    /// Returns whether a snapshot was recorded. Nothing is recorded while a
    /// replay is in progress, and an encoding failure is logged and skipped.
    pub fn push(&mut self, nodes: &[Node], edges: &[Edge]) -> bool {
        if self.replaying {
            log::trace!("Ignoring history push during replay");
            return false;
        }

        let snapshot = match encode(nodes, edges) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Skipping history snapshot: {}", e);
                return false;
            }
        };

        self.undo.push_back(snapshot);
        self.evict_overflow();
        self.redo.clear();
        true
    }

    /// Step back one snapshot
    ///
    /// `current` is captured onto the redo stack. Returns the state to
    /// apply, or `None` when there is nothing to undo. On error neither
    /// stack changes.
    pub fn undo(&mut self, current: &Workflow) -> Result<Option<Workflow>> {
        let Some(top) = self.undo.back() else {
            return Ok(None);
        };
        let previous = decode(top)?;
        let current = encode(&current.nodes, &current.edges)?;

        self.undo.pop_back();
        self.redo.push(current);
        self.replaying = true;
        Ok(Some(previous))
    }

    /// Step forward one snapshot
    ///
    /// `current` is captured onto the undo stack. Returns the state to
    /// apply, or `None` when there is nothing to redo.
    pub fn redo(&mut self, current: &Workflow) -> Result<Option<Workflow>> {
        let Some(top) = self.redo.last() else {
            return Ok(None);
        };
        let next = decode(top)?;
        let current = encode(&current.nodes, &current.edges)?;

        self.redo.pop();
        self.undo.push_back(current);
        self.evict_overflow();
        self.replaying = true;
        Ok(Some(next))
    }

    /// End the replay started by `undo` or `redo`
    pub fn finish_replay(&mut self) {
        self.replaying = false;
    }

    /// Whether a replayed state is still being applied
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear both stacks
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Get the total compressed size of all snapshots
    pub fn compressed_size(&self) -> usize {
        self.undo.iter().chain(self.redo.iter()).map(|s| s.len()).sum()
    }

    fn evict_overflow(&mut self) {
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(crate::constants::history::CAPACITY)
    }
}

fn encode(nodes: &[Node], edges: &[Edge]) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(&SnapshotRef { nodes, edges })?;
    zstd::encode_all(&json[..], COMPRESSION_LEVEL).map_err(|e| EngineError::Compression(e.to_string()))
}

fn decode(compressed: &[u8]) -> Result<Workflow> {
    let json =
        zstd::decode_all(compressed).map_err(|e| EngineError::Compression(e.to_string()))?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeKind, Position};
    use serde_json::json;

    fn make_graph(label: &str) -> Workflow {
        let mut node = Node::with_id("node1", NodeKind::Task, (0.0, 0.0));
        node.data = json!({ "label": label });
        Workflow::new(vec![node], vec![])
    }

    fn label_of(workflow: &Workflow) -> &str {
        workflow.nodes[0].label()
    }

    #[test]
    fn test_push_and_undo() {
        let mut history = UndoHistory::new(10);
        let first = make_graph("first");
        let second = make_graph("second");
        let third = make_graph("third");

        history.push(&first.nodes, &first.edges);
        history.push(&second.nodes, &second.edges);

        let undone = history.undo(&third).unwrap().unwrap();
        assert_eq!(label_of(&undone), "second");
        history.finish_replay();

        let undone = history.undo(&undone).unwrap().unwrap();
        assert_eq!(label_of(&undone), "first");
        history.finish_replay();

        assert!(history.undo(&undone).unwrap().is_none());
    }

    #[test]
    fn test_redo_restores_state_captured_by_undo() {
        let mut history = UndoHistory::new(10);
        let before = make_graph("before");
        let after = make_graph("after");

        history.push(&before.nodes, &before.edges);
        let undone = history.undo(&after).unwrap().unwrap();
        assert_eq!(undone, before);
        history.finish_replay();

        let redone = history.redo(&undone).unwrap().unwrap();
        assert_eq!(redone, after);
        history.finish_replay();

        assert!(history.redo(&redone).unwrap().is_none());
        assert!(history.can_undo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = UndoHistory::new(10);
        let first = make_graph("first");
        let second = make_graph("second");

        history.push(&first.nodes, &first.edges);
        history.undo(&second).unwrap();
        history.finish_replay();
        assert!(history.can_redo());

        history.push(&first.nodes, &first.edges);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_ignored_during_replay() {
        let mut history = UndoHistory::new(10);
        let first = make_graph("first");
        let second = make_graph("second");

        history.push(&first.nodes, &first.edges);
        history.undo(&second).unwrap();
        assert!(history.is_replaying());

        assert!(!history.push(&second.nodes, &second.edges));
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);

        history.finish_replay();
        assert!(history.push(&second.nodes, &second.edges));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = UndoHistory::new(3);
        for i in 0..5 {
            let graph = make_graph(&format!("graph_{}", i));
            history.push(&graph.nodes, &graph.edges);
        }
        assert_eq!(history.undo_len(), 3);

        let mut current = make_graph("live");
        let mut seen = Vec::new();
        while let Some(previous) = history.undo(&current).unwrap() {
            history.finish_replay();
            seen.push(label_of(&previous).to_string());
            current = previous;
        }
        assert_eq!(seen, vec!["graph_4", "graph_3", "graph_2"]);
    }

    #[test]
    fn test_snapshot_is_independent_of_live_graph() {
        let mut history = UndoHistory::new(10);
        let mut live = make_graph("original");
        history.push(&live.nodes, &live.edges);

        live.nodes[0].data["label"] = json!("mutated");
        live.nodes[0].position.x = 500.0;

        let restored = history.undo(&live).unwrap().unwrap();
        assert_eq!(label_of(&restored), "original");
        assert_eq!(restored.nodes[0].position.x, 0.0);
    }

    #[test]
    fn test_can_undo_redo() {
        let mut history = UndoHistory::default();
        assert_eq!(history.capacity(), 60);
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        let graph = make_graph("first");
        history.push(&graph.nodes, &graph.edges);
        assert!(history.can_undo());
        assert!(history.compressed_size() > 0);

        history.clear();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_snapshot_floats_are_bit_exact() {
        let mut history = UndoHistory::new(10);
        let mut graph = make_graph("first");
        graph.nodes[0].position = Position::new(72.83369356103547, 496.45120045017444);
        history.push(&graph.nodes, &graph.edges);

        let restored = history.undo(&make_graph("second")).unwrap().unwrap();
        assert_eq!(restored, graph);
    }
}
