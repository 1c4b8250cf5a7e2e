//! Editor session
//!
//! `Editor` sequences every user-originated mutation through the same steps:
//!
//! 1. settle any replay that finished since the last operation
//! 2. record the pre-mutation state, if the operation is history-tracked
//! 3. compute the next nodes/edges completely and replace them in one step
//! 4. run the post-mutation hook: re-validate (only applied when a verdict
//!    changed) and persist, both skipped until hydration has completed
//!
//! Work that must happen "later" is queued rather than run inline: the end
//! of an undo/redo replay, and the revert of a focus highlight. Hosts drain
//! the queue with `settle` and `tick`.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::commands::{EditorCommand, FormEvent};
use crate::config::EditorConfig;
use crate::constants::storage::EXPORT_FILE_NAME;
use crate::error::{EngineError, Result};
use crate::events::{EditorEvent, EventSink, NullEventSink};
use crate::focus::{Camera, CameraView};
use crate::layout;
use crate::persistence::{MemoryStore, WorkflowStore};
use crate::simulation::{PendingSimulation, SimulationError, SimulationGate};
use crate::store::GraphStore;
use crate::transform;
use crate::types::{Edge, EdgeId, Node, NodeId, NodeKind, Position, Workflow};
use crate::undo::UndoHistory;
use crate::validation;

/// Queued follow-up work
#[derive(Debug, Clone, PartialEq)]
enum Deferred {
    /// Clear the history replay flag
    EndReplay,
    /// Revert a focus highlight once `due` has passed
    ClearHighlight { node_id: NodeId, due: Instant },
}

/// A single-user editing session over one workflow
pub struct Editor {
    config: EditorConfig,
    graph: GraphStore,
    history: UndoHistory,
    /// Set once the persisted workflow has been loaded
    hydrated: bool,
    store: Arc<dyn WorkflowStore>,
    event_sink: Arc<dyn EventSink>,
    deferred: VecDeque<Deferred>,
    simulations: SimulationGate,
}

impl Editor {
    /// Create an editor backed by `store`
    ///
    /// The editor starts empty and un-hydrated; call `hydrate` before
    /// handing it to a user.
    pub fn new(config: EditorConfig, store: Arc<dyn WorkflowStore>) -> Self {
        Self {
            history: UndoHistory::new(config.history_capacity),
            config,
            graph: GraphStore::new(),
            hydrated: false,
            store,
            event_sink: Arc::new(NullEventSink),
            deferred: VecDeque::new(),
            simulations: SimulationGate::new(),
        }
    }

    /// Create an editor that persists to memory only
    pub fn in_memory(config: EditorConfig) -> Self {
        let store = Arc::new(MemoryStore::new(config.storage_key.clone()));
        Self::new(config, store)
    }

    /// Route editor events to `sink`
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.graph.node(id)
    }

    /// Deep copy of the live workflow, for external collaborators
    pub fn workflow(&self) -> Workflow {
        self.graph.workflow().clone()
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Whether an undo/redo replay has not been settled yet
    pub fn is_replaying(&self) -> bool {
        self.history.is_replaying()
    }

    pub fn simulation_running(&self) -> bool {
        self.simulations.is_running()
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Load the persisted workflow and open the hydration gate
    ///
    /// A missing or unreadable saved workflow leaves the current graph in
    /// place. The result is validated, and saved back only when validation
    /// changed it. Returns whether a saved workflow was restored.
    pub fn hydrate(&mut self) -> bool {
        if self.hydrated {
            return false;
        }

        let key = self.store.storage_key().to_string();
        let restored = match self.store.load().and_then(sanitize) {
            Ok(Some(workflow)) => {
                log::info!(
                    "Hydrated workflow '{}' ({} nodes, {} edges)",
                    key,
                    workflow.nodes.len(),
                    workflow.edges.len()
                );
                self.graph.replace_workflow(workflow);
                true
            }
            Ok(None) => {
                log::info!("No saved workflow under '{}'", key);
                false
            }
            Err(e) => {
                log::warn!("Ignoring saved workflow '{}': {}", key, e);
                false
            }
        };

        self.hydrated = true;
        self.emit_graph_changed();
        if self.revalidate() {
            self.persist();
        }
        restored
    }

    // =========================================================================
    // Graph mutations
    // =========================================================================

    /// Drop a new node of `kind` onto the canvas
    pub fn add_node(&mut self, kind: NodeKind, position: impl Into<Position>) -> NodeId {
        self.settle();
        let node = Node::new(kind, position);
        let id = node.id.clone();

        self.record_history();
        let mut nodes = self.graph.nodes().to_vec();
        nodes.push(node);
        self.graph.replace_nodes(nodes);
        log::debug!("Added {} node {}", kind, id);

        self.commit();
        id
    }

    /// Connect `source` to `target`
    ///
    /// Returns `None` without recording history if the same connection
    /// already exists.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<Option<EdgeId>> {
        self.settle();
        for id in [source, target] {
            if !self.graph.contains(id) {
                return Err(EngineError::UnknownNode(id.to_string()));
            }
        }
        if self
            .graph
            .edges()
            .iter()
            .any(|e| e.source == source && e.target == target)
        {
            log::debug!("Edge {} -> {} already exists", source, target);
            return Ok(None);
        }

        let edge = Edge::new(source, target);
        let id = edge.id.clone();

        self.record_history();
        let mut edges = self.graph.edges().to_vec();
        edges.push(edge);
        self.graph.replace_edges(edges);
        log::debug!("Connected {} -> {}", source, target);

        self.commit();
        Ok(Some(id))
    }

    /// Remove edges by id; returns how many were removed
    pub fn remove_edges(&mut self, ids: &[EdgeId]) -> usize {
        self.settle();
        let remove: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let kept: Vec<Edge> = self
            .graph
            .edges()
            .iter()
            .filter(|e| !remove.contains(e.id.as_str()))
            .cloned()
            .collect();

        let removed = self.graph.edges().len() - kept.len();
        if removed == 0 {
            return 0;
        }

        self.record_history();
        self.graph.replace_edges(kept);
        log::debug!("Removed {} edges", removed);

        self.commit();
        removed
    }

    /// Reposition a node; not recorded in history
    pub fn move_node(&mut self, id: &str, position: impl Into<Position>) -> Result<()> {
        self.settle();
        let position = position.into();
        let nodes = self.updated_nodes(id, |n| n.position = position)?;
        self.graph.replace_nodes(nodes);
        self.commit();
        Ok(())
    }

    /// Make `ids` the selection, deselecting everything else
    pub fn select(&mut self, ids: &[NodeId]) {
        self.settle();
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        if self
            .graph
            .nodes()
            .iter()
            .all(|n| n.selected == wanted.contains(n.id.as_str()))
        {
            return;
        }

        let nodes = self
            .graph
            .nodes()
            .iter()
            .map(|n| {
                let mut node = n.clone();
                node.selected = wanted.contains(n.id.as_str());
                node
            })
            .collect();
        self.graph.replace_nodes(nodes);
        self.commit();
    }

    /// Set one node's selection flag
    pub fn set_selected(&mut self, id: &str, selected: bool) -> Result<()> {
        self.settle();
        let current = self
            .graph
            .node(id)
            .ok_or_else(|| EngineError::UnknownNode(id.to_string()))?;
        if current.selected == selected {
            return Ok(());
        }

        let nodes = self.updated_nodes(id, |n| n.selected = selected)?;
        self.graph.replace_nodes(nodes);
        self.commit();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.select(&[]);
    }

    /// Replace a node's data payload
    pub fn edit_node(&mut self, id: &str, data: Value) -> Result<()> {
        self.settle();
        let nodes = transform::replace_node_data(self.graph.nodes(), id, data)
            .ok_or_else(|| EngineError::UnknownNode(id.to_string()))?;

        self.record_history();
        self.graph.replace_nodes(nodes);
        log::debug!("Edited node {}", id);

        self.commit();
        Ok(())
    }

    /// Delete a node together with its incident edges
    pub fn delete_node(&mut self, id: &str) -> Result<()> {
        self.settle();
        if !self.graph.contains(id) {
            return Err(EngineError::UnknownNode(id.to_string()));
        }

        let ids: HashSet<NodeId> = std::iter::once(id.to_string()).collect();
        let (nodes, edges) = transform::remove_nodes(self.graph.nodes(), self.graph.edges(), &ids);

        self.record_history();
        self.graph.replace_workflow(Workflow::new(nodes, edges));
        log::debug!("Deleted node {}", id);

        self.commit();
        Ok(())
    }

    /// Apply a message from the property form
    pub fn apply_form_event(&mut self, event: FormEvent) -> Result<()> {
        match event {
            FormEvent::Edit { id, data } => self.edit_node(&id, data),
            FormEvent::Delete { id } => self.delete_node(&id),
        }
    }

    /// Duplicate the selection; returns the ids of the clones
    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        self.settle();
        let Some(duplication) = transform::duplicate_selected(
            self.graph.nodes(),
            self.graph.edges(),
            self.config.duplicate_offset,
        ) else {
            log::debug!("Nothing selected to duplicate");
            return Vec::new();
        };

        let ids: Vec<NodeId> = duplication.nodes.iter().map(|n| n.id.clone()).collect();

        self.record_history();
        let mut workflow = self.graph.workflow().clone();
        workflow.nodes.extend(duplication.nodes);
        workflow.edges.extend(duplication.edges);
        self.graph.replace_workflow(workflow);
        log::debug!("Duplicated {} nodes", ids.len());

        self.commit();
        ids
    }

    /// Delete the selection; returns how many nodes were removed
    pub fn delete_selected(&mut self) -> usize {
        self.settle();
        let Some((nodes, edges)) = transform::delete_selected(self.graph.nodes(), self.graph.edges())
        else {
            log::debug!("Nothing selected to delete");
            return 0;
        };

        let removed = self.graph.nodes().len() - nodes.len();

        self.record_history();
        self.graph.replace_workflow(Workflow::new(nodes, edges));
        log::debug!("Deleted {} selected nodes", removed);

        self.commit();
        removed
    }

    /// Arrange nodes by BFS level; returns false for an empty graph
    pub fn auto_layout(&mut self) -> bool {
        self.settle();
        if self.graph.nodes().is_empty() {
            return false;
        }

        let nodes = layout::auto_layout(self.graph.nodes(), self.graph.edges());

        self.record_history();
        self.graph.replace_nodes(nodes);
        log::debug!("Auto-layout applied to {} nodes", self.graph.nodes().len());

        self.commit();
        true
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Restore the previous snapshot; returns false if there is none
    pub fn undo(&mut self) -> Result<bool> {
        self.settle();
        let Some(previous) = self.history.undo(self.graph.workflow())? else {
            return Ok(false);
        };
        log::debug!("Undo");
        self.apply_replay(previous);
        Ok(true)
    }

    /// Re-apply the last undone snapshot; returns false if there is none
    pub fn redo(&mut self) -> Result<bool> {
        self.settle();
        let Some(next) = self.history.redo(self.graph.workflow())? else {
            return Ok(false);
        };
        log::debug!("Redo");
        self.apply_replay(next);
        Ok(true)
    }

    fn apply_replay(&mut self, workflow: Workflow) {
        self.graph.replace_workflow(workflow);
        self.deferred.push_back(Deferred::EndReplay);
        self.emit_history_changed();
        self.commit();
    }

    // =========================================================================
    // Import / export
    // =========================================================================

    /// Replace the whole graph through the loader path
    ///
    /// Duplicate node ids are rejected; edges referencing missing nodes
    /// are dropped. Recorded in history.
    pub fn load_workflow(&mut self, workflow: Workflow) -> Result<()> {
        let workflow = sanitize(Some(workflow))?.unwrap_or_default();
        self.settle();

        self.record_history();
        log::info!(
            "Loading workflow ({} nodes, {} edges)",
            workflow.nodes.len(),
            workflow.edges.len()
        );
        self.graph.replace_workflow(workflow);

        self.commit();
        Ok(())
    }

    /// Parse `text` as a workflow and load it
    ///
    /// On a parse error the graph and history are left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let workflow: Workflow =
            serde_json::from_str(text).map_err(|e| EngineError::import(e.to_string()))?;
        self.load_workflow(workflow)
    }

    /// Pretty-printed workflow, as offered for download
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.graph.workflow())?)
    }

    /// Write the export into `dir` and return the file path
    pub fn export_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(EXPORT_FILE_NAME);
        std::fs::write(&path, self.export_json()?)?;
        log::info!("Exported workflow to {:?}", path);
        Ok(path)
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Center the camera on a node (when available) and flash it
    pub fn focus(&mut self, id: &str, camera: Option<&mut dyn Camera>) -> Result<()> {
        self.focus_at(id, camera, Instant::now())
    }

    /// `focus` with an explicit clock reading
    pub fn focus_at(&mut self, id: &str, camera: Option<&mut dyn Camera>, now: Instant) -> Result<()> {
        let position = self
            .graph
            .node(id)
            .map(|n| n.position)
            .ok_or_else(|| EngineError::UnknownNode(id.to_string()))?;

        if let Some(camera) = camera {
            if let Err(e) = camera.set_center(position.x, position.y, CameraView::default()) {
                log::debug!("Camera could not center on {}: {}", id, e);
            }
        }

        let nodes = self.updated_nodes(id, |n| n.highlighted = true)?;
        self.graph.replace_nodes(nodes);
        self.deferred.push_back(Deferred::ClearHighlight {
            node_id: id.to_string(),
            due: now + self.config.highlight_duration(),
        });
        self.emit(EditorEvent::HighlightStarted {
            node_id: id.to_string(),
        });
        Ok(())
    }

    // =========================================================================
    // Deferred work
    // =========================================================================

    /// Finish a pending undo/redo replay
    pub fn settle(&mut self) {
        let before = self.deferred.len();
        self.deferred.retain(|task| *task != Deferred::EndReplay);
        if self.deferred.len() != before {
            self.history.finish_replay();
            log::trace!("Replay settled");
        }
    }

    /// Run all queued work that is due at `now`
    pub fn tick(&mut self, now: Instant) {
        self.settle();

        let (ready, waiting): (Vec<Deferred>, Vec<Deferred>) = self
            .deferred
            .drain(..)
            .partition(|task| matches!(task, Deferred::ClearHighlight { due, .. } if *due <= now));
        self.deferred = waiting.into();

        for task in ready {
            if let Deferred::ClearHighlight { node_id, .. } = task {
                self.clear_highlight(&node_id);
            }
        }
    }

    /// Earliest pending highlight revert, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred
            .iter()
            .filter_map(|task| match task {
                Deferred::ClearHighlight { due, .. } => Some(*due),
                Deferred::EndReplay => None,
            })
            .min()
    }

    fn clear_highlight(&mut self, node_id: &str) {
        let Some(index) = self
            .graph
            .nodes()
            .iter()
            .position(|n| n.id == node_id && n.highlighted)
        else {
            log::trace!("Highlight target {} no longer highlighted", node_id);
            return;
        };

        let mut nodes = self.graph.nodes().to_vec();
        nodes[index].highlighted = false;
        self.graph.replace_nodes(nodes);
        self.emit(EditorEvent::HighlightCleared {
            node_id: node_id.to_string(),
        });
    }

    // =========================================================================
    // Commands and simulation
    // =========================================================================

    /// Run a keyboard-driven command
    pub fn dispatch(&mut self, command: EditorCommand) -> Result<()> {
        match command {
            EditorCommand::Undo => {
                self.undo()?;
            }
            EditorCommand::Redo => {
                self.redo()?;
            }
            EditorCommand::DuplicateSelected => {
                self.duplicate_selected();
            }
            EditorCommand::DeleteSelected => {
                self.delete_selected();
            }
            EditorCommand::AutoLayout => {
                self.auto_layout();
            }
        }
        Ok(())
    }

    /// Preflight the graph and reserve the simulation slot
    ///
    /// The returned value owns a copy of the workflow and keeps the slot
    /// until it is run or dropped.
    pub fn start_simulation(&self) -> std::result::Result<PendingSimulation, SimulationError> {
        let guard = self
            .simulations
            .try_acquire()
            .ok_or(SimulationError::AlreadyRunning)?;

        let issues = validation::preflight(self.graph.workflow());
        if !issues.is_empty() {
            let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
            log::info!("Simulation refused: {}", messages.join(" "));
            return Err(SimulationError::Preflight(messages));
        }

        Ok(PendingSimulation::new(self.workflow(), guard))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn updated_nodes(&self, id: &str, update: impl FnOnce(&mut Node)) -> Result<Vec<Node>> {
        let index = self
            .graph
            .nodes()
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| EngineError::UnknownNode(id.to_string()))?;
        let mut nodes = self.graph.nodes().to_vec();
        update(&mut nodes[index]);
        Ok(nodes)
    }

    fn record_history(&mut self) {
        if self.history.push(self.graph.nodes(), self.graph.edges()) {
            self.emit_history_changed();
        }
    }

    /// Post-mutation hook
    fn commit(&mut self) {
        self.emit_graph_changed();
        if !self.hydrated {
            log::trace!("Skipping validation and save before hydration");
            return;
        }
        self.revalidate();
        self.persist();
    }

    /// Apply fresh verdicts if any changed; returns whether they did
    fn revalidate(&mut self) -> bool {
        let validated = validation::validate(self.graph.nodes(), self.graph.edges());
        if !validation::needs_update(self.graph.nodes(), &validated) {
            return false;
        }

        let invalid_nodes = validation::invalid_node_ids(&validated);
        self.graph.replace_nodes(validated);
        self.emit(EditorEvent::ValidationChanged { invalid_nodes });
        true
    }

    fn persist(&self) {
        let storage_key = self.store.storage_key().to_string();
        match self.store.save(self.graph.workflow()) {
            Ok(()) => self.emit(EditorEvent::Saved { storage_key }),
            Err(e) => {
                log::warn!("Failed to save workflow '{}': {}", storage_key, e);
                self.emit(EditorEvent::SaveFailed {
                    storage_key,
                    error: e.to_string(),
                });
            }
        }
    }

    fn emit_graph_changed(&self) {
        self.emit(EditorEvent::GraphChanged {
            node_count: self.graph.nodes().len(),
            edge_count: self.graph.edges().len(),
        });
    }

    fn emit_history_changed(&self) {
        self.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit(&self, event: EditorEvent) {
        if let Err(e) = self.event_sink.send(event) {
            log::trace!("Dropped editor event: {}", e);
        }
    }
}

/// Check a workflow coming from outside before it replaces the graph
fn sanitize(workflow: Option<Workflow>) -> Result<Option<Workflow>> {
    let Some(workflow) = workflow else {
        return Ok(None);
    };
    if let Some(id) = transform::find_duplicate_id(&workflow.nodes) {
        return Err(EngineError::import(format!("duplicate node id '{}'", id)));
    }

    let Workflow { nodes, edges } = workflow;
    let (edges, dropped) = transform::prune_dangling_edges(&nodes, edges);
    if dropped > 0 {
        log::warn!("Dropped {} edges referencing missing nodes", dropped);
    }
    Ok(Some(Workflow::new(nodes, edges)))
}
