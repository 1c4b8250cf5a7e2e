//! Smoothwork Engine - the workflow graph core
//!
//! This crate keeps a user-edited directed graph of typed nodes consistent
//! across display styling, structural validity, reversible history and
//! persistence. It supports:
//!
//! - Structural validation re-derived after every committed mutation
//! - Compressed snapshot-based undo/redo with replay guarding
//! - Breadth-first auto-layout
//! - Selection duplicate/delete with edge cascade
//! - JSON persistence, import and export
//! - A single-in-flight contract for external simulators
//!
//! # Architecture
//!
//! - `GraphStore`: the canonical node/edge collections, replaced atomically
//! - `UndoHistory`: bounded zstd snapshot stacks
//! - `validation`, `layout`, `transform`: pure functions over nodes and edges
//! - `Editor`: sequences user operations through history, store, validation
//!   and persistence
//! - `EventSink`: generic event streaming to the host
//!
//! # Example
//!
//! ```
//! use smoothwork_engine::{Editor, EditorConfig, NodeKind};
//!
//! let mut editor = Editor::in_memory(EditorConfig::default());
//! editor.hydrate();
//!
//! let start = editor.add_node(NodeKind::Start, (0.0, 0.0));
//! let end = editor.add_node(NodeKind::End, (0.0, 140.0));
//! editor.connect(&start, &end).unwrap();
//!
//! assert!(editor.nodes().iter().all(|n| n.is_valid()));
//! ```

pub mod builder;
pub mod commands;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod events;
pub mod focus;
pub mod layout;
pub mod persistence;
pub mod simulation;
pub mod store;
pub mod transform;
pub mod types;
pub mod undo;
pub mod validation;

// Re-export key types
pub use builder::WorkflowBuilder;
pub use commands::{EditorCommand, FormEvent, KeyChord};
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EngineError, Result};
pub use events::{EditorEvent, EventError, EventSink, NullEventSink, VecEventSink};
pub use focus::{Camera, CameraError, CameraView};
pub use persistence::{FileStore, MemoryStore, WorkflowStore};
pub use simulation::{
    PendingSimulation, SimulationError, SimulationGate, SimulationResponse, Simulator, TraceStep,
};
pub use store::GraphStore;
pub use types::{
    new_id, Edge, EdgeId, Node, NodeId, NodeKind, NodeStatus, Position, StyleHint,
    UnknownNodeKind, Workflow,
};
pub use undo::UndoHistory;
pub use validation::ValidationIssue;
