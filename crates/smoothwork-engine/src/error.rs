//! Error types for the workflow graph engine

use thiserror::Error;

use crate::types::NodeId;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur in the graph engine
///
/// None of these leave the live graph partially mutated: every operation
/// computes its next state fully before replacing anything.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Serialization error (snapshots, persistence, export)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot compression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// Operation referenced a node that is not in the graph
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Imported text could not be turned into a workflow
    #[error("Import failed: {0}")]
    Import(String),

    /// Persistence adapter failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create an import error with a message
    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }

    /// Create a persistence error with a message
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
