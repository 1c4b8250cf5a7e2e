//! Editor events
//!
//! The editor reports what happened after each operation so a host can
//! redraw, show save status, or enable undo/redo controls without polling.

use std::sync::mpsc::Sender;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// Receives editor events
///
/// Hosts implement this over whatever transport they have (a UI bridge, a
/// channel, a log). Delivery failures never affect the editor.
pub trait EventSink: Send + Sync {
    fn send(&self, event: EditorEvent) -> Result<(), EventError>;
}

/// Why an event could not be delivered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// The receiving side is gone
    #[error("Event receiver closed")]
    Closed,
    /// The sink refused the event
    #[error("Event rejected: {0}")]
    Rejected(String),
}

/// Events emitted by an editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// Nodes or edges were replaced
    #[serde(rename_all = "camelCase")]
    GraphChanged { node_count: usize, edge_count: usize },

    /// Re-validation changed at least one status
    #[serde(rename_all = "camelCase")]
    ValidationChanged { invalid_nodes: Vec<NodeId> },

    /// The workflow was persisted
    #[serde(rename_all = "camelCase")]
    Saved { storage_key: String },

    /// Persisting the workflow failed; the live graph is unaffected
    #[serde(rename_all = "camelCase")]
    SaveFailed { storage_key: String, error: String },

    /// Undo/redo availability
    #[serde(rename_all = "camelCase")]
    HistoryChanged { can_undo: bool, can_redo: bool },

    /// A node started its focus flash
    #[serde(rename_all = "camelCase")]
    HighlightStarted { node_id: NodeId },

    /// A focus flash was reverted
    #[serde(rename_all = "camelCase")]
    HighlightCleared { node_id: NodeId },
}

/// Discards every event
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: EditorEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// Keeps every event in memory, mostly for tests
#[derive(Default)]
pub struct VecEventSink {
    events: Mutex<Vec<EditorEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events received so far
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Remove and return the events received so far
    pub fn take(&self) -> Vec<EditorEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.take();
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| EventError::Rejected(e.to_string()))?;
        events.push(event);
        Ok(())
    }
}

impl EventSink for Sender<EditorEvent> {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        Sender::send(self, event).map_err(|_| EventError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_event() -> EditorEvent {
        EditorEvent::HistoryChanged {
            can_undo: true,
            can_redo: false,
        }
    }

    #[test]
    fn test_recording_sink() {
        let recorder = VecEventSink::new();
        recorder.send(history_event()).unwrap();
        assert_eq!(recorder.events(), vec![history_event()]);

        assert_eq!(recorder.take().len(), 1);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = std::sync::mpsc::channel::<EditorEvent>();
        EventSink::send(&tx, history_event()).unwrap();
        assert_eq!(rx.recv().unwrap(), history_event());

        drop(rx);
        assert_eq!(EventSink::send(&tx, history_event()), Err(EventError::Closed));
    }

    #[test]
    fn test_event_wire_format() {
        let event = EditorEvent::SaveFailed {
            storage_key: "wf".to_string(),
            error: "disk full".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "saveFailed");
        assert_eq!(value["storageKey"], "wf");
    }
}
