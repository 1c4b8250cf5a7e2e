//! Reference simulator
//!
//! Walks the nodes in array order after a short artificial delay and reports
//! one trace step per node. It does not follow edges; the editor's preflight
//! has already vetted the structure.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use smoothwork_engine::{SimulationResponse, Simulator, TraceStep, Workflow};

/// Error reported for payloads that are not a workflow
pub const INVALID_PAYLOAD: &str = "Invalid workflow payload";

const DEFAULT_DELAY: Duration = Duration::from_millis(400);

/// Simulator that echoes the node sequence back as a trace
#[derive(Debug, Clone)]
pub struct MockSimulator {
    delay: Duration,
}

impl MockSimulator {
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }

    /// Override the artificial latency
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Simulate an untyped payload, as received over a JSON boundary
    pub async fn simulate_value(&self, payload: Value) -> SimulationResponse {
        if !payload.get("nodes").is_some_and(Value::is_array) {
            self.wait().await;
            return SimulationResponse::failed(INVALID_PAYLOAD);
        }
        match serde_json::from_value::<Workflow>(payload) {
            Ok(workflow) => self.simulate(workflow).await,
            Err(e) => {
                log::debug!("Rejected simulation payload: {}", e);
                self.wait().await;
                SimulationResponse::failed(INVALID_PAYLOAD)
            }
        }
    }

    async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for MockSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// One step per node, numbered from 1
pub fn build_trace(workflow: &Workflow) -> Vec<TraceStep> {
    workflow
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| TraceStep {
            step: i as u32 + 1,
            node_id: node.id.clone(),
            node_type: node.kind.to_string(),
            message: format!("Executed {} ({})", node.kind, node.label()),
        })
        .collect()
}

#[async_trait]
impl Simulator for MockSimulator {
    async fn simulate(&self, workflow: Workflow) -> SimulationResponse {
        self.wait().await;
        SimulationResponse::ok(build_trace(&workflow))
    }
}
