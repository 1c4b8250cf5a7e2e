//! Simulation collaborator contract
//!
//! The editor never executes a workflow itself. It runs the structural
//! preflight, hands a deep copy to a `Simulator`, and allows only one
//! simulation in flight at a time. The in-flight slot is released when the
//! `PendingSimulation` (or its guard) is dropped, so an abandoned run never
//! wedges the gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{NodeId, Workflow};

/// One executed step reported by a simulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    /// 1-based step number
    pub step: u32,
    pub node_id: NodeId,
    /// Lowercase node kind
    pub node_type: String,
    pub message: String,
}

/// What a simulator hands back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimulationResponse {
    pub fn ok(trace: Vec<TraceStep>) -> Self {
        Self {
            success: true,
            trace,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            trace: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Convert into the trace, or the collaborator's error
    pub fn into_result(self) -> Result<Vec<TraceStep>, SimulationError> {
        if self.success {
            Ok(self.trace)
        } else {
            Err(SimulationError::Collaborator(
                self.error
                    .unwrap_or_else(|| "Simulation failed".to_string()),
            ))
        }
    }
}

/// Errors surfaced when starting or running a simulation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Another simulation has not finished yet
    #[error("A simulation is already running")]
    AlreadyRunning,

    /// The graph failed the structural preflight
    #[error("Workflow is not runnable: {}", .0.join(" "))]
    Preflight(Vec<String>),

    /// The simulator reported failure
    #[error("Simulation failed: {0}")]
    Collaborator(String),
}

/// An external workflow simulator
#[async_trait]
pub trait Simulator: Send + Sync {
    /// Simulate `workflow`, which is the caller's own copy
    async fn simulate(&self, workflow: Workflow) -> SimulationResponse;
}

/// Single-in-flight gate shared by an editor and its pending runs
#[derive(Debug, Clone, Default)]
pub struct SimulationGate {
    running: Arc<AtomicBool>,
}

impl SimulationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the in-flight slot
    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Holds the in-flight slot; released on drop
#[derive(Debug)]
pub struct InFlightGuard {
    running: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// A preflighted workflow waiting to be handed to a simulator
#[derive(Debug)]
pub struct PendingSimulation {
    workflow: Workflow,
    guard: InFlightGuard,
}

impl PendingSimulation {
    pub(crate) fn new(workflow: Workflow, guard: InFlightGuard) -> Self {
        Self { workflow, guard }
    }

    /// The copy that will be simulated
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Run the simulation, releasing the in-flight slot when done
    pub async fn run(self, simulator: &dyn Simulator) -> Result<Vec<TraceStep>, SimulationError> {
        let Self { workflow, guard } = self;
        let node_count = workflow.nodes.len();
        log::debug!("Simulating workflow with {} nodes", node_count);

        let response = simulator.simulate(workflow).await;
        drop(guard);

        match response.into_result() {
            Ok(trace) => {
                log::info!("Simulation finished with {} steps", trace.len());
                Ok(trace)
            }
            Err(e) => {
                log::warn!("{}", e);
                Err(e)
            }
        }
    }
}
