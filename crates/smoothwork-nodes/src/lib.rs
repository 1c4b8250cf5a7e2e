//! Smoothwork Nodes
//!
//! Everything the editor core treats as an external collaborator but a
//! complete host still needs:
//!
//! - **Catalog**: palette entries for every node kind
//! - **Automations**: the automated-action catalog and the params rebuild
//!   that follows choosing an action
//! - **Simulator**: a reference `Simulator` producing one trace step per node

pub mod automations;
pub mod catalog;
pub mod simulator;

pub use automations::{apply_action, automation_catalog, find_action, ActionRegistration, AutomationAction};
pub use catalog::{palette, NodeDescriptor};
pub use simulator::{build_trace, MockSimulator, INVALID_PAYLOAD};
