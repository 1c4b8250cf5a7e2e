//! Automated action catalog
//!
//! Actions are registered at link time with `inventory::submit!`, so adding
//! one is a single declaration next to its definition:
//!
//! ```ignore
//! inventory::submit!(smoothwork_nodes::ActionRegistration {
//!     order: 30,
//!     id: "post_webhook",
//!     label: "Post Webhook",
//!     params: &["url", "body"],
//! });
//! ```
//!
//! An Automated node's `params` map always mirrors the parameter names of
//! its chosen action.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Link-time registration of an automated action
pub struct ActionRegistration {
    /// Sort key for catalog listings
    pub order: u32,
    /// Stable action identifier stored in `actionId`
    pub id: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Parameter names, in form order
    pub params: &'static [&'static str],
}

inventory::collect!(ActionRegistration);

inventory::submit!(ActionRegistration {
    order: 10,
    id: "send_email",
    label: "Send Email",
    params: &["to", "subject"],
});

inventory::submit!(ActionRegistration {
    order: 20,
    id: "generate_doc",
    label: "Generate Document",
    params: &["template", "user"],
});

/// An action as offered to hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationAction {
    pub id: String,
    pub label: String,
    pub params: Vec<String>,
}

impl From<&ActionRegistration> for AutomationAction {
    fn from(reg: &ActionRegistration) -> Self {
        Self {
            id: reg.id.to_string(),
            label: reg.label.to_string(),
            params: reg.params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// All registered actions, in catalog order
pub fn automation_catalog() -> Vec<AutomationAction> {
    let mut registrations: Vec<&ActionRegistration> =
        inventory::iter::<ActionRegistration>.into_iter().collect();
    registrations.sort_by_key(|reg| (reg.order, reg.id));
    registrations.into_iter().map(AutomationAction::from).collect()
}

pub fn find_action(id: &str) -> Option<AutomationAction> {
    inventory::iter::<ActionRegistration>
        .into_iter()
        .find(|reg| reg.id == id)
        .map(AutomationAction::from)
}

/// Point an Automated node's data at `action_id`
///
/// `params` is rebuilt to hold exactly the action's parameter names. Values
/// already present for those names are kept, new ones default to `""`. An
/// unknown action leaves `params` empty. Every other key is untouched.
pub fn apply_action(data: &Value, action_id: &str) -> Value {
    let mut next = match data {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let previous = next.get("params").and_then(Value::as_object).cloned().unwrap_or_default();
    let params: Map<String, Value> = match find_action(action_id) {
        Some(action) => action
            .params
            .into_iter()
            .map(|name| {
                let value = previous
                    .get(&name)
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new()));
                (name, value)
            })
            .collect(),
        None => {
            if !action_id.is_empty() {
                log::debug!("Unknown automated action '{}'", action_id);
            }
            Map::new()
        }
    };

    next.insert("actionId".to_string(), Value::String(action_id.to_string()));
    next.insert("params".to_string(), Value::Object(params));
    Value::Object(next)
}
