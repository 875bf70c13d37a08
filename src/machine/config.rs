//! Declarative JSON format for machine definitions.
//!
//! ```json
//! {
//!   "id": "toggle",
//!   "initial": "off",
//!   "context": { "count": 0 },
//!   "states": {
//!     "off": { "on": { "TOGGLE": "on" } },
//!     "on": {
//!       "entry": "increment",
//!       "on": { "TOGGLE": { "target": "off", "cond": "canStop" } }
//!     }
//!   }
//! }
//! ```
//!
//! Actions and guards are referenced by name and resolved against the
//! registry when the machine is built.

use crate::core::Context;
use crate::effects::{ActionRef, GuardRef};
use crate::machine::node::{MachineDefinition, MachineOptions, StateNode, Transition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single action name or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionList {
    One(String),
    Many(Vec<String>),
}

impl Default for ActionList {
    fn default() -> Self {
        ActionList::Many(Vec::new())
    }
}

impl ActionList {
    fn into_refs(self) -> Vec<ActionRef> {
        match self {
            ActionList::One(name) => vec![ActionRef::Named(name)],
            ActionList::Many(names) => names.into_iter().map(ActionRef::Named).collect(),
        }
    }
}

/// One transition in object form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, alias = "guard", skip_serializing_if = "Option::is_none")]
    pub cond: Option<String>,

    #[serde(default)]
    pub actions: ActionList,
}

/// The forms an `on` entry may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionsConfig {
    /// `"FOCUS": "focused"`
    Target(String),
    One(TransitionConfig),
    Many(Vec<TransitionConfig>),
}

impl TransitionsConfig {
    fn into_transitions(self) -> Vec<Transition> {
        let configs = match self {
            TransitionsConfig::Target(target) => vec![TransitionConfig {
                target: Some(target),
                ..TransitionConfig::default()
            }],
            TransitionsConfig::One(config) => vec![config],
            TransitionsConfig::Many(configs) => configs,
        };
        configs
            .into_iter()
            .map(|config| Transition {
                target: config.target,
                guard: config.cond.map(GuardRef::Named),
                actions: config.actions.into_refs(),
            })
            .collect()
    }
}

/// A state node in declarative form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Global `#id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub body: StateBody,
}

/// Everything a state declares apart from its `#id`.
///
/// The machine root uses this directly: its `"id"` key names the machine,
/// so the root cannot carry a `#id` of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,

    #[serde(default)]
    pub entry: ActionList,

    #[serde(default)]
    pub exit: ActionList,

    #[serde(default)]
    pub on: BTreeMap<String, TransitionsConfig>,

    #[serde(default)]
    pub states: BTreeMap<String, StateConfig>,
}

impl StateBody {
    fn into_node(self, key: String, id: Option<String>) -> StateNode {
        let mut node = StateNode {
            key,
            id,
            initial: self.initial,
            entry: self.entry.into_refs(),
            exit: self.exit.into_refs(),
            on: Vec::new(),
            states: self
                .states
                .into_iter()
                .map(|(key, child)| child.body.into_node(key, child.id))
                .collect(),
        };
        for (event, transitions) in self.on {
            node.add_transitions(event, transitions.into_transitions());
        }
        node
    }
}

/// A whole machine in declarative form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub id: String,

    #[serde(default)]
    pub context: Context,

    #[serde(default)]
    pub options: MachineOptions,

    #[serde(flatten)]
    pub root: StateBody,
}

impl MachineConfig {
    pub fn into_definition(self) -> MachineDefinition {
        MachineDefinition {
            root: self.root.into_node(self.id, None),
            context: self.context,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_transition_form() {
        let config: MachineConfig = serde_json::from_value(json!({
            "id": "field",
            "initial": "idle",
            "context": { "filter": "" },
            "states": {
                "idle": { "on": { "GO": "busy" } },
                "busy": {
                    "entry": "start",
                    "exit": ["stop", "log"],
                    "on": {
                        "DONE": { "target": "idle", "actions": "finish" },
                        "TRY": [
                            { "target": "idle", "cond": "ready" },
                            { "actions": ["retry"] }
                        ]
                    }
                }
            }
        }))
        .unwrap();

        let definition = config.into_definition();
        let root = &definition.root;
        assert_eq!(root.key, "field");
        assert_eq!(root.initial.as_deref(), Some("idle"));
        assert_eq!(definition.context.get_text("filter"), Some(""));

        let busy = root.states.iter().find(|s| s.key == "busy").unwrap();
        assert_eq!(busy.entry.len(), 1);
        assert_eq!(busy.exit.len(), 2);

        let (_, tries) = busy.on.iter().find(|(e, _)| e == "TRY").unwrap();
        assert_eq!(tries.len(), 2);
        assert!(matches!(&tries[0].guard, Some(GuardRef::Named(n)) if n == "ready"));
        assert!(tries[1].target.is_none());

        let idle = root.states.iter().find(|s| s.key == "idle").unwrap();
        assert_eq!(idle.on[0].1[0].target.as_deref(), Some("busy"));
    }

    #[test]
    fn guard_is_accepted_as_alias_for_cond() {
        let config: TransitionConfig =
            serde_json::from_value(json!({ "target": "x", "guard": "ok" })).unwrap();
        assert_eq!(config.cond.as_deref(), Some("ok"));
    }

    #[test]
    fn options_are_optional() {
        let config: MachineConfig =
            serde_json::from_value(json!({ "id": "m", "options": { "unknown_actions": "skip" } }))
                .unwrap();
        assert_eq!(
            config.options.unknown_actions,
            crate::machine::UnknownActionPolicy::Skip
        );
        assert!(config.root.states.is_empty());
    }

    #[test]
    fn machine_id_is_written_once_and_child_ids_survive() {
        let config: MachineConfig = serde_json::from_value(json!({
            "id": "field",
            "initial": "idle",
            "states": {
                "idle": { "id": "start", "on": { "GO": "#start" } }
            }
        }))
        .unwrap();
        assert_eq!(config.root.states["idle"].id.as_deref(), Some("start"));

        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(text.matches("\"id\"").count(), 2);

        let reread: MachineConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(reread, config);

        let definition = reread.into_definition();
        assert_eq!(definition.root.key, "field");
        assert!(definition.root.id.is_none());
        assert_eq!(definition.root.states[0].id.as_deref(), Some("start"));
    }
}
