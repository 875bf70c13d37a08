//! Declarative description of a state tree, before validation.

use crate::core::Context;
use crate::effects::{ActionRef, GuardRef};
use serde::{Deserialize, Serialize};

/// What to do with action names missing from the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownActionPolicy {
    /// Fail machine construction.
    #[default]
    Reject,
    /// Build anyway; report and skip the action each time it would run.
    Skip,
}

/// Options applied while building a machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    pub unknown_actions: UnknownActionPolicy,
}

/// One candidate transition for an event.
#[derive(Debug, Clone, Default)]
pub struct Transition {
    /// Target state. `None` makes the transition targetless: its actions
    /// run but no state is exited or entered.
    pub target: Option<String>,
    pub guard: Option<GuardRef>,
    pub actions: Vec<ActionRef>,
}

/// A node of the state tree.
#[derive(Debug, Clone, Default)]
pub struct StateNode {
    /// Identifier, unique among siblings.
    pub key: String,
    /// Optional machine-wide id, addressable as `#id`.
    pub id: Option<String>,
    /// Initial child; required when `states` is non-empty.
    pub initial: Option<String>,
    pub entry: Vec<ActionRef>,
    pub exit: Vec<ActionRef>,
    /// Event name to ordered candidates.
    pub on: Vec<(String, Vec<Transition>)>,
    pub states: Vec<StateNode>,
}

impl StateNode {
    pub fn is_leaf(&self) -> bool {
        self.states.is_empty()
    }

    /// Append candidates for `event`, keeping earlier ones first.
    pub fn add_transitions(&mut self, event: impl Into<String>, transitions: Vec<Transition>) {
        let event = event.into();
        match self.on.iter_mut().find(|(name, _)| *name == event) {
            Some((_, existing)) => existing.extend(transitions),
            None => self.on.push((event, transitions)),
        }
    }
}

/// A complete, unvalidated machine definition.
#[derive(Debug, Clone, Default)]
pub struct MachineDefinition {
    /// The root node; its key is the machine id.
    pub root: StateNode,
    /// Initial context, already merged with any caller overrides.
    pub context: Context,
    pub options: MachineOptions,
}

impl MachineDefinition {
    pub fn id(&self) -> &str {
        &self.root.key
    }
}
