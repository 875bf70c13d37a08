//! Named actions and guards a machine definition can refer to.

use crate::core::{Context, Event, Guard};
use crate::effects::action::{Action, Assignment};
use std::collections::HashMap;

/// Table resolving action and guard names.
///
/// The registry is bound to a definition when the machine is built, and
/// every name the definition uses is checked against it at that point.
///
/// # Example
///
/// ```rust
/// use chartwell::core::{Context, Event};
/// use chartwell::effects::{ActionRegistry, Assignment};
///
/// let registry = ActionRegistry::new()
///     .with_assign("clearFilter", Assignment::new().constant("filter", ""))
///     .with_effect("log", |ctx: &Context, ev: &Event| println!("{} {:?}", ev.kind(), ctx))
///     .with_guard("hasFilter", |ctx: &Context, _: &Event| {
///         ctx.get_text("filter").is_some_and(|f| !f.is_empty())
///     });
///
/// assert!(registry.contains_action("clearFilter"));
/// assert!(registry.contains_guard("hasFilter"));
/// assert!(!registry.contains_action("missing"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Action>,
    guards: HashMap<String, Guard>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under `name`, replacing any previous one.
    pub fn with_action(mut self, name: impl Into<String>, action: Action) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    pub fn with_assign(self, name: impl Into<String>, assignment: Assignment) -> Self {
        self.with_action(name, Action::Assign(assignment))
    }

    pub fn with_effect<F>(self, name: impl Into<String>, effect: F) -> Self
    where
        F: Fn(&Context, &Event) + Send + Sync + 'static,
    {
        self.with_action(name, Action::effect(effect))
    }

    pub fn with_guard<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Context, &Event) -> bool + Send + Sync + 'static,
    {
        self.guards.insert(name.into(), Guard::new(predicate));
        self
    }

    /// Merge another registry into this one; entries of `other` win.
    pub fn extend(mut self, other: ActionRegistry) -> Self {
        self.actions.extend(other.actions);
        self.guards.extend(other.guards);
        self
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn guard(&self, name: &str) -> Option<&Guard> {
        self.guards.get(name)
    }

    pub fn contains_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn contains_guard(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}
