//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{Context, Event, Guard};
use crate::effects::{ActionRef, GuardRef};
use crate::machine::Transition;

/// Builder for constructing transitions with a fluent API.
#[derive(Debug, Clone, Default)]
pub struct TransitionBuilder {
    target: Option<String>,
    guard: Option<GuardRef>,
    actions: Vec<ActionRef>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target state. Without one the transition is targetless.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Guard by registry name or by value (optional).
    pub fn guard(mut self, guard: impl Into<GuardRef>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Context, &Event) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(GuardRef::Inline(Guard::new(predicate)));
        self
    }

    /// Append one action.
    pub fn action(mut self, action: impl Into<ActionRef>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Append several actions, keeping their order.
    pub fn actions<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionRef>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition, BuildError> {
        if self.target.is_none() && self.actions.is_empty() {
            return Err(BuildError::EmptyTransition);
        }

        Ok(Transition {
            target: self.target,
            guard: self.guard,
            actions: self.actions,
        })
    }
}

/// Anything that can stand for the candidate list of one event.
pub trait IntoTransitions {
    fn into_transitions(self) -> Vec<TransitionBuilder>;
}

impl IntoTransitions for TransitionBuilder {
    fn into_transitions(self) -> Vec<TransitionBuilder> {
        vec![self]
    }
}

impl IntoTransitions for Vec<TransitionBuilder> {
    fn into_transitions(self) -> Vec<TransitionBuilder> {
        self
    }
}

/// A bare target, as in `.on("FOCUS", "focused")`.
impl IntoTransitions for &str {
    fn into_transitions(self) -> Vec<TransitionBuilder> {
        vec![TransitionBuilder::new().target(self)]
    }
}
