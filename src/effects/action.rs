//! Action kinds: context assignments and side effects.

use crate::core::{Context, Event, Guard, Value};
use std::fmt;
use std::sync::Arc;

/// Computes the new value of one context field.
pub type AssignFn = Arc<dyn Fn(&Context, &Event) -> Value + Send + Sync>;

/// Effectful procedure run against the current context and event.
pub type EffectFn = Arc<dyn Fn(&Context, &Event) + Send + Sync>;

/// An ordered set of field assignments.
///
/// Every field is computed against the context as it was before the
/// assignment started, so later fields never observe earlier fields' new
/// values.
///
/// # Example
///
/// ```rust
/// use chartwell::core::{Context, Event};
/// use chartwell::effects::Assignment;
///
/// let swap = Assignment::new()
///     .field("a", |ctx: &Context, _: &Event| ctx.get("b").cloned().unwrap_or_default())
///     .field("b", |ctx: &Context, _: &Event| ctx.get("a").cloned().unwrap_or_default());
///
/// let ctx = Context::new().with("a", 1).with("b", 2);
/// let next = swap.apply(&ctx, &Event::new("SWAP"));
///
/// assert_eq!(next.get_int("a"), Some(2));
/// assert_eq!(next.get_int("b"), Some(1));
/// ```
#[derive(Clone, Default)]
pub struct Assignment {
    fields: Vec<(String, AssignFn)>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field computed by `compute`.
    pub fn field<F, V>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Context, &Event) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        let compute: AssignFn =
            Arc::new(move |ctx: &Context, event: &Event| -> Value { compute(ctx, event).into() });
        self.fields.push((name.into(), compute));
        self
    }

    /// Add a field that is always set to `value`.
    pub fn constant(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.field(name, move |_: &Context, _: &Event| value.clone())
    }

    /// Names of the assigned fields, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Produce the next context. The input context is not modified.
    pub fn apply(&self, context: &Context, event: &Event) -> Context {
        let updates = self
            .fields
            .iter()
            .map(|(name, compute)| (name.clone(), compute(context, event)))
            .collect();
        context.assigned(updates)
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assignment")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

/// The two kinds of action a machine can run.
#[derive(Clone)]
pub enum Action {
    /// Pure context update.
    Assign(Assignment),
    /// External effect; may read the context but never assigns it.
    Effect(EffectFn),
}

impl Action {
    pub fn assign(assignment: Assignment) -> Self {
        Action::Assign(assignment)
    }

    pub fn effect<F>(effect: F) -> Self
    where
        F: Fn(&Context, &Event) + Send + Sync + 'static,
    {
        Action::Effect(Arc::new(effect))
    }

    /// Run the action and return the context the next action should see.
    pub fn run(&self, context: Context, event: &Event) -> Context {
        match self {
            Action::Assign(assignment) => assignment.apply(&context, event),
            Action::Effect(effect) => {
                effect(&context, event);
                context
            }
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, Action::Assign(_))
    }
}

impl From<Assignment> for Action {
    fn from(assignment: Assignment) -> Self {
        Action::Assign(assignment)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Assign(assignment) => f.debug_tuple("Assign").field(assignment).finish(),
            Action::Effect(_) => f.write_str("Effect(..)"),
        }
    }
}

/// Reference to an action from a machine definition: either a name looked
/// up in the registry, or the action itself.
#[derive(Clone, Debug)]
pub enum ActionRef {
    Named(String),
    Inline(Action),
}

impl From<&str> for ActionRef {
    fn from(name: &str) -> Self {
        ActionRef::Named(name.to_string())
    }
}

impl From<String> for ActionRef {
    fn from(name: String) -> Self {
        ActionRef::Named(name)
    }
}

impl From<Action> for ActionRef {
    fn from(action: Action) -> Self {
        ActionRef::Inline(action)
    }
}

impl From<Assignment> for ActionRef {
    fn from(assignment: Assignment) -> Self {
        ActionRef::Inline(Action::Assign(assignment))
    }
}

/// Reference to a guard: a registry name or the guard itself.
#[derive(Clone, Debug)]
pub enum GuardRef {
    Named(String),
    Inline(Guard),
}

impl From<&str> for GuardRef {
    fn from(name: &str) -> Self {
        GuardRef::Named(name.to_string())
    }
}

impl From<String> for GuardRef {
    fn from(name: String) -> Self {
        GuardRef::Named(name)
    }
}

impl From<Guard> for GuardRef {
    fn from(guard: Guard) -> Self {
        GuardRef::Inline(guard)
    }
}
