//! Guard predicates for choosing between candidate transitions.
//!
//! Guards are pure boolean functions over the current context and the
//! triggering event. When an event has several candidate transitions, the
//! first one whose guard holds is taken.

use super::context::Context;
use super::event::Event;
use std::fmt;
use std::sync::Arc;

/// Pure predicate that decides whether a transition is eligible.
///
/// Guards are evaluated before any action runs. They must be deterministic
/// and free of side effects.
///
/// # Example
///
/// ```rust
/// use chartwell::core::{Context, Event, Guard};
///
/// let close_on_select = Guard::new(|ctx: &Context, _: &Event| {
///     ctx.get_bool("closeOnSelect").unwrap_or(false)
/// });
///
/// let event = Event::new("SELECT_MULTI");
/// assert!(close_on_select.check(&Context::new().with("closeOnSelect", true), &event));
/// assert!(!close_on_select.check(&Context::new(), &event));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<dyn Fn(&Context, &Event) -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be pure (deterministic, no side effects) and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Context, &Event) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Check if the guard allows the transition for this context and event.
    pub fn check(&self, context: &Context, event: &Event) -> bool {
        (self.predicate)(context, event)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
