//! Actions and their execution.
//!
//! This module is the "imperative shell" of a transition: it holds the two
//! action kinds a definition can name and runs action lists in order.
//!
//! # Key Concepts
//!
//! - **Assignments**: pure per-field updates producing a new context
//! - **Side effects**: procedures touching the outside world, never the context
//! - **Registry**: named actions and guards bound when a machine is built

mod action;
pub(crate) mod pipeline;
mod registry;

pub use action::{Action, ActionRef, AssignFn, Assignment, EffectFn, GuardRef};
pub use registry::ActionRegistry;
