//! Core data types of the engine.
//!
//! This module contains the plain values the rest of the crate moves around:
//! - Context fields and their values
//! - Events and their payloads
//! - Guards over (context, event)
//! - Immutable transition history
//! - Handles to focusable host resources
//!
//! Nothing in this module has side effects of its own.

mod context;
mod event;
mod guard;
mod history;
mod resource;

pub use context::{Context, Value};
pub use event::{Event, INIT_EVENT};
pub use guard::Guard;
pub use history::{StateHistory, TransitionRecord};
pub use resource::{Focusable, Resource};
