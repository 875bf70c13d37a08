//! Chartwell: hierarchical statecharts with a reference combobox machine
//!
//! Chartwell separates what a machine *is* from what it is *doing*. A
//! [`Machine`] is an immutable, validated tree of states with transitions,
//! guards and named actions resolved once at construction. An
//! [`Interpreter`] runs one instance of it: it holds the active leaf and
//! the context, processes events run-to-completion and notifies
//! subscribers after every transition.
//!
//! # Core Concepts
//!
//! - **Context**: immutable named fields; assignments produce a new context
//! - **Actions**: pure assignments or side effects, bound by name
//! - **Resolution**: innermost active state first, guards in declaration order
//! - **Diagnostics**: unhandled events and rejected sends go to a sink, never panic
//!
//! # Example
//!
//! ```rust
//! use chartwell::builder::{state, transition, MachineBuilder};
//! use chartwell::core::{Context, Event};
//! use chartwell::effects::{ActionRegistry, Assignment};
//! use chartwell::interpreter::Interpreter;
//!
//! let registry = ActionRegistry::new().with_assign(
//!     "remember",
//!     Assignment::new().field("last", |_: &Context, ev: &Event| {
//!         ev.value_text().unwrap_or_default().to_string()
//!     }),
//! );
//!
//! let machine = MachineBuilder::new("door")
//!     .context(Context::new().with("last", ""))
//!     .initial("closed")
//!     .state(state("closed").on("OPEN", transition().target("open").action("remember")))
//!     .state(state("open").on("CLOSE", "closed"))
//!     .build(&registry)
//!     .unwrap();
//!
//! let service = Interpreter::new(machine);
//! service.start();
//! service.send(Event::new("OPEN").with_value("front"));
//!
//! let snapshot = service.state().unwrap();
//! assert!(snapshot.matches("open"));
//! assert_eq!(snapshot.context().get_text("last"), Some("front"));
//! ```

pub mod builder;
pub mod combobox;
pub mod core;
pub mod diagnostics;
pub mod effects;
pub mod interpreter;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use crate::core::{Context, Event, Value};
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use effects::{Action, ActionRegistry, Assignment};
pub use interpreter::{interpret, Interpreter, InterpreterOptions, SendOutcome, Snapshot};
pub use machine::Machine;
