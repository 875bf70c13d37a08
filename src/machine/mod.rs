//! Machine definitions: the declarative tree, its JSON form, and the
//! validated arena interpreters run.

pub mod config;
pub(crate) mod definition;
mod node;
pub(crate) mod resolver;

pub use config::MachineConfig;
pub use definition::{Machine, NodeId};
pub use node::{MachineDefinition, MachineOptions, StateNode, Transition, UnknownActionPolicy};
