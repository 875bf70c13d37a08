//! Build errors for machine definitions and their builders.

use thiserror::Error;

/// A single problem found while validating a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionViolation {
    #[error("state '{state}': key must be non-empty and must not contain '.' or start with '#'")]
    InvalidStateKey { state: String },

    #[error("state '{parent}' declares child '{key}' more than once")]
    DuplicateState { parent: String, key: String },

    #[error("id '#{id}' is used by more than one state")]
    DuplicateId { id: String },

    #[error("state '{state}' has children but no initial state")]
    MissingInitial { state: String },

    #[error("state '{state}' names initial state '{initial}', which is not one of its children")]
    UnknownInitial { state: String, initial: String },

    #[error("state '{state}', event '{event}': target '{target}' does not exist")]
    UnknownTarget {
        state: String,
        event: String,
        target: String,
    },

    #[error("state '{state}': action '{name}' is not registered")]
    UnknownAction { state: String, name: String },

    #[error("state '{state}': guard '{name}' is not registered")]
    UnknownGuard { state: String, name: String },

    #[error("state '{state}': assignment writes undeclared context field '{field}'")]
    UndeclaredField { state: String, field: String },
}

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("Transition has neither a target nor actions. Call .target(path) or .action(name)")]
    EmptyTransition,

    #[error("invalid machine definition ({} violations): {}", .violations.len(), render(.violations))]
    InvalidDefinition { violations: Vec<DefinitionViolation> },

    #[error("invalid machine config: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    /// The definition problems, if this error carries any.
    pub fn violations(&self) -> &[DefinitionViolation] {
        match self {
            BuildError::InvalidDefinition { violations } => violations,
            _ => &[],
        }
    }
}

fn render(violations: &[DefinitionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
