//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and macros for describing state
//! trees with minimal boilerplate. Nothing is validated until
//! [`MachineBuilder::build`] binds the tree to an action registry.

pub mod error;
pub mod machine;
pub mod macros;
pub mod node;
pub mod transition;

pub use error::{BuildError, DefinitionViolation};
pub use machine::MachineBuilder;
pub use node::StateNodeBuilder;
pub use transition::{IntoTransitions, TransitionBuilder};

/// Start a state node.
///
/// # Example
///
/// ```
/// use chartwell::builder::state;
///
/// let node = state("opened").on("CLOSE", "closed").build().unwrap();
/// assert_eq!(node.key, "opened");
/// ```
pub fn state(key: impl Into<String>) -> StateNodeBuilder {
    StateNodeBuilder::new(key)
}

/// Start a transition.
///
/// # Example
///
/// ```
/// use chartwell::builder::transition;
///
/// let t = transition()
///     .target("closed")
///     .actions(["setValue", "clearFilter"])
///     .build()
///     .unwrap();
/// assert_eq!(t.actions.len(), 2);
/// ```
pub fn transition() -> TransitionBuilder {
    TransitionBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_match_builders() {
        let from_helper = state("a").on("GO", transition().target("b")).build().unwrap();
        let from_builder = StateNodeBuilder::new("a")
            .on("GO", TransitionBuilder::new().target("b"))
            .build()
            .unwrap();

        assert_eq!(from_helper.key, from_builder.key);
        assert_eq!(from_helper.on.len(), from_builder.on.len());
    }
}
