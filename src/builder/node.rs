//! Builder for state nodes.

use crate::builder::error::BuildError;
use crate::builder::transition::{IntoTransitions, TransitionBuilder};
use crate::effects::ActionRef;
use crate::machine::StateNode;

/// Builder for one node of the state tree and, recursively, its children.
#[derive(Debug, Clone, Default)]
pub struct StateNodeBuilder {
    key: String,
    id: Option<String>,
    initial: Option<String>,
    entry: Vec<ActionRef>,
    exit: Vec<ActionRef>,
    on: Vec<(String, Vec<TransitionBuilder>)>,
    states: Vec<StateNodeBuilder>,
}

impl StateNodeBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Machine-wide id, addressable as `#id`.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Initial child (required once the node has children).
    pub fn initial(mut self, key: impl Into<String>) -> Self {
        self.initial = Some(key.into());
        self
    }

    pub fn entry(mut self, action: impl Into<ActionRef>) -> Self {
        self.entry.push(action.into());
        self
    }

    pub fn exit(mut self, action: impl Into<ActionRef>) -> Self {
        self.exit.push(action.into());
        self
    }

    /// Add candidates for `event`. Repeated calls for the same event append.
    pub fn on(mut self, event: impl Into<String>, transitions: impl IntoTransitions) -> Self {
        self.on.push((event.into(), transitions.into_transitions()));
        self
    }

    pub fn state(mut self, child: StateNodeBuilder) -> Self {
        self.states.push(child);
        self
    }

    pub fn states(mut self, children: impl IntoIterator<Item = StateNodeBuilder>) -> Self {
        self.states.extend(children);
        self
    }

    pub fn build(self) -> Result<StateNode, BuildError> {
        let mut node = StateNode {
            key: self.key,
            id: self.id,
            initial: self.initial,
            entry: self.entry,
            exit: self.exit,
            on: Vec::new(),
            states: self
                .states
                .into_iter()
                .map(StateNodeBuilder::build)
                .collect::<Result<_, _>>()?,
        };
        for (event, candidates) in self.on {
            let transitions = candidates
                .into_iter()
                .map(TransitionBuilder::build)
                .collect::<Result<_, _>>()?;
            node.add_transitions(event, transitions);
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_nodes() {
        let node = StateNodeBuilder::new("focused")
            .id("edited")
            .initial("opened")
            .entry("focusElement")
            .on("BLUR", "unfocused")
            .states([
                StateNodeBuilder::new("closed"),
                StateNodeBuilder::new("opened").exit("log"),
            ])
            .build()
            .unwrap();

        assert_eq!(node.id.as_deref(), Some("edited"));
        assert_eq!(node.states.len(), 2);
        assert_eq!(node.states[1].exit.len(), 1);
        assert_eq!(node.entry.len(), 1);
        assert!(!node.is_leaf());
    }

    #[test]
    fn repeated_events_append_candidates() {
        let node = StateNodeBuilder::new("opened")
            .on("SELECT", TransitionBuilder::new().guard("closeOnSelect").target("closed"))
            .on("SELECT", "opened")
            .build()
            .unwrap();

        assert_eq!(node.on.len(), 1);
        assert_eq!(node.on[0].1.len(), 2);
    }

    #[test]
    fn child_errors_propagate() {
        let result = StateNodeBuilder::new("root")
            .state(StateNodeBuilder::new("leaf").on("NOTHING", TransitionBuilder::new()))
            .build();

        assert!(matches!(result, Err(BuildError::EmptyTransition)));
    }
}
