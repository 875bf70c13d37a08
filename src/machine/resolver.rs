//! Transition selection for one event.

use crate::core::{Context, Event};
use crate::machine::definition::{BoundTransition, Machine, NodeId, ROOT};

/// Outcome of looking an event up from the active leaf.
#[derive(Debug)]
pub(crate) enum Resolution<'m> {
    Selected(Selected<'m>),
    /// Some node declares the event, but no candidate's guard held.
    Swallowed { node: NodeId },
    /// No node on the active path declares the event.
    Unresolved,
}

/// A chosen transition and the states it leaves and enters.
#[derive(Debug)]
pub(crate) struct Selected<'m> {
    pub(crate) source: NodeId,
    pub(crate) transition: &'m BoundTransition,
    /// Innermost first.
    pub(crate) exits: Vec<NodeId>,
    /// Outermost first.
    pub(crate) entries: Vec<NodeId>,
    /// Active leaf once the transition completes.
    pub(crate) leaf: NodeId,
}

impl Machine {
    /// Select the transition `event` triggers from `leaf`.
    ///
    /// The leaf's own table is consulted first; ancestors are only asked
    /// when a node has no entry for the event at all.
    pub(crate) fn resolve(&self, leaf: NodeId, context: &Context, event: &Event) -> Resolution<'_> {
        let tree = self.tree();
        let mut current = Some(leaf);
        while let Some(node) = current {
            if let Some(candidates) = tree.node(node).on.get(event.kind()) {
                let chosen = candidates
                    .iter()
                    .find(|t| t.guard.as_ref().map_or(true, |g| g.check(context, event)));
                return match chosen {
                    Some(transition) => Resolution::Selected(self.select(leaf, node, transition)),
                    None => Resolution::Swallowed { node },
                };
            }
            current = tree.parent(node);
        }
        Resolution::Unresolved
    }

    fn select<'m>(&'m self, leaf: NodeId, source: NodeId, transition: &'m BoundTransition) -> Selected<'m> {
        let Some(target) = transition.target else {
            return Selected {
                source,
                transition,
                exits: Vec::new(),
                entries: Vec::new(),
                leaf,
            };
        };

        let tree = self.tree();
        let domain = self.domain(source, target);
        let next_leaf = tree.settle(target);
        let mut entries = tree.chain_below(next_leaf, domain);
        entries.reverse();

        Selected {
            source,
            transition,
            exits: tree.chain_below(leaf, domain),
            entries,
            leaf: next_leaf,
        }
    }

    /// Deepest node that is a proper ancestor of both `source` and `target`.
    ///
    /// Nothing at or above the domain is exited or entered, so a transition
    /// targeting its own source leaves and re-enters it.
    pub(crate) fn domain(&self, source: NodeId, target: NodeId) -> NodeId {
        if source == ROOT || target == ROOT {
            return ROOT;
        }
        let tree = self.tree();
        let mut candidate = tree.parent(source);
        while let Some(node) = candidate {
            if tree.is_proper_ancestor(node, target) {
                return node;
            }
            candidate = tree.parent(node);
        }
        ROOT
    }
}
