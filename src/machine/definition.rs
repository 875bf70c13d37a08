//! Validated, immutable machines.
//!
//! A [`MachineDefinition`] is flattened into an arena of nodes addressed by
//! [`NodeId`]. Parent links, dotted paths, initial children, transition
//! targets and action references are all resolved here, once, so running
//! a machine never parses a path or looks up a name.

use crate::builder::error::{BuildError, DefinitionViolation};
use crate::core::{Context, Guard};
use crate::effects::pipeline::BoundAction;
use crate::effects::{Action, ActionRef, ActionRegistry, GuardRef};
use crate::machine::config::MachineConfig;
use crate::machine::node::{MachineDefinition, StateNode, UnknownActionPolicy};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionViolation>>;

/// Index of a node inside a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

pub(crate) const ROOT: NodeId = NodeId(0);

#[derive(Debug)]
pub(crate) struct BoundTransition {
    pub(crate) target: Option<NodeId>,
    pub(crate) guard: Option<Guard>,
    pub(crate) actions: Vec<BoundAction>,
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) key: String,
    /// Dotted path from the root, empty for the root itself.
    pub(crate) path: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) initial: Option<NodeId>,
    pub(crate) entry: Vec<BoundAction>,
    pub(crate) exit: Vec<BoundAction>,
    pub(crate) on: HashMap<String, Vec<BoundTransition>>,
}

impl NodeData {
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Node storage plus the navigation every later stage relies on.
#[derive(Debug, Default)]
pub(crate) struct Tree {
    nodes: Vec<NodeData>,
    ids: HashMap<String, NodeId>,
}

impl Tree {
    pub(crate) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    fn name(&self, id: NodeId) -> &str {
        let node = self.node(id);
        if node.path.is_empty() {
            &node.key
        } else {
            &node.path
        }
    }

    fn child(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).key == key)
    }

    fn descend(&self, from: NodeId, path: &str) -> Option<NodeId> {
        path.split('.').try_fold(from, |node, key| self.child(node, key))
    }

    /// Resolve a written target relative to the node declaring it.
    ///
    /// `#id[.path]` is global, `.path` is below the source, anything else is
    /// tried against the source's parent and then each further ancestor.
    fn resolve_target(&self, source: NodeId, target: &str) -> Option<NodeId> {
        if let Some(rest) = target.strip_prefix('#') {
            return match rest.split_once('.') {
                Some((id, tail)) => self.descend(*self.ids.get(id)?, tail),
                None => self.ids.get(rest).copied(),
            };
        }
        if let Some(rest) = target.strip_prefix('.') {
            return self.descend(source, rest);
        }
        let mut scope = self.parent(source).unwrap_or(source);
        loop {
            if let Some(found) = self.descend(scope, target) {
                return Some(found);
            }
            scope = self.parent(scope)?;
        }
    }

    /// Follow initial children down to a leaf.
    pub(crate) fn settle(&self, from: NodeId) -> NodeId {
        let mut current = from;
        while let Some(next) = self.node(current).initial {
            current = next;
        }
        current
    }

    pub(crate) fn is_proper_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Nodes from `from` upward, stopping before `stop`.
    pub(crate) fn chain_below(&self, from: NodeId, stop: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(from);
        while let Some(id) = current {
            if id == stop {
                break;
            }
            chain.push(id);
            current = self.parent(id);
        }
        chain
    }
}

/// Flattening state used while a machine is being built.
struct Arena<'d> {
    tree: Tree,
    sources: Vec<&'d StateNode>,
    checks: Vec<Check>,
}

impl<'d> Arena<'d> {
    fn flatten(&mut self, node: &'d StateNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.tree.nodes.len());
        let path = match parent {
            None => String::new(),
            Some(p) if self.tree.node(p).path.is_empty() => node.key.clone(),
            Some(p) => format!("{}.{}", self.tree.node(p).path, node.key),
        };

        if parent.is_some() {
            self.checks.push(check_key(node, &path));
        }
        if let Some(global) = &node.id {
            if self.tree.ids.insert(global.clone(), id).is_some() {
                self.checks.push(Validation::fail(DefinitionViolation::DuplicateId {
                    id: global.clone(),
                }));
            }
        }

        self.tree.nodes.push(NodeData {
            key: node.key.clone(),
            path,
            parent,
            children: Vec::new(),
            initial: None,
            entry: Vec::new(),
            exit: Vec::new(),
            on: HashMap::new(),
        });
        self.sources.push(node);

        let mut seen = HashSet::new();
        for child in &node.states {
            if !seen.insert(child.key.as_str()) {
                self.checks.push(Validation::fail(DefinitionViolation::DuplicateState {
                    parent: self.tree.name(id).to_string(),
                    key: child.key.clone(),
                }));
            }
            let child_id = self.flatten(child, Some(id));
            self.tree.nodes[id.0].children.push(child_id);
        }
        id
    }

    fn bind(&mut self, binder: &Binder<'_>) {
        for index in 0..self.tree.nodes.len() {
            let id = NodeId(index);
            let source = self.sources[index];
            let state = self.tree.name(id).to_string();
            let mut checks = Vec::new();

            let initial = if source.is_leaf() {
                None
            } else {
                match &source.initial {
                    None => {
                        checks.push(Validation::fail(DefinitionViolation::MissingInitial {
                            state: state.clone(),
                        }));
                        None
                    }
                    Some(key) => {
                        let child = self.tree.child(id, key);
                        if child.is_none() {
                            checks.push(Validation::fail(DefinitionViolation::UnknownInitial {
                                state: state.clone(),
                                initial: key.clone(),
                            }));
                        }
                        child
                    }
                }
            };

            let entry = binder.actions(&source.entry, &state, &mut checks);
            let exit = binder.actions(&source.exit, &state, &mut checks);

            let mut on: HashMap<String, Vec<BoundTransition>> = HashMap::new();
            for (event, candidates) in &source.on {
                for candidate in candidates {
                    let target = candidate.target.as_ref().and_then(|written| {
                        let resolved = self.tree.resolve_target(id, written);
                        if resolved.is_none() {
                            checks.push(Validation::fail(DefinitionViolation::UnknownTarget {
                                state: state.clone(),
                                event: event.clone(),
                                target: written.clone(),
                            }));
                        }
                        resolved
                    });
                    let guard = candidate
                        .guard
                        .as_ref()
                        .and_then(|guard| binder.guard(guard, &state, &mut checks));
                    let actions = binder.actions(&candidate.actions, &state, &mut checks);
                    on.entry(event.clone()).or_default().push(BoundTransition {
                        target,
                        guard,
                        actions,
                    });
                }
            }

            let node = &mut self.tree.nodes[index];
            node.initial = initial;
            node.entry = entry;
            node.exit = exit;
            node.on = on;
            self.checks.extend(checks);
        }
    }
}

fn check_key(node: &StateNode, path: &str) -> Check {
    if node.key.is_empty() || node.key.contains('.') || node.key.starts_with('#') {
        Validation::fail(DefinitionViolation::InvalidStateKey {
            state: path.to_string(),
        })
    } else {
        Validation::success(())
    }
}

/// Resolves action and guard references against a registry.
struct Binder<'r> {
    registry: &'r ActionRegistry,
    context: &'r Context,
    policy: UnknownActionPolicy,
}

impl Binder<'_> {
    fn actions(&self, refs: &[ActionRef], state: &str, checks: &mut Vec<Check>) -> Vec<BoundAction> {
        refs.iter()
            .filter_map(|action| self.action(action, state, checks))
            .collect()
    }

    fn action(&self, action: &ActionRef, state: &str, checks: &mut Vec<Check>) -> Option<BoundAction> {
        let (label, action) = match action {
            ActionRef::Inline(action) => ("<inline>".to_string(), action.clone()),
            ActionRef::Named(name) => match (self.registry.action(name), self.policy) {
                (Some(action), _) => (name.clone(), action.clone()),
                (None, UnknownActionPolicy::Skip) => {
                    tracing::debug!(action = %name, state, "binding unknown action as skipped");
                    return Some(BoundAction::Missing { name: name.clone() });
                }
                (None, UnknownActionPolicy::Reject) => {
                    checks.push(Validation::fail(DefinitionViolation::UnknownAction {
                        state: state.to_string(),
                        name: name.clone(),
                    }));
                    return None;
                }
            },
        };

        if let Action::Assign(assignment) = &action {
            for field in assignment.field_names() {
                if !self.context.contains(field) {
                    checks.push(Validation::fail(DefinitionViolation::UndeclaredField {
                        state: state.to_string(),
                        field: field.to_string(),
                    }));
                }
            }
        }
        Some(BoundAction::Run { label, action })
    }

    fn guard(&self, guard: &GuardRef, state: &str, checks: &mut Vec<Check>) -> Option<Guard> {
        match guard {
            GuardRef::Inline(guard) => Some(guard.clone()),
            GuardRef::Named(name) => {
                let found = self.registry.guard(name).cloned();
                if found.is_none() {
                    checks.push(Validation::fail(DefinitionViolation::UnknownGuard {
                        state: state.to_string(),
                        name: name.clone(),
                    }));
                }
                found
            }
        }
    }
}

#[derive(Debug)]
struct MachineInner {
    tree: Tree,
    context: Context,
    initial_leaf: NodeId,
}

/// An immutable, validated statechart.
///
/// Cloning is cheap; every clone shares the same definition, so one machine
/// can back any number of interpreters.
#[derive(Debug, Clone)]
pub struct Machine {
    inner: Arc<MachineInner>,
}

impl Machine {
    /// Validate `definition` against `registry` and build the machine.
    ///
    /// Every problem is collected before failing, so the returned
    /// [`BuildError::InvalidDefinition`] lists all of them at once.
    pub fn new(definition: MachineDefinition, registry: &ActionRegistry) -> Result<Self, BuildError> {
        let MachineDefinition {
            root,
            context,
            options,
        } = definition;

        let mut arena = Arena {
            tree: Tree::default(),
            sources: Vec::new(),
            checks: Vec::new(),
        };
        arena.flatten(&root, None);
        arena.bind(&Binder {
            registry,
            context: &context,
            policy: options.unknown_actions,
        });

        let Arena { tree, checks, .. } = arena;
        if let Validation::Failure(errors) = Validation::all_vec(checks) {
            let violations: Vec<DefinitionViolation> = errors.iter().cloned().collect();
            tracing::debug!(machine = %root.key, count = violations.len(), "machine definition rejected");
            return Err(BuildError::InvalidDefinition { violations });
        }

        let initial_leaf = tree.settle(ROOT);
        tracing::debug!(
            machine = %root.key,
            states = tree.nodes.len(),
            initial = %tree.node(initial_leaf).path,
            "machine built"
        );

        Ok(Self {
            inner: Arc::new(MachineInner {
                tree,
                context,
                initial_leaf,
            }),
        })
    }

    /// Parse the declarative JSON format and build the machine.
    pub fn from_json(json: &serde_json::Value, registry: &ActionRegistry) -> Result<Self, BuildError> {
        let config: MachineConfig = serde_json::from_value(json.clone())?;
        Self::new(config.into_definition(), registry)
    }

    pub fn id(&self) -> &str {
        &self.tree().node(ROOT).key
    }

    /// The context every interpreter starts from.
    pub fn initial_context(&self) -> &Context {
        &self.inner.context
    }

    /// Dotted path of the leaf an interpreter starts in.
    pub fn initial_state(&self) -> &str {
        &self.tree().node(self.inner.initial_leaf).path
    }

    pub fn contains_state(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    pub fn is_leaf_state(&self, path: &str) -> bool {
        self.find(path)
            .is_some_and(|id| self.tree().node(id).is_leaf())
    }

    /// Dotted paths of every leaf, in definition order.
    pub fn leaf_states(&self) -> Vec<&str> {
        self.tree()
            .nodes
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| node.path.as_str())
            .collect()
    }

    /// Every event name handled anywhere in the machine.
    pub fn event_names(&self) -> BTreeSet<&str> {
        self.tree()
            .nodes
            .iter()
            .flat_map(|node| node.on.keys().map(String::as_str))
            .collect()
    }

    pub(crate) fn tree(&self) -> &Tree {
        &self.inner.tree
    }

    pub(crate) fn initial_leaf(&self) -> NodeId {
        self.inner.initial_leaf
    }

    /// Root-to-leaf chain of node ids, root included.
    pub(crate) fn active_path(&self, leaf: NodeId) -> Vec<NodeId> {
        let mut path = self.tree().chain_below(leaf, ROOT);
        path.push(ROOT);
        path.reverse();
        path
    }

    /// Keys of the active states below the root, outermost first.
    pub(crate) fn state_keys(&self, leaf: NodeId) -> Vec<String> {
        let tree = self.tree();
        tree.chain_below(leaf, ROOT)
            .into_iter()
            .rev()
            .map(|id| tree.node(id).key.clone())
            .collect()
    }

    fn find(&self, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return Some(ROOT);
        }
        self.tree().descend(ROOT, path)
    }
}
