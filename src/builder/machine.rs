//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::node::StateNodeBuilder;
use crate::builder::transition::IntoTransitions;
use crate::core::Context;
use crate::effects::{ActionRef, ActionRegistry};
use crate::machine::{Machine, MachineDefinition, MachineOptions, UnknownActionPolicy};

/// Builder for constructing machines with a fluent API.
///
/// The builder itself is the root node: `on`, `entry` and `exit` apply to
/// the root, and `state` adds top-level states.
///
/// # Example
///
/// ```rust
/// use chartwell::builder::{state, transition, MachineBuilder};
/// use chartwell::core::{Context, Event};
/// use chartwell::effects::{ActionRegistry, Assignment};
///
/// let registry = ActionRegistry::new()
///     .with_assign("count", Assignment::new().field("presses", |ctx: &Context, _: &Event| {
///         ctx.get_int("presses").unwrap_or(0) + 1
///     }));
///
/// let machine = MachineBuilder::new("toggle")
///     .context(Context::new().with("presses", 0))
///     .initial("off")
///     .state(state("off").on("TOGGLE", transition().target("on").action("count")))
///     .state(state("on").on("TOGGLE", "off"))
///     .build(&registry)
///     .unwrap();
///
/// assert_eq!(machine.initial_state(), "off");
/// ```
#[derive(Debug, Clone)]
pub struct MachineBuilder {
    root: StateNodeBuilder,
    context: Context,
    start_context: Context,
    options: MachineOptions,
}

impl MachineBuilder {
    /// Create a new builder; `id` names the root node.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            root: StateNodeBuilder::new(id),
            context: Context::new(),
            start_context: Context::new(),
            options: MachineOptions::default(),
        }
    }

    /// Set the initial top-level state (required).
    pub fn initial(mut self, key: impl Into<String>) -> Self {
        self.root = self.root.initial(key);
        self
    }

    /// Default context. Declares every field the machine may assign.
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Caller supplied fields that override the defaults.
    pub fn start_context(mut self, overrides: Context) -> Self {
        self.start_context = overrides;
        self
    }

    pub fn options(mut self, options: MachineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn unknown_actions(mut self, policy: UnknownActionPolicy) -> Self {
        self.options.unknown_actions = policy;
        self
    }

    /// Add root-level candidates for `event`.
    pub fn on(mut self, event: impl Into<String>, transitions: impl IntoTransitions) -> Self {
        self.root = self.root.on(event, transitions);
        self
    }

    pub fn entry(mut self, action: impl Into<ActionRef>) -> Self {
        self.root = self.root.entry(action);
        self
    }

    pub fn exit(mut self, action: impl Into<ActionRef>) -> Self {
        self.root = self.root.exit(action);
        self
    }

    /// Add a top-level state.
    pub fn state(mut self, state: StateNodeBuilder) -> Self {
        self.root = self.root.state(state);
        self
    }

    pub fn states(mut self, states: impl IntoIterator<Item = StateNodeBuilder>) -> Self {
        self.root = self.root.states(states);
        self
    }

    /// Produce the unvalidated definition.
    pub fn definition(self) -> Result<MachineDefinition, BuildError> {
        let root = self.root.build()?;

        if root.initial.is_none() {
            return Err(BuildError::MissingInitialState);
        }
        if root.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        Ok(MachineDefinition {
            root,
            context: self.context.merged(&self.start_context),
            options: self.options,
        })
    }

    /// Build and validate the machine against `registry`.
    pub fn build(self, registry: &ActionRegistry) -> Result<Machine, BuildError> {
        Machine::new(self.definition()?, registry)
    }
}
