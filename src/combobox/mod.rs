//! Reference machine: a filterable single or multi select input.
//!
//! ```text
//! inputfield
//! ├── unfocused
//! └── focused (#edited)
//!     ├── closed
//!     └── opened (initial)
//! ```
//!
//! `REMOVE`, `REMOVE_MULTI`, `CLEAR`, `SET_VALUE` and `SET_VALUE_MULTI` are
//! handled at the root, so they work from every state.
//!
//! # Example
//!
//! ```rust
//! use chartwell::combobox::{self, field};
//! use chartwell::core::{Context, Event};
//! use chartwell::interpreter::Interpreter;
//!
//! let service = Interpreter::new(combobox::machine(Context::new(), None).unwrap());
//! service.start();
//!
//! service.send(combobox::FOCUS);
//! service.send(Event::new(combobox::SELECT).with_value("apple"));
//!
//! let snapshot = service.state().unwrap();
//! assert_eq!(snapshot.value(), "focused.closed");
//! assert_eq!(snapshot.context().get_text(field::VALUE), Some("apple"));
//! ```

pub mod collaborators;

pub use collaborators::{
    close_on_outside_click, ContainsFilter, Focusable, HostNotifier, ItemFilter,
    OutsideClickDetector, ReleaseHandle,
};

use crate::builder::{state, transition, BuildError, MachineBuilder};
use crate::core::{Context, Event, Value};
use crate::effects::{ActionRegistry, Assignment};
use crate::machine::{Machine, MachineDefinition};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const FOCUS: &str = "FOCUS";
pub const BLUR: &str = "BLUR";
pub const OPEN: &str = "OPEN";
pub const CLOSE: &str = "CLOSE";
pub const FILTER: &str = "FILTER";
pub const SELECT: &str = "SELECT";
pub const SELECT_MULTI: &str = "SELECT_MULTI";
pub const REMOVE: &str = "REMOVE";
pub const REMOVE_MULTI: &str = "REMOVE_MULTI";
pub const SET_VALUE: &str = "SET_VALUE";
pub const SET_VALUE_MULTI: &str = "SET_VALUE_MULTI";
pub const CLEAR: &str = "CLEAR";
pub const SET_HIGHLIGHT_INDEX: &str = "SET_HIGHLIGHT_INDEX";

/// Context field names.
pub mod field {
    pub const VALUE: &str = "value";
    pub const VALUES: &str = "values";
    pub const FILTER: &str = "filter";
    /// `-1` when nothing is highlighted.
    pub const HIGHLIGHT_INDEX: &str = "highlightIndex";
    pub const FOCUSABLE: &str = "focusable";
    pub const CLOSE_ON_SELECT: &str = "closeOnSelect";
}

/// Context a combobox starts from when the caller overrides nothing.
pub fn default_context() -> Context {
    Context::new()
        .with(field::VALUE, Value::Null)
        .with(field::VALUES, BTreeSet::<String>::new())
        .with(field::FILTER, "")
        .with(field::HIGHLIGHT_INDEX, -1)
        .with(field::FOCUSABLE, Value::Null)
        .with(field::CLOSE_ON_SELECT, false)
}

fn values(ctx: &Context) -> BTreeSet<String> {
    ctx.get_set(field::VALUES).cloned().unwrap_or_default()
}

fn event_key(event: &Event) -> Option<String> {
    event.value.as_ref().and_then(Value::to_key)
}

fn notifier(host: &Option<Arc<dyn HostNotifier>>, name: &'static str) -> impl Fn(&Context, &Event) + Send + Sync + 'static {
    let host = host.clone();
    move |ctx: &Context, _: &Event| {
        if let Some(host) = &host {
            host.emit(name, ctx);
        }
    }
}

/// Actions and guards the combobox definition refers to.
///
/// `host` receives the `input`, `focus` and `blur` notifications.
pub fn registry(host: Option<Arc<dyn HostNotifier>>) -> ActionRegistry {
    ActionRegistry::new()
        .with_assign(
            "setFilter",
            Assignment::new().field(field::FILTER, |_, ev: &Event| {
                ev.value_text().unwrap_or_default().to_string()
            }),
        )
        .with_assign("clearFilter", Assignment::new().constant(field::FILTER, ""))
        .with_assign(
            "setValue",
            Assignment::new().field(field::VALUE, |_, ev: &Event| ev.value.clone().unwrap_or_default()),
        )
        .with_assign(
            "addValue",
            Assignment::new().field(field::VALUES, |ctx: &Context, ev: &Event| {
                let mut next = values(ctx);
                if let Some(key) = event_key(ev) {
                    next.insert(key);
                }
                next
            }),
        )
        .with_assign(
            "removeValue",
            Assignment::new().field(field::VALUES, |ctx: &Context, ev: &Event| {
                let mut next = values(ctx);
                if let Some(key) = event_key(ev) {
                    next.remove(&key);
                }
                next
            }),
        )
        .with_assign(
            "setValues",
            Assignment::new().field(field::VALUES, |_, ev: &Event| {
                ev.value
                    .as_ref()
                    .and_then(Value::as_set)
                    .cloned()
                    .unwrap_or_default()
            }),
        )
        .with_assign("clearValue", Assignment::new().constant(field::VALUE, Value::Null))
        .with_assign(
            "clearValues",
            Assignment::new()
                .constant(field::VALUES, BTreeSet::<String>::new())
                .constant(field::VALUE, Value::Null)
                .constant(field::FILTER, ""),
        )
        .with_assign(
            "setHighlightedIndex",
            Assignment::new().field(field::HIGHLIGHT_INDEX, |_, ev: &Event| ev.value_int().unwrap_or(-1)),
        )
        .with_assign(
            "clearHighlightedIndex",
            Assignment::new().constant(field::HIGHLIGHT_INDEX, -1),
        )
        .with_assign(
            "setFocusableElement",
            Assignment::new().field(field::FOCUSABLE, |ctx: &Context, ev: &Event| match &ev.target {
                Some(target) => Value::Resource(target.clone()),
                None => ctx.get(field::FOCUSABLE).cloned().unwrap_or_default(),
            }),
        )
        .with_effect("focusElement", |ctx, _| {
            if let Some(resource) = ctx.get_resource(field::FOCUSABLE) {
                resource.focus();
            }
        })
        .with_effect("emitInput", notifier(&host, "input"))
        .with_effect("emitFocus", notifier(&host, "focus"))
        .with_effect("emitBlur", notifier(&host, "blur"))
        .with_guard("closeOnSelect", |ctx, _| {
            ctx.get_bool(field::CLOSE_ON_SELECT).unwrap_or(false)
        })
}

fn builder(start_context: Context) -> MachineBuilder {
    MachineBuilder::new("inputfield")
        .context(default_context())
        .start_context(start_context)
        .initial("unfocused")
        .on(REMOVE_MULTI, transition().target("unfocused").action("removeValue"))
        .on(REMOVE, transition().target("unfocused").action("clearValue"))
        .on(CLEAR, transition().target("unfocused").action("clearValues"))
        .on(SET_VALUE, transition().actions(["setValue", "emitInput"]))
        .on(SET_VALUE_MULTI, transition().actions(["setValues", "emitInput"]))
        .state(state("unfocused").on(FOCUS, "focused"))
        .state(
            state("focused")
                .id("edited")
                .initial("opened")
                .entry("setFocusableElement")
                .entry("focusElement")
                .entry("clearHighlightedIndex")
                .entry("emitFocus")
                .on(
                    BLUR,
                    transition()
                        .target("unfocused")
                        .actions(["clearFilter", "emitBlur"]),
                )
                .state(state("closed").on(
                    OPEN,
                    transition().target("opened").action("clearHighlightedIndex"),
                ))
                .state(
                    state("opened")
                        .on(CLOSE, "closed")
                        .on(FILTER, transition().target("opened").action("setFilter"))
                        .on(
                            SELECT,
                            transition()
                                .target("closed")
                                .actions(["setValue", "clearFilter", "emitInput"]),
                        )
                        .on(
                            SELECT_MULTI,
                            vec![
                                transition()
                                    .guard("closeOnSelect")
                                    .target("closed")
                                    .actions(["addValue", "clearFilter", "emitInput"]),
                                transition()
                                    .target("opened")
                                    .actions(["addValue", "clearFilter", "emitInput"]),
                            ],
                        )
                        .on(
                            SET_HIGHLIGHT_INDEX,
                            transition().target("opened").action("setHighlightedIndex"),
                        ),
                ),
        )
}

/// The combobox definition, with `start_context` overriding the defaults.
pub fn definition(start_context: Context) -> Result<MachineDefinition, BuildError> {
    builder(start_context).definition()
}

/// Build the combobox machine.
pub fn machine(
    start_context: Context,
    host: Option<Arc<dyn HostNotifier>>,
) -> Result<Machine, BuildError> {
    Machine::new(definition(start_context)?, &registry(host))
}

/// Items the current filter lets through.
pub fn visible_items<'a>(filter: &dyn ItemFilter, items: &'a [String], context: &Context) -> Vec<&'a str> {
    filter.filter(items, context.get_text(field::FILTER).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_declares_every_field() {
        let ctx = default_context();
        assert!(ctx.get(field::VALUE).unwrap().is_null());
        assert!(ctx.get_set(field::VALUES).unwrap().is_empty());
        assert_eq!(ctx.get_text(field::FILTER), Some(""));
        assert_eq!(ctx.get_int(field::HIGHLIGHT_INDEX), Some(-1));
        assert_eq!(ctx.get_bool(field::CLOSE_ON_SELECT), Some(false));
    }

    #[test]
    fn machine_shape() {
        let machine = machine(Context::new(), None).unwrap();
        assert_eq!(machine.id(), "inputfield");
        assert_eq!(machine.initial_state(), "unfocused");
        assert_eq!(
            machine.leaf_states(),
            vec!["unfocused", "focused.closed", "focused.opened"]
        );
        for event in [
            FOCUS, BLUR, OPEN, CLOSE, FILTER, SELECT, SELECT_MULTI, REMOVE, REMOVE_MULTI,
            SET_VALUE, SET_VALUE_MULTI, CLEAR, SET_HIGHLIGHT_INDEX,
        ] {
            assert!(machine.event_names().contains(event), "{event} not handled");
        }
    }

    #[test]
    fn start_context_overrides_defaults() {
        let machine = machine(Context::new().with(field::CLOSE_ON_SELECT, true), None).unwrap();
        assert_eq!(machine.initial_context().get_bool(field::CLOSE_ON_SELECT), Some(true));
        assert_eq!(machine.initial_context().get_int(field::HIGHLIGHT_INDEX), Some(-1));
    }

    #[test]
    fn add_and_remove_values_copy_the_set() {
        let registry = registry(None);
        let ctx = default_context().with(field::VALUES, Value::set(["a"]));

        let added = registry
            .action("addValue")
            .unwrap()
            .run(ctx.clone(), &Event::new(SELECT_MULTI).with_value("b"));
        assert_eq!(added.get_set(field::VALUES).unwrap().len(), 2);
        assert_eq!(ctx.get_set(field::VALUES).unwrap().len(), 1);

        let removed = registry
            .action("removeValue")
            .unwrap()
            .run(added, &Event::new(REMOVE_MULTI).with_value("zzz"));
        assert_eq!(removed.get_set(field::VALUES).unwrap().len(), 2);
    }

    #[test]
    fn set_filter_defaults_to_empty() {
        let registry = registry(None);
        let ctx = default_context().with(field::FILTER, "old");
        let next = registry.action("setFilter").unwrap().run(ctx, &Event::new(FILTER));
        assert_eq!(next.get_text(field::FILTER), Some(""));
    }

    #[test]
    fn visible_items_use_context_filter() {
        let items = vec!["Apple".to_string(), "Cherry".to_string()];
        let ctx = default_context().with(field::FILTER, "ch");
        assert_eq!(visible_items(&ContainsFilter, &items, &ctx), vec!["Cherry"]);
    }
}
