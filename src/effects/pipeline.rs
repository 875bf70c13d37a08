//! Ordered execution of action lists.

use crate::core::{Context, Event};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::effects::action::Action;

/// An action reference after it has been looked up in the registry.
#[derive(Clone, Debug)]
pub(crate) enum BoundAction {
    Run { label: String, action: Action },
    /// Only produced for machines built with `UnknownActionPolicy::Skip`.
    Missing { name: String },
}

impl BoundAction {
    pub(crate) fn label(&self) -> &str {
        match self {
            BoundAction::Run { label, .. } => label,
            BoundAction::Missing { name } => name,
        }
    }
}

/// Run `actions` in order, threading the context from one to the next.
///
/// Missing actions are reported and skipped; the rest of the list still
/// runs.
pub(crate) fn run_actions(
    actions: &[BoundAction],
    context: Context,
    event: &Event,
    sink: &dyn DiagnosticSink,
) -> Context {
    actions.iter().fold(context, |ctx, bound| match bound {
        BoundAction::Run { label, action } => {
            tracing::trace!(action = %label, event = event.kind(), "running action");
            action.run(ctx, event)
        }
        BoundAction::Missing { name } => {
            sink.report(&Diagnostic::UnknownAction {
                name: name.clone(),
                event: event.kind().to_string(),
            });
            ctx
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::effects::Assignment;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn run(label: &str, action: Action) -> BoundAction {
        BoundAction::Run {
            label: label.to_string(),
            action,
        }
    }

    #[test]
    fn each_action_sees_previous_result() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let actions = vec![
            run("first", Action::assign(Assignment::new().constant("n", 1))),
            run(
                "observe",
                Action::effect(move |ctx: &Context, _: &Event| {
                    log.lock().push(ctx.get_int("n"));
                }),
            ),
            run(
                "second",
                Action::assign(Assignment::new().field("n", |ctx: &Context, _: &Event| {
                    ctx.get_int("n").unwrap_or(0) + 1
                })),
            ),
        ];

        let sink = CollectingSink::new();
        let result = run_actions(&actions, Context::new().with("n", 0), &Event::new("X"), &sink);

        assert_eq!(result.get_int("n"), Some(2));
        assert_eq!(*seen.lock(), vec![Some(1)]);
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_actions_are_reported_and_skipped() {
        let actions = vec![
            BoundAction::Missing {
                name: "ghost".to_string(),
            },
            run("set", Action::assign(Assignment::new().constant("n", 5))),
        ];

        let sink = CollectingSink::new();
        let result = run_actions(&actions, Context::new().with("n", 0), &Event::new("GO"), &sink);

        assert_eq!(result.get_int("n"), Some(5));
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::UnknownAction {
                name: "ghost".to_string(),
                event: "GO".to_string(),
            }]
        );
    }

    #[test]
    fn empty_list_returns_input() {
        let ctx = Context::new().with("a", 1);
        let sink = CollectingSink::new();
        assert_eq!(run_actions(&[], ctx.clone(), &Event::new("X"), &sink), ctx);
    }
}
