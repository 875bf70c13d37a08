//! Property-based tests for the engine and the combobox machine.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated event sequences.

use chartwell::combobox::{self, field};
use chartwell::core::{Context, Event, Guard, StateHistory, TransitionRecord, Value};
use chartwell::interpreter::{Interpreter, SendOutcome};
use chrono::Utc;
use proptest::prelude::*;
use std::sync::Arc;

const EVENTS: [&str; 14] = [
    combobox::FOCUS,
    combobox::BLUR,
    combobox::OPEN,
    combobox::CLOSE,
    combobox::FILTER,
    combobox::SELECT,
    combobox::SELECT_MULTI,
    combobox::REMOVE,
    combobox::REMOVE_MULTI,
    combobox::SET_VALUE,
    combobox::SET_VALUE_MULTI,
    combobox::CLEAR,
    combobox::SET_HIGHLIGHT_INDEX,
    "UNKNOWN",
];

prop_compose! {
    fn arbitrary_event()(
        kind in 0..EVENTS.len(),
        payload in 0..4u8,
        text in "[a-c]{0,2}",
        index in -1i64..5,
    ) -> Event {
        let event = Event::new(EVENTS[kind]);
        match payload {
            0 => event,
            1 => event.with_value(text),
            2 => event.with_value(index),
            _ => event.with_value(Value::set([text])),
        }
    }
}

prop_compose! {
    fn arbitrary_context()(filter in "[a-z]{0,3}", index in -1i64..10, close in any::<bool>()) -> Context {
        combobox::default_context()
            .with(field::FILTER, filter)
            .with(field::HIGHLIGHT_INDEX, index)
            .with(field::CLOSE_ON_SELECT, close)
    }
}

fn running(start_context: Context) -> Interpreter {
    let service = Interpreter::new(combobox::machine(start_context, None).unwrap());
    service.start();
    service
}

proptest! {
    #[test]
    fn active_path_is_always_a_leaf(
        events in prop::collection::vec(arbitrary_event(), 0..40),
        close in any::<bool>(),
    ) {
        let service = running(Context::new().with(field::CLOSE_ON_SELECT, close));
        let machine = service.machine().clone();

        for event in events {
            service.send(event);
            let snapshot = service.state().unwrap();
            prop_assert!(machine.is_leaf_state(&snapshot.value()), "{} is not a leaf", snapshot.value());
        }
    }

    #[test]
    fn context_keeps_declared_fields(events in prop::collection::vec(arbitrary_event(), 0..30)) {
        let service = running(Context::new());
        let declared: Vec<String> = combobox::default_context().keys().map(str::to_string).collect();

        for event in events {
            service.send(event);
        }
        let snapshot = service.state().unwrap();
        let keys: Vec<String> = snapshot.context().keys().map(str::to_string).collect();
        prop_assert_eq!(keys, declared);
    }

    #[test]
    fn clear_resets_from_anywhere(events in prop::collection::vec(arbitrary_event(), 0..30)) {
        let service = running(Context::new());
        for event in events {
            service.send(event);
        }

        prop_assert_eq!(service.send(combobox::CLEAR), SendOutcome::Transitioned);
        let snapshot = service.state().unwrap();
        prop_assert_eq!(snapshot.value(), "unfocused");
        prop_assert!(snapshot.context().get(field::VALUE).unwrap().is_null());
        prop_assert!(snapshot.context().get_set(field::VALUES).unwrap().is_empty());
        prop_assert_eq!(snapshot.context().get_text(field::FILTER), Some(""));
    }

    #[test]
    fn unresolved_events_keep_the_snapshot(events in prop::collection::vec(arbitrary_event(), 0..20)) {
        let service = running(Context::new());
        for event in events {
            service.send(event);
        }

        let before = service.state().unwrap();
        prop_assert_eq!(service.send("UNKNOWN"), SendOutcome::Unresolved);
        prop_assert!(Arc::ptr_eq(&before, &service.state().unwrap()));
    }

    #[test]
    fn restart_restores_initial_context(
        start in arbitrary_context(),
        events in prop::collection::vec(arbitrary_event(), 0..20),
    ) {
        let service = running(start.clone());
        let initial = service.state().unwrap();
        for event in events {
            service.send(event);
        }

        service.stop();
        service.start();
        let restarted = service.state().unwrap();
        prop_assert_eq!(restarted.value(), "unfocused");
        prop_assert_eq!(restarted.context(), initial.context());
        prop_assert!(service.history().is_empty());
    }

    #[test]
    fn guard_is_deterministic(ctx in arbitrary_context(), event in arbitrary_event()) {
        let guard = Guard::new(|ctx: &Context, _: &Event| ctx.get_bool(field::CLOSE_ON_SELECT).unwrap_or(false));
        prop_assert_eq!(guard.check(&ctx, &event), guard.check(&ctx, &event));
    }

    #[test]
    fn history_tracks_every_transition(events in prop::collection::vec(arbitrary_event(), 0..30)) {
        let service = Interpreter::with_options(
            combobox::machine(Context::new(), None).unwrap(),
            chartwell::InterpreterOptions::new().history_limit(None),
        );
        service.start();

        let mut taken = 0;
        for event in events {
            if service.send(event) == SendOutcome::Transitioned {
                taken += 1;
            }
        }

        let history = service.history();
        prop_assert_eq!(history.len(), taken);
        if let Some(last) = history.last() {
            prop_assert_eq!(&last.to, &service.state().unwrap().value());
        }
        for pair in history.transitions().windows(2) {
            prop_assert_eq!(&pair[0].to, &pair[1].from);
        }
    }

    #[test]
    fn history_record_is_pure(from in "[a-z]{1,5}", to in "[a-z]{1,5}") {
        let history = StateHistory::new();
        let next = history.record(TransitionRecord {
            from,
            to,
            event: "NEXT".to_string(),
            timestamp: Utc::now(),
        });

        prop_assert_eq!(history.transitions().len(), 0);
        prop_assert_eq!(next.transitions().len(), 1);
    }

    #[test]
    fn history_roundtrip_serialization(steps in prop::collection::vec("[a-z]{1,5}", 0..5)) {
        let mut history = StateHistory::new();
        for window in steps.windows(2) {
            history = history.record(TransitionRecord {
                from: window[0].clone(),
                to: window[1].clone(),
                event: "NEXT".to_string(),
                timestamp: Utc::now(),
            });
        }

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(history.get_path(), deserialized.get_path());
        prop_assert_eq!(history.len(), deserialized.len());
    }
}
