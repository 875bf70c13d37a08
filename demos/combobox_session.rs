//! Combobox Session
//!
//! This demo drives the reference combobox the way a widget would: focus,
//! type a filter, pick items and clear.
//!
//! Key concepts:
//! - Host collaborators (focusable input, notifier, item filter)
//! - Subscribing to snapshots
//! - Diagnostics for events the current state does not handle
//!
//! Run with: RUST_LOG=chartwell=debug cargo run --example combobox_session

use chartwell::combobox::{self, field, ContainsFilter, Focusable, HostNotifier};
use chartwell::core::{Context, Event, Resource};
use chartwell::interpreter::Interpreter;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct TerminalInput;

impl Focusable for TerminalInput {
    fn focus(&self) {
        println!("  [input] focused");
    }

    fn blur(&self) {
        println!("  [input] blurred");
    }

    fn label(&self) -> &str {
        "terminal-input"
    }
}

struct PrintingHost;

impl HostNotifier for PrintingHost {
    fn emit(&self, name: &str, context: &Context) {
        println!("  [host] {name}: value={:?}", context.get(field::VALUE));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("=== Combobox Session ===\n");

    let fruit: Vec<String> = ["Apple", "Apricot", "Banana", "Cherry", "Grape"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let host: Arc<dyn HostNotifier> = Arc::new(PrintingHost);
    let machine = combobox::machine(Context::new(), Some(host)).expect("combobox definition is valid");
    let service = Interpreter::new(machine);

    let items = fruit.clone();
    service.subscribe(move |snapshot| {
        let visible = combobox::visible_items(&ContainsFilter, &items, snapshot.context());
        println!(
            "  -> {} after {} | filter={:?} visible={:?}",
            snapshot.value(),
            snapshot.event().kind(),
            snapshot.context().get_text(field::FILTER).unwrap_or_default(),
            visible
        );
    });

    service.start();

    println!("\nFocus the input:");
    service.send(Event::new(combobox::FOCUS).with_target(Resource::new(TerminalInput)));

    println!("\nType \"ap\":");
    service.send(Event::new(combobox::FILTER).with_value("ap"));

    println!("\nHighlight the second match and select it:");
    service.send(Event::new(combobox::SET_HIGHLIGHT_INDEX).with_value(1));
    service.send(Event::new(combobox::SELECT).with_value("Apricot"));

    println!("\nOPEN is only handled while closed, CLOSE only while opened:");
    service.send(combobox::CLOSE);
    service.send(combobox::OPEN);

    println!("\nBlur and clear:");
    service.send(combobox::BLUR);
    service.send(combobox::CLEAR);

    println!("\nHistory:");
    for record in service.history().transitions() {
        println!("  {} --{}--> {}", record.from, record.event, record.to);
    }

    println!("\n=== Demo Complete ===");
}
