//! Declarative Machine
//!
//! This demo loads a machine from JSON, binds its action names to a
//! registry and runs it.
//!
//! Key concepts:
//! - The declarative machine format
//! - Named assignments and guards
//! - Construction errors listing every problem at once
//!
//! Run with: cargo run --example declarative_machine

use chartwell::core::{Context, Event};
use chartwell::effects::{ActionRegistry, Assignment};
use chartwell::interpreter::Interpreter;
use chartwell::machine::Machine;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Declarative Machine ===\n");

    let registry = ActionRegistry::new()
        .with_assign(
            "countPress",
            Assignment::new().field("presses", |ctx: &Context, _: &Event| {
                ctx.get_int("presses").unwrap_or(0) + 1
            }),
        )
        .with_effect("announce", |ctx, _| {
            println!("  light is on ({} presses)", ctx.get_int("presses").unwrap_or(0));
        })
        .with_guard("hasPower", |ctx, _| ctx.get_bool("power").unwrap_or(false));

    let config = json!({
        "id": "lamp",
        "initial": "off",
        "context": { "presses": 0, "power": true },
        "states": {
            "off": {
                "on": { "PRESS": { "target": "on", "cond": "hasPower", "actions": "countPress" } }
            },
            "on": {
                "entry": "announce",
                "on": { "PRESS": "off" }
            }
        }
    });

    let machine = Machine::from_json(&config, &registry).expect("lamp definition is valid");
    println!("Leaf states: {:?}", machine.leaf_states());

    let service = Interpreter::new(machine);
    service.start();
    for _ in 0..4 {
        service.send("PRESS");
        println!("  state: {}", service.state().map(|s| s.value()).unwrap_or_default());
    }

    println!("\nA broken definition reports every problem:");
    let broken = json!({
        "id": "broken",
        "initial": "missing",
        "states": {
            "a": { "on": { "GO": { "target": "nowhere", "actions": "undefined" } } }
        }
    });
    match Machine::from_json(&broken, &registry) {
        Ok(_) => println!("  unexpectedly valid"),
        Err(err) => {
            for violation in err.violations() {
                println!("  - {violation}");
            }
        }
    }

    println!("\n=== Demo Complete ===");
}
