//! Running machines.
//!
//! An [`Interpreter`] owns the mutable half of a statechart: the active
//! leaf, the current context and the subscribers. The [`Machine`] it runs
//! is shared and never changes.
//!
//! Processing is synchronous run-to-completion. A `send` issued while a
//! transition is still running (from an action, a subscriber or a
//! collaborator callback) is queued by default and handled once the
//! current transition has been committed and announced.
//!
//! # Example
//!
//! ```rust
//! use chartwell::builder::{state, MachineBuilder};
//! use chartwell::effects::ActionRegistry;
//! use chartwell::interpreter::{Interpreter, SendOutcome};
//!
//! let machine = MachineBuilder::new("light")
//!     .initial("off")
//!     .state(state("off").on("TOGGLE", "on"))
//!     .state(state("on").on("TOGGLE", "off"))
//!     .build(&ActionRegistry::new())
//!     .unwrap();
//!
//! let service = Interpreter::new(machine);
//! service.start();
//! assert_eq!(service.send("TOGGLE"), SendOutcome::Transitioned);
//! assert_eq!(service.state().unwrap().value(), "on");
//! ```

mod bus;
mod options;
mod snapshot;

pub use bus::Subscription;
pub use options::{InterpreterOptions, ReentrancyPolicy};
pub use snapshot::Snapshot;

use crate::core::{Event, StateHistory, TransitionRecord};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::effects::pipeline::run_actions;
use crate::machine::resolver::Resolution;
use crate::machine::{Machine, NodeId};
use bus::SubscriptionBus;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Lifecycle of an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Created, never started.
    Idle,
    Running,
    Stopped,
}

/// What a `send` did with its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A transition was taken and subscribers were notified.
    Transitioned,
    /// The event is handled by an active state but no guard passed.
    Swallowed,
    /// No active state handles the event; a diagnostic was reported.
    Unresolved,
    /// The interpreter was not running, or the event was dropped.
    Rejected,
    /// A transition was in flight; the event will run after it.
    Queued,
}

#[derive(Debug)]
struct Core {
    status: Status,
    leaf: Option<NodeId>,
    snapshot: Option<Arc<Snapshot>>,
    history: VecDeque<TransitionRecord>,
    /// Bumped by every start and stop so in-flight work can tell it is stale.
    generation: u64,
}

struct Shared {
    id: Uuid,
    machine: Machine,
    options: InterpreterOptions,
    sink: Arc<dyn DiagnosticSink>,
    core: Mutex<Core>,
    queue: Mutex<VecDeque<Event>>,
    busy: AtomicBool,
    bus: Arc<SubscriptionBus>,
    span: tracing::Span,
}

/// A running instance of a [`Machine`].
///
/// Cloning yields another handle to the same instance.
#[derive(Clone)]
pub struct Interpreter {
    inner: Arc<Shared>,
}

impl Interpreter {
    pub fn new(machine: Machine) -> Self {
        Self::with_options(machine, InterpreterOptions::default())
    }

    pub fn with_options(machine: Machine, options: InterpreterOptions) -> Self {
        Self::with_diagnostics(machine, options, Arc::new(TracingSink))
    }

    /// Create an interpreter reporting diagnostics to `sink`.
    pub fn with_diagnostics(
        machine: Machine,
        options: InterpreterOptions,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("interpreter", %id, machine = %machine.id());
        Self {
            inner: Arc::new(Shared {
                id,
                machine,
                options,
                sink,
                core: Mutex::new(Core {
                    status: Status::Idle,
                    leaf: None,
                    snapshot: None,
                    history: VecDeque::new(),
                    generation: 0,
                }),
                queue: Mutex::new(VecDeque::new()),
                busy: AtomicBool::new(false),
                bus: Arc::new(SubscriptionBus::default()),
                span,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn machine(&self) -> &Machine {
        &self.inner.machine
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.inner.options
    }

    /// Enter the initial configuration.
    ///
    /// Starting a stopped interpreter begins again from the initial state
    /// and context. Starting a running one does nothing.
    pub fn start(&self) {
        self.inner.start();
    }

    /// Stop processing events and drop the current snapshot.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Process one event.
    pub fn send(&self, event: impl Into<Event>) -> SendOutcome {
        self.inner.send(event.into())
    }

    /// Call `callback` with every snapshot produced from now on.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<Snapshot>) + Send + Sync + 'static,
    {
        let slot = self.inner.bus.add(Arc::new(callback));
        Subscription::new(slot, &self.inner.bus)
    }

    /// Current snapshot; `None` unless running.
    pub fn state(&self) -> Option<Arc<Snapshot>> {
        self.inner.core.lock().snapshot.clone()
    }

    pub fn status(&self) -> Status {
        self.inner.core.lock().status
    }

    /// Transitions taken since the last `start`.
    pub fn history(&self) -> StateHistory {
        self.inner.core.lock().history.iter().cloned().collect()
    }

    /// A weak handle for sending from actions and callbacks.
    ///
    /// Holding a sender does not keep the interpreter alive, so it can be
    /// captured by closures the interpreter itself owns.
    pub fn sender(&self) -> Sender {
        Sender {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("id", &self.inner.id)
            .field("machine", &self.inner.machine.id())
            .field("status", &self.status())
            .finish()
    }
}

/// Weak, cloneable handle that sends events to an interpreter.
#[derive(Clone)]
pub struct Sender {
    inner: Weak<Shared>,
}

impl std::fmt::Debug for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("connected", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Sender {
    /// Send `event`; `Rejected` once the interpreter has been dropped.
    pub fn send(&self, event: impl Into<Event>) -> SendOutcome {
        match self.inner.upgrade() {
            Some(shared) => shared.send(event.into()),
            None => {
                tracing::debug!("event sent to a dropped interpreter");
                SendOutcome::Rejected
            }
        }
    }
}

impl Shared {
    fn start(&self) {
        let _span = self.span.enter();
        let generation = {
            let mut core = self.core.lock();
            if core.status == Status::Running {
                tracing::debug!("start ignored, already running");
                return;
            }
            core.status = Status::Running;
            core.generation += 1;
            core.generation
        };
        self.queue.lock().clear();
        let busy = Busy::acquire(self);

        let tree = self.machine.tree();
        let leaf = self.machine.initial_leaf();
        let event = Event::init();
        let context = self
            .machine
            .active_path(leaf)
            .into_iter()
            .fold(self.machine.initial_context().clone(), |ctx, node| {
                run_actions(&tree.node(node).entry, ctx, &event, self.sink.as_ref())
            });

        let snapshot = Arc::new(Snapshot::new(
            self.machine.state_keys(leaf),
            context,
            event,
            true,
        ));
        let committed = {
            let mut core = self.core.lock();
            if core.generation == generation {
                core.leaf = Some(leaf);
                core.snapshot = Some(Arc::clone(&snapshot));
                core.history.clear();
                true
            } else {
                false
            }
        };

        if committed {
            tracing::info!(state = %snapshot.value(), "interpreter started");
            if self.options.notify_on_start {
                self.bus.notify(&snapshot);
            }
        } else {
            tracing::debug!("start superseded while entry actions ran");
        }
        if let Some(busy) = busy {
            busy.release();
        }
    }

    fn stop(&self) {
        let _span = self.span.enter();
        {
            let mut core = self.core.lock();
            if core.status == Status::Stopped {
                return;
            }
            core.status = Status::Stopped;
            core.generation += 1;
            core.leaf = None;
            core.snapshot = None;
        }
        self.queue.lock().clear();
        tracing::info!("interpreter stopped");
    }

    fn send(&self, event: Event) -> SendOutcome {
        let _span = self.span.enter();
        if self.core.lock().status != Status::Running {
            self.sink.report(&Diagnostic::SendWhileStopped {
                event: event.kind().to_string(),
            });
            return SendOutcome::Rejected;
        }

        let Some(busy) = Busy::acquire(self) else {
            return match self.options.reentrancy {
                ReentrancyPolicy::Queue => {
                    tracing::debug!(event = event.kind(), "event queued behind running transition");
                    self.queue.lock().push_back(event);
                    SendOutcome::Queued
                }
                ReentrancyPolicy::Reject => {
                    self.sink.report(&Diagnostic::ReentrantSend {
                        event: event.kind().to_string(),
                    });
                    SendOutcome::Rejected
                }
            };
        };

        let outcome = self.process(event);
        busy.release();
        outcome
    }

    /// Drain queued events, then clear the busy flag.
    fn drain(&self) {
        loop {
            loop {
                let next = self.queue.lock().pop_front();
                match next {
                    Some(event) => {
                        self.process(event);
                    }
                    None => break,
                }
            }
            self.busy.store(false, Ordering::Release);
            if self.queue.lock().is_empty() || self.busy.swap(true, Ordering::AcqRel) {
                break;
            }
        }
    }

    fn process(&self, event: Event) -> SendOutcome {
        let active = {
            let core = self.core.lock();
            match (core.status, core.leaf, core.snapshot.clone()) {
                (Status::Running, Some(leaf), Some(snapshot)) => Some((leaf, snapshot, core.generation)),
                _ => None,
            }
        };
        let Some((leaf, current, generation)) = active else {
            self.sink.report(&Diagnostic::SendWhileStopped {
                event: event.kind().to_string(),
            });
            return SendOutcome::Rejected;
        };

        let selected = match self.machine.resolve(leaf, current.context(), &event) {
            Resolution::Selected(selected) => selected,
            Resolution::Swallowed { node } => {
                tracing::debug!(
                    event = event.kind(),
                    handler = %self.machine.tree().node(node).key,
                    "no guard passed"
                );
                return SendOutcome::Swallowed;
            }
            Resolution::Unresolved => {
                self.sink.report(&Diagnostic::UnresolvedEvent {
                    event: event.kind().to_string(),
                    state: current.value(),
                });
                return SendOutcome::Unresolved;
            }
        };

        let tree = self.machine.tree();
        let sink = self.sink.as_ref();
        let mut context = current.context().clone();
        for node in &selected.exits {
            context = run_actions(&tree.node(*node).exit, context, &event, sink);
        }
        context = run_actions(&selected.transition.actions, context, &event, sink);
        for node in &selected.entries {
            context = run_actions(&tree.node(*node).entry, context, &event, sink);
        }

        let path = self.machine.state_keys(selected.leaf);
        let changed = path.as_slice() != current.path();
        let kind = event.kind().to_string();
        let snapshot = Arc::new(Snapshot::new(path, context, event, changed));
        {
            let mut core = self.core.lock();
            if core.generation != generation {
                tracing::debug!(event = %kind, "transition discarded, interpreter restarted or stopped");
                return SendOutcome::Rejected;
            }
            let record = TransitionRecord {
                from: current.value(),
                to: snapshot.value(),
                event: kind.clone(),
                timestamp: Utc::now(),
            };
            core.history.push_back(record);
            if let Some(limit) = self.options.history_limit {
                let excess = core.history.len().saturating_sub(limit);
                core.history.drain(..excess);
            }
            core.leaf = Some(selected.leaf);
            core.snapshot = Some(Arc::clone(&snapshot));
        }

        tracing::debug!(
            event = %kind,
            from = %current.value(),
            to = %snapshot.value(),
            "transition"
        );
        self.bus.notify(&snapshot);
        SendOutcome::Transitioned
    }
}

/// Ownership of the busy flag for one outermost `send` or `start`.
///
/// Dropped without [`release`](Busy::release) only while unwinding out of an
/// action or subscriber. The flag is then cleared and queued events are
/// dropped, and a start that never committed leaves the interpreter stopped.
struct Busy<'a> {
    shared: &'a Shared,
    released: bool,
}

impl<'a> Busy<'a> {
    fn acquire(shared: &'a Shared) -> Option<Self> {
        if shared.busy.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self {
                shared,
                released: false,
            })
        }
    }

    fn release(mut self) {
        self.shared.drain();
        self.released = true;
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let dropped = {
            let mut queue = self.shared.queue.lock();
            let dropped = queue.len();
            queue.clear();
            dropped
        };
        {
            let mut core = self.shared.core.lock();
            if core.status == Status::Running && core.snapshot.is_none() {
                core.status = Status::Stopped;
                core.generation += 1;
            }
        }
        self.shared.busy.store(false, Ordering::Release);
        tracing::warn!(dropped, "transition unwound, busy flag cleared");
    }
}

/// Start an interpreter for `machine` with default options.
pub fn interpret(machine: Machine) -> Interpreter {
    let service = Interpreter::new(machine);
    service.start();
    service
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{state, transition, MachineBuilder};
    use crate::core::Context;
    use crate::diagnostics::CollectingSink;
    use crate::effects::{ActionRegistry, Assignment};
    use std::sync::atomic::AtomicUsize;

    fn counter_machine(log: Arc<Mutex<Vec<String>>>) -> Machine {
        let entry_log = Arc::clone(&log);
        let exit_log = Arc::clone(&log);
        let registry = ActionRegistry::new()
            .with_assign(
                "bump",
                Assignment::new().field("count", |ctx: &Context, _: &Event| {
                    ctx.get_int("count").unwrap_or(0) + 1
                }),
            )
            .with_effect("logEntry", move |_, ev| entry_log.lock().push(format!("enter:{}", ev.kind())))
            .with_effect("logExit", move |_, ev| exit_log.lock().push(format!("exit:{}", ev.kind())));

        MachineBuilder::new("counter")
            .context(Context::new().with("count", 0))
            .initial("idle")
            .on("BUMP", transition().action("bump"))
            .state(state("idle").on("GO", "active").exit("logExit"))
            .state(
                state("active")
                    .entry("logEntry")
                    .on("STOP", "idle")
                    .on("MAYBE", transition().when(|_, _| false).target("idle")),
            )
            .build(&registry)
            .unwrap()
    }

    #[test]
    fn lifecycle_statuses() {
        let service = Interpreter::new(counter_machine(Arc::default()));
        assert_eq!(service.status(), Status::Idle);
        assert!(service.state().is_none());

        service.start();
        assert_eq!(service.status(), Status::Running);
        assert_eq!(service.state().unwrap().value(), "idle");
        assert_eq!(service.state().unwrap().event().kind(), crate::core::INIT_EVENT);

        service.stop();
        assert_eq!(service.status(), Status::Stopped);
        assert!(service.state().is_none());
    }

    #[test]
    fn exit_then_entry_ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = interpret(counter_machine(Arc::clone(&log)));

        assert_eq!(service.send("GO"), SendOutcome::Transitioned);
        assert_eq!(*log.lock(), vec!["exit:GO", "enter:GO"]);
        assert!(service.state().unwrap().changed());
    }

    #[test]
    fn targetless_transition_keeps_path_and_notifies() {
        let service = interpret(counter_machine(Arc::default()));
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        service.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(service.send("BUMP"), SendOutcome::Transitioned);
        let snapshot = service.state().unwrap();
        assert_eq!(snapshot.value(), "idle");
        assert!(!snapshot.changed());
        assert_eq!(snapshot.context().get_int("count"), Some(1));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn swallowed_and_unresolved_leave_snapshot_untouched() {
        let sink = CollectingSink::new();
        let service = Interpreter::with_diagnostics(
            counter_machine(Arc::default()),
            InterpreterOptions::default(),
            Arc::new(sink.clone()),
        );
        service.start();
        service.send("GO");
        let before = service.state().unwrap();

        assert_eq!(service.send("MAYBE"), SendOutcome::Swallowed);
        assert!(sink.is_empty());
        assert_eq!(service.send("NOPE"), SendOutcome::Unresolved);
        assert!(Arc::ptr_eq(&before, &service.state().unwrap()));
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::UnresolvedEvent {
                event: "NOPE".to_string(),
                state: "active".to_string(),
            }]
        );
    }

    #[test]
    fn history_is_bounded() {
        let service = Interpreter::with_options(
            counter_machine(Arc::default()),
            InterpreterOptions::new().history_limit(Some(2)),
        );
        service.start();
        for _ in 0..5 {
            service.send("BUMP");
        }

        let history = service.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().event, "BUMP");
    }

    #[test]
    fn dropped_interpreter_rejects_sender() {
        let service = interpret(counter_machine(Arc::default()));
        let sender = service.sender();
        assert_eq!(sender.send("GO"), SendOutcome::Transitioned);

        drop(service);
        assert_eq!(sender.send("STOP"), SendOutcome::Rejected);
    }

    #[test]
    fn stop_before_start_marks_stopped() {
        let service = Interpreter::new(counter_machine(Arc::default()));
        service.stop();
        assert_eq!(service.status(), Status::Stopped);
        assert_eq!(service.send("GO"), SendOutcome::Rejected);

        service.start();
        assert_eq!(service.send("GO"), SendOutcome::Transitioned);
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let service = interpret(counter_machine(Arc::default()));
        service.send("BUMP");
        service.start();
        assert_eq!(service.state().unwrap().context().get_int("count"), Some(1));
    }
}
