//! Non-fatal conditions reported while a machine runs.
//!
//! The interpreter never fails a `send`. Anything worth knowing about
//! (unhandled events, skipped actions, rejected sends) is handed to a
//! [`DiagnosticSink`] so the host decides whether to log, collect or assert.

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// A non-fatal condition observed by the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("event '{event}' has no handler in state '{state}'")]
    UnresolvedEvent { event: String, state: String },

    #[error("action '{name}' could not be found while handling '{event}'")]
    UnknownAction { name: String, event: String },

    #[error("event '{event}' was sent while the interpreter is not running")]
    SendWhileStopped { event: String },

    #[error("event '{event}' was sent while another transition was in flight")]
    ReentrantSend { event: String },
}

impl Diagnostic {
    /// Kind of the event the diagnostic concerns.
    pub fn event(&self) -> &str {
        match self {
            Diagnostic::UnresolvedEvent { event, .. }
            | Diagnostic::UnknownAction { event, .. }
            | Diagnostic::SendWhileStopped { event }
            | Diagnostic::ReentrantSend { event } => event,
        }
    }
}

/// Destination for diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Default sink: every diagnostic becomes a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::warn!(event = diagnostic.event(), "{}", diagnostic);
    }
}

/// Sink that keeps every diagnostic in memory.
///
/// Clones share the same buffer, so a test can keep one clone and hand the
/// other to the interpreter.
///
/// ```rust
/// use chartwell::diagnostics::{CollectingSink, Diagnostic, DiagnosticSink};
///
/// let sink = CollectingSink::new();
/// sink.report(&Diagnostic::SendWhileStopped { event: "FOCUS".to_string() });
///
/// assert_eq!(sink.entries().len(), 1);
/// assert_eq!(sink.entries()[0].event(), "FOCUS");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::debug!(event = diagnostic.event(), "collected diagnostic: {}", diagnostic);
        self.entries.lock().push(diagnostic.clone());
    }
}
