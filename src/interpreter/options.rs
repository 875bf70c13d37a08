//! Interpreter configuration.

use serde::{Deserialize, Serialize};

/// What `send` does when called while a transition is already running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentrancyPolicy {
    /// Append to the interpreter's FIFO queue; the outermost `send` drains it.
    #[default]
    Queue,
    /// Drop the event and report a `ReentrantSend` diagnostic.
    Reject,
}

/// Interpreter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterOptions {
    /// Handling of sends issued from actions, subscribers or collaborators.
    pub reentrancy: ReentrancyPolicy,
    /// Maximum number of history records kept. `None` keeps everything.
    pub history_limit: Option<usize>,
    /// Notify subscribers with the initial snapshot on `start`.
    pub notify_on_start: bool,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            reentrancy: ReentrancyPolicy::Queue,
            history_limit: Some(64),
            notify_on_start: true,
        }
    }
}

impl InterpreterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reentrancy(mut self, policy: ReentrancyPolicy) -> Self {
        self.reentrancy = policy;
        self
    }

    pub fn history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn notify_on_start(mut self, notify: bool) -> Self {
        self.notify_on_start = notify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = InterpreterOptions::default();
        assert_eq!(options.reentrancy, ReentrancyPolicy::Queue);
        assert_eq!(options.history_limit, Some(64));
        assert!(options.notify_on_start);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let options: InterpreterOptions =
            serde_json::from_str(r#"{ "reentrancy": "reject" }"#).unwrap();

        assert_eq!(options.reentrancy, ReentrancyPolicy::Reject);
        assert_eq!(options.history_limit, Some(64));
        assert!(options.notify_on_start);
    }

    #[test]
    fn setters_chain() {
        let options = InterpreterOptions::new()
            .history_limit(None)
            .notify_on_start(false);

        assert_eq!(options.history_limit, None);
        assert!(!options.notify_on_start);
    }
}
