//! Immutable view of an interpreter at one point in time.

use crate::core::{Context, Event};
use serde::Serialize;

/// The active configuration, the context and the event that produced them.
///
/// Snapshots are handed out behind an `Arc` and never change; a transition
/// produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    path: Vec<String>,
    context: Context,
    event: Event,
    changed: bool,
}

impl Snapshot {
    pub(crate) fn new(path: Vec<String>, context: Context, event: Event, changed: bool) -> Self {
        Self {
            path,
            context,
            event,
            changed,
        }
    }

    /// Keys of the active states below the root, outermost first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Dotted form of [`path`](Self::path), e.g. `"focused.opened"`.
    pub fn value(&self) -> String {
        self.path.join(".")
    }

    /// Whether `state` is active.
    ///
    /// `state` is a dotted path from the root and matches whole segments
    /// only: `"focused"` matches `focused.opened`, `"focus"` does not.
    ///
    /// ```rust
    /// # use chartwell::combobox;
    /// # use chartwell::core::Context;
    /// # use chartwell::interpreter::Interpreter;
    /// let service = Interpreter::new(combobox::machine(Context::new(), None).unwrap());
    /// service.start();
    /// service.send(combobox::FOCUS);
    ///
    /// let snapshot = service.state().unwrap();
    /// assert!(snapshot.matches("focused"));
    /// assert!(snapshot.matches("focused.opened"));
    /// assert!(!snapshot.matches("focus"));
    /// ```
    pub fn matches(&self, state: &str) -> bool {
        if state.is_empty() {
            return true;
        }
        let segments: Vec<&str> = state.split('.').collect();
        segments.len() <= self.path.len()
            && segments.iter().zip(&self.path).all(|(want, have)| *want == have)
    }

    /// Key of the active leaf.
    pub fn leaf(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The event that produced this snapshot (`"@init"` after `start`).
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Whether the active path differs from the previous snapshot's.
    pub fn changed(&self) -> bool {
        self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(path: &[&str]) -> Snapshot {
        Snapshot::new(
            path.iter().map(|s| s.to_string()).collect(),
            Context::new(),
            Event::new("FOCUS"),
            true,
        )
    }

    #[test]
    fn value_joins_segments() {
        assert_eq!(snapshot(&["focused", "opened"]).value(), "focused.opened");
        assert_eq!(snapshot(&["unfocused"]).leaf(), Some("unfocused"));
    }

    #[test]
    fn matches_whole_segments_from_root() {
        let s = snapshot(&["focused", "opened"]);
        assert!(s.matches("focused"));
        assert!(s.matches("focused.opened"));
        assert!(!s.matches("opened"));
        assert!(!s.matches("focused.closed"));
        assert!(!s.matches("focused.opened.deeper"));
    }

    #[test]
    fn serializes_path_and_event() {
        let json = serde_json::to_value(snapshot(&["unfocused"])).unwrap();
        assert_eq!(json["path"], serde_json::json!(["unfocused"]));
        assert_eq!(json["event"]["type"], "FOCUS");
        assert_eq!(json["changed"], true);
    }
}
