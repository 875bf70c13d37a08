//! Transition history tracking.
//!
//! Provides immutable tracking of the transitions an interpreter took,
//! following functional programming principles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single completed transition.
///
/// Paths are dotted state paths such as `"focused.opened"`.
///
/// # Example
///
/// ```rust
/// use chartwell::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: "unfocused".to_string(),
///     to: "focused.opened".to_string(),
///     event: "FOCUS".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert!(record.changed_state());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The active state before the transition
    pub from: String,
    /// The active state after the transition
    pub to: String,
    /// Kind of the event that triggered it
    pub event: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    /// Whether the active state differs after the transition.
    pub fn changed_state(&self) -> bool {
        self.from != self.to
    }
}

/// Ordered history of transitions.
///
/// History is immutable - `record` returns a new history with the
/// transition added.
///
/// # Example
///
/// ```rust
/// use chartwell::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let step = |from: &str, to: &str, event: &str| TransitionRecord {
///     from: from.to_string(),
///     to: to.to_string(),
///     event: event.to_string(),
///     timestamp: Utc::now(),
/// };
///
/// let history = StateHistory::new()
///     .record(step("unfocused", "focused.opened", "FOCUS"))
///     .record(step("focused.opened", "focused.closed", "CLOSE"));
///
/// assert_eq!(
///     history.get_path(),
///     vec!["unfocused", "focused.opened", "focused.closed"]
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<TransitionRecord>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: TransitionRecord) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first transition, then the `to`
    /// state of each transition.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions in order.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.last()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

impl FromIterator<TransitionRecord> for StateHistory {
    fn from_iter<I: IntoIterator<Item = TransitionRecord>>(iter: I) -> Self {
        Self {
            transitions: iter.into_iter().collect(),
        }
    }
}
