//! Events delivered to an interpreter.

use super::context::Value;
use super::resource::Resource;
use serde::{Deserialize, Serialize};

/// Kind of the synthetic event used when a machine starts.
pub const INIT_EVENT: &str = "@init";

/// A discriminated event with optional payload.
///
/// Events are consumed entirely within one `send` call.
///
/// # Example
///
/// ```rust
/// use chartwell::core::Event;
///
/// let event = Event::new("SELECT").with_value("apple");
/// assert_eq!(event.kind(), "SELECT");
/// assert_eq!(event.value_text(), Some("apple"));
///
/// let bare: Event = "FOCUS".into();
/// assert!(bare.value.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Resource>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: None,
            target: None,
        }
    }

    pub(crate) fn init() -> Self {
        Self::new(INIT_EVENT)
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_target(mut self, target: Resource) -> Self {
        self.target = Some(target);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn value_text(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_text)
    }

    pub fn value_int(&self) -> Option<i64> {
        self.value.as_ref().and_then(Value::as_int)
    }
}

impl From<&str> for Event {
    fn from(kind: &str) -> Self {
        Event::new(kind)
    }
}

impl From<String> for Event {
    fn from(kind: String) -> Self {
        Event::new(kind)
    }
}
