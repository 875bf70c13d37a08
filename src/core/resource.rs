//! Opaque handles to host resources that can take focus.
//!
//! The engine never touches a widget directly. A host wraps whatever it owns
//! (an input element, a terminal pane, a test double) in a [`Focusable`]
//! implementation and hands it to the machine inside an event's `target`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A resource that can receive and release input focus.
pub trait Focusable: Send + Sync {
    /// Request focus for this resource.
    fn focus(&self);

    /// Release focus from this resource.
    fn blur(&self);

    /// Short human readable label, used in logs and serialized snapshots.
    fn label(&self) -> &str {
        "focusable"
    }
}

/// Shared, cloneable handle to a [`Focusable`].
///
/// Two handles are equal only when they point at the same resource.
///
/// # Example
///
/// ```rust
/// use chartwell::core::{Focusable, Resource};
///
/// struct Input;
///
/// impl Focusable for Input {
///     fn focus(&self) {}
///     fn blur(&self) {}
/// }
///
/// let a = Resource::new(Input);
/// let b = a.clone();
/// let c = Resource::new(Input);
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Clone)]
pub struct Resource(Arc<dyn Focusable>);

impl Resource {
    pub fn new<F: Focusable + 'static>(focusable: F) -> Self {
        Self(Arc::new(focusable))
    }

    pub fn from_arc(focusable: Arc<dyn Focusable>) -> Self {
        Self(focusable)
    }

    pub fn focus(&self) {
        self.0.focus();
    }

    pub fn blur(&self) {
        self.0.blur();
    }

    pub fn label(&self) -> &str {
        self.0.label()
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resource").field(&self.label()).finish()
    }
}

// Resources serialize as their label so snapshots stay printable.
impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D: Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {
        Err(D::Error::custom(
            "resources are attached at runtime and cannot be deserialized",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        focused: AtomicUsize,
        blurred: AtomicUsize,
    }

    impl Focusable for Counter {
        fn focus(&self) {
            self.focused.fetch_add(1, Ordering::SeqCst);
        }

        fn blur(&self) {
            self.blurred.fetch_add(1, Ordering::SeqCst);
        }

        fn label(&self) -> &str {
            "counter"
        }
    }

    #[test]
    fn resource_forwards_focus_and_blur() {
        let counter = Arc::new(Counter::default());
        let resource = Resource::from_arc(counter.clone());

        resource.focus();
        resource.focus();
        resource.blur();

        assert_eq!(counter.focused.load(Ordering::SeqCst), 2);
        assert_eq!(counter.blurred.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resource_equality_is_identity() {
        let a = Resource::new(Counter::default());
        let b = Resource::new(Counter::default());

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn resource_serializes_as_label() {
        let resource = Resource::new(Counter::default());
        let json = serde_json::to_string(&resource).unwrap();
        assert_eq!(json, "\"counter\"");
    }

    #[test]
    fn resource_refuses_deserialization() {
        let result: Result<Resource, _> = serde_json::from_str("\"counter\"");
        assert!(result.is_err());
    }
}
