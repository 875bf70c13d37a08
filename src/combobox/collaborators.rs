//! Host-side collaborators of the combobox.
//!
//! The machine only talks to the outside world through these traits. Hosts
//! implement them over whatever widget toolkit they use; the engine ships
//! only [`ContainsFilter`].

use crate::core::Context;
use crate::interpreter::{SendOutcome, Sender};
use std::fmt;

pub use crate::core::Focusable;

/// Narrows the item list to what the current filter allows.
pub trait ItemFilter: Send + Sync {
    fn filter<'a>(&self, items: &'a [String], query: &str) -> Vec<&'a str>;
}

/// Case-insensitive substring match. An empty query keeps every item.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsFilter;

impl ItemFilter for ContainsFilter {
    fn filter<'a>(&self, items: &'a [String], query: &str) -> Vec<&'a str> {
        let needle = query.to_lowercase();
        items
            .iter()
            .map(String::as_str)
            .filter(|item| item.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Receives the notifications a combobox owner listens for.
pub trait HostNotifier: Send + Sync {
    /// `name` is one of `"input"`, `"focus"` or `"blur"`.
    fn emit(&self, name: &str, context: &Context);
}

type ReleaseFn = Box<dyn FnOnce() + Send>;

/// Undoes a registration when released or dropped.
pub struct ReleaseHandle {
    release: Option<ReleaseFn>,
}

impl ReleaseHandle {
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn release(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ReleaseHandle {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for ReleaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseHandle")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// Watches for pointer presses outside the widget's region.
pub trait OutsideClickDetector {
    /// Call `on_outside` for every press outside the region until the
    /// returned handle is released.
    fn watch(&self, on_outside: Box<dyn Fn() + Send + Sync>) -> ReleaseHandle;
}

/// Blur the combobox whenever `detector` sees a press outside it.
pub fn close_on_outside_click(detector: &dyn OutsideClickDetector, sender: Sender) -> ReleaseHandle {
    detector.watch(Box::new(move || {
        if sender.send(super::BLUR) == SendOutcome::Rejected {
            tracing::trace!("outside click ignored, combobox not running");
        }
    }))
}
