//! The context store: named fields holding a machine's data.
//!
//! Context is a plain value. Nothing in the engine mutates a context in
//! place; assignment actions produce a new context and side effects only
//! ever see a shared reference.

use super::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single context field value.
///
/// Serialized untagged, so JSON `null`, booleans, integers, strings and
/// string arrays map directly onto the variants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Set(BTreeSet<String>),
    Resource(Resource),
}

impl Value {
    /// Build a set value from any iterator of strings.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Value::Resource(r) => Some(r),
            _ => None,
        }
    }

    /// Text form of scalar values, used when a value is added to a set.
    pub fn to_key(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<BTreeSet<String>> for Value {
    fn from(value: BTreeSet<String>) -> Self {
        Value::Set(value)
    }
}

impl From<Resource> for Value {
    fn from(value: Resource) -> Self {
        Value::Resource(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Ordered mapping from field name to [`Value`].
///
/// # Example
///
/// ```rust
/// use chartwell::core::{Context, Value};
///
/// let defaults = Context::new()
///     .with("filter", "")
///     .with("highlightIndex", -1);
/// let overrides = Context::new().with("filter", "ap");
///
/// let context = defaults.merged(&overrides);
/// assert_eq!(context.get_text("filter"), Some("ap"));
/// assert_eq!(context.get_int("highlightIndex"), Some(-1));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    fields: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this context with one field set.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    pub fn get_set(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.get(key).and_then(Value::as_set)
    }

    pub fn get_resource(&self, key: &str) -> Option<&Resource> {
        self.get(key).and_then(Value::as_resource)
    }

    /// Caller supplied fields win over the fields already present.
    pub fn merged(&self, overrides: &Context) -> Context {
        let mut fields = self.fields.clone();
        for (key, value) in &overrides.fields {
            fields.insert(key.clone(), value.clone());
        }
        Context { fields }
    }

    /// Apply a batch of field updates that were all computed beforehand.
    pub(crate) fn assigned(&self, updates: Vec<(String, Value)>) -> Context {
        let mut fields = self.fields.clone();
        fields.extend(updates);
        Context { fields }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Context {
            fields: iter.into_iter().collect(),
        }
    }
}
