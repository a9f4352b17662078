//! Read access to submitted form records.
//!
//! The evaluator only ever reads a record through [`Record::field`]; a field
//! that is missing and one that maps to nothing (JSON `null`) are treated the
//! same way.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;
use serde_json::Value;

/// A submitted form record: field name → raw text value.
pub trait Record {
    /// The raw value of `name`, or `None` if the field was not submitted.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

impl<S: BuildHasher> Record for HashMap<String, String, S> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl Record for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl<S: BuildHasher> Record for IndexMap<String, String, S> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

/// JSON bodies: strings are used as-is, `null` counts as absent, and any
/// other value is read as its JSON text (`17`, `true`).
impl Record for serde_json::Map<String, Value> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Record for [(K, V)] {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        lookup_pair(self, name)
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> Record for [(K, V); N] {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        lookup_pair(self, name)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Record for Vec<(K, V)> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        lookup_pair(self, name)
    }
}

// First occurrence wins for repeated keys.
fn lookup_pair<'a, K: AsRef<str>, V: AsRef<str>>(
    pairs: &'a [(K, V)],
    name: &str,
) -> Option<Cow<'a, str>> {
    pairs
        .iter()
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| Cow::Borrowed(v.as_ref()))
}
