//! The VM's associative container.
//!
//! Raw, untyped access only; the typed accessor lives in the SDK. Keys are
//! strings, which is what the globals table and the boundary tests need.

use rustc_hash::FxHashMap;
use std::rc::Rc;

use crate::value::Value;

/// An associative VM container with string keys.
#[derive(Debug, Default)]
pub struct Table {
    entries: FxHashMap<Rc<str>, Value>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a field; missing fields read as nil.
    pub fn raw_get(&self, key: &str) -> Value {
        self.entries.get(key).cloned().unwrap_or(Value::Nil)
    }

    /// Store a field. Setting nil removes the entry, so a table never
    /// distinguishes "absent" from "nil".
    pub fn raw_set(&mut self, key: impl AsRef<str>, value: Value) {
        match value {
            Value::Nil => {
                self.entries.remove(key.as_ref());
            }
            other => {
                self.entries.insert(Rc::from(key.as_ref()), other);
            }
        }
    }

    /// Visit every entry. Iteration order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
