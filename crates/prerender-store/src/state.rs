//! JSON state tree with dotted-path access.

use serde_json::{Map, Value};

/// Application state for one request, stored as a JSON object tree.
///
/// Paths are dot-separated keys (`"intl.locale"`). Reads clone; writes
/// create intermediate objects as needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateTree {
    root: Map<String, Value>,
}

impl StateTree {
    /// Create an empty state tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the value at a path.
    pub fn get(&self, path: &str) -> Option<Value> {
        let mut iter = path.split('.');
        let first = iter.next()?;
        let mut node = self.root.get(first)?;
        for key in iter {
            node = node.as_object()?.get(key)?;
        }
        Some(node.clone())
    }

    /// Set the value at a path, replacing whatever was there.
    ///
    /// Intermediate objects are created; a non-object intermediate is
    /// replaced by an object.
    pub fn set(&mut self, path: &str, value: Value) {
        let mut keys: Vec<&str> = path.split('.').collect();
        let Some(last) = keys.pop() else {
            return;
        };

        let mut node = &mut self.root;
        for key in keys {
            let entry = node
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            match entry.as_object_mut() {
                Some(obj) => node = obj,
                None => return,
            }
        }
        node.insert(last.to_string(), value);
    }

    /// Deep-merge an object into the value at a path.
    ///
    /// Non-object values on either side are replaced by the incoming value.
    pub fn merge(&mut self, path: &str, value: Value) {
        match self.get(path) {
            Some(existing) => {
                let merged = deep_merge(existing, value);
                self.set(path, merged);
            }
            None => self.set(path, value),
        }
    }

    /// Take a deep, serializable copy of the whole tree.
    pub fn snapshot(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Whether the tree holds no state.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn deep_merge(base: Value, incoming: Value) -> Value {
    match (base, incoming) {
        (Value::Object(mut base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match base.remove(&key) {
                    Some(existing) => {
                        base.insert(key, deep_merge(existing, value));
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (_, incoming) => incoming,
    }
}
