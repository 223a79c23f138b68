use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Principal is the set of entities (accounts, users, services) a statement applies to.
///
/// Each principal type (e.g. `"AWS"`) maps to one or more values. Writing a key that
/// already holds a value turns it into a list that accumulates every write in order:
///
/// ```
/// # use apl::Principal;
/// let mut p = Principal::new();
/// p.set("AWS", "123456789012");
/// p.set("AWS", "210987654321");
/// assert_eq!(
///     serde_json::to_string(&p).unwrap(),
///     r#"{"AWS":["123456789012","210987654321"]}"#
/// );
/// ```
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct Principal(BTreeMap<String, Value>);

impl Principal {
    /// Create an empty principal
    pub fn new() -> Self {
        Principal(BTreeMap::new())
    }

    /// Add a value for the given principal type. A first write stores the value as is,
    /// later writes for the same key accumulate into a list.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let key = key.into();
        let value = value.into();
        trace!("principal {} <- {}", key, value);

        match self.0.remove(&key) {
            None => {
                self.0.insert(key, value);
            }
            Some(Value::Array(mut values)) => {
                values.push(value);
                self.0.insert(key, Value::Array(values));
            }
            Some(current) => {
                self.0.insert(key, Value::Array(vec![current, value]));
            }
        }
    }

    /// The value(s) stored for a principal type
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of principal types present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no principal has been set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (principal type, value) pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}
