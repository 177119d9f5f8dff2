//! Ordered record type for the value model.
//!
//! [`Record`] wraps [`IndexMap`] so that keys keep the position they were first seen at.
//! Every parser relies on this: re-inserting a key overwrites its value but does not move
//! it, which is exactly how duplicate CSV headers, duplicate JSON keys and repeated SQL
//! column names behave.
//!
//! ## Examples
//!
//! ```rust
//! use datacast::{Record, Value};
//!
//! let mut record = Record::new();
//! record.insert("name".to_string(), Value::from("Alice"));
//! record.insert("age".to_string(), Value::from(30));
//! record.insert("name".to_string(), Value::from("Bob"));
//!
//! let keys: Vec<_> = record.keys().cloned().collect();
//! assert_eq!(keys, vec!["name", "age"]);
//! assert_eq!(record.get("name").and_then(|v| v.as_str()), Some("Bob"));
//! ```

use indexmap::IndexMap;

/// An ordered, key-unique map from string keys to values, modeling one row or object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record(IndexMap<String, crate::Value>);

impl Record {
    /// Creates an empty `Record`.
    #[must_use]
    pub fn new() -> Self {
        Record(IndexMap::new())
    }

    /// Creates an empty `Record` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Record(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the record.
    ///
    /// If the key was already present its value is replaced in place, keeping the
    /// original position, and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::{Record, Value};
    ///
    /// let mut record = Record::new();
    /// assert!(record.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(record.insert("key".to_string(), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    /// Returns `true` if the record contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, shifting later entries down so the remaining order is preserved.
    pub fn remove(&mut self, key: &str) -> Option<crate::Value> {
        self.0.shift_remove(key)
    }

    /// Returns the number of entries in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in first-seen order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values, in first-seen order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Returns an iterator over the entries, in first-seen order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl IntoIterator for Record {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}
