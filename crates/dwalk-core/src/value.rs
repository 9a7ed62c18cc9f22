use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Number;

use crate::error::WalkError;

/// A node of a walkable tree.
///
/// `Sequence` and `Mapping` are shared handles: cloning one yields a second
/// handle to the same container, which is what lets a visit write back into
/// its parent. `Bool` is carried for JSON fidelity but never visited.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Absent,
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Sequence(Sequence),
    Mapping(Mapping),
}

impl Value {
    pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(items.into_iter().collect())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Mapping(entries.into_iter().collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    /// Builds a number value; non-finite floats become `Null` since they have no
    /// JSON representation.
    pub fn float(f: f64) -> Self {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Sequence> for Value {
    fn from(s: Sequence) -> Self {
        Value::Sequence(s)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

// -------- Sequence --------

/// Shared, index-addressed container.
#[derive(Clone, Default, PartialEq)]
pub struct Sequence(Rc<RefCell<Vec<Value>>>);

impl Sequence {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns a clone of the item at `index`; containers come back as shared handles.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Writes `value` at `index`. Writing past the end pads the gap with `Absent`.
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.borrow_mut();
        if index >= items.len() {
            items.resize(index + 1, Value::Absent);
        }
        items[index] = value;
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// True when both handles refer to the same container.
    pub fn ptr_eq(&self, other: &Sequence) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.borrow().iter()).finish()
    }
}

// -------- Mapping --------

/// Shared, string-keyed container that keeps insertion order.
#[derive(Clone, Default, PartialEq)]
pub struct Mapping(Rc<RefCell<Vec<(String, Value)>>>);

impl Mapping {
    /// Builds a mapping from entries. A repeated key keeps its first position
    /// and takes the last value, as `serde_json::Map` does.
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        let map = Self(Rc::new(RefCell::new(Vec::with_capacity(entries.len()))));
        for (key, value) in entries {
            map.insert(key, value);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the keys in entry order.
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Replaces the value of an existing key in place, or appends a new entry.
    /// Returns the previous value, if any.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        let mut entries = self.0.borrow_mut();
        if let Some((_, slot)) = entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        entries.push((key, value));
        None
    }

    /// Removes an entry, shifting later entries down.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut entries = self.0.borrow_mut();
        let pos = entries.iter().position(|(k, _)| k == key)?;
        Some(entries.remove(pos).1)
    }

    /// Renames `old` to `new` without moving the entry.
    ///
    /// Renaming a key to itself is a no-op. Fails when `new` already names a
    /// different entry or when `old` is not present.
    pub fn rename_key(&self, old: &str, new: &str) -> Result<(), WalkError> {
        if old == new {
            return if self.contains_key(old) {
                Ok(())
            } else {
                Err(WalkError::MissingKey { key: old.to_string() })
            };
        }
        let mut entries = self.0.borrow_mut();
        if entries.iter().any(|(k, _)| k == new) {
            return Err(WalkError::KeyCollision { key: new.to_string() });
        }
        let entry = entries
            .iter_mut()
            .find(|(k, _)| k == old)
            .ok_or_else(|| WalkError::MissingKey { key: old.to_string() })?;
        entry.0 = new.to_string();
        Ok(())
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Mapping) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.borrow().iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mapping {
        Mapping::from_iter([
            ("a", Value::from(1)),
            ("k", Value::from("middle")),
            ("b", Value::Null),
        ])
    }

    #[test]
    fn rename_key_keeps_position_and_value() {
        let m = sample();
        m.rename_key("k", "k2").unwrap();
        assert_eq!(m.keys(), vec!["a", "k2", "b"]);
        assert_eq!(m.get("k2"), Some(Value::from("middle")));
        assert_eq!(m.get("k"), None);
    }

    #[test]
    fn rename_key_onto_existing_key_fails() {
        let m = sample();
        let err = m.rename_key("k", "a").unwrap_err();
        assert!(matches!(err, WalkError::KeyCollision { ref key } if key == "a"));
        assert_eq!(m.keys(), vec!["a", "k", "b"]);
    }

    #[test]
    fn rename_key_to_itself_is_noop() {
        let m = sample();
        m.rename_key("k", "k").unwrap();
        assert_eq!(m.keys(), vec!["a", "k", "b"]);
        assert!(matches!(
            m.rename_key("zz", "zz"),
            Err(WalkError::MissingKey { .. })
        ));
    }

    #[test]
    fn clones_share_the_container() {
        let s = Sequence::from_iter([Value::from(1), Value::from(2)]);
        let alias = s.clone();
        alias.set(0, Value::from("x"));
        assert_eq!(s.get(0), Some(Value::from("x")));
        assert!(s.ptr_eq(&alias));
    }

    #[test]
    fn set_past_end_pads_with_absent() {
        let s = Sequence::default();
        s.set(2, Value::Null);
        assert_eq!(s.to_vec(), vec![Value::Absent, Value::Absent, Value::Null]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let m = sample();
        assert_eq!(m.insert("a", Value::from(5)), Some(Value::from(1)));
        assert_eq!(m.insert("c", Value::Absent), None);
        assert_eq!(m.keys(), vec!["a", "k", "b", "c"]);
        assert_eq!(m.remove("k"), Some(Value::from("middle")));
        assert_eq!(m.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn repeated_keys_collapse_to_last_value() {
        let m = Mapping::from_iter([
            ("a", Value::from(1)),
            ("b", Value::Null),
            ("a", Value::from(2)),
        ]);
        assert_eq!(m.keys(), vec!["a", "b"]);
        assert_eq!(m.get("a"), Some(Value::from(2)));

        let root = Value::map([("a", Value::from(1)), ("a", Value::from(2))]);
        let mut seen = Vec::new();
        crate::walk(&root, &crate::WalkOpts::default(), |v| {
            if v.kind() == crate::VisitKind::MappingValueNumber {
                seen.push(v.value());
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![Value::from(2)]);
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert_eq!(Value::float(f64::NAN), Value::Null);
        assert_eq!(Value::from(1.5).as_f64(), Some(1.5));
    }
}
