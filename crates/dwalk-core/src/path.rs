use std::fmt;

use crate::value::{Mapping, Sequence, Value};

/// A writable slot: an index into a sequence or a key into a mapping,
/// together with a shared handle to that parent container.
#[derive(Clone)]
pub enum Locator {
    Index { parent: Sequence, index: usize },
    Key { parent: Mapping, key: String },
}

/// Ancestor slots of a node, nearest first.
pub type Path = Vec<Locator>;

impl Locator {
    pub fn index(parent: &Sequence, index: usize) -> Self {
        Locator::Index {
            parent: parent.clone(),
            index,
        }
    }

    pub fn key(parent: &Mapping, key: impl Into<String>) -> Self {
        Locator::Key {
            parent: parent.clone(),
            key: key.into(),
        }
    }

    /// Current content of the slot, if it still exists.
    pub fn read(&self) -> Option<Value> {
        match self {
            Locator::Index { parent, index } => parent.get(*index),
            Locator::Key { parent, key } => parent.get(key),
        }
    }
}

impl fmt::Debug for Locator {
    // Parents are omitted: printing them would dump the whole subtree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Index { index, .. } => write!(f, "[{}]", index),
            Locator::Key { key, .. } => write!(f, "[{:?}]", key),
        }
    }
}

/// Overwrites the slot named by `locator`.
pub fn write_slot(locator: &Locator, value: Value) {
    match locator {
        Locator::Index { parent, index } => parent.set(*index, value),
        Locator::Key { parent, key } => {
            parent.insert(key.clone(), value);
        }
    }
}

/// Prepends `step` to `path`, keeping at most `max_len` steps.
pub(crate) fn extend(path: &[Locator], step: Locator, max_len: Option<usize>) -> Path {
    std::iter::once(step)
        .chain(path.iter().cloned())
        .take(max_len.unwrap_or(usize::MAX))
        .collect()
}

/// Renders a path root-first, e.g. `$[0]["name"]`.
pub fn display_path(path: &[Locator]) -> String {
    let mut out = String::from("$");
    for step in path.iter().rev() {
        out.push_str(&format!("{:?}", step));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_truncates_far_end() {
        let seq = Sequence::from_iter([Value::Null, Value::Null]);
        let map = Mapping::from_iter([("a", Value::Null)]);
        let path = extend(&[], Locator::key(&map, "a"), None);
        let path = extend(&path, Locator::index(&seq, 1), Some(1));
        assert_eq!(path.len(), 1);
        assert!(matches!(path[0], Locator::Index { index: 1, .. }));
        assert!(extend(&path, Locator::index(&seq, 0), Some(0)).is_empty());
    }

    #[test]
    fn write_slot_hits_index_and_key() {
        let seq = Sequence::from_iter([Value::from(1)]);
        let map = Mapping::from_iter([("a", Value::Null)]);
        write_slot(&Locator::index(&seq, 0), Value::from("x"));
        write_slot(&Locator::key(&map, "a"), Value::from(2));
        assert_eq!(seq.get(0), Some(Value::from("x")));
        assert_eq!(map.get("a"), Some(Value::from(2)));
        assert_eq!(Locator::key(&map, "a").read(), Some(Value::from(2)));
    }

    #[test]
    fn display_path_is_root_first() {
        let seq = Sequence::from_iter([Value::Null]);
        let map = Mapping::from_iter([("name", Value::Null)]);
        let path = vec![Locator::key(&map, "name"), Locator::index(&seq, 0)];
        assert_eq!(display_path(&path), "$[0][\"name\"]");
    }
}
