use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::trace;

use crate::error::WalkError;
use crate::path::{Locator, write_slot};
use crate::split::{Piece, Separator};
use crate::value::{Mapping, Sequence, Value};

/// Classification of a visit. Wire names are kebab-case, e.g. `mapping-key-substring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitKind {
    ContainerSequence,
    SequenceItemString,
    SequenceItemSubstring,
    SequenceItemNumber,
    SequenceItemNull,
    SequenceItemAbsent,
    ContainerMapping,
    MappingKeyString,
    MappingKeySubstring,
    MappingValueString,
    MappingValueSubstring,
    MappingValueNumber,
    MappingValueNull,
    MappingValueAbsent,
    Number,
    Null,
    Absent,
}

impl VisitKind {
    pub const ALL: [VisitKind; 17] = [
        VisitKind::ContainerSequence,
        VisitKind::SequenceItemString,
        VisitKind::SequenceItemSubstring,
        VisitKind::SequenceItemNumber,
        VisitKind::SequenceItemNull,
        VisitKind::SequenceItemAbsent,
        VisitKind::ContainerMapping,
        VisitKind::MappingKeyString,
        VisitKind::MappingKeySubstring,
        VisitKind::MappingValueString,
        VisitKind::MappingValueSubstring,
        VisitKind::MappingValueNumber,
        VisitKind::MappingValueNull,
        VisitKind::MappingValueAbsent,
        VisitKind::Number,
        VisitKind::Null,
        VisitKind::Absent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisitKind::ContainerSequence => "container-sequence",
            VisitKind::SequenceItemString => "sequence-item-string",
            VisitKind::SequenceItemSubstring => "sequence-item-substring",
            VisitKind::SequenceItemNumber => "sequence-item-number",
            VisitKind::SequenceItemNull => "sequence-item-null",
            VisitKind::SequenceItemAbsent => "sequence-item-absent",
            VisitKind::ContainerMapping => "container-mapping",
            VisitKind::MappingKeyString => "mapping-key-string",
            VisitKind::MappingKeySubstring => "mapping-key-substring",
            VisitKind::MappingValueString => "mapping-value-string",
            VisitKind::MappingValueSubstring => "mapping-value-substring",
            VisitKind::MappingValueNumber => "mapping-value-number",
            VisitKind::MappingValueNull => "mapping-value-null",
            VisitKind::MappingValueAbsent => "mapping-value-absent",
            VisitKind::Number => "number",
            VisitKind::Null => "null",
            VisitKind::Absent => "absent",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, VisitKind::ContainerSequence | VisitKind::ContainerMapping)
    }

    pub fn is_substring(self) -> bool {
        matches!(
            self,
            VisitKind::SequenceItemSubstring
                | VisitKind::MappingKeySubstring
                | VisitKind::MappingValueSubstring
        )
    }

    /// Whole-string kinds: items, keys and values.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            VisitKind::SequenceItemString
                | VisitKind::MappingKeyString
                | VisitKind::MappingValueString
        )
    }
}

impl fmt::Display for VisitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitKind {
    type Err = WalkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisitKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| WalkError::config(format!("unknown visit kind: {}", s)))
    }
}

/// The visited datum, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    ContainerSequence(Sequence),
    SequenceItemString(String),
    SequenceItemSubstring(Piece),
    SequenceItemNumber(Number),
    SequenceItemNull,
    SequenceItemAbsent,
    ContainerMapping(Mapping),
    MappingKeyString(String),
    MappingKeySubstring(Piece),
    MappingValueString(String),
    MappingValueSubstring(Piece),
    MappingValueNumber(Number),
    MappingValueNull,
    MappingValueAbsent,
    Number(Number),
    Null,
    Absent,
}

impl Node {
    pub fn kind(&self) -> VisitKind {
        match self {
            Node::ContainerSequence(_) => VisitKind::ContainerSequence,
            Node::SequenceItemString(_) => VisitKind::SequenceItemString,
            Node::SequenceItemSubstring(_) => VisitKind::SequenceItemSubstring,
            Node::SequenceItemNumber(_) => VisitKind::SequenceItemNumber,
            Node::SequenceItemNull => VisitKind::SequenceItemNull,
            Node::SequenceItemAbsent => VisitKind::SequenceItemAbsent,
            Node::ContainerMapping(_) => VisitKind::ContainerMapping,
            Node::MappingKeyString(_) => VisitKind::MappingKeyString,
            Node::MappingKeySubstring(_) => VisitKind::MappingKeySubstring,
            Node::MappingValueString(_) => VisitKind::MappingValueString,
            Node::MappingValueSubstring(_) => VisitKind::MappingValueSubstring,
            Node::MappingValueNumber(_) => VisitKind::MappingValueNumber,
            Node::MappingValueNull => VisitKind::MappingValueNull,
            Node::MappingValueAbsent => VisitKind::MappingValueAbsent,
            Node::Number(_) => VisitKind::Number,
            Node::Null => VisitKind::Null,
            Node::Absent => VisitKind::Absent,
        }
    }

    /// Text of string, key and piece visits.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::SequenceItemString(s) | Node::MappingKeyString(s) | Node::MappingValueString(s) => {
                Some(s)
            }
            Node::SequenceItemSubstring(p)
            | Node::MappingKeySubstring(p)
            | Node::MappingValueSubstring(p) => Some(&p.text),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<&Number> {
        match self {
            Node::SequenceItemNumber(n) | Node::MappingValueNumber(n) | Node::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn piece(&self) -> Option<&Piece> {
        match self {
            Node::SequenceItemSubstring(p)
            | Node::MappingKeySubstring(p)
            | Node::MappingValueSubstring(p) => Some(p),
            _ => None,
        }
    }

    /// The datum as a tree value. Containers come back as shared handles.
    pub fn to_value(&self) -> Value {
        match self {
            Node::ContainerSequence(s) => Value::Sequence(s.clone()),
            Node::ContainerMapping(m) => Value::Mapping(m.clone()),
            Node::SequenceItemNull | Node::MappingValueNull | Node::Null => Value::Null,
            Node::SequenceItemAbsent | Node::MappingValueAbsent | Node::Absent => Value::Absent,
            other => match (other.text(), other.number()) {
                (Some(s), _) => Value::Text(s.to_string()),
                (_, Some(n)) => Value::Number(n.clone()),
                _ => Value::Absent,
            },
        }
    }
}

/// Where a commit lands.
pub(crate) enum Target<'a> {
    /// No parent slot: the traversal root, or a node whose path was capped away.
    Root,
    Slot(Locator),
    /// Whole mapping key; `key` is the entry's current name and follows renames.
    Key { mapping: Mapping, key: &'a mut String },
    Piece {
        pieces: &'a mut Vec<String>,
        index: usize,
        separator: Separator<'a>,
        dest: PieceDest<'a>,
    },
}

pub(crate) enum PieceDest<'a> {
    Slot(Locator),
    Key { mapping: Mapping, key: &'a mut String },
}

/// One emission of the walk callback.
///
/// Borrowed for the duration of the callback only; `commit` writes straight
/// into the tree.
pub struct Visit<'a> {
    node: Node,
    path: &'a [Locator],
    target: Target<'a>,
}

impl<'a> Visit<'a> {
    pub(crate) fn new(node: Node, path: &'a [Locator], target: Target<'a>) -> Self {
        Self { node, path, target }
    }

    pub fn kind(&self) -> VisitKind {
        self.node.kind()
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn value(&self) -> Value {
        self.node.to_value()
    }

    pub fn text(&self) -> Option<&str> {
        self.node.text()
    }

    pub fn number(&self) -> Option<&Number> {
        self.node.number()
    }

    /// Neighbor metadata; only substring visits carry it.
    pub fn piece(&self) -> Option<&Piece> {
        self.node.piece()
    }

    /// Ancestor slots of the visited node, nearest first, capped by `max_path_length`.
    pub fn path(&self) -> &[Locator] {
        self.path
    }

    pub fn is_modifiable(&self) -> bool {
        !matches!(self.target, Target::Root)
    }

    /// Overwrites the slot this visit came from.
    ///
    /// Keys and pieces only accept text. Calling twice is allowed; the last
    /// call wins.
    pub fn commit(&mut self, value: impl Into<Value>) -> Result<(), WalkError> {
        let value = value.into();
        let kind = self.node.kind();
        trace!(kind = %kind, path = ?self.path, "commit");
        match &mut self.target {
            Target::Root => Err(WalkError::Unmodifiable(kind)),
            Target::Slot(locator) => {
                write_slot(locator, value);
                Ok(())
            }
            Target::Key { mapping, key } => {
                let new_key = expect_text(kind, value)?;
                mapping.rename_key(key.as_str(), &new_key)?;
                **key = new_key;
                Ok(())
            }
            Target::Piece {
                pieces,
                index,
                separator,
                dest,
            } => {
                let text = expect_text(kind, value)?;
                let previous = std::mem::replace(&mut pieces[*index], text);
                let joined = separator.join(pieces.as_slice());
                match dest {
                    PieceDest::Slot(locator) => write_slot(locator, Value::Text(joined)),
                    PieceDest::Key { mapping, key } => {
                        // A rejected rename leaves the piece list as it was.
                        if let Err(e) = mapping.rename_key(key.as_str(), &joined) {
                            pieces[*index] = previous;
                            return Err(e);
                        }
                        **key = joined;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Visit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visit")
            .field("node", &self.node)
            .field("path", &self.path)
            .field("modifiable", &self.is_modifiable())
            .finish()
    }
}

fn expect_text(kind: VisitKind, value: Value) -> Result<String, WalkError> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(WalkError::config(format!(
            "{} visits only accept text, got {:?}",
            kind, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in VisitKind::ALL {
            assert_eq!(kind.as_str().parse::<VisitKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
        assert!("array".parse::<VisitKind>().is_err());
    }

    #[test]
    fn node_to_value() {
        assert_eq!(Node::MappingValueAbsent.to_value(), Value::Absent);
        assert_eq!(Node::Number(7.into()).to_value(), Value::from(7));
        assert_eq!(
            Node::MappingKeyString("name".into()).to_value(),
            Value::from("name")
        );
    }

    #[test]
    fn root_visit_refuses_commit() {
        let mut visit = Visit::new(Node::Null, &[], Target::Root);
        assert!(!visit.is_modifiable());
        assert!(matches!(
            visit.commit(1),
            Err(WalkError::Unmodifiable(VisitKind::Null))
        ));
    }

    #[test]
    fn piece_commit_rejoins_into_slot() {
        let seq = Sequence::from_iter([Value::from("a b c")]);
        let sep = Separator::new(" ", false);
        let mut pieces = sep.split("a b c");
        let mut visit = Visit::new(
            Node::SequenceItemSubstring(crate::split::annotate(&pieces, 1)),
            &[],
            Target::Piece {
                pieces: &mut pieces,
                index: 1,
                separator: sep,
                dest: PieceDest::Slot(Locator::index(&seq, 0)),
            },
        );
        visit.commit("B").unwrap();
        assert!(visit.commit(3).is_err());
        assert_eq!(seq.get(0), Some(Value::from("a B c")));
    }
}
