use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::error::WalkError;
use crate::path::{Locator, Path, extend};
use crate::split::{Separator, annotate};
use crate::value::{Mapping, Sequence, Value};
use crate::visit::{Node, PieceDest, Target, Visit, VisitKind};

/// Walk configuration. Deserializes from kebab-case JSON, e.g.
/// `{"split-on": " ", "kinds": ["mapping-value-string"]}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct WalkOpts {
    /// Also visit the pieces of every string split on this separator.
    pub split_on: Option<String>,
    /// Keep the separator as a prefix of every piece but the first.
    pub include_separator: bool,
    /// Cap on tracked ancestors; `None` is unbounded.
    pub max_path_length: Option<usize>,
    /// Split mapping keys too. Defaults to whether `split_on` is set.
    pub split_keys: Option<bool>,
    /// Deliver only these kinds. Traversal still descends through the rest.
    pub kinds: Option<HashSet<VisitKind>>,
    /// Emit per-node debug events.
    pub debug: bool,
}

impl WalkOpts {
    pub fn split_on(mut self, separator: impl Into<String>) -> Self {
        self.split_on = Some(separator.into());
        self
    }

    pub fn include_separator(mut self, include: bool) -> Self {
        self.include_separator = include;
        self
    }

    pub fn max_path_length(mut self, max: usize) -> Self {
        self.max_path_length = Some(max);
        self
    }

    pub fn split_keys(mut self, split: bool) -> Self {
        self.split_keys = Some(split);
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = VisitKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn separator(&self) -> Option<Separator<'_>> {
        self.split_on
            .as_deref()
            .map(|s| Separator::new(s, self.include_separator))
    }

    pub fn splits_keys(&self) -> bool {
        self.split_on.is_some() && self.split_keys.unwrap_or(true)
    }

    pub fn allows(&self, kind: VisitKind) -> bool {
        self.kinds.as_ref().is_none_or(|k| k.contains(&kind))
    }
}

/// Walks `root` depth-first, calling `callback` once per visit.
///
/// The root must be a container or a scalar; a bare string is rejected before
/// anything is visited. An error returned by the callback (typically from a
/// failed `commit`) stops the walk and is returned as-is.
pub fn walk<F>(root: &Value, opts: &WalkOpts, callback: F) -> Result<(), WalkError>
where
    F: FnMut(&mut Visit<'_>) -> Result<(), WalkError>,
{
    if let Value::Text(_) = root {
        return Err(WalkError::config(
            "the walk root must be a sequence, mapping or scalar, not a string",
        ));
    }
    let mut walker = Walker { opts, callback };
    walker.walk_value(root.clone(), &[])
}

struct Walker<'o, F> {
    opts: &'o WalkOpts,
    callback: F,
}

#[derive(Clone, Copy)]
enum TextSite {
    SequenceItem,
    MappingValue,
}

impl TextSite {
    fn whole(self, text: String) -> Node {
        match self {
            TextSite::SequenceItem => Node::SequenceItemString(text),
            TextSite::MappingValue => Node::MappingValueString(text),
        }
    }

    fn piece_kind(self) -> VisitKind {
        match self {
            TextSite::SequenceItem => VisitKind::SequenceItemSubstring,
            TextSite::MappingValue => VisitKind::MappingValueSubstring,
        }
    }
}

impl<'o, F> Walker<'o, F>
where
    F: FnMut(&mut Visit<'_>) -> Result<(), WalkError>,
{
    fn emit(&mut self, node: Node, path: &[Locator], target: Target<'_>) -> Result<(), WalkError> {
        if !self.opts.allows(node.kind()) {
            return Ok(());
        }
        let mut visit = Visit::new(node, path, target);
        (self.callback)(&mut visit)
    }

    fn extend(&self, path: &[Locator], step: Locator) -> Path {
        extend(path, step, self.opts.max_path_length)
    }

    fn walk_value(&mut self, value: Value, path: &[Locator]) -> Result<(), WalkError> {
        match value {
            Value::Sequence(seq) => self.walk_sequence(seq, path),
            Value::Mapping(map) => self.walk_mapping(map, path),
            Value::Number(n) => {
                let node = match path.first() {
                    None => Node::Number(n),
                    Some(Locator::Index { .. }) => Node::SequenceItemNumber(n),
                    Some(Locator::Key { .. }) => Node::MappingValueNumber(n),
                };
                self.emit(node, path, parent_target(path))
            }
            Value::Null => {
                let node = match path.first() {
                    None => Node::Null,
                    Some(Locator::Index { .. }) => Node::SequenceItemNull,
                    Some(Locator::Key { .. }) => Node::MappingValueNull,
                };
                self.emit(node, path, parent_target(path))
            }
            Value::Absent => {
                let node = match path.first() {
                    None => Node::Absent,
                    Some(Locator::Index { .. }) => Node::SequenceItemAbsent,
                    Some(Locator::Key { .. }) => Node::MappingValueAbsent,
                };
                self.emit(node, path, parent_target(path))
            }
            // Strings are visited by their parent; booleans have no visit kind.
            Value::Text(_) | Value::Bool(_) => Ok(()),
        }
    }

    fn walk_sequence(&mut self, seq: Sequence, path: &[Locator]) -> Result<(), WalkError> {
        if self.opts.debug {
            debug!(path = ?path, len = seq.len(), "walking sequence");
        }
        self.emit(Node::ContainerSequence(seq.clone()), path, parent_target(path))?;

        // Items are read fresh each step; a commit may have shrunk the sequence.
        for index in 0..seq.len() {
            let Some(item) = seq.get(index) else {
                break;
            };
            let slot = Locator::index(&seq, index);
            let item_path = self.extend(path, slot.clone());
            match item {
                Value::Text(text) => self.visit_text(text, TextSite::SequenceItem, slot, &item_path)?,
                other => self.walk_value(other, &item_path)?,
            }
        }
        Ok(())
    }

    fn walk_mapping(&mut self, map: Mapping, path: &[Locator]) -> Result<(), WalkError> {
        if self.opts.debug {
            debug!(path = ?path, len = map.len(), "walking mapping");
        }
        self.emit(Node::ContainerMapping(map.clone()), path, parent_target(path))?;

        for original in map.keys() {
            if !map.contains_key(&original) {
                if self.opts.debug {
                    debug!(key = %original, "entry vanished during walk, skipping");
                }
                continue;
            }
            let mut key = original;
            let key_path = self.extend(path, Locator::key(&map, key.clone()));
            self.emit(
                Node::MappingKeyString(key.clone()),
                &key_path,
                Target::Key {
                    mapping: map.clone(),
                    key: &mut key,
                },
            )?;

            // A rename above moves the entry; pieces report the current key.
            let key_path = self.extend(path, Locator::key(&map, key.clone()));
            let opts = self.opts;
            if opts.splits_keys()
                && opts.allows(VisitKind::MappingKeySubstring)
                && let Some(separator) = opts.separator()
            {
                let mut pieces = separator.split(&key);
                for index in 0..pieces.len() {
                    let node = Node::MappingKeySubstring(annotate(&pieces, index));
                    self.emit(
                        node,
                        &key_path,
                        Target::Piece {
                            pieces: &mut pieces,
                            index,
                            separator,
                            dest: PieceDest::Key {
                                mapping: map.clone(),
                                key: &mut key,
                            },
                        },
                    )?;
                }
            }

            if self.opts.debug {
                debug!(key = %key, "visiting entry value");
            }
            let Some(value) = map.get(&key) else {
                continue;
            };
            let slot = Locator::key(&map, key.clone());
            let value_path = self.extend(path, slot.clone());
            match value {
                Value::Text(text) => self.visit_text(text, TextSite::MappingValue, slot, &value_path)?,
                other => self.walk_value(other, &value_path)?,
            }
        }
        Ok(())
    }

    fn visit_text(
        &mut self,
        text: String,
        site: TextSite,
        slot: Locator,
        path: &[Locator],
    ) -> Result<(), WalkError> {
        self.emit(site.whole(text), path, Target::Slot(slot.clone()))?;

        let opts = self.opts;
        let Some(separator) = opts.separator() else {
            return Ok(());
        };
        if !opts.allows(site.piece_kind()) {
            return Ok(());
        }
        // Split the slot's current text; the whole-string visit may have replaced it.
        let Some(Value::Text(current)) = slot.read() else {
            return Ok(());
        };
        let mut pieces = separator.split(&current);
        for index in 0..pieces.len() {
            let piece = annotate(&pieces, index);
            let node = match site {
                TextSite::SequenceItem => Node::SequenceItemSubstring(piece),
                TextSite::MappingValue => Node::MappingValueSubstring(piece),
            };
            self.emit(
                node,
                path,
                Target::Piece {
                    pieces: &mut pieces,
                    index,
                    separator,
                    dest: PieceDest::Slot(slot.clone()),
                },
            )?;
        }
        Ok(())
    }
}

fn parent_target<'a>(path: &[Locator]) -> Target<'a> {
    match path.first() {
        Some(locator) => Target::Slot(locator.clone()),
        None => Target::Root,
    }
}
