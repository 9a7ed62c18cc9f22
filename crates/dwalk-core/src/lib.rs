//! dwalk-core: deep, mutation-capable traversal of nested containers
//!
//! This crate focuses on a small surface:
//! - `Value` trees of shared sequences and mappings, strings and scalars
//! - `walk`: depth-first, pre-order visits of every container, string, key,
//!   optional string piece and scalar, each with a `commit` that writes back
//!   into the exact slot it came from
//! - Leaf helpers for splitting strings and renaming keys in place
//! - A JSON bridge for loading and saving documents
//!
pub mod error;
pub mod json;
pub mod path;
pub mod split;
pub mod value;
pub mod visit;
pub mod walk;

pub use error::{DocError, WalkError};
pub use json::{parse_file_to_value, parse_str_to_value, write_value_to_file};
pub use path::{Locator, Path, display_path, write_slot};
pub use split::{Piece, Separator, split_annotated};
pub use value::{Mapping, Sequence, Value};
pub use visit::{Node, Visit, VisitKind};
pub use walk::{WalkOpts, walk};
