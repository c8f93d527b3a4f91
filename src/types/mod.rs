mod content;

pub use content::{ContentId, ViewFormat};
pub(crate) use content::{percent_decode, percent_encode};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a workspace unit inside one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

/// Where a compilation unit lives.
///
/// Workspace units are numbered by their position in the snapshot's sorted
/// path list. Library units are numbered by artifact position and by the
/// ordinal of the type inside the artifact's sorted type list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitId {
    Workspace(FileId),
    Library { artifact: u32, type_ordinal: u32 },
}

/// Identity of one declaration inside one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId {
    pub unit: UnitId,
    pub index: u32,
}

impl FileId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl DeclId {
    pub fn new(unit: UnitId, index: u32) -> Self {
        Self { unit, index }
    }

    pub fn is_library(&self) -> bool {
        matches!(self.unit, UnitId::Library { .. })
    }
}

/// A zero-based line/column pair. Columns count bytes within the line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Half-open source range, serialized in LSP shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl From<tree_sitter::Point> for Position {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row as u32,
            character: point.column as u32,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

impl Range {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    /// Range covered by a tree-sitter node
    pub fn of_node(node: &tree_sitter::Node) -> Self {
        Self {
            start: node.start_position().into(),
            end: node.end_position().into(),
        }
    }

    /// True when `position` lies inside the range. The end is exclusive,
    /// except for empty ranges which contain their single position.
    pub fn contains(&self, position: Position) -> bool {
        if self.start == self.end {
            return position == self.start;
        }
        self.start <= position && position < self.end
    }

    /// True when `other` lies entirely inside this range
    pub fn encloses(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
