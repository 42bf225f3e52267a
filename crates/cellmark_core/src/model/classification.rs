//! Cell classification states and transition table.
//!
//! # Responsibility
//! - Define the three classification states a notebook cell can be in.
//! - Map `(current, requested)` to the next state without relying on
//!   evaluation order.
//!
//! # Invariants
//! - A cell carries at most one classification at a time.
//! - Requesting the current classification clears it to `None`.
//! - Requesting a different kind always switches to that kind.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Metadata string for hint cells.
pub const CLASSIFICATION_HINT: &str = "hint";
/// Metadata string for solution cells.
pub const CLASSIFICATION_SOLUTION: &str = "solution";

/// Presentation class applied to hint cells.
pub const CLASS_IS_HINT: &str = "is-hint";
/// Presentation class applied to solution cells.
pub const CLASS_IS_SOLUTION: &str = "is-solution";

/// Block kind an instructor can request through a toolbar action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Optional nudge a student may reveal.
    Hint,
    /// Worked answer a student may reveal.
    Solution,
}

impl BlockKind {
    /// All requestable kinds, in toolbar order.
    pub const ALL: [BlockKind; 2] = [BlockKind::Solution, BlockKind::Hint];

    /// Stable string id persisted in cell metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hint => CLASSIFICATION_HINT,
            Self::Solution => CLASSIFICATION_SOLUTION,
        }
    }

    /// Presentation class kept in lockstep with this kind.
    pub fn presentation_class(self) -> &'static str {
        match self {
            Self::Hint => CLASS_IS_HINT,
            Self::Solution => CLASS_IS_SOLUTION,
        }
    }

    /// Matches a persisted metadata value exactly; padded or cased variants
    /// are not a kind.
    pub fn from_metadata(value: &str) -> Option<Self> {
        match value {
            CLASSIFICATION_HINT => Some(Self::Hint),
            CLASSIFICATION_SOLUTION => Some(Self::Solution),
            _ => None,
        }
    }

    /// Parses user input such as a CLI argument; surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Result<Self, ClassificationParseError> {
        match value.trim() {
            "" => Err(ClassificationParseError::Empty),
            CLASSIFICATION_HINT => Ok(Self::Hint),
            CLASSIFICATION_SOLUTION => Ok(Self::Solution),
            other => Err(ClassificationParseError::Unsupported(other.to_string())),
        }
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic classification of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Regular cell, no banner and no presentation class.
    #[default]
    None,
    Hint,
    Solution,
}

impl Classification {
    /// Returns the block kind for classified cells.
    pub fn kind(self) -> Option<BlockKind> {
        match self {
            Self::None => None,
            Self::Hint => Some(BlockKind::Hint),
            Self::Solution => Some(BlockKind::Solution),
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Presentation class for this state, `None` for unclassified cells.
    pub fn presentation_class(self) -> Option<&'static str> {
        self.kind().map(BlockKind::presentation_class)
    }

    /// Metadata string for this state, `None` when the key must be absent.
    pub fn metadata_value(self) -> Option<&'static str> {
        self.kind().map(BlockKind::as_str)
    }

    /// Label used in logs and listings.
    pub fn label(self) -> &'static str {
        self.metadata_value().unwrap_or("none")
    }
}

impl From<BlockKind> for Classification {
    fn from(value: BlockKind) -> Self {
        match value {
            BlockKind::Hint => Self::Hint,
            BlockKind::Solution => Self::Solution,
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Returns the classification a toggle request leads to.
///
/// | current  | requested | next     |
/// |----------|-----------|----------|
/// | none     | hint      | hint     |
/// | none     | solution  | solution |
/// | hint     | hint      | none     |
/// | hint     | solution  | solution |
/// | solution | solution  | none     |
/// | solution | hint      | hint     |
pub fn next_classification(current: Classification, requested: BlockKind) -> Classification {
    match (current, requested) {
        (Classification::None, BlockKind::Hint) => Classification::Hint,
        (Classification::None, BlockKind::Solution) => Classification::Solution,
        (Classification::Hint, BlockKind::Hint) => Classification::None,
        (Classification::Hint, BlockKind::Solution) => Classification::Solution,
        (Classification::Solution, BlockKind::Solution) => Classification::None,
        (Classification::Solution, BlockKind::Hint) => Classification::Hint,
    }
}

/// Parse errors for persisted or user-supplied kind strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationParseError {
    Empty,
    Unsupported(String),
}

impl Display for ClassificationParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "block kind must not be empty"),
            Self::Unsupported(value) => {
                write!(f, "block kind is unsupported: {value} (expected hint|solution)")
            }
        }
    }
}

impl Error for ClassificationParseError {}
