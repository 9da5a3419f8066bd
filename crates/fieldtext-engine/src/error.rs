use std::fmt;

/// Why a physical position was refused by an editing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionFault {
    /// Position lies past the end of the physical text
    OutOfBounds { position: usize, len: usize },
    /// Position falls strictly inside the span of a field
    InsideField {
        position: usize,
        start: usize,
        end: usize,
    },
    /// Position splits a multi-byte character
    NotCharBoundary { position: usize },
    /// Range given with its start after its end
    Reversed { start: usize, end: usize },
}

impl fmt::Display for PositionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionFault::OutOfBounds { position, len } => {
                write!(f, "position {position} is out of bounds (length {len})")
            }
            PositionFault::InsideField {
                position,
                start,
                end,
            } => write!(f, "position {position} is inside field {start}..{end}"),
            PositionFault::NotCharBoundary { position } => {
                write!(f, "position {position} is not on a character boundary")
            }
            PositionFault::Reversed { start, end } => {
                write!(f, "range start {start} is after its end {end}")
            }
        }
    }
}

/// Errors reported by the document model.
///
/// Every mutating operation either succeeds or fails with one of these
/// and leaves the document exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Unknown field: {field}")]
    UnknownField { field: String },
    #[error("Invalid position: {0}")]
    InvalidPosition(PositionFault),
    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),
}

impl EditError {
    pub(crate) fn unknown_field(field: &impl fmt::Debug) -> Self {
        EditError::UnknownField {
            field: format!("{field:?}"),
        }
    }

    pub fn is_invalid_position(&self) -> bool {
        matches!(self, EditError::InvalidPosition(_))
    }
}

impl From<PositionFault> for EditError {
    fn from(fault: PositionFault) -> Self {
        EditError::InvalidPosition(fault)
    }
}
