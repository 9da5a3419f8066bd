use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A field as seen in the logical text, where it has zero width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalField<F> {
    pub field_id: F,
    /// Offset in the logical text immediately after the field
    pub position: usize,
}

impl<F> LogicalField<F> {
    pub fn new(field_id: F, position: usize) -> Self {
        Self { field_id, position }
    }
}

impl<F: fmt::Debug> fmt::Display for LogicalField<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalField({:?} @ {})", self.field_id, self.position)
    }
}

/// A placed field, carrying both its logical position and its physical span.
///
/// The physical document keeps a single list of these, so the logical and
/// physical views of a field can never fall out of step with each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpan<F> {
    pub field_id: F,
    pub logical_position: usize,
    pub start: usize,
    pub end: usize,
}

impl<F> FieldSpan<F> {
    /// Physical width of the field
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// True when `position` lies strictly between the field's start and end
    pub fn strictly_contains(&self, position: usize) -> bool {
        self.start < position && position < self.end
    }

    /// True when the whole span lies within `range`
    pub fn is_within(&self, range: &Range<usize>) -> bool {
        self.start >= range.start && self.end <= range.end
    }

    pub(crate) fn shift(&mut self, physical: isize, logical: isize) {
        self.start = self.start.saturating_add_signed(physical);
        self.end = self.end.saturating_add_signed(physical);
        self.logical_position = self.logical_position.saturating_add_signed(logical);
    }
}

impl<F: Clone> FieldSpan<F> {
    pub fn to_logical(&self) -> LogicalField<F> {
        LogicalField::new(self.field_id.clone(), self.logical_position)
    }
}

impl<F: fmt::Debug> fmt::Display for FieldSpan<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldSpan({:?} @ {}..{}, logical {})",
            self.field_id, self.start, self.end, self.logical_position
        )
    }
}
