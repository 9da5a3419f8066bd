use std::ops::Range;

use crate::editing::{Bias, FieldDocument};
use crate::error::{EditError, PositionFault};
use crate::models::{FieldId, LogicalDocument, LogicalField};

impl<F: FieldId> FieldDocument<F> {
    /// Independent copy of the whole document in logical form.
    pub fn export_all(&self) -> LogicalDocument<F> {
        LogicalDocument {
            text: self.logical_text(),
            fields: self.fields.iter().map(|field| field.to_logical()).collect(),
        }
    }

    /// Logical form of the physical selection `range`.
    ///
    /// Only fields lying wholly inside the selection are exported. A boundary
    /// that falls inside a field is moved past it, so a partly selected field
    /// is left out together with its display text. Field positions are
    /// relative to the start of the exported text.
    pub fn export_selection(&self, range: Range<usize>) -> Result<LogicalDocument<F>, EditError> {
        if range.start > range.end {
            return Err(PositionFault::Reversed {
                start: range.start,
                end: range.end,
            }
            .into());
        }
        let len = self.len();
        if range.end > len {
            return Err(PositionFault::OutOfBounds {
                position: range.end,
                len,
            }
            .into());
        }

        let start = self.snap_to_boundary(range.start, Bias::After);
        let end = self.snap_to_boundary(range.end, Bias::Before).max(start);
        for position in [start, end] {
            self.check_position(position)?;
        }

        let logical_start = self.physical_to_logical(start);
        let logical_end = self.physical_to_logical(end);
        let text = self
            .logical
            .slice_to_cow(logical_start..logical_end)
            .into_owned();
        let fields = self
            .fields_within(start..end)
            .map(|field| {
                LogicalField::new(
                    field.field_id.clone(),
                    field.logical_position - logical_start,
                )
            })
            .collect();

        Ok(LogicalDocument { text, fields })
    }

    /// Replace the contents with a snapshot taken by [`Self::export_all`].
    pub fn restore(&mut self, snapshot: &LogicalDocument<F>) -> Result<(), EditError> {
        self.assign_logical(snapshot)
    }
}
