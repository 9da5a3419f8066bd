use std::fmt;
use std::ops::Range;

use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::error::{EditError, PositionFault};
use crate::models::{FieldCatalog, FieldId, FieldSpan, LogicalDocument};
use crate::plain_text::{escape_run, parse_clipboard_text, parse_plain_text};
use crate::translate;

/// Which side of a field a position strictly inside it should move to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Before,
    After,
}

/// Field-aware text document holding the physical and logical views.
///
/// ## Two views of one content
///
/// - **Physical**: the rendered string, every field expanded to its display
///   text. This is what a text box shows and what edit positions refer to.
/// - **Logical**: the same string with fields removed. Fields sit between
///   characters at zero width.
///
/// Both strings live in `xi_rope::Rope` buffers and are edited through
/// deltas. Each [`FieldSpan`] carries the field's logical position next to
/// its physical span, so every edit updates both views of a field in one
/// place.
///
/// ## Guarantees after every successful edit
///
/// - physical length = logical length + total field width
/// - spans are sorted by `start` and do not overlap
/// - a field's logical position = its `start` minus the widths of the fields
///   before it
///
/// A rejected edit leaves the document untouched, version included.
///
/// ```rust
/// use fieldtext_engine::{FieldCatalog, FieldDocument};
///
/// let catalog: FieldCatalog<u32> = [(1, "{X}")].into_iter().collect();
/// let mut doc = FieldDocument::new(catalog);
///
/// doc.insert_field(0, 1).unwrap();
/// doc.insert_text(3, "ab").unwrap();
/// assert_eq!(doc.physical_text(), "{X}ab");
/// assert_eq!(doc.logical_text(), "ab");
///
/// doc.delete_range(0..3).unwrap();
/// assert_eq!(doc.physical_text(), "ab");
/// assert!(doc.fields().is_empty());
/// ```
#[derive(Clone)]
pub struct FieldDocument<F> {
    /// Known fields; swapping it never revalidates placed fields
    pub(crate) catalog: FieldCatalog<F>,
    /// Rendered text, fields expanded
    pub(crate) physical: Rope,
    /// Text with fields stripped
    pub(crate) logical: Rope,
    /// Placed fields ordered by physical start
    pub(crate) fields: Vec<FieldSpan<F>>,
    /// Bumped by every successful mutation
    pub(crate) version: u64,
}

impl<F: FieldId> FieldDocument<F> {
    /// Empty document rendering fields from `catalog`
    pub fn new(catalog: FieldCatalog<F>) -> Self {
        Self {
            catalog,
            physical: Rope::from(""),
            logical: Rope::from(""),
            fields: Vec::new(),
            version: 0,
        }
    }

    /// Build the physical view by replaying `logical`'s fields over its text.
    pub fn from_logical(
        catalog: FieldCatalog<F>,
        logical: &LogicalDocument<F>,
    ) -> Result<Self, EditError> {
        let mut doc = Self::new(catalog);
        doc.assign_logical(logical)?;
        Ok(doc)
    }

    /// Build a document from flat text, turning known display texts into fields.
    pub fn from_plain_text(catalog: FieldCatalog<F>, raw: &str) -> Result<Self, EditError> {
        let logical = parse_plain_text(raw, &catalog);
        Self::from_logical(catalog, &logical)
    }

    /// Replace the contents with `logical`, rebuilding the physical view.
    ///
    /// Fails with `MalformedFragment` for out-of-range field positions and
    /// `UnknownField` for ids missing from the catalog.
    pub fn assign_logical(&mut self, logical: &LogicalDocument<F>) -> Result<(), EditError> {
        logical
            .validate()
            .map_err(|err| rejected("assign_logical", err))?;

        let mut physical = String::with_capacity(logical.text.len());
        let mut fields = Vec::with_capacity(logical.fields.len());
        let mut offset = 0;
        for (run, field) in logical.runs() {
            physical.push_str(run);
            if let Some(field) = field {
                let display = self
                    .catalog
                    .display_text(&field.field_id)
                    .ok_or_else(|| rejected("assign_logical", EditError::unknown_field(&field.field_id)))?;
                let start = field.position + offset;
                physical.push_str(display);
                fields.push(FieldSpan {
                    field_id: field.field_id.clone(),
                    logical_position: field.position,
                    start,
                    end: start + display.len(),
                });
                offset += display.len();
            }
        }

        self.physical = Rope::from(physical);
        self.logical = Rope::from(logical.text.as_str());
        self.fields = fields;
        self.committed("assign_logical");
        Ok(())
    }

    /// Replace the contents with clipboard text from [`Self::get_plain_text`].
    pub fn assign_clipboard_text(&mut self, raw: &str) -> Result<(), EditError> {
        let logical = parse_clipboard_text(raw, &self.catalog);
        self.assign_logical(&logical)
    }

    /// Reset to the empty document. The catalog is kept.
    pub fn clear(&mut self) {
        self.physical = Rope::from("");
        self.logical = Rope::from("");
        self.fields.clear();
        self.committed("clear");
    }

    pub fn catalog(&self) -> &FieldCatalog<F> {
        &self.catalog
    }

    /// Swap the catalog. Placed fields keep their current spans.
    pub fn assign_catalog(&mut self, catalog: FieldCatalog<F>) {
        self.catalog = catalog;
    }

    /// Rendered text, fields expanded
    pub fn physical_text(&self) -> String {
        self.physical.to_string()
    }

    /// Text with fields stripped
    pub fn logical_text(&self) -> String {
        self.logical.to_string()
    }

    /// Length of the physical text in bytes
    pub fn len(&self) -> usize {
        self.physical.len()
    }

    pub fn logical_len(&self) -> usize {
        self.logical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.physical.len() == 0 && self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldSpan<F>] {
        &self.fields
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn physical_to_logical(&self, position: usize) -> usize {
        translate::physical_to_logical(&self.fields, position)
    }

    pub fn logical_to_physical(&self, position: usize) -> usize {
        translate::logical_to_physical(&self.fields, position)
    }

    /// Field whose span strictly contains `position`
    pub fn field_at(&self, position: usize) -> Option<&FieldSpan<F>> {
        self.fields
            .iter()
            .find(|field| field.strictly_contains(position))
    }

    /// Last field ending at or before `position`
    pub fn field_before(&self, position: usize) -> Option<&FieldSpan<F>> {
        self.fields.iter().rev().find(|field| field.end <= position)
    }

    /// First field starting at or after `position`
    pub fn field_after(&self, position: usize) -> Option<&FieldSpan<F>> {
        self.fields.iter().find(|field| field.start >= position)
    }

    /// Fields lying entirely within `range`
    pub fn fields_within(&self, range: Range<usize>) -> impl Iterator<Item = &FieldSpan<F>> {
        self.fields
            .iter()
            .filter(move |field| field.is_within(&range))
    }

    /// Move a position out of any field it falls inside, clamped to the text.
    pub fn snap_to_boundary(&self, position: usize, bias: Bias) -> usize {
        let position = position.min(self.len());
        match (self.field_at(position), bias) {
            (Some(field), Bias::Before) => field.start,
            (Some(field), Bias::After) => field.end,
            (None, _) => position,
        }
    }

    /// Grow `range` until no field overlaps it only partially.
    pub fn expand_to_fields(&self, range: Range<usize>) -> Range<usize> {
        let start = self.snap_to_boundary(range.start, Bias::Before);
        let end = self.snap_to_boundary(range.end, Bias::After);
        start..end.max(start)
    }

    /// Check that `position` is a valid edit point.
    pub fn check_position(&self, position: usize) -> Result<(), PositionFault> {
        let len = self.len();
        if position > len {
            return Err(PositionFault::OutOfBounds { position, len });
        }
        if let Some(field) = self.field_at(position) {
            return Err(PositionFault::InsideField {
                position,
                start: field.start,
                end: field.end,
            });
        }
        if !self.is_char_boundary(position) {
            return Err(PositionFault::NotCharBoundary { position });
        }
        Ok(())
    }

    /// Check that `range` can be deleted: both ends valid, and every field it
    /// touches lies wholly inside it.
    pub fn check_range(&self, range: &Range<usize>) -> Result<(), PositionFault> {
        if range.start > range.end {
            return Err(PositionFault::Reversed {
                start: range.start,
                end: range.end,
            });
        }
        let len = self.len();
        if range.end > len {
            return Err(PositionFault::OutOfBounds {
                position: range.end,
                len,
            });
        }
        let partial = self.fields.iter().find(|field| {
            field.start < range.end && field.end > range.start && !field.is_within(range)
        });
        if let Some(field) = partial {
            let position = if field.strictly_contains(range.start) {
                range.start
            } else {
                range.end
            };
            return Err(PositionFault::InsideField {
                position,
                start: field.start,
                end: field.end,
            });
        }
        for position in [range.start, range.end] {
            if !self.is_char_boundary(position) {
                return Err(PositionFault::NotCharBoundary { position });
            }
        }
        Ok(())
    }

    /// Insert a field at physical position `at`.
    ///
    /// Fields starting at or after `at` move right by the display width; the
    /// new field goes in front of them. The logical text is unchanged.
    pub fn insert_field(&mut self, at: usize, field_id: F) -> Result<FieldSpan<F>, EditError> {
        let display = self
            .catalog
            .display_text(&field_id)
            .map(str::to_string)
            .ok_or_else(|| rejected("insert_field", EditError::unknown_field(&field_id)))?;
        self.check_position(at)
            .map_err(|fault| rejected("insert_field", fault.into()))?;

        let index = translate::insertion_index(&self.fields, at);
        let span = self.place_field(at, index, field_id, &display);
        self.committed("insert_field");
        Ok(span)
    }

    /// Insert plain text at physical position `at`, returning its length.
    pub fn insert_text(&mut self, at: usize, text: &str) -> Result<usize, EditError> {
        self.check_position(at)
            .map_err(|fault| rejected("insert_text", fault.into()))?;
        if text.is_empty() {
            return Ok(0);
        }

        self.splice_text(at, text);
        self.committed("insert_text");
        Ok(text.len())
    }

    /// Delete the physical range, returning the number of bytes removed.
    ///
    /// Fields wholly inside the range are removed with it. A field that the
    /// range only partly covers makes the call fail with `InsideField`; use
    /// [`Self::expand_to_fields`] first to delete such a field entirely.
    /// An empty range removes the zero-width fields sitting at it, and is a
    /// no-op when there are none.
    pub fn delete_range(&mut self, range: Range<usize>) -> Result<usize, EditError> {
        self.check_range(&range)
            .map_err(|fault| rejected("delete_range", fault.into()))?;
        if range.is_empty() && !self.fields.iter().any(|field| field.range() == range) {
            return Ok(0);
        }

        let Range { start, end } = range;
        let mut shrinking_end = end;
        while let Some(index) = self
            .fields
            .iter()
            .position(|field| field.start >= start && field.end <= shrinking_end)
        {
            let removed = self.fields.remove(index);
            let width = removed.len();
            if width > 0 {
                self.physical = splice(&self.physical, removed.range(), "");
                for field in &mut self.fields[index..] {
                    field.shift(-(width as isize), 0);
                }
                shrinking_end -= width;
            }
        }

        let residual = shrinking_end - start;
        if residual > 0 {
            let logical_start = self.physical_to_logical(start);
            self.physical = splice(&self.physical, start..shrinking_end, "");
            self.logical = splice(&self.logical, logical_start..logical_start + residual, "");
            let index = translate::insertion_index(&self.fields, start);
            for field in &mut self.fields[index..] {
                field.shift(-(residual as isize), -(residual as isize));
            }
        }

        self.committed("delete_range");
        Ok(end - start)
    }

    /// Paste an exported fragment at `at`, returning the physical length added
    /// (text plus the display width of every pasted field).
    pub fn insert_fragment(
        &mut self,
        at: usize,
        fragment: &LogicalDocument<F>,
    ) -> Result<usize, EditError> {
        self.check_position(at)
            .map_err(|fault| rejected("insert_fragment", fault.into()))?;
        fragment
            .validate()
            .map_err(|err| rejected("insert_fragment", err))?;
        let displays = fragment
            .fields
            .iter()
            .map(|field| {
                self.catalog
                    .display_text(&field.field_id)
                    .map(str::to_string)
                    .ok_or_else(|| EditError::unknown_field(&field.field_id))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| rejected("insert_fragment", err))?;

        if !fragment.text.is_empty() {
            self.splice_text(at, &fragment.text);
        }
        let mut inserted = fragment.text.len();
        let mut placed: Option<usize> = None;
        for (field, display) in fragment.fields.iter().zip(&displays) {
            let position = at + field.position + inserted - fragment.text.len();
            // Keep fragment order when zero-width fields share a position
            let mut index = translate::insertion_index(&self.fields, position);
            if let Some(previous) = placed {
                index = index.max(previous + 1);
            }
            self.place_field(position, index, field.field_id.clone(), display);
            placed = Some(index);
            inserted += display.len();
        }

        self.committed("insert_fragment");
        Ok(inserted)
    }

    /// Flat text for the clipboard: plain runs escaped, fields expanded to
    /// the display text they were placed with.
    pub fn get_plain_text(&self) -> String {
        let physical = self.physical_text();
        let mut out = String::with_capacity(physical.len());
        let mut copied = 0;
        for field in &self.fields {
            out.push_str(&escape_run(&physical[copied..field.start]));
            out.push_str(&physical[field.range()]);
            copied = field.end;
        }
        out.push_str(&escape_run(&physical[copied..]));
        out
    }

    // Callers have validated `at`; `index` is where the span goes in the list.
    fn place_field(
        &mut self,
        at: usize,
        index: usize,
        field_id: F,
        display: &str,
    ) -> FieldSpan<F> {
        let width = display.len();
        let logical_position = self.physical_to_logical(at);
        for field in &mut self.fields[index..] {
            field.shift(width as isize, 0);
        }

        let span = FieldSpan {
            field_id,
            logical_position,
            start: at,
            end: at + width,
        };
        self.fields.insert(index, span.clone());
        if width > 0 {
            self.physical = splice(&self.physical, at..at, display);
        }
        span
    }

    // Callers have validated `at`; `text` is non-empty.
    fn splice_text(&mut self, at: usize, text: &str) {
        let logical_at = self.physical_to_logical(at);
        self.physical = splice(&self.physical, at..at, text);
        self.logical = splice(&self.logical, logical_at..logical_at, text);

        let width = text.len() as isize;
        let index = translate::insertion_index(&self.fields, at);
        for field in &mut self.fields[index..] {
            field.shift(width, width);
        }
    }

    fn is_char_boundary(&self, position: usize) -> bool {
        let len = self.len();
        if position == 0 || position >= len {
            return position <= len;
        }
        self.fields
            .iter()
            .any(|field| field.start == position || field.end == position)
            || self.physical.is_codepoint_boundary(position)
    }

    fn committed(&mut self, operation: &str) {
        self.version += 1;
        log::debug!(
            "{operation}: version {} ({} bytes, {} fields)",
            self.version,
            self.len(),
            self.fields.len()
        );
        debug_assert_eq!(self.check_invariants(), Ok(()), "after {operation}");
    }
}

impl<F: fmt::Debug> fmt::Debug for FieldDocument<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDocument")
            .field("physical", &self.physical.to_string())
            .field("logical", &self.logical.to_string())
            .field("fields", &self.fields)
            .field("version", &self.version)
            .finish()
    }
}

impl<F: fmt::Debug> fmt::Display for FieldDocument<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldDocument(text={:?}, fields=[", self.physical.to_string())?;
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, "])")
    }
}

fn rejected(operation: &str, err: EditError) -> EditError {
    log::warn!("{operation} rejected: {err}");
    err
}

/// Replace `range` of `rope` with `text` through a delta.
fn splice(rope: &Rope, range: Range<usize>, text: &str) -> Rope {
    let mut builder = Builder::new(rope.len());
    if text.is_empty() {
        builder.delete(range);
    } else {
        builder.replace(range, Rope::from(text));
    }
    builder.build().apply(rope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogicalField;
    use crate::tests::{sample_catalog, sample_document};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn x_catalog() -> FieldCatalog<u32> {
        [(1, "{X}")].into_iter().collect()
    }

    fn spans(doc: &FieldDocument<u32>) -> Vec<(u32, usize, Range<usize>)> {
        doc.fields()
            .iter()
            .map(|f| (f.field_id, f.logical_position, f.range()))
            .collect()
    }

    #[test]
    fn test_insert_field_insert_text_delete_scenario() {
        let mut doc = FieldDocument::new(x_catalog());
        assert_eq!(doc.physical_text(), "");
        assert_eq!(doc.logical_text(), "");

        let span = doc.insert_field(0, 1).unwrap();
        assert_eq!(span.range(), 0..3);
        assert_eq!(doc.physical_text(), "{X}");
        assert_eq!(doc.logical_text(), "");
        assert_eq!(spans(&doc), vec![(1, 0, 0..3)]);

        assert_eq!(doc.insert_text(3, "ab").unwrap(), 2);
        assert_eq!(doc.physical_text(), "{X}ab");
        assert_eq!(doc.logical_text(), "ab");
        assert_eq!(spans(&doc), vec![(1, 0, 0..3)]);

        assert_eq!(doc.delete_range(0..3).unwrap(), 3);
        assert_eq!(doc.physical_text(), "ab");
        assert_eq!(doc.logical_text(), "ab");
        assert!(doc.fields().is_empty());

        let exported = doc.export_all();
        assert_eq!(exported, LogicalDocument::from_text("ab"));
        let rebuilt = FieldDocument::from_logical(x_catalog(), &exported).unwrap();
        assert_eq!(rebuilt.physical_text(), "ab");
    }

    #[test]
    fn test_insert_unknown_field_leaves_document_unchanged() {
        let mut doc = sample_document();
        let before = doc.clone();

        let err = doc.insert_field(0, 42).unwrap_err();

        assert_eq!(
            err,
            EditError::UnknownField {
                field: "42".to_string()
            }
        );
        assert_eq!(doc.physical_text(), before.physical_text());
        assert_eq!(doc.fields(), before.fields());
        assert_eq!(doc.version(), before.version());
    }

    #[test]
    fn test_insert_text_inside_field_is_rejected() {
        let mut doc = sample_document();
        let before = doc.physical_text();
        // "Due: {Month}, total {Sum}" - 7 is inside {Month}
        let err = doc.insert_text(7, "zz").unwrap_err();

        assert_eq!(
            err,
            EditError::InvalidPosition(PositionFault::InsideField {
                position: 7,
                start: 5,
                end: 12,
            })
        );
        assert_eq!(doc.physical_text(), before);
    }

    #[test]
    fn test_insert_text_out_of_bounds() {
        let mut doc = sample_document();
        let len = doc.len();
        let err = doc.insert_text(len + 1, "z").unwrap_err();
        assert_eq!(
            err,
            EditError::InvalidPosition(PositionFault::OutOfBounds {
                position: len + 1,
                len,
            })
        );
    }

    #[test]
    fn test_insert_text_before_field_shifts_it() {
        let mut doc = sample_document();
        doc.insert_text(0, ">> ").unwrap();

        assert_eq!(doc.physical_text(), ">> Due: {Month}, total {Sum}");
        assert_eq!(doc.logical_text(), ">> Due: , total ");
        assert_eq!(spans(&doc), vec![(1, 8, 8..15), (2, 16, 23..28)]);
    }

    #[test]
    fn test_insert_text_at_field_start_goes_before_field() {
        let mut doc = sample_document();
        doc.insert_text(5, "the ").unwrap();

        assert_eq!(doc.physical_text(), "Due: the {Month}, total {Sum}");
        assert_eq!(spans(&doc), vec![(1, 9, 9..16), (2, 17, 24..29)]);
    }

    #[test]
    fn test_insert_text_at_field_end_stays_after_field() {
        let mut doc = sample_document();
        doc.insert_text(12, "!").unwrap();

        assert_eq!(doc.physical_text(), "Due: {Month}!, total {Sum}");
        assert_eq!(doc.logical_text(), "Due: !, total ");
        assert_eq!(spans(&doc), vec![(1, 5, 5..12), (2, 14, 21..26)]);
    }

    #[test]
    fn test_insert_text_rejects_split_character() {
        let mut doc = FieldDocument::new(sample_catalog());
        doc.insert_text(0, "ä").unwrap();
        let err = doc.insert_text(1, "x").unwrap_err();
        assert_eq!(
            err,
            EditError::InvalidPosition(PositionFault::NotCharBoundary { position: 1 })
        );
    }

    #[test]
    fn test_insert_field_between_fields() {
        let mut doc = sample_document();
        // right after {Month}
        let span = doc.insert_field(12, 2).unwrap();

        assert_eq!(span.range(), 12..17);
        assert_eq!(doc.physical_text(), "Due: {Month}{Sum}, total {Sum}");
        assert_eq!(doc.logical_text(), "Due: , total ");
        assert_eq!(
            spans(&doc),
            vec![(1, 5, 5..12), (2, 5, 12..17), (2, 13, 25..30)]
        );
    }

    #[test]
    fn test_insert_field_in_front_of_adjacent_field() {
        let mut doc = sample_document();
        doc.insert_field(5, 3).unwrap();

        assert_eq!(doc.physical_text(), "Due: <Tag>{Month}, total {Sum}");
        assert_eq!(
            spans(&doc),
            vec![(3, 5, 5..10), (1, 5, 10..17), (2, 13, 25..30)]
        );
    }

    #[test]
    fn test_insert_field_inside_field_is_rejected() {
        let mut doc = sample_document();
        let err = doc.insert_field(6, 2).unwrap_err();
        assert!(err.is_invalid_position());
        assert_eq!(doc.fields().len(), 2);
    }

    #[rstest]
    #[case::plain_text_only(0..4, " {Month}, total {Sum}", " , total ")]
    #[case::whole_field(5..12, "Due: , total {Sum}", "Due: , total ")]
    #[case::text_and_field(3..14, "Duetotal {Sum}", "Duetotal ")]
    #[case::everything(0..25, "", "")]
    fn test_delete_range(
        #[case] range: Range<usize>,
        #[case] physical: &str,
        #[case] logical: &str,
    ) {
        let mut doc = sample_document();
        let removed = doc.delete_range(range.clone()).unwrap();

        assert_eq!(removed, range.len());
        assert_eq!(doc.physical_text(), physical);
        assert_eq!(doc.logical_text(), logical);
        assert_eq!(doc.check_invariants(), Ok(()));
    }

    #[test]
    fn test_delete_range_shifts_following_fields() {
        let mut doc = sample_document();
        // delete "Due: {Month}" - trailing field moves left
        doc.delete_range(0..12).unwrap();

        assert_eq!(doc.physical_text(), ", total {Sum}");
        assert_eq!(spans(&doc), vec![(2, 8, 8..13)]);
    }

    #[rstest]
    #[case::start_inside(7..14, 7)]
    #[case::end_inside(0..8, 8)]
    #[case::both_in_same_field(6..9, 6)]
    fn test_delete_partial_overlap_is_rejected(
        #[case] range: Range<usize>,
        #[case] position: usize,
    ) {
        let mut doc = sample_document();
        let before = doc.physical_text();

        let err = doc.delete_range(range).unwrap_err();

        assert_eq!(
            err,
            EditError::InvalidPosition(PositionFault::InsideField {
                position,
                start: 5,
                end: 12,
            })
        );
        assert_eq!(doc.physical_text(), before);
        assert_eq!(doc.fields().len(), 2);
    }

    #[test]
    fn test_delete_reversed_range_is_rejected() {
        let mut doc = sample_document();
        #[allow(clippy::reversed_empty_ranges)]
        let err = doc.delete_range(4..2).unwrap_err();
        assert_eq!(
            err,
            EditError::InvalidPosition(PositionFault::Reversed { start: 4, end: 2 })
        );
    }

    #[test]
    fn test_delete_empty_range_is_noop() {
        let mut doc = sample_document();
        let version = doc.version();
        assert_eq!(doc.delete_range(3..3).unwrap(), 0);
        assert_eq!(doc.version(), version);
    }

    fn blank_catalog() -> FieldCatalog<u32> {
        [(1, "{X}"), (7, ""), (8, "")].into_iter().collect()
    }

    #[test]
    fn test_delete_empty_range_removes_zero_width_field() {
        let mut doc = FieldDocument::new(blank_catalog());
        doc.insert_text(0, "ab").unwrap();
        let before = doc.export_all();

        let span = doc.insert_field(1, 7).unwrap();
        assert_eq!(span.range(), 1..1);
        assert_eq!(doc.physical_text(), "ab");
        let version = doc.version();

        assert_eq!(doc.delete_range(span.range()).unwrap(), 0);
        assert!(doc.fields().is_empty());
        assert_eq!(doc.version(), version + 1);
        assert_eq!(doc.export_all(), before);
    }

    #[test]
    fn test_delete_range_over_zero_width_field_at_end() {
        let mut doc = FieldDocument::new(blank_catalog());
        doc.insert_text(0, "ab").unwrap();
        doc.insert_field(2, 7).unwrap();

        doc.delete_range(0..2).unwrap();

        assert_eq!(doc.physical_text(), "");
        assert!(doc.fields().is_empty());
    }

    #[test]
    fn test_insert_fragment_keeps_zero_width_field_order() {
        let mut doc = FieldDocument::new(blank_catalog());
        doc.insert_text(0, "xy").unwrap();
        let fragment = LogicalDocument::new(
            "",
            vec![
                LogicalField::new(7, 0),
                LogicalField::new(8, 0),
                LogicalField::new(1, 0),
            ],
        );

        doc.insert_fragment(1, &fragment).unwrap();

        assert_eq!(doc.physical_text(), "x{X}y");
        assert_eq!(
            spans(&doc),
            vec![(7, 1, 1..1), (8, 1, 1..1), (1, 1, 1..4)]
        );
        assert_eq!(doc.export_selection(1..4).unwrap(), fragment);
    }

    #[test]
    fn test_insert_then_delete_field_restores_text() {
        let mut doc = sample_document();
        let before = doc.export_all();

        let span = doc.insert_field(2, 3).unwrap();
        assert_eq!(doc.logical_text(), before.text);
        doc.delete_range(span.range()).unwrap();

        assert_eq!(doc.export_all(), before);
    }

    #[test]
    fn test_expand_to_fields_allows_whole_field_delete() {
        let mut doc = sample_document();
        let range = doc.expand_to_fields(7..14);
        assert_eq!(range, 5..14);

        doc.delete_range(range).unwrap();
        assert_eq!(doc.physical_text(), "Due: total {Sum}");
    }

    #[test]
    fn test_snap_to_boundary() {
        let doc = sample_document();
        assert_eq!(doc.snap_to_boundary(7, Bias::Before), 5);
        assert_eq!(doc.snap_to_boundary(7, Bias::After), 12);
        assert_eq!(doc.snap_to_boundary(3, Bias::After), 3);
        assert_eq!(doc.snap_to_boundary(100, Bias::Before), doc.len());
    }

    #[test]
    fn test_field_lookup() {
        let doc = sample_document();
        assert_eq!(doc.field_at(5), None);
        assert_eq!(doc.field_at(6).map(|f| f.field_id), Some(1));
        assert_eq!(doc.field_before(12).map(|f| f.field_id), Some(1));
        assert_eq!(doc.field_before(11), None);
        assert_eq!(doc.field_after(13).map(|f| f.field_id), Some(2));
        assert_eq!(doc.fields_within(0..13).count(), 1);
        assert_eq!(doc.fields_within(0..25).count(), 2);
    }

    #[test]
    fn test_insert_fragment() {
        let mut doc = FieldDocument::new(sample_catalog());
        doc.insert_text(0, "[]").unwrap();
        let fragment = LogicalDocument::new(
            "a b",
            vec![
                LogicalField::new(1, 0),
                LogicalField::new(2, 2),
                LogicalField::new(3, 3),
            ],
        );

        let added = doc.insert_fragment(1, &fragment).unwrap();

        assert_eq!(doc.physical_text(), "[{Month}a {Sum}b<Tag>]");
        assert_eq!(added, 3 + 7 + 5 + 5);
        assert_eq!(doc.logical_text(), "[a b]");
        assert_eq!(
            spans(&doc),
            vec![(1, 1, 1..8), (2, 3, 10..15), (3, 4, 16..21)]
        );
    }

    #[test]
    fn test_insert_fragment_before_existing_field() {
        let mut doc = sample_document();
        let fragment = LogicalDocument::new("x", vec![LogicalField::new(3, 1)]);

        doc.insert_fragment(5, &fragment).unwrap();

        assert_eq!(doc.physical_text(), "Due: x<Tag>{Month}, total {Sum}");
        assert_eq!(
            spans(&doc),
            vec![(3, 6, 6..11), (1, 6, 11..18), (2, 14, 26..31)]
        );
    }

    #[test]
    fn test_insert_fragment_with_unknown_field_changes_nothing() {
        let mut doc = sample_document();
        let before = doc.physical_text();
        let fragment = LogicalDocument::new("abc", vec![LogicalField::new(9, 1)]);

        assert!(matches!(
            doc.insert_fragment(0, &fragment),
            Err(EditError::UnknownField { .. })
        ));
        assert_eq!(doc.physical_text(), before);
    }

    #[test]
    fn test_insert_malformed_fragment_is_rejected() {
        let mut doc = sample_document();
        let fragment = LogicalDocument::new("ab", vec![LogicalField::new(1, 5)]);

        assert!(matches!(
            doc.insert_fragment(0, &fragment),
            Err(EditError::MalformedFragment(_))
        ));
    }

    #[test]
    fn test_from_plain_text() {
        let doc = FieldDocument::from_plain_text(sample_catalog(), "Due: {Month}!").unwrap();
        assert_eq!(doc.logical_text(), "Due: !");
        assert_eq!(spans(&doc), vec![(1, 5, 5..12)]);
    }

    #[test]
    fn test_get_plain_text_round_trip() {
        let mut doc = sample_document();
        doc.insert_text(0, "<b>&").unwrap();
        let raw = doc.get_plain_text();
        assert_eq!(raw, "&lt;b&gt;&amp;Due: {Month}, total {Sum}");

        let mut copy = FieldDocument::new(sample_catalog());
        copy.assign_clipboard_text(&raw).unwrap();
        assert_eq!(copy.export_all(), doc.export_all());
    }

    #[test]
    fn test_catalog_swap_keeps_placed_fields() {
        let mut doc = sample_document();
        doc.assign_catalog(x_catalog());

        assert_eq!(doc.physical_text(), "Due: {Month}, total {Sum}");
        assert_eq!(doc.get_plain_text(), "Due: {Month}, total {Sum}");
        assert!(matches!(
            doc.insert_field(0, 2),
            Err(EditError::UnknownField { .. })
        ));
        doc.insert_field(0, 1).unwrap();
        assert_eq!(doc.physical_text(), "{X}Due: {Month}, total {Sum}");
    }

    #[test]
    fn test_display() {
        let mut doc = FieldDocument::new(x_catalog());
        doc.insert_text(0, "a").unwrap();
        doc.insert_field(1, 1).unwrap();
        assert_eq!(
            doc.to_string(),
            "FieldDocument(text=\"a{X}\", fields=[FieldSpan(1 @ 1..4, logical 1)])"
        );
    }

    #[test]
    fn test_clear() {
        let mut doc = sample_document();
        let version = doc.version();
        doc.clear();

        assert!(doc.is_empty());
        assert_eq!(doc.logical_text(), "");
        assert_eq!(doc.version(), version + 1);
        assert_eq!(doc.catalog().len(), 3);
    }

    #[test]
    fn test_version_counts_successful_edits() {
        let mut doc = FieldDocument::new(sample_catalog());
        doc.insert_text(0, "a").unwrap();
        doc.insert_field(1, 1).unwrap();
        let _ = doc.insert_text(3, "b");
        assert_eq!(doc.version(), 2);
    }
}
