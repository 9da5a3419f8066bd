//! Pure conversions between physical and logical offsets.
//!
//! All functions take the field list of a physical document, sorted by
//! `start` with non-overlapping spans.

use crate::models::FieldSpan;

/// Logical offset equivalent to physical offset `position`.
///
/// Subtracts the part of every field lying before `position`. A position
/// strictly inside a field maps to that field's logical position, so the
/// result is non-decreasing in `position`.
pub fn physical_to_logical<F>(fields: &[FieldSpan<F>], position: usize) -> usize {
    let hidden: usize = fields
        .iter()
        .map(|field| position.saturating_sub(field.start).min(field.len()))
        .sum();
    position - hidden
}

/// Physical offset of logical offset `position`.
///
/// Fields sitting exactly at `position` are placed after the returned
/// offset, so the result is the earliest physical point with that logical
/// offset.
pub fn logical_to_physical<F>(fields: &[FieldSpan<F>], position: usize) -> usize {
    let shown: usize = fields
        .iter()
        .take_while(|field| field.logical_position < position)
        .map(FieldSpan::len)
        .sum();
    position + shown
}

/// Index of the first field starting at or after `position`, or the list
/// length when there is none.
pub fn insertion_index<F>(fields: &[FieldSpan<F>], position: usize) -> usize {
    fields.partition_point(|field| field.start < position)
}
