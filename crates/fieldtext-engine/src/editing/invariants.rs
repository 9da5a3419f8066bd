use crate::editing::FieldDocument;
use crate::models::FieldSpan;

/// Validates the relationship between the physical text, the logical text
/// and the field list.
///
/// Checks that:
/// - spans are in bounds, sorted by `start` and pairwise non-overlapping
/// - the physical length equals the logical length plus all field widths
/// - each field's logical position equals its start minus the widths before it
/// - removing every span from the physical text yields the logical text
///
/// Returns a description of the first violation found.
pub fn check<F: std::fmt::Debug>(
    physical: &str,
    logical: &str,
    fields: &[FieldSpan<F>],
) -> Result<(), String> {
    let n = physical.len();
    let mut hidden = 0;
    let mut previous_end = 0;
    let mut stripped = String::with_capacity(logical.len());

    for (index, field) in fields.iter().enumerate() {
        if field.start > field.end || field.end > n {
            return Err(format!("field {index} span out of bounds: {field} (physical len: {n})"));
        }
        if field.start < previous_end {
            return Err(format!(
                "field {index} overlaps or precedes the field before it: {field} (previous end: {previous_end})"
            ));
        }
        if field.logical_position + hidden != field.start {
            return Err(format!(
                "field {index} logical position out of step: {field} (width before it: {hidden})"
            ));
        }
        stripped.push_str(physical.get(previous_end..field.start).ok_or_else(|| {
            format!("field {index} span splits a character: {field}")
        })?);
        hidden += field.len();
        previous_end = field.end;
    }
    stripped.push_str(physical.get(previous_end..).unwrap_or_default());

    if n != logical.len() + hidden {
        return Err(format!(
            "length mismatch: physical {n} != logical {} + fields {hidden}",
            logical.len()
        ));
    }
    if stripped != logical {
        return Err(format!(
            "logical text {logical:?} differs from physical text without fields {stripped:?}"
        ));
    }
    Ok(())
}

impl<F: std::fmt::Debug> FieldDocument<F> {
    /// Run [`check`] against this document.
    pub fn check_invariants(&self) -> Result<(), String> {
        check(
            &self.physical.to_string(),
            &self.logical.to_string(),
            &self.fields,
        )
    }
}
