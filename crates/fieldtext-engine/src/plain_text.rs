//! Conversion between flat text and the logical model.
//!
//! Flat text is what a clipboard or a legacy text box holds: fields appear
//! as their display text. Recovering the fields means scanning for display
//! texts the catalog knows about.

use std::borrow::Cow;

use crate::models::{FieldCatalog, FieldId, LogicalDocument, LogicalField};

/// Escape XML-special characters in one plain-text run.
pub(crate) fn escape_run(run: &str) -> Cow<'_, str> {
    html_escape::encode_safe(run)
}

/// Undo [`escape_run`].
pub(crate) fn unescape_run(run: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(run)
}

/// Split flat text into logical text and fields.
///
/// Scans left to right. At each position every catalog entry is tried in
/// catalog order; the first whose display text starts there becomes a field
/// and the scan skips past it. Otherwise one character is copied into the
/// logical text. Entries with an empty display text never match.
pub fn parse_plain_text<F: FieldId>(raw: &str, catalog: &FieldCatalog<F>) -> LogicalDocument<F> {
    let mut doc = LogicalDocument::default();
    let mut index = 0;

    while let Some(rest) = raw.get(index..).filter(|rest| !rest.is_empty()) {
        let matched = catalog
            .iter()
            .find(|entry| !entry.display_text.is_empty() && rest.starts_with(&entry.display_text));

        match matched {
            Some(entry) => {
                doc.fields
                    .push(LogicalField::new(entry.field_id.clone(), doc.text.len()));
                index += entry.display_len();
            }
            None => {
                // rest is non-empty, so there is always a next char
                let ch = rest.chars().next().unwrap_or_default();
                doc.text.push(ch);
                index += ch.len_utf8();
            }
        }
    }

    doc
}

/// Parse text produced by [`LogicalDocument::to_plain_text`].
///
/// Fields are extracted first, while the escaped runs cannot be confused
/// with display texts containing `<` or `&`; each run between fields is then
/// unescaped and field positions are rebased onto the unescaped text.
pub fn parse_clipboard_text<F: FieldId>(raw: &str, catalog: &FieldCatalog<F>) -> LogicalDocument<F> {
    let escaped = parse_plain_text(raw, catalog);
    let mut doc = LogicalDocument::default();

    for (run, field) in escaped.runs() {
        doc.text.push_str(&unescape_run(run));
        if let Some(field) = field {
            doc.fields
                .push(LogicalField::new(field.field_id.clone(), doc.text.len()));
        }
    }

    doc
}
