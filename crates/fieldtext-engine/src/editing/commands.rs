use std::ops::Range;

use crate::editing::{FieldDocument, Patch};
use crate::error::EditError;
use crate::models::{FieldId, LogicalDocument};

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd<F> {
    InsertField {
        at: usize,
        field_id: F,
    },
    InsertText {
        at: usize,
        text: String,
    },
    DeleteRange {
        range: Range<usize>,
    },
    /// Paste an exported fragment
    InsertFragment {
        at: usize,
        fragment: LogicalDocument<F>,
    },
}

impl<F: FieldId> FieldDocument<F> {
    /// Apply a command, describing what changed and where the caret lands.
    ///
    /// A rejected command leaves the document and its version untouched.
    pub fn apply(&mut self, cmd: Cmd<F>) -> Result<Patch, EditError> {
        let changed = match cmd {
            Cmd::InsertField { at, field_id } => self.insert_field(at, field_id)?.range(),
            Cmd::InsertText { at, text } => {
                let inserted = self.insert_text(at, &text)?;
                at..at + inserted
            }
            Cmd::DeleteRange { range } => {
                self.delete_range(range.clone())?;
                range.start..range.start
            }
            Cmd::InsertFragment { at, fragment } => {
                let inserted = self.insert_fragment(at, &fragment)?;
                at..at + inserted
            }
        };

        Ok(Patch {
            caret: changed.end,
            changed,
            version: self.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogicalField;
    use crate::tests::sample_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_insert_field() {
        let mut doc = sample_document();
        let version = doc.version();

        let patch = doc
            .apply(Cmd::InsertField {
                at: 0,
                field_id: 2,
            })
            .unwrap();

        assert_eq!(
            patch,
            Patch {
                changed: 0..5,
                caret: 5,
                version: version + 1,
            }
        );
        assert!(doc.physical_text().starts_with("{Sum}Due: "));
    }

    #[test]
    fn test_apply_insert_text() {
        let mut doc = sample_document();
        let patch = doc
            .apply(Cmd::InsertText {
                at: 25,
                text: " due".to_string(),
            })
            .unwrap();

        assert_eq!(patch.changed, 25..29);
        assert_eq!(patch.caret, 29);
        assert_eq!(doc.physical_text(), "Due: {Month}, total {Sum} due");
    }

    #[test]
    fn test_apply_delete_range() {
        let mut doc = sample_document();
        let patch = doc.apply(Cmd::DeleteRange { range: 12..20 }).unwrap();

        assert_eq!(patch.changed, 12..12);
        assert_eq!(patch.caret, 12);
        assert_eq!(doc.physical_text(), "Due: {Month}{Sum}");
    }

    #[test]
    fn test_apply_insert_fragment() {
        let mut doc = sample_document();
        let fragment = LogicalDocument::new("=", vec![LogicalField::new(3, 1)]);

        let patch = doc
            .apply(Cmd::InsertFragment { at: 0, fragment })
            .unwrap();

        assert_eq!(patch.changed, 0..6);
        assert_eq!(doc.physical_text(), "=<Tag>Due: {Month}, total {Sum}");
    }

    #[test]
    fn test_rejected_command_keeps_version() {
        let mut doc = sample_document();
        let version = doc.version();

        let result = doc.apply(Cmd::InsertText {
            at: 8,
            text: "x".to_string(),
        });

        assert!(result.unwrap_err().is_invalid_position());
        assert_eq!(doc.version(), version);
    }
}
