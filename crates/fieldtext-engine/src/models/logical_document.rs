use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::models::{FieldCatalog, FieldId, LogicalField};
use crate::plain_text::escape_run;

/// The canonical, serializable form of a document: plain text plus the
/// zero-width fields sitting in it.
///
/// This is what gets exported for copy/paste and undo, and what the codec
/// persists. It does not know about display texts; rendering it needs a
/// [`FieldCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalDocument<F> {
    pub text: String,
    pub fields: Vec<LogicalField<F>>,
}

// Not derived: that would require `F: Default`
impl<F> Default for LogicalDocument<F> {
    fn default() -> Self {
        Self::new(String::new(), Vec::new())
    }
}

impl<F> LogicalDocument<F> {
    pub fn new(text: impl Into<String>, fields: Vec<LogicalField<F>>) -> Self {
        Self {
            text: text.into(),
            fields,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.fields.clear();
    }

    /// Check that every field position is inside the text, on a character
    /// boundary, and that positions never decrease along the list.
    pub fn validate(&self) -> Result<(), EditError> {
        let mut previous = 0;
        for (index, field) in self.fields.iter().enumerate() {
            if field.position > self.text.len() {
                return Err(EditError::MalformedFragment(format!(
                    "field {index} at position {} is past the end of the text (length {})",
                    field.position,
                    self.text.len()
                )));
            }
            if !self.text.is_char_boundary(field.position) {
                return Err(EditError::MalformedFragment(format!(
                    "field {index} at position {} splits a character",
                    field.position
                )));
            }
            if field.position < previous {
                return Err(EditError::MalformedFragment(format!(
                    "field {index} at position {} precedes the field before it (position {previous})",
                    field.position
                )));
            }
            previous = field.position;
        }
        Ok(())
    }

    /// Plain-text runs between fields, paired with the field that follows each
    /// run. The final run has no field after it.
    pub(crate) fn runs(&self) -> impl Iterator<Item = (&str, Option<&LogicalField<F>>)> {
        let mut copied = 0;
        let mut fields = self.fields.iter();
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            match fields.next() {
                Some(field) => {
                    let run = &self.text[copied..field.position];
                    copied = field.position;
                    Some((run, Some(field)))
                }
                None => {
                    done = true;
                    Some((&self.text[copied..], None))
                }
            }
        })
    }
}

impl<F: FieldId> LogicalDocument<F> {
    /// Expand every field to its display text, producing the physical string.
    pub fn render(&self, catalog: &FieldCatalog<F>) -> Result<String, EditError> {
        self.render_runs(catalog, |run, out| out.push_str(run))
    }

    /// Flat text for clipboard interop: XML-special characters in the plain
    /// runs are escaped, fields are expanded verbatim.
    ///
    /// [`crate::parse_clipboard_text`] reverses this.
    pub fn to_plain_text(&self, catalog: &FieldCatalog<F>) -> Result<String, EditError> {
        self.render_runs(catalog, |run, out| out.push_str(&escape_run(run)))
    }

    fn render_runs(
        &self,
        catalog: &FieldCatalog<F>,
        mut push_run: impl FnMut(&str, &mut String),
    ) -> Result<String, EditError> {
        self.validate()?;
        let mut out = String::with_capacity(self.text.len());
        for (run, field) in self.runs() {
            push_run(run, &mut out);
            if let Some(field) = field {
                let display = catalog
                    .display_text(&field.field_id)
                    .ok_or_else(|| EditError::unknown_field(&field.field_id))?;
                out.push_str(display);
            }
        }
        Ok(out)
    }
}

impl<F: fmt::Debug> fmt::Display for LogicalDocument<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalDocument(text={:?}, fields=[", self.text)?;
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, "])")
    }
}
