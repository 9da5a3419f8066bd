use serde::{Deserialize, Serialize};

use crate::models::FieldId;

/// One known field kind and the text it renders as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry<F> {
    pub field_id: F,
    pub display_text: String,
}

impl<F> CatalogEntry<F> {
    pub fn new(field_id: F, display_text: impl Into<String>) -> Self {
        Self {
            field_id,
            display_text: display_text.into(),
        }
    }

    /// Length of the display text in bytes, i.e. the physical width of the field
    pub fn display_len(&self) -> usize {
        self.display_text.len()
    }
}

/// Ordered set of fields the document knows how to render.
///
/// Order matters twice: lookup returns the first entry with a matching id,
/// and plain-text parsing tries entries in order so the first display text
/// that matches wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCatalog<F> {
    entries: Vec<CatalogEntry<F>>,
}

impl<F> Default for FieldCatalog<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: FieldId> FieldCatalog<F> {
    pub fn new(entries: Vec<CatalogEntry<F>>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, field_id: F, display_text: impl Into<String>) {
        self.entries.push(CatalogEntry::new(field_id, display_text));
    }

    /// First entry whose id equals `field_id`
    pub fn find(&self, field_id: &F) -> Option<&CatalogEntry<F>> {
        self.entries.iter().find(|entry| &entry.field_id == field_id)
    }

    pub fn display_text(&self, field_id: &F) -> Option<&str> {
        self.find(field_id).map(|entry| entry.display_text.as_str())
    }

    pub fn contains(&self, field_id: &F) -> bool {
        self.find(field_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry<F>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: FieldId, S: Into<String>> FromIterator<(F, S)> for FieldCatalog<F> {
    fn from_iter<I: IntoIterator<Item = (F, S)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(field_id, text)| CatalogEntry::new(field_id, text))
                .collect(),
        }
    }
}
