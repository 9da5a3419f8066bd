pub mod catalog;
pub mod field;
pub mod field_id;
pub mod logical_document;

pub use catalog::{CatalogEntry, FieldCatalog};
pub use field::{FieldSpan, LogicalField};
pub use field_id::{FieldId, FieldIdError, FieldIdRepr};
pub use logical_document::LogicalDocument;
