use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::editing::FieldDocument;
use crate::models::FieldCatalog;

pub fn create_test_documents_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

pub fn create_test_file(documents_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = documents_dir.path().join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Catalog shared by the unit tests: `{Month}` (7 bytes), `{Sum}` and `<Tag>` (5 bytes each)
pub fn sample_catalog() -> FieldCatalog<u32> {
    [(1, "{Month}"), (2, "{Sum}"), (3, "<Tag>")]
        .into_iter()
        .collect()
}

/// `"Due: {Month}, total {Sum}"`: `{Month}` at 5..12, `{Sum}` at 20..25
pub fn sample_document() -> FieldDocument<u32> {
    FieldDocument::from_plain_text(sample_catalog(), "Due: {Month}, total {Sum}").unwrap()
}
