use crate::codec::{self, CodecError};
use crate::models::{FieldId, LogicalDocument};
use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

const DOCUMENT_EXTENSION: &str = "xml";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid documents directory: {0}")]
    InvalidDocumentsDir(String),
    #[error("Could not read document {path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

/// Read a saved document
pub fn read_document<F: FieldId>(
    relative_path: &RelativePath,
    documents_root: &Path,
) -> Result<LogicalDocument<F>, IoError> {
    let absolute_path = relative_path.to_path(documents_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    let xml = fs::read_to_string(&absolute_path).map_err(IoError::Io)?;
    codec::decode(&xml).map_err(|source| IoError::Codec {
        path: absolute_path,
        source,
    })
}

/// Write a document, replacing any existing file
pub fn write_document<F: FieldId>(
    relative_path: &RelativePath,
    documents_root: &Path,
    doc: &LogicalDocument<F>,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(documents_root);
    let xml = codec::encode(doc).map_err(|source| IoError::Codec {
        path: absolute_path.clone(),
        source,
    })?;

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, xml).map_err(IoError::Io)?;
    log::debug!("wrote {}", absolute_path.display());
    Ok(())
}

/// Scan for saved documents in the documents directory
pub fn scan_documents(documents_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_documents_dir(documents_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(documents_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == DOCUMENT_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_documents_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidDocumentsDir(format!(
            "documents directory not found: {}",
            path.display()
        )));
    }

    Ok(())
}
