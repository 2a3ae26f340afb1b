// Exported document downloads

use super::{atomic_write, FileResult};
use crate::models::DocumentType;
use std::path::{Path, PathBuf};

/// File name for an export taken at `millis`: `document_{millis}.{ext}`
pub fn export_file_name(document_type: DocumentType, millis: i64) -> String {
    format!("document_{}.{}", millis, document_type.extension())
}

/// Write an exported document into `dir` and return its path
pub fn save_export(
    dir: &Path,
    document_type: DocumentType,
    millis: i64,
    bytes: &[u8],
) -> FileResult<PathBuf> {
    let path = dir.join(export_file_name(document_type, millis));
    atomic_write(&path, bytes)?;
    log::info!("Saved {} export to {}", document_type, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(DocumentType::Docx, 1700000000123),
            "document_1700000000123.docx"
        );
        assert_eq!(export_file_name(DocumentType::Pptx, 5), "document_5.pptx");
    }

    #[test]
    fn test_save_export_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("exports");

        let path = save_export(&dir, DocumentType::Pptx, 42, b"deck").unwrap();

        assert_eq!(path, dir.join("document_42.pptx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"deck");
    }
}
