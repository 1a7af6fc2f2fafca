use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::StoreError;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];

/// Filesystem-owned store of uploaded support documents. Files are never
/// garbage collected; deleting a ledger row just orphans its file.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes an uploaded file under a name derived from (date, employee,
    /// extension) and returns the relative path recorded in `Soporte`.
    /// A second upload for the same key replaces the file.
    pub fn save_document(
        &self,
        date: NaiveDate,
        employee: &str,
        ext: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(StoreError::UnsupportedExtension(ext));
        }

        let stem = employee.trim().replace(' ', "_");
        let file_name = format!("{date}_{stem}.{ext}");

        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(&file_name), bytes)?;

        let folder = self
            .dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("soportes");
        Ok(format!("{folder}/{file_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn name_is_deterministic_and_spaces_become_underscores() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("soportes"));

        let date = "2024-01-01".parse().unwrap();
        let path = store
            .save_document(date, "Ana Torres", "pdf", b"%PDF-1.4")
            .unwrap();

        assert_eq!(path, "soportes/2024-01-01_Ana_Torres.pdf");
        assert!(dir.path().join("soportes/2024-01-01_Ana_Torres.pdf").exists());
    }

    #[test]
    fn replaces_existing_upload_for_same_key() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("soportes"));
        let date = "2024-01-01".parse().unwrap();

        store.save_document(date, "Ana", "png", b"v1").unwrap();
        let path = store.save_document(date, "Ana", "png", b"v2").unwrap();

        assert_eq!(fs::read(dir.path().join("soportes/2024-01-01_Ana.png")).unwrap(), b"v2");
        assert_eq!(path, "soportes/2024-01-01_Ana.png");
    }

    #[test]
    fn rejects_unlisted_extensions() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("soportes"));
        let date = "2024-01-01".parse().unwrap();

        assert!(matches!(
            store.save_document(date, "Ana", "exe", b""),
            Err(StoreError::UnsupportedExtension(_))
        ));
        // but a dotted or upper-case extension is normalized
        assert!(store.save_document(date, "Ana", ".PDF", b"x").is_ok());
    }
}
