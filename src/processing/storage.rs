//! Scoped on-disk staging for uploaded files.

use super::types::DocumentId;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Uploaded bytes staged at `<dir>/temp_<document_id>.pdf`.
///
/// The file is removed when the value is dropped, so every exit path of the ingestion
/// pipeline (success, error, panic unwinding) cleans up after itself.
pub struct ScopedUpload {
    file: NamedTempFile,
}

impl ScopedUpload {
    /// Write `bytes` to the staging file for `document_id` inside `dir`.
    pub fn write(dir: &Path, document_id: &DocumentId, bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("temp_{document_id}"))
            .suffix(".pdf")
            .rand_bytes(0)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        tracing::debug!(
            document_id = %document_id,
            path = %file.path().display(),
            bytes = bytes.len(),
            "Upload staged"
        );
        Ok(Self { file })
    }

    /// Location of the staged file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
