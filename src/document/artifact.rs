use std::fs;
use std::io::Write;
use std::path::Path;

use log::warn;
use tempfile::NamedTempFile;

use crate::document::package::DOCX_MEDIA_TYPE;
use crate::errors::DocumentError;

/// A finished output document, spooled to a temporary file until saved or released
#[derive(Debug)]
pub struct DownloadArtifact {
    file_name: String,
    media_type: &'static str,
    size: u64,
    spool: Option<NamedTempFile>,
}

impl DownloadArtifact {
    /// Spool `bytes` to a new temporary file
    pub fn spool(file_name: impl Into<String>, bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut spool = tempfile::Builder::new()
            .prefix("docxpolyglot-")
            .suffix(".docx")
            .tempfile()?;
        spool.write_all(bytes)?;
        spool.flush()?;

        Ok(Self {
            file_name: file_name.into(),
            media_type: DOCX_MEDIA_TYPE,
            size: bytes.len() as u64,
            spool: Some(spool),
        })
    }

    /// Suggested download name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// Size in bytes of the spooled document
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Temporary file backing the artifact, gone once released
    pub fn path(&self) -> Option<&Path> {
        self.spool.as_ref().map(|spool| spool.path())
    }

    pub fn is_released(&self) -> bool {
        self.spool.is_none()
    }

    /// Read the spooled document back
    pub fn read_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let path = self.path().ok_or_else(released)?;
        Ok(fs::read(path)?)
    }

    /// Copy the spooled document to `destination`
    pub fn save_to<P: AsRef<Path>>(&self, destination: P) -> Result<(), DocumentError> {
        let path = self.path().ok_or_else(released)?;
        fs::copy(path, destination.as_ref())?;
        Ok(())
    }

    /// Delete the temporary file; releasing twice is a no-op
    pub fn release(&mut self) -> Result<(), DocumentError> {
        if let Some(spool) = self.spool.take() {
            spool.close()?;
        }
        Ok(())
    }

    /// Release, logging instead of failing
    pub(crate) fn discard(mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release artifact {}: {}", self.file_name, e);
        }
    }
}

fn released() -> DocumentError {
    DocumentError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "artifact has already been released",
    ))
}
