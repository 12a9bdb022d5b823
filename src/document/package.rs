use std::io::{Cursor, Read, Write};

use bytes::Bytes;
use log::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::DocumentError;

/// Archive entry holding the main document body
pub const CONTENT_STREAM: &str = "word/document.xml";

/// Media type of a WordprocessingML package
pub const DOCX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// An opened `.docx` archive
pub struct DocxPackage {
    archive: ZipArchive<Cursor<Bytes>>,
}

impl DocxPackage {
    /// Open a package, requiring the primary content stream
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self, DocumentError> {
        let archive = ZipArchive::new(Cursor::new(bytes.into()))
            .map_err(|e| DocumentError::InvalidPackage(format!("not a zip archive: {}", e)))?;

        if !archive.file_names().any(|name| name == CONTENT_STREAM) {
            return Err(DocumentError::InvalidPackage(format!("missing {}", CONTENT_STREAM)));
        }

        debug!("Opened package with {} entries", archive.len());
        Ok(Self { archive })
    }

    /// Number of archive entries
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Entry names in archive order
    pub fn entry_names(&mut self) -> Result<Vec<String>, DocumentError> {
        let mut names = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            names.push(self.archive.by_index_raw(index)?.name().to_string());
        }
        Ok(names)
    }

    /// Decoded primary content stream
    pub fn content_xml(&mut self) -> Result<String, DocumentError> {
        let mut entry = self.archive.by_name(CONTENT_STREAM)
            .map_err(|e| DocumentError::InvalidPackage(format!("cannot open {}: {}", CONTENT_STREAM, e)))?;

        let mut raw = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut raw)?;

        String::from_utf8(raw)
            .map_err(|e| DocumentError::MalformedContent(format!("{} is not UTF-8: {}", CONTENT_STREAM, e)))
    }

    /// Rebuild the archive with a new primary content stream
    ///
    /// Every other entry is copied raw, compressed bytes and headers included,
    /// in its original order.
    pub fn repackage(&mut self, content: &[u8]) -> Result<Vec<u8>, DocumentError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for index in 0..self.archive.len() {
            let entry = self.archive.by_index_raw(index)?;
            if entry.name() == CONTENT_STREAM {
                let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
                writer.start_file(CONTENT_STREAM, options)?;
                writer.write_all(content)?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }

        let output = writer.finish()?;
        Ok(output.into_inner())
    }
}
