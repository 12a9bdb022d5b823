/*!
 * Single document translation: open the package, rewrite fonts, extract
 * segments, translate them in batches and rebuild the package.
 */

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use log::{debug, info};

use crate::app_config::Config;
use crate::document::{ContentDocument, DocxPackage};
use crate::errors::{DocumentError, TranslationError};

use super::backend::{create_backend, TranslationBackend};
use super::batch::{BatchTranslator, TokenUsageStats, TranslationProgress, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};

/// Options of the document pipeline
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Segments per request
    pub batch_size: usize,
    /// Pause between requests
    pub batch_delay: Duration,
    /// Font forced on every run, `None` keeps the document fonts
    pub uniform_font: Option<String>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            uniform_font: Some("Times New Roman".to_string()),
        }
    }
}

impl TranslationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.translation.common.batch_size,
            batch_delay: Duration::from_millis(config.translation.common.batch_delay_ms),
            uniform_font: config.document.uniform_font(),
        }
    }
}

/// Output of one translated document
#[derive(Debug)]
pub struct TranslatedDocument {
    /// The rebuilt package
    pub bytes: Vec<u8>,
    /// Number of segments sent for translation
    pub total_segments: usize,
    pub usage: TokenUsageStats,
}

/// Translates whole `.docx` packages
pub struct DocumentTranslator {
    batches: BatchTranslator,
    uniform_font: Option<String>,
}

impl DocumentTranslator {
    pub fn new(backend: Arc<dyn TranslationBackend>, options: TranslationOptions) -> Self {
        Self {
            batches: BatchTranslator::new(backend, options.batch_size, options.batch_delay),
            uniform_font: options.uniform_font,
        }
    }

    /// Build the backend and options described by `config`
    pub fn from_config(config: &Config) -> Result<Self, TranslationError> {
        let backend = create_backend(&config.translation)?;
        Ok(Self::new(backend, TranslationOptions::from_config(config)))
    }

    pub fn backend(&self) -> &Arc<dyn TranslationBackend> {
        self.batches.backend()
    }

    /// Translate one package
    ///
    /// Structural problems (not a package, unparsable content, failed rebuild)
    /// are errors; backend failures only leave text untranslated.
    pub async fn translate<F>(
        &self,
        package: Bytes,
        target_language: &str,
        on_progress: F,
    ) -> Result<TranslatedDocument, DocumentError>
    where
        F: FnMut(TranslationProgress),
    {
        let mut package = DocxPackage::from_bytes(package)?;
        let mut document = ContentDocument::parse(&package.content_xml()?)?;

        if let Some(font) = &self.uniform_font {
            let runs = document.apply_uniform_font(font);
            debug!("Applied font '{}' to {} runs", font, runs);
        }

        let segments = document.segments()?;
        info!("Found {} translatable segments", segments.len());

        let usage = self.batches
            .translate_segments(&mut document, &segments, target_language, on_progress)
            .await;

        let content = document.to_xml()?;
        let bytes = package.repackage(&content)?;
        debug!("Rebuilt package: {} bytes", bytes.len());
        debug!("{}", usage.summary());

        Ok(TranslatedDocument {
            bytes,
            total_segments: segments.len(),
            usage,
        })
    }
}
