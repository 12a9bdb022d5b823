/*!
 * Batch translation processing.
 *
 * Segments are sent to the backend in contiguous batches, one request at a
 * time and in document order. Each answer is normalized to the batch length
 * and written back through the segment anchors.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::document::{ContentDocument, Segment};

use super::backend::TranslationBackend;
use super::response::normalize;

/// Default number of segments per request
pub const DEFAULT_BATCH_SIZE: usize = 40;

/// Default pause between two requests
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Progress of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationProgress {
    pub total_segments: usize,
    pub translated_segments: usize,
    pub current_action: String,
}

impl TranslationProgress {
    /// Completion percentage, 0 for a document without segments
    pub fn percent(&self) -> u8 {
        if self.total_segments == 0 {
            return 0;
        }
        let ratio = self.translated_segments.min(self.total_segments) as f64 / self.total_segments as f64;
        (ratio * 100.0).round() as u8
    }

    /// Whether every segment has been handled
    pub fn is_final(&self) -> bool {
        self.translated_segments >= self.total_segments
    }
}

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of requests sent
    pub batches: usize,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Backend name
    pub backend: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::with_backend(String::new())
    }
}

impl TokenUsageStats {
    /// Create new token usage stats for a backend
    pub fn with_backend(backend: impl Into<String>) -> Self {
        Self {
            total_tokens: 0,
            batches: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            backend: backend.into(),
        }
    }

    /// Account for one finished request
    pub fn record_batch(&mut self, tokens: u64, duration: Duration) {
        self.total_tokens += tokens;
        self.batches += 1;
        self.api_duration += duration;
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token Usage Summary:\n\
             Backend: {}\n\
             Requests: {}\n\
             Total tokens: {}\n\
             Elapsed time: {:.2} minutes\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}",
            self.backend,
            self.batches,
            self.total_tokens,
            self.start_time.elapsed().as_secs_f64() / 60.0,
            self.api_duration.as_secs_f64() / 60.0,
            self.tokens_per_minute()
        )
    }
}

/// Batch translator driving one backend sequentially
pub struct BatchTranslator {
    backend: Arc<dyn TranslationBackend>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchTranslator {
    /// Create a new batch translator; a batch size of 0 is treated as 1
    pub fn new(backend: Arc<dyn TranslationBackend>, batch_size: usize, batch_delay: Duration) -> Self {
        Self {
            backend,
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn backend(&self) -> &Arc<dyn TranslationBackend> {
        &self.backend
    }

    /// Translate `segments` in place inside `document`
    ///
    /// `on_progress` is called before every batch and once more with
    /// "Finalizing..." after the last one, also when there is nothing to translate.
    pub async fn translate_segments<F>(
        &self,
        document: &mut ContentDocument,
        segments: &[Segment],
        target_language: &str,
        mut on_progress: F,
    ) -> TokenUsageStats
    where
        F: FnMut(TranslationProgress),
    {
        let total = segments.len();
        let mut translated = 0;
        let mut stats = TokenUsageStats::with_backend(self.backend.name());

        for (batch_index, batch) in segments.chunks(self.batch_size).enumerate() {
            on_progress(TranslationProgress {
                total_segments: total,
                translated_segments: translated,
                current_action: format!("Translating ({}/{})...", translated + 1, total),
            });

            let originals: Vec<String> = batch.iter().map(|segment| segment.original_text.clone()).collect();
            let started = Instant::now();
            let result = self.backend.translate_batch(&originals, target_language).await;
            stats.record_batch(result.tokens_used, started.elapsed());

            let items = normalize(result.items, &originals);
            for (segment, text) in batch.iter().zip(items) {
                if text == segment.original_text {
                    continue;
                }
                if !document.set_text(&segment.anchor, &text) {
                    warn!("Segment {} has no matching text in the document, skipped", segment.index);
                }
            }

            translated += batch.len();
            debug!(
                "Batch {} done: {}/{} segments, {} tokens",
                batch_index + 1,
                translated,
                total,
                result.tokens_used
            );

            if translated < total {
                self.pause().await;
            }
        }

        on_progress(TranslationProgress {
            total_segments: total,
            translated_segments: total,
            current_action: "Finalizing...".to_string(),
        });

        stats
    }

    async fn pause(&self) {
        if self.batch_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.batch_delay).await;
        }
    }
}
