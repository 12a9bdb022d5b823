/*!
 * Mock backend implementations for testing
 *
 * Scripted implementations of `TranslationBackend` so no test reaches a real
 * API. Every mock records the batches it receives.
 */

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use docxpolyglot::translation::{BatchTranslation, TranslationBackend};

/// How a mock answers a batch
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Prefix every text with the target language, e.g. `[es] Hello`
    Prefix,
    /// Answer only the first `n` texts
    Short(usize),
    /// Answer every text plus `n` extra items
    Long(usize),
    /// Behave like a backend whose request failed
    Fail,
}

/// Tracks calls so tests can check what reached the backend
#[derive(Debug, Default)]
pub struct CallTracker {
    pub batches: Vec<Vec<String>>,
    pub connection_tests: usize,
}

/// Mock translation backend
#[derive(Debug)]
pub struct MockBackend {
    behavior: MockBehavior,
    tokens_per_batch: u64,
    tracker: Arc<Mutex<CallTracker>>,
}

impl MockBackend {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            tokens_per_batch: 10,
            tracker: Arc::new(Mutex::new(CallTracker::default())),
        }
    }

    pub fn with_tokens(mut self, tokens_per_batch: u64) -> Self {
        self.tokens_per_batch = tokens_per_batch;
        self
    }

    pub fn tracker(&self) -> Arc<Mutex<CallTracker>> {
        self.tracker.clone()
    }

    /// Batch sizes received so far
    pub fn batch_sizes(tracker: &Arc<Mutex<CallTracker>>) -> Vec<usize> {
        tracker.lock().unwrap().batches.iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn name(&self) -> String {
        "Mock".to_string()
    }

    async fn translate_batch(&self, texts: &[String], target_language: &str) -> BatchTranslation {
        self.tracker.lock().unwrap().batches.push(texts.to_vec());

        let prefixed = |text: &String| format!("[{}] {}", target_language, text);
        match &self.behavior {
            MockBehavior::Prefix => BatchTranslation {
                items: texts.iter().map(prefixed).collect(),
                tokens_used: self.tokens_per_batch,
            },
            MockBehavior::Short(n) => BatchTranslation {
                items: texts.iter().take(*n).map(prefixed).collect(),
                tokens_used: self.tokens_per_batch,
            },
            MockBehavior::Long(n) => {
                let mut items: Vec<String> = texts.iter().map(prefixed).collect();
                items.extend((0..*n).map(|i| format!("extra {}", i)));
                BatchTranslation { items, tokens_used: self.tokens_per_batch }
            }
            MockBehavior::Fail => BatchTranslation::passthrough(texts),
        }
    }

    async fn test_connection(&self) -> bool {
        self.tracker.lock().unwrap().connection_tests += 1;
        !matches!(self.behavior, MockBehavior::Fail)
    }
}
