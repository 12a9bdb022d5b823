/*!
 * # docxpolyglot
 *
 * A Rust library for translating Word (`.docx`) documents with AI backends
 * while keeping their structure and formatting.
 *
 * ## Features
 *
 * - Extract the visible text runs of a document in reading order
 * - Translate them in batches with:
 *   - Gemini (structured JSON output)
 *   - any OpenAI-compatible chat completions server
 * - Tolerate malformed or short answers, keeping the original text where needed
 * - Write translations back in place and rebuild a valid package
 * - Optionally force one font family across the document
 * - Queue several files and report per-file progress
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Package, content stream and output artifact handling
 * - `translation`: Backends, batching and the per-document pipeline
 * - `queue`: Sequential multi-file queue with job status tracking
 * - `providers`: REST clients for Gemini and OpenAI-compatible APIs
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod queue;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{ContentDocument, DocxPackage, DownloadArtifact, Segment, TextAnchor};
pub use errors::{DocumentError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, normalize_to_part2t, validate_language_code};
pub use queue::{FileJob, FileQueue, JobStatus, QueueSummary};
pub use translation::{BatchTranslator, DocumentTranslator, TranslationBackend, TranslationProgress};
