/*!
 * File queue.
 *
 * The queue owns every job and is the only place job state changes. Files
 * are translated one after another in queue order; a failing file is marked
 * and the queue moves on.
 */

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use log::{error, info};
use uuid::Uuid;

use crate::document::DownloadArtifact;
use crate::file_utils::FileManager;
use crate::translation::{DocumentTranslator, TranslationProgress};

/// Lifecycle of a file job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Parsing,
    Translating,
    Rebuilding,
    Completed,
    Error,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::Translating => "translating",
            Self::Rebuilding => "rebuilding",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// One document in the queue
#[derive(Debug)]
pub struct FileJob {
    id: Uuid,
    name: String,
    source: Bytes,
    status: JobStatus,
    progress: u8,
    current_action: String,
    error: Option<String>,
    artifact: Option<DownloadArtifact>,
    tokens_used: Option<u64>,
}

impl FileJob {
    fn new(name: String, source: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            source,
            status: JobStatus::Idle,
            progress: 0,
            current_action: String::new(),
            error: None,
            artifact: None,
            tokens_used: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Bytes {
        &self.source
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Progress in percent, 0 to 100
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn current_action(&self) -> &str {
        &self.current_action
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn artifact(&self) -> Option<&DownloadArtifact> {
        self.artifact.as_ref()
    }

    pub fn tokens_used(&self) -> Option<u64> {
        self.tokens_used
    }

    fn begin(&mut self) {
        self.release_artifact();
        self.status = JobStatus::Parsing;
        self.progress = 0;
        self.current_action = "Parsing document...".to_string();
        self.error = None;
        self.tokens_used = None;
    }

    fn apply_progress(&mut self, progress: &TranslationProgress) {
        self.status = if progress.is_final() {
            JobStatus::Rebuilding
        } else {
            JobStatus::Translating
        };
        self.progress = progress.percent();
        self.current_action = progress.current_action.clone();
    }

    fn complete(&mut self, artifact: DownloadArtifact, tokens_used: u64) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.current_action = "Done".to_string();
        self.artifact = Some(artifact);
        self.tokens_used = Some(tokens_used);
    }

    fn fail(&mut self, message: String) {
        self.status = JobStatus::Error;
        self.current_action = "Failed".to_string();
        self.error = Some(message);
    }

    fn release_artifact(&mut self) {
        if let Some(artifact) = self.artifact.take() {
            artifact.discard();
        }
    }
}

/// Outcome of one `translate_all` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub completed: usize,
    pub failed: usize,
    /// Jobs already completed before the run
    pub skipped: usize,
    pub tokens_used: u64,
}

/// Ordered collection of file jobs
#[derive(Debug, Default)]
pub struct FileQueue {
    jobs: Vec<FileJob>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an idle job
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<Bytes>) -> Uuid {
        let job = FileJob::new(name.into(), source.into());
        let id = job.id;
        self.jobs.push(job);
        id
    }

    /// Read a file from disk and append it
    pub fn add_path<P: AsRef<Path>>(&mut self, path: P) -> Result<Uuid> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .with_context(|| format!("Not a file path: {:?}", path))?;
        let source = FileManager::read_bytes(path)?;
        Ok(self.add(name, source))
    }

    /// Remove a job, releasing its artifact first
    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.jobs.iter().position(|job| job.id == id) {
            Some(position) => {
                let mut job = self.jobs.remove(position);
                job.release_artifact();
                true
            }
            None => false,
        }
    }

    /// Remove every job, releasing all artifacts
    pub fn clear(&mut self) {
        for mut job in self.jobs.drain(..) {
            job.release_artifact();
        }
    }

    pub fn jobs(&self) -> &[FileJob] {
        &self.jobs
    }

    pub fn get(&self, id: Uuid) -> Option<&FileJob> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Translate every job that is not completed yet, in queue order
    ///
    /// `observer` sees each job after every state change.
    pub async fn translate_all<O>(
        &mut self,
        translator: &DocumentTranslator,
        target_language: &str,
        mut observer: O,
    ) -> QueueSummary
    where
        O: FnMut(&FileJob),
    {
        let mut summary = QueueSummary::default();

        for job in self.jobs.iter_mut() {
            if job.status == JobStatus::Completed {
                summary.skipped += 1;
                continue;
            }

            info!("Translating {}", job.name);
            job.begin();
            observer(job);

            let source = job.source.clone();
            let result = translator
                .translate(source, target_language, |progress| {
                    job.apply_progress(&progress);
                    observer(job);
                })
                .await;

            let outcome = result.and_then(|translated| {
                let file_name = FileManager::translated_file_name(&job.name, target_language);
                DownloadArtifact::spool(file_name, &translated.bytes)
                    .map(|artifact| (artifact, translated.usage.total_tokens))
            });

            match outcome {
                Ok((artifact, tokens)) => {
                    info!("Finished {} ({} tokens)", job.name, tokens);
                    job.complete(artifact, tokens);
                    summary.completed += 1;
                    summary.tokens_used += tokens;
                }
                Err(e) => {
                    error!("Failed to translate {}: {}", job.name, e);
                    job.fail(e.to_string());
                    summary.failed += 1;
                }
            }
            observer(job);
        }

        summary
    }
}

impl Drop for FileQueue {
    fn drop(&mut self) {
        self.clear();
    }
}
