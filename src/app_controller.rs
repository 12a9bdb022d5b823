use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::queue::{FileJob, FileQueue, JobStatus, QueueSummary};
use crate::translation::{create_backend, DocumentTranslator};

// @module: Application controller for document translation

const ISSUES_LOG_FILE: &str = "docxpolyglot.issues.log";

// Jobs queued for one run, plus the inputs that were left out
#[derive(Default)]
struct RunPlan {
    queue: FileQueue,
    destinations: HashMap<Uuid, PathBuf>,
    skipped: usize,
    rejected: usize,
    issues: Vec<String>,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one `.docx` file or every `.docx` under a folder
    ///
    /// Outputs go next to each input unless `output_dir` is given, in which
    /// case the folder layout below `input` is mirrored there. Existing
    /// outputs are skipped unless `force_overwrite` is set.
    pub async fn run(&self, input: PathBuf, output_dir: Option<PathBuf>, force_overwrite: bool) -> Result<QueueSummary> {
        let start_time = Instant::now();
        let inputs = Self::collect_inputs(&input)?;

        let RunPlan { mut queue, destinations, skipped, rejected, mut issues } =
            self.plan_run(&input, &inputs, output_dir.as_deref(), force_overwrite);

        if queue.is_empty() {
            info!("Nothing to translate");
            if !issues.is_empty() {
                let log_dir = output_dir.clone().unwrap_or_else(|| Self::input_dir(&input));
                self.write_issues_log(&log_dir.join(ISSUES_LOG_FILE), &issues);
            }
            return Ok(QueueSummary { skipped, failed: rejected, ..QueueSummary::default() });
        }

        let translator = DocumentTranslator::from_config(&self.config)
            .context("Failed to create the translation backend")?;
        info!(
            "Translating {} file(s) into {} with {}",
            queue.len(),
            self.config.target_language,
            translator.backend().name()
        );

        let multi_progress = MultiProgress::new();
        let bars: HashMap<Uuid, ProgressBar> = queue.jobs()
            .iter()
            .map(|job| (job.id(), Self::file_progress_bar(&multi_progress, job.name())))
            .collect();

        let mut summary = queue
            .translate_all(&translator, &self.config.target_language, |job| Self::render_job(&bars, job))
            .await;
        summary.skipped += skipped;
        summary.failed += rejected;

        for job in queue.jobs() {
            match (job.status(), job.artifact(), destinations.get(&job.id())) {
                (JobStatus::Completed, Some(artifact), Some(destination)) => {
                    let saved = destination.parent()
                        .map(FileManager::ensure_dir)
                        .unwrap_or(Ok(()))
                        .and_then(|_| artifact.save_to(destination).map_err(anyhow::Error::from));
                    match saved {
                        Ok(()) => info!("Success: {}", destination.display()),
                        Err(e) => {
                            error!("Failed to save {}: {}", destination.display(), e);
                            issues.push(format!("{}: failed to save output: {}", job.name(), e));
                        }
                    }
                }
                _ => {
                    if let Some(message) = job.error() {
                        issues.push(format!("{}: {}", job.name(), message));
                    }
                }
            }
        }
        queue.clear();

        if !issues.is_empty() {
            let log_dir = output_dir.clone().unwrap_or_else(|| Self::input_dir(&input));
            self.write_issues_log(&log_dir.join(ISSUES_LOG_FILE), &issues);
        }

        info!(
            "Completed {} file(s), {} failed, {} skipped in {}",
            summary.completed,
            summary.failed,
            summary.skipped,
            Self::format_duration(start_time.elapsed())
        );
        info!("Total tokens used: {}", summary.tokens_used);

        Ok(summary)
    }

    /// Send a minimal request to the configured backend
    pub async fn test_connection(&self) -> Result<bool> {
        let backend = create_backend(&self.config.translation)
            .context("Failed to create the translation backend")?;
        info!("Testing connection to {}", backend.name());
        Ok(backend.test_connection().await)
    }

    // Queue every input, resolving its destination; inputs that cannot be
    // queued are reported as issues instead of aborting the run
    fn plan_run(&self, input: &Path, inputs: &[PathBuf], output_dir: Option<&Path>, force_overwrite: bool) -> RunPlan {
        let mut plan = RunPlan::default();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for path in inputs {
            let target_dir = match output_dir {
                Some(out) => {
                    let relative = path.parent().and_then(|parent| parent.strip_prefix(input).ok());
                    relative.map(|relative| out.join(relative)).unwrap_or_else(|| out.to_path_buf())
                }
                None => path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")),
            };
            let output_path = FileManager::generate_output_path(path, &target_dir, &self.config.target_language);

            if !claimed.insert(output_path.clone()) {
                warn!("Skipping {:?}, another input already writes {:?}", path, output_path);
                plan.issues.push(format!("{}: output {} is already produced by another input", path.display(), output_path.display()));
                plan.rejected += 1;
                continue;
            }

            if output_path.exists() && !force_overwrite {
                warn!("Skipping {:?}, translation already exists (use -f to force overwrite)", path);
                plan.skipped += 1;
                continue;
            }

            match plan.queue.add_path(path) {
                Ok(id) => {
                    plan.destinations.insert(id, output_path);
                }
                Err(e) => {
                    error!("Cannot queue {:?}: {:#}", path, e);
                    plan.issues.push(format!("{}: {:#}", path.display(), e));
                    plan.rejected += 1;
                }
            }
        }

        plan
    }

    /// Input documents: the file itself, or every `.docx` under a folder
    pub fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
        if FileManager::dir_exists(input) {
            let files = FileManager::find_files(input, "docx")?;
            if files.is_empty() {
                return Err(anyhow!("No .docx files found in directory: {:?}", input));
            }
            debug!("Found {} document(s) in {:?}", files.len(), input);
            return Ok(files);
        }

        if FileManager::file_exists(input) {
            return Ok(vec![input.to_path_buf()]);
        }

        Err(anyhow!("Input path does not exist: {:?}", input))
    }

    fn input_dir(input: &Path) -> PathBuf {
        if input.is_dir() {
            input.to_path_buf()
        } else {
            input.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
        }
    }

    fn file_progress_bar(multi_progress: &MultiProgress, name: &str) -> ProgressBar {
        let bar = multi_progress.add(ProgressBar::new(100));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {prefix} {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}% {prefix} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        bar.set_prefix(name.to_string());
        bar.set_message("waiting");
        bar
    }

    fn render_job(bars: &HashMap<Uuid, ProgressBar>, job: &FileJob) {
        let Some(bar) = bars.get(&job.id()) else {
            return;
        };

        bar.set_position(u64::from(job.progress()));
        match job.status() {
            JobStatus::Completed => bar.finish_with_message("done"),
            JobStatus::Error => bar.abandon_with_message(format!("failed: {}", job.error().unwrap_or("unknown error"))),
            _ => bar.set_message(job.current_action().to_string()),
        }
    }

    fn write_issues_log(&self, path: &Path, issues: &[String]) {
        let mut content = format!("Translation issues ({})", self.config.target_language);
        for issue in issues {
            content.push_str("\n  ");
            content.push_str(issue);
        }

        match FileManager::append_to_log_file(path, &content) {
            Ok(()) => warn!("{} file(s) had problems, see {}", issues.len(), path.display()),
            Err(e) => error!("Failed to write issues log: {}", e),
        }
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
