// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use docxpolyglot::app_config::{self, Config, TranslationProvider};
use docxpolyglot::app_controller::Controller;
use docxpolyglot::file_utils::FileManager;
use docxpolyglot::language_utils;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    #[value(alias = "openai-compatible")]
    Openai,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::Openai => TranslationProvider::OpenAICompatible,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate .docx documents (default command)
    Translate(TranslateArgs),

    /// Check that the configured backend answers
    TestConnection(BackendArgs),

    /// List the offered target languages
    Languages,

    /// Generate shell completions for docxpolyglot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Backend and configuration options shared by the commands
#[derive(Args, Debug, Clone)]
struct BackendArgs {
    /// Translation backend to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the backend API
    #[arg(long)]
    endpoint: Option<String>,

    /// API key of the backend
    #[arg(long, env = "DOCXPOLYGLOT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct TranslateArgs {
    /// Input .docx file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    backend: BackendArgs,

    /// Target language code (e.g., 'ru', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of text segments per request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Keep the document fonts instead of forcing one family
    #[arg(long)]
    no_font_rewrite: bool,

    /// Directory for translated documents (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// docxpolyglot - translate Word documents with AI backends
///
/// Extracts the text of .docx documents, translates it in batches and writes
/// documents with the same structure and formatting.
#[derive(Parser, Debug)]
#[command(name = "docxpolyglot")]
#[command(version)]
#[command(about = "AI-powered .docx translation tool")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "docxpolyglot translates the text of .docx documents with Gemini or any OpenAI-compatible server.

EXAMPLES:
    docxpolyglot report.docx                         # Translate using default config
    docxpolyglot -t es report.docx                   # Translate into Spanish
    docxpolyglot -f -o out/ ./documents/             # Translate a folder, overwriting outputs
    docxpolyglot -p openai -m deepseek-ai/deepseek-r1 report.docx
    docxpolyglot test-connection -p gemini           # Check the backend
    docxpolyglot completions bash > docxpolyglot.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The API key can also come from DOCXPOLYGLOT_API_KEY.

SUPPORTED BACKENDS:
    gemini - Google Gemini with structured JSON output (default)
    openai - Any OpenAI-compatible chat completions server")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker and ANSI color for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (marker, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "docxpolyglot", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Languages) => {
            for language in language_utils::supported_languages() {
                println!("{}  {}", language.code, language.name);
            }
            Ok(())
        }
        Some(Commands::TestConnection(args)) => run_test_connection(args).await,
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let input_path = options.input_path.clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

    let mut config = load_config(&options.backend)?;

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.trim().to_string();
    }
    if let Some(batch_size) = options.batch_size {
        config.translation.common.batch_size = batch_size;
    }
    if options.no_font_rewrite {
        config.document.enforce_uniform_font = false;
    }

    config.validate()
        .context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let summary = controller.run(input_path, options.output_dir.clone(), options.force_overwrite).await?;

    if summary.failed > 0 {
        return Err(anyhow!("{} document(s) failed to translate", summary.failed));
    }
    Ok(())
}

async fn run_test_connection(options: BackendArgs) -> Result<()> {
    let config = load_config(&options)?;
    config.validate()
        .context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    if controller.test_connection().await? {
        println!("OK");
        Ok(())
    } else {
        println!("FAIL");
        Err(anyhow!("Connection test failed"))
    }
}

/// Load the config file (created with defaults when missing) and apply CLI overrides
fn load_config(options: &BackendArgs) -> Result<Config> {
    // Apply a command line log level before anything else is logged
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let content = FileManager::read_to_string(config_path)?;
        serde_json::from_str::<Config>(&content)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        FileManager::write_to_file(config_path, &config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    {
        let provider_config = config.translation.active_provider_config_mut();
        if let Some(model) = &options.model {
            provider_config.model = model.clone();
        }
        if let Some(endpoint) = &options.endpoint {
            provider_config.endpoint = endpoint.clone();
        }
        if let Some(api_key) = &options.api_key {
            provider_config.api_key = api_key.clone();
        }
    }

    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(level_filter(&config.log_level)),
    }

    Ok(config)
}
