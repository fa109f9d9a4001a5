// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use polyscript::app_config::{self, Config, TranslationProvider};
use polyscript::file_utils::FileManager;
use polyscript::language_utils::LanguageCode;
use polyscript::providers::mock::MockTranslator;
use polyscript::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    Anthropic,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
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
    /// Fill blank languages of a script and export it as CSV
    Translate(TranslateArgs),

    /// Export a script as CSV without translating
    Export(ExportArgs),

    /// Generate shell completions for polyscript
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Script file (JSON) to process
    #[arg(value_name = "SCRIPT")]
    script_path: PathBuf,

    /// Preferred source language (zh, en or id), overrides the script
    #[arg(short, long)]
    base_language: Option<String>,

    /// Directory for the CSV artifact, defaults to the script's directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Script file (JSON) to export
    #[arg(value_name = "SCRIPT")]
    script_path: PathBuf,

    /// Directory for the CSV artifact, defaults to the script's directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,
}

/// polyscript - multilingual video script tool
///
/// Fills the blank Chinese, English and Indonesian fields of a video script
/// using AI providers and exports the result as a spreadsheet-ready CSV.
#[derive(Parser, Debug)]
#[command(name = "polyscript")]
#[command(version)]
#[command(about = "Multilingual video script translation and export")]
#[command(long_about = "polyscript fills blank language fields of video scripts using AI providers.

Text that is already present is never overwritten. When a provider fails,
the source text is copied into the blank field and a warning is reported.

EXAMPLES:
    polyscript translate demo.json                  # Translate using default config
    polyscript translate -b en demo.json            # Prefer English as source
    polyscript translate -p mock -o out demo.json   # Offline dry run into ./out
    polyscript export demo.json                     # CSV export without translation
    polyscript completions bash > polyscript.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    anthropic - Anthropic Claude API (requires API key)
    mock      - Offline translator that tags text with the target language")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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
        // The logger accepts everything, verbosity is controlled through max_level
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker for log level
    fn get_marker_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_marker_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info by default, the level is updated once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "polyscript", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Export(args) => run_export(args),
    }
}

/// Load the configuration file, or write a default one when missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;
        Ok(config)
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        FileManager::write_to_file(config_path, &config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
    }
}

/// Output directory requested on the command line, or the script's directory
fn output_dir_for(script_path: &Path, output_dir: Option<PathBuf>) -> PathBuf {
    output_dir.unwrap_or_else(|| {
        script_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
    })
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let mut config = load_or_create_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        let provider_str = config.translation.provider.to_lowercase_string();
        if let Some(provider_config) = config.translation.available_providers.iter_mut()
            .find(|p| p.provider_type == provider_str) {
            provider_config.model = model.clone();
        }
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let base = options.base_language
        .as_deref()
        .map(str::parse::<LanguageCode>)
        .transpose()
        .map_err(|e| anyhow!("Invalid base language: {}", e))?;

    let output_dir = output_dir_for(&options.script_path, options.output_dir);
    let mut controller = Controller::with_config(config)
        .context("Failed to set up translation")?;
    if let Err(e) = controller.check_provider().await {
        warn!("Provider check failed, blank fields may fall back to source text: {}", e);
    }

    let summary = controller
        .run(&options.script_path, &output_dir, base, options.force_overwrite)
        .await?;

    for warning in &summary.warnings {
        warn!("{}", warning);
    }
    info!("{} scenes, {} fields filled", summary.scenes, summary.filled_slots);

    Ok(())
}

fn run_export(options: ExportArgs) -> Result<()> {
    let config = load_or_create_config(&options.config_path)?;
    log::set_max_level(config.log_level.to_level_filter());

    let output_dir = output_dir_for(&options.script_path, options.output_dir);
    // Export never calls a provider
    let mut controller = Controller::with_translator(config, Arc::new(MockTranslator::working()));

    let output_path = controller.export_script(&options.script_path, &output_dir)?;
    info!("Success: {}", output_path.display());
    Ok(())
}
