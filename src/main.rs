// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use dialoc::app_config::{self, Config, ProviderConfig, TranslationProvider};
use dialoc::providers;
use dialoc::validation::AnomalyTag;
use dialoc::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
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

/// CLI Wrapper for AnomalyTag to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliAnomalyTag {
    Missing,
    Same,
    Dlc,
    Technical,
    Punctuation,
}

impl From<CliAnomalyTag> for AnomalyTag {
    fn from(cli_tag: CliAnomalyTag) -> Self {
        match cli_tag {
            CliAnomalyTag::Missing => AnomalyTag::Missing,
            CliAnomalyTag::Same => AnomalyTag::Same,
            CliAnomalyTag::Dlc => AnomalyTag::Dlc,
            CliAnomalyTag::Technical => AnomalyTag::Technical,
            CliAnomalyTag::Punctuation => AnomalyTag::Punctuation,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a string table file or every .xml file below a directory
    Import {
        /// String table file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Replace the glossary from a JSON file
    Glossary {
        /// Glossary file: {"Category": ["term", ...]} or [{"id", "term", "category"}]
        #[arg(value_name = "GLOSSARY_PATH")]
        glossary_path: PathBuf,
    },

    /// Mask glossary terms in every imported line
    Mask,

    /// Translate imported lines using AI providers
    Translate(TranslateArgs),

    /// Show anomaly tags of translated lines
    Report {
        /// Only list lines carrying this tag
        #[arg(long, value_enum)]
        tag: Option<CliAnomalyTag>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write every line to a string table file
    Export {
        /// Output file
        #[arg(value_name = "OUTPUT_PATH")]
        output_path: PathBuf,
    },

    /// Show database statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions for dialoc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translate lines that already have a translation
    #[arg(short, long)]
    retranslate: bool,

    /// Skip the provider connection check
    #[arg(long)]
    skip_check: bool,
}

/// dialoc - glossary-safe dialogue translation
///
/// Translates game dialogue string tables with AI providers while keeping
/// glossary terms (places, characters, items) untouched, then tags
/// suspicious translations.
#[derive(Parser, Debug)]
#[command(name = "dialoc")]
#[command(version)]
#[command(about = "Glossary-safe AI translation of game dialogue")]
#[command(long_about = "dialoc masks glossary terms in game dialogue, translates it with AI providers and reports anomalies.

EXAMPLES:
    dialoc import Strings/                   # Import every string table below a directory
    dialoc glossary glossary.json            # Replace the glossary
    dialoc mask                              # Mask glossary terms
    dialoc translate -p openai -m gpt-4o     # Translate with a specific provider and model
    dialoc translate -s en -t de             # Translate from English to German
    dialoc report --tag missing              # List lines without translation
    dialoc export translated.xml             # Write the translated string table
    dialoc completions bash > dialoc.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (OpenAI-compatible on http://localhost:11434/v1)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)
    mock      - Offline provider for dry runs (model: echo, uppercase, prefix:<text>)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Database file (overrides the configuration)
    #[arg(long, global = true)]
    database: Option<PathBuf>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

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
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
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
    // Logger accepts everything; the effective level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "dialoc", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_config(&cli)?;
    if let Commands::Translate(args) = &cli.command {
        apply_translate_overrides(&mut config, args);
    }

    config.validate().context("Configuration validation failed")?;

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let mut controller = Controller::with_config(config).await?;

    match cli.command {
        Commands::Import { input_path } => {
            let summary = controller.import(&input_path).await?;
            info!(
                "Imported {} entries from {} file(s)",
                summary.entries, summary.files
            );
            if summary.failed_files > 0 {
                warn!("{} file(s) could not be imported", summary.failed_files);
            }
        }
        Commands::Glossary { glossary_path } => {
            let count = controller.load_glossary(&glossary_path).await?;
            info!("Glossary replaced with {} terms, run 'dialoc mask' to update masked lines", count);
        }
        Commands::Mask => {
            controller.mask_all().await?;
        }
        Commands::Translate(args) => {
            let provider = providers::create_provider(&controller.config().translation)?;
            if !args.skip_check {
                Controller::check_provider(provider.as_ref()).await?;
            }
            let stats = controller.translate(provider, args.retranslate).await?;
            println!("{}", stats);
        }
        Commands::Report { tag, json } => {
            let report = controller.report(tag.map(Into::into)).await?;
            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report);
            }
        }
        Commands::Export { output_path } => {
            let count = controller.export(&output_path).await?;
            info!("Exported {} entries to {}", count, output_path.display());
        }
        Commands::Stats { json } => {
            let stats = controller.stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", stats);
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load the configuration and apply the global overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    if !cli.config.exists() {
        warn!("Config file not found at '{}', creating default config.", cli.config.display());
    }
    let mut config = Config::load_or_create(&cli.config)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(database) = &cli.database {
        config.database_path = Some(database.clone());
    }

    Ok(config)
}

fn apply_translate_overrides(config: &mut Config, args: &TranslateArgs) {
    if let Some(provider) = &args.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &args.model {
        let provider = config.translation.provider;
        let provider_str = provider.to_lowercase_string();
        match config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.clone(),
            None => {
                let mut provider_config = ProviderConfig::new(provider);
                provider_config.model = model.clone();
                config.translation.available_providers.push(provider_config);
            }
        }
    }

    if let Some(source_lang) = &args.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &args.target_language {
        config.target_language = target_lang.clone();
    }
}
