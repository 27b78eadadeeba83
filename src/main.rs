// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::pipeline::{Pipeline, ProjectEdit};
use crate::render::RenderMode;
use crate::timeline::{AckPlacement, AcknowledgmentSettings};

mod app_config;
mod errors;
mod file_utils;
mod fragment;
mod matcher;
mod metadata;
mod pipeline;
mod providers;
mod reconcile;
mod render;
mod session;
mod teaching;
mod timeline;
mod tools;

/// CLI Wrapper for RenderMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliRenderMode {
    Board,
    Slides,
}

impl From<CliRenderMode> for RenderMode {
    fn from(cli_mode: CliRenderMode) -> Self {
        match cli_mode {
            CliRenderMode::Board => RenderMode::Board,
            CliRenderMode::Slides => RenderMode::Slides,
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
    /// Produce a lesson video from an exam paper and memo (default command)
    #[command(alias = "produce")]
    Produce(ProduceArgs),

    /// Generate shell completions for boardcast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ProduceArgs {
    /// Exam paper document (pdf or plain text)
    #[arg(value_name = "EXAM_PATH")]
    exam_path: PathBuf,

    /// Marking memo document (pdf or plain text)
    #[arg(value_name = "MEMO_PATH")]
    memo_path: PathBuf,

    /// Subject label shown in the intro, e.g. "Physical Sciences P1"
    #[arg(short, long)]
    subject: String,

    /// Exam title used in publish metadata, e.g. "November 2025"
    #[arg(short = 'e', long, default_value = "Exam Paper")]
    exam_title: String,

    /// Voice-over audio track; replaces synthesized narration
    #[arg(long)]
    voice_over: Option<PathBuf>,

    /// Logo image overlaid on the video
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Diagram images consumed in order by the slide deck
    #[arg(long = "diagram")]
    diagrams: Vec<PathBuf>,

    /// Render mode
    #[arg(short = 'r', long, value_enum, default_value = "board")]
    mode: CliRenderMode,

    /// Replacement intro body text
    #[arg(long)]
    intro_text: Option<String>,

    /// Replacement outro body text
    #[arg(long)]
    outro_text: Option<String>,

    /// Acknowledgment text inserted into the timeline
    #[arg(long)]
    ack_text: Option<String>,

    /// Place the acknowledgment at the start instead of the end
    #[arg(long, requires = "ack_text")]
    ack_start: bool,

    /// Print publish metadata as JSON after rendering
    #[arg(long)]
    print_meta: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Boardcast - Exam Paper to Narrated Video Lessons
///
/// Turns an exam paper and its marking memo into a narrated, timed teaching
/// video rendered on a virtual board.
#[derive(Parser, Debug)]
#[command(name = "boardcast")]
#[command(version = "0.1.0")]
#[command(about = "Exam paper to narrated video lesson renderer")]
#[command(long_about = "Boardcast extracts questions and memo answers from exam documents, \
pairs them, generates teaching scripts, and renders a narrated lesson video.

EXAMPLES:
    boardcast paper.pdf memo.pdf -s \"Physical Sciences P1\"
    boardcast paper.pdf memo.pdf -s Maths -r slides        # Static slide deck
    boardcast paper.pdf memo.pdf -s Maths --logo logo.png  # With logo overlay
    boardcast paper.pdf memo.pdf -s Maths --voice-over narration.mp3
    boardcast completions bash > boardcast.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Exam paper document (pdf or plain text)
    #[arg(value_name = "EXAM_PATH")]
    exam_path: Option<PathBuf>,

    /// Marking memo document (pdf or plain text)
    #[arg(value_name = "MEMO_PATH")]
    memo_path: Option<PathBuf>,

    /// Subject label shown in the intro, e.g. "Physical Sciences P1"
    #[arg(short, long)]
    subject: Option<String>,

    /// Exam title used in publish metadata, e.g. "November 2025"
    #[arg(short = 'e', long, default_value = "Exam Paper")]
    exam_title: String,

    /// Voice-over audio track; replaces synthesized narration
    #[arg(long)]
    voice_over: Option<PathBuf>,

    /// Logo image overlaid on the video
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Diagram images consumed in order by the slide deck
    #[arg(long = "diagram")]
    diagrams: Vec<PathBuf>,

    /// Render mode
    #[arg(short = 'r', long, value_enum, default_value = "board")]
    mode: CliRenderMode,

    /// Replacement intro body text
    #[arg(long)]
    intro_text: Option<String>,

    /// Replacement outro body text
    #[arg(long)]
    outro_text: Option<String>,

    /// Acknowledgment text inserted into the timeline
    #[arg(long)]
    ack_text: Option<String>,

    /// Place the acknowledgment at the start instead of the end
    #[arg(long, requires = "ack_text")]
    ack_start: bool,

    /// Print publish metadata as JSON after rendering
    #[arg(long)]
    print_meta: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
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
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
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
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "boardcast", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Produce(args)) => run_produce(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let exam_path = cli
                .exam_path
                .context("EXAM_PATH is required when no subcommand is specified")?;
            let memo_path = cli
                .memo_path
                .context("MEMO_PATH is required when no subcommand is specified")?;
            let subject = cli
                .subject
                .context("--subject is required when no subcommand is specified")?;

            let produce_args = ProduceArgs {
                exam_path,
                memo_path,
                subject,
                exam_title: cli.exam_title,
                voice_over: cli.voice_over,
                logo: cli.logo,
                diagrams: cli.diagrams,
                mode: cli.mode,
                intro_text: cli.intro_text,
                outro_text: cli.outro_text,
                ack_text: cli.ack_text,
                ack_start: cli.ack_start,
                print_meta: cli.print_meta,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_produce(produce_args).await
        }
    }
}

async fn run_produce(options: ProduceArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    // Load or create configuration
    let config = load_config(&options.config_path, options.log_level.as_ref())?;

    // Validate the configuration after loading and overriding
    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let pipeline = Pipeline::new(config);
    let session = pipeline.create_session(&options.subject, &options.exam_title);

    pipeline.upload_exam(&session.id, &options.exam_path)?;
    pipeline.upload_memo(&session.id, &options.memo_path)?;
    if let Some(voice_over) = &options.voice_over {
        pipeline.upload_voice_over(&session.id, voice_over)?;
    }
    if let Some(logo) = &options.logo {
        pipeline.upload_logo(&session.id, logo)?;
    }
    for diagram in &options.diagrams {
        pipeline.add_diagram(&session.id, diagram)?;
    }

    let matched = pipeline.extract_and_match(&session.id).await?;
    for m in matched.matches.iter().filter(|m| m.needs_review) {
        warn!(
            "Question {} needs review ({:?}, score {:.2})",
            m.question_number, m.match_reason, m.similarity_score
        );
    }

    pipeline.generate_scripts(&session.id).await?;
    pipeline.build_video_project(&session.id)?;

    let edit = build_project_edit(&options);
    if let Some(edit) = edit {
        pipeline.update_project(&session.id, edit)?;
    }

    pipeline.render(&session.id, options.mode.into()).await?;
    let video_path = pipeline.video_path(&session.id)?;
    info!("Lesson video written to {:?}", video_path);

    if options.print_meta {
        let meta = pipeline.publish_meta(&session.id)?;
        let json = serde_json::to_string_pretty(&meta)
            .context("Failed to serialize publish metadata")?;
        println!("{}", json);
    }

    Ok(())
}

// Assemble the optional project edit from CLI flags
fn build_project_edit(options: &ProduceArgs) -> Option<ProjectEdit> {
    if options.intro_text.is_none() && options.outro_text.is_none() && options.ack_text.is_none() {
        return None;
    }

    let acknowledgment = options.ack_text.as_ref().map(|text| AcknowledgmentSettings {
        enabled: true,
        text: Some(text.clone()),
        placement: if options.ack_start {
            AckPlacement::Start
        } else {
            AckPlacement::End
        },
    });

    Some(ProjectEdit {
        intro_text: options.intro_text.clone(),
        outro_text: options.outro_text.clone(),
        logo: None,
        acknowledgment,
    })
}

fn load_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        // Update log level in config if specified via command line
        if let Some(log_level) = log_level {
            config.log_level = log_level.clone().into();
        }

        Ok(config)
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let mut config = Config::default();
        if let Some(log_level) = log_level {
            config.log_level = log_level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
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
