//! doclingo - document extraction, segmentation and LLM translation
//!
//! Command-line entry point: loads configuration, sets up logging and runs
//! one subcommand against the library.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use doclingo::cli::{unescape_delimiter, Args, Commands};
use doclingo::config::Config;
use doclingo::corpus::load_corpus;
use doclingo::extract::extract_text;
use doclingo::segment::{split_paragraph, SegmenterFactory};
use doclingo::translate::{Direction, TranslationSession};

const DEFAULT_CONFIG_FILE: &str = "doclingo.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };
    if let Some(source) = args.source {
        config.languages.source = source;
    }
    if let Some(target) = args.target {
        config.languages.target = target;
    }
    config.validate()?;

    match args.command {
        Commands::Extract { input_dir } => {
            let corpus = load_corpus(&input_dir)?;
            println!("{}", serde_json::to_string_pretty(&corpus)?);
        }
        Commands::Sentences { input } => {
            let text = extract_text(&input)?;
            let segmenter = SegmenterFactory::create(config.segmenter.language);
            for sentence in segmenter.segment(&text) {
                println!("{}", sentence);
            }
        }
        Commands::Paragraphs { input, delimiter } => {
            let text = extract_text(&input)?;
            let pieces = split_paragraph(&text, &unescape_delimiter(&delimiter));
            println!("{}", serde_json::to_string_pretty(&pieces)?);
        }
        Commands::Translate { text, input, reverse } => {
            let session = TranslationSession::from_config(&config).await?;
            let direction = if reverse { Direction::Reverse } else { Direction::Forward };

            match (text, input) {
                (Some(text), _) => {
                    let translation = session.translate_in(direction, &text).await?;
                    println!("{}", translation);
                }
                (None, Some(input)) => {
                    info!("Translating document: {}", input.display());
                    let text = extract_text(&input)?;
                    let exchanges = session.translate_document(&text, direction).await;
                    println!("{}", serde_json::to_string_pretty(&exchanges)?);
                }
                (None, None) => anyhow::bail!("Either --text or --input is required"),
            }
        }
        Commands::Check => {
            let session = TranslationSession::from_config(&config).await?;
            println!(
                "Model ready: {} ⇄ {} with a {}-token context window",
                session.source_language(),
                session.target_language(),
                session.context_window()
            );
        }
    }

    Ok(())
}

/// Setup logging to stderr and to a daily rotated file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".doclingo").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "doclingo.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // stdout carries command output, so the console layer writes to stderr
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("doclingo.log").display());

    Ok(())
}
