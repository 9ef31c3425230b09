//! SmallTalks - smalltalk intent detection for conversational pipelines.
//!
//! - `smalltalks analyze <TEXT>` prints the analysis of one utterance as JSON
//! - `smalltalks serve` runs the HTTP API

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use smalltalks_core::{InformationLevel, PreProcessingConfig, SourceDetector, SourceProvider};
use smalltalks_server::{Server, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// SmallTalks - detect smalltalk intents and curse words in utterances
#[derive(Parser, Debug)]
#[command(name = "smalltalks", version, about)]
struct Cli {
    /// Directory holding intents.json, stopwords.txt and cursewords.txt
    /// (default: bundled data)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Also write logs to daily-rotated files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse one utterance and print the result as JSON
    Analyze(AnalyzeArgs),
    /// Run the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Text to analyse
    text: String,

    /// Keep the original case when scanning
    #[arg(long)]
    no_lower: bool,

    /// Keep accents in marked and cleaned input
    #[arg(long)]
    no_unicode_normalization: bool,

    /// Information level (none, normal, full)
    #[arg(long, default_value = "normal")]
    level: InformationLevel,
}

impl AnalyzeArgs {
    fn config(&self) -> PreProcessingConfig {
        PreProcessingConfig::default()
            .with_to_lower(!self.no_lower)
            .with_unicode_normalization(!self.no_unicode_normalization)
            .with_information_level(self.level)
    }
}

/// Initialize logging to stderr, plus a rolling file when a log directory is set.
fn init_logging(cli: &Cli) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if cli.debug { "debug" } else { &cli.log_level };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "smalltalks={0},smalltalks_core={0},smalltalks_server={0},warn",
            log_level
        ))
    });

    if let Some(log_dir) = &cli.log_dir {
        match file_appender(log_dir) {
            Ok(appender) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(std::io::stderr))
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                    .init();

                tracing::info!("Logging to {:?}", log_dir);
                return Some(guard);
            }
            Err(e) => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .init();
                tracing::warn!("File logging unavailable ({}), using console only", e);
                return None;
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    None
}

fn file_appender(log_dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix("smalltalks")
        .filename_suffix("log")
        .build(log_dir)
        .context("building rolling file appender")
}

fn source(cli: &Cli) -> SourceProvider {
    match &cli.source {
        Some(dir) => SourceProvider::local(dir),
        None => SourceProvider::bundled(),
    }
}

async fn analyze(source: SourceProvider, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let detector = SourceDetector::from_source(source);
    let analysis = detector
        .analyze(&args.text, args.config())
        .await
        .context("analysis failed")?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

async fn serve(source: SourceProvider, host: String, port: u16) -> anyhow::Result<()> {
    let config = ServerConfig::default()
        .with_host(host)
        .with_port(port)
        .with_source(source);

    let server = Server::new(config)?;
    tracing::info!("Listening on http://{}", server.addr());
    server.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli);
    let source = source(&cli);

    match &cli.command {
        Command::Analyze(args) => analyze(source, args).await,
        Command::Serve { host, port } => serve(source, host.clone(), *port).await,
    }
}
