use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use showpull::{
    Config, DownloadClient, NoopReporter, NyaaIndexer, Orchestrator, PartialAwareFilter,
    ProgressEvent, ProgressReporter, ReqwestClient, Schedule, SharedProgressReporter, SkipReason,
    TransmissionClient, run,
};

// Emoji with fallback for terminals without Unicode support
static TV: Emoji<'_, '_> = Emoji("📺 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "[=] ");
static SUBMIT: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");

/// Track torrent indexer feeds and hand new episodes to Transmission
#[derive(Parser, Debug)]
#[command(name = "showpull")]
#[command(about = "Track torrent indexer feeds and hand new episodes to Transmission")]
#[command(version)]
struct Args {
    /// Configuration file (TOML; JSON or YAML by .json, .yml or .yaml extension)
    ///
    /// In periodic mode `root` and `shows` are re-read before every cycle;
    /// all other settings apply from startup until restart.
    #[arg(short, long, default_value = "shows.toml")]
    config: PathBuf,

    /// Keep running and sync again after each interval
    #[arg(short, long)]
    periodic: bool,

    /// Hours between cycles in periodic mode (overrides the config file)
    #[arg(long)]
    interval_hours: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only log errors, no progress output
    #[arg(short, long)]
    quiet: bool,
}

/// Progress reporter printing one line per event
struct TerminalReporter;

impl ProgressReporter for TerminalReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::ShowStarted { query, destination } => {
                println!(
                    "\n{SEARCH}{} {}",
                    query.bold().green(),
                    format!("→ {}", destination.display()).dimmed()
                );
            }

            ProgressEvent::FeedUnavailable { error, .. } => {
                println!("  {FAILURE}{} {}", "Feed unavailable:".red(), error.dimmed());
            }

            ProgressEvent::FeedFetched {
                total_episodes,
                candidates,
                ..
            } => {
                println!(
                    "  {TV}{} episodes in feed, {} tracked",
                    total_episodes.to_string().cyan(),
                    candidates.to_string().cyan()
                );
            }

            ProgressEvent::EpisodeSkipped { title, reason, .. } => {
                let why = match reason {
                    SkipReason::TitlePresent => "present".to_string(),
                    SkipReason::ResolvedNamePresent { file_name } => {
                        format!("present as {file_name}")
                    }
                };
                println!("  {SKIP}{} {}", title.dimmed(), format!("({why})").dimmed());
            }

            ProgressEvent::EpisodeSubmitted { title, .. } => {
                println!("  {SUBMIT}{}", title.green());
            }

            ProgressEvent::EpisodeFailed { title, error, .. } => {
                println!("  {FAILURE}{} - {}", title.red(), error.dimmed());
            }

            ProgressEvent::ShowCompleted { .. } => {}

            ProgressEvent::CycleCompleted {
                shows,
                submitted,
                skipped,
                failed,
            } => {
                println!(
                    "\n{PARTY}{} {} shows, {} submitted, {} skipped, {} failed\n",
                    "Sync complete:".bold().green(),
                    shows.to_string().cyan(),
                    submitted.to_string().green().bold(),
                    skipped.to_string().yellow(),
                    if failed > 0 {
                        failed.to_string().red().bold()
                    } else {
                        failed.to_string().green()
                    }
                );
            }
        }
    }
}

fn init_logging(args: &Args) {
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    if !args.quiet {
        println!(
            "\n{}{} {}",
            TV,
            "showpull".bold().magenta(),
            format!("- {} show(s) under {}", config.shows.len(), config.root.display()).dimmed()
        );
    }

    let client = ReqwestClient::new(config.timeout()).context("Failed to build HTTP client")?;
    let indexer =
        NyaaIndexer::new(client.clone(), &config.indexer_url).context("Invalid indexer URL")?;

    let mut downloader =
        TransmissionClient::new(client, config.daemon_url.clone(), config.rpc_protocol);
    if let Err(e) = downloader.establish_session().await {
        warn!(url = %config.daemon_url, error = %e, "daemon not reachable yet, will retry on first submission");
    }

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(TerminalReporter)
    };

    let schedule = if args.periodic {
        let interval = args
            .interval_hours
            .map(|hours| Duration::from_secs(hours.max(1).saturating_mul(60 * 60)))
            .unwrap_or_else(|| config.interval());
        info!(interval_hours = interval.as_secs() / 3600, "running periodically");
        Schedule::Every(interval)
    } else {
        Schedule::Once
    };

    let mut orchestrator = Orchestrator::new(
        indexer,
        downloader,
        PartialAwareFilter::new(config.partial_suffix.clone()),
        config.sync_options(),
        reporter,
    );

    // The first cycle uses the config loaded above; later cycles re-read the file.
    let config_path = args.config.clone();
    let mut initial = Some(config);
    run(
        &mut orchestrator,
        move || match initial.take() {
            Some(config) => Ok(config.library()),
            None => Config::load(&config_path).map(|config| config.library()),
        },
        schedule,
    )
    .await
    .context("Failed to load configuration")?;

    Ok(())
}
