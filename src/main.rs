mod dedup;
mod discord;
mod error;
mod fetch;
mod listing;
mod message;
mod parser;
mod pipeline;
mod settings;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dedup::DedupMemory;
use discord::{Delivery, DiscordClient, DryRun};
use fetch::HttpFetcher;
use parser::{ExtractOptions, Extraction};
use pipeline::Pipeline;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "dmsguild_notifier",
    about = "Post today's new DMs Guild products to a Discord channel",
    after_help = settings::env_help()
)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check now, then every configured interval until interrupted (default)
    Run,
    /// Run a single check and exit
    Once {
        /// Log messages instead of posting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse a saved search results page and print what would be posted
    Parse {
        /// HTML file saved from the search page
        file: PathBuf,
        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("reading configuration from {}", cli.config.display()))?;
    info!(?settings, "configuration loaded");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let delivery = discord_client(&settings)?;
            let mut pipeline = Pipeline::new(
                HttpFetcher::new(settings.timeout)?,
                delivery,
                &settings,
                Local::now().date_naive(),
            );
            let cancel = CancellationToken::new();
            spawn_signal_listener(cancel.clone());
            info!(
                every_secs = settings.interval.as_secs(),
                "starting scheduled checks"
            );
            pipeline::run(&mut pipeline, settings.interval, cancel).await;
            Ok(())
        }
        Commands::Once { dry_run } => {
            if dry_run {
                check_once(&settings, DryRun).await
            } else {
                check_once(&settings, discord_client(&settings)?).await
            }
        }
        Commands::Parse { file, today } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            parse_saved_page(&settings, &html, today);
            Ok(())
        }
    }
}

fn discord_client(settings: &Settings) -> anyhow::Result<DiscordClient> {
    let token = settings.require_token()?;
    settings.require_channel()?;
    DiscordClient::new(token, settings.timeout)
}

async fn check_once<D: Delivery>(settings: &Settings, delivery: D) -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new(
        HttpFetcher::new(settings.timeout)?,
        delivery,
        settings,
        Local::now().date_naive(),
    );
    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    let stats = pipeline.tick(&cancel).await?;
    println!(
        "Checked {} rows: {} posted, {} skipped.",
        stats.rows, stats.sent, stats.skipped
    );
    Ok(())
}

fn parse_saved_page(settings: &Settings, html: &str, today: NaiveDate) {
    let options = ExtractOptions {
        title_filter: settings.title_filter.clone(),
    };
    let mut memory = DedupMemory::new(today);
    let rows = listing::extract_rows(html, &settings.base_url);

    let mut kept = 0usize;
    for entry in &rows {
        match parser::process_entry(entry, &options, &mut memory) {
            Extraction::Kept(product) => {
                kept += 1;
                println!("{}\n", product.format(&settings.affiliate_id));
            }
            Extraction::Skipped { title, reason } => {
                println!(
                    "-- skipped {}: {:?}\n",
                    title.as_deref().unwrap_or("<untitled>"),
                    reason
                );
            }
        }
    }
    println!("{} rows, {} would be posted for {}", rows.len(), kept, today);
}

/// Cancel `cancel` on Ctrl+C or SIGTERM. The pipeline finishes its current
/// row before stopping.
fn spawn_signal_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("received Ctrl+C, shutting down"),
            _ = wait_for_sigterm() => info!("received SIGTERM, shutting down"),
        }
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("could not register SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
