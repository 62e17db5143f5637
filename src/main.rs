use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use hckr::app::{archive_today, App, AppEvent};
use hckr::config::Config;
use hckr::nav::{NavOptions, Navigator};
use hckr::view::{FilterMode, SortMode};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Default config location (~/.config/hckr/config.toml)
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("hckr")
            .join("config.toml"),
    )
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn parse_filter(s: &str) -> Result<FilterMode, String> {
    FilterMode::from_str_name(s)
        .ok_or_else(|| "expected one of top10, top20, top50, all, homepage".to_string())
}

fn parse_sort(s: &str) -> Result<SortMode, String> {
    SortMode::from_str_name(s).ok_or_else(|| "expected one of points, comments, date".to_string())
}

#[derive(Parser, Debug)]
#[command(
    name = "hckr",
    version,
    about = "Browse the daily Hacker News front-page archive from hckrnews.com"
)]
struct Args {
    /// Day to open (defaults to today in the archive's timezone)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Initial filter: top10, top20, top50, all, homepage
    #[arg(long, value_parser = parse_filter)]
    filter: Option<FilterMode>,

    /// Initial sort: points, comments, date
    #[arg(long, value_parser = parse_sort)]
    sort: Option<SortMode>,

    /// Config file (defaults to ~/.config/hckr/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Route tracing output. The TUI owns the terminal, so a log file is the
/// only way to read debug output while it runs.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let config = match args.config.clone().or_else(default_config_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from '{}'", path.display()))?,
        None => {
            tracing::debug!("HOME not set and no --config given, using defaults");
            Config::default()
        }
    };

    let latest = archive_today(config.archive_timezone());
    let start = args.date.unwrap_or(latest);
    if start > latest {
        tracing::info!(requested = %start, %latest, "Requested day not published yet, opening latest");
    }

    let nav = Navigator::new(
        start,
        NavOptions {
            filter: args.filter.unwrap_or_else(|| config.filter_mode()),
            sort: args.sort.unwrap_or_else(|| config.sort_mode()),
            cache_days: config.cache_days,
            latest: Some(latest),
        },
    );

    let mut app = App::new(&config, nav).context("Failed to create application")?;
    tracing::info!(
        date = %app.nav.current_date(),
        data_url = %app.sources.data_url,
        site_url = %app.sources.site_url,
        "Starting"
    );

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    hckr::ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
