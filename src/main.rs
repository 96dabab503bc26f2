mod config;
mod output;
mod source;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use icalagg_core::Aggregator;
use owo_colors::OwoColorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Settings, expand_path};
use crate::source::UrlSource;

#[derive(Parser)]
#[command(name = "icalagg")]
#[command(about = "Merge per-room calendar feeds into one schedule feed and an HTML room grid")]
struct Cli {
    /// Config file (defaults to ~/.config/icalagg/config.toml)
    config: Option<PathBuf>,

    /// Write the merged calendar here instead of files.ical
    #[arg(long)]
    ical: Option<PathBuf>,

    /// Write the HTML schedule here instead of files.html
    #[arg(long)]
    html: Option<PathBuf>,

    /// Log feed and event details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;

    if settings.rooms.is_empty() {
        anyhow::bail!("No rooms configured.\nAdd at least one [[rooms]] entry with a name and url");
    }

    let mut aggregator = Aggregator::new(settings.aggregator_config()?);
    for room in &settings.rooms {
        aggregator.register(settings.room_name(room), room.url.as_str());
    }

    let source = UrlSource::new(Duration::from_secs(settings.core.fetch_timeout_secs))?;
    aggregator.collect_all(&source)?;

    // Render both outputs before writing either, so a layout error leaves
    // the previous files in place.
    let ics = aggregator.to_ics();
    let grid = aggregator.to_html()?;
    let html = output::wrap_html(
        &grid,
        settings.files.htmlheader.as_deref().map(expand_path).as_deref(),
        settings.files.htmlfooter.as_deref().map(expand_path).as_deref(),
    )?;

    let ical_path = expand_path(cli.ical.as_deref().unwrap_or(settings.files.ical.as_path()));
    let html_path = expand_path(cli.html.as_deref().unwrap_or(settings.files.html.as_path()));

    output::write_output(&ical_path, &ics)?;
    output::write_output(&html_path, &html)?;
    info!(ical = %ical_path.display(), html = %html_path.display(), "wrote schedule");

    println!(
        "{} {} events from {} rooms",
        "Merged".green(),
        aggregator.events().len(),
        aggregator.feeds().len()
    );
    println!("  {}", ical_path.display().dimmed());
    println!("  {}", html_path.display().dimmed());

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
