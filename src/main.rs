//! hdb-flats command-line entry point
//!
//! Lists the flats currently open for selection on the HDB portal and
//! exports every unit of a chosen launch, flat type and town.

use anyhow::{bail, Context};
use clap::Parser;
use hdb_flats::config::{load_config_with_hash, Config};
use hdb_flats::crawler::{find_launch, ScrapeRequest};
use hdb_flats::output::{
    default_file_name, render_available_flats, write_json, write_records, OutputFormat,
};
use hdb_flats::prompt::{Prompter, TerminalChooser};
use hdb_flats::{get_available_flats, scrape};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// hdb-flats: HDB flat availability scraper
///
/// Walks the portal's launch, town, flat type and block views in a headless
/// browser and writes one row per available unit.
#[derive(Parser, Debug)]
#[command(name = "hdb-flats")]
#[command(version = "1.0.0")]
#[command(about = "Scrapes available HDB flats", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when absent)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Selection type: BTO, SBF or OBF
    #[arg(short, long, default_value = "BTO")]
    selection_type: String,

    /// Launch date exactly as listed, e.g. "Feb 2024"
    #[arg(short, long)]
    launch_date: Option<String>,

    /// Town, or All
    #[arg(short, long)]
    town: Option<String>,

    /// Room count (2, 3, 4, 5), or All
    #[arg(short, long)]
    flat_type: Option<String>,

    /// Output file (defaults to a name derived from the selection)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Only list the flats currently available and exit
    #[arg(long)]
    list: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Err(e) = run(&cli, &config).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hdb_flats=info,warn"),
            1 => EnvFilter::new("hdb_flats=debug,info"),
            2 => EnvFilter::new("hdb_flats=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    if cli.list {
        return handle_list(cli, config).await;
    }

    let request = if cli.launch_date.is_none() && cli.town.is_none() && cli.flat_type.is_none() {
        match interactive_request(cli, config).await? {
            Some(request) => request,
            None => return Ok(()),
        }
    } else {
        let Some(launch_date) = &cli.launch_date else {
            bail!("--launch-date is required when --town or --flat-type is given");
        };
        ScrapeRequest::new(&cli.selection_type, launch_date)
            .with_flat_type(cli.flat_type.as_deref())
            .with_town(cli.town.as_deref())
    };

    handle_scrape(cli, config, &request).await
}

/// Handles --list: prints the discovery tree
async fn handle_list(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let launches = get_available_flats(config, &cli.selection_type).await?;
    match cli.format {
        OutputFormat::Json => write_json(io::stdout().lock(), &launches)?,
        OutputFormat::Csv => print!("{}", render_available_flats(&launches)),
    }
    Ok(())
}

/// Prints what is available and asks which launch, flat type and town to scrape
///
/// Returns `None` when nothing is open for selection.
async fn interactive_request(cli: &Cli, config: &Config) -> anyhow::Result<Option<ScrapeRequest>> {
    let launches = get_available_flats(config, &cli.selection_type).await?;
    print!("{}", render_available_flats(&launches));
    if launches.is_empty() {
        return Ok(None);
    }

    let mut prompter = Prompter::new(TerminalChooser);
    let launch_date = prompter.launch_date(&launches)?;
    let Some(launch) = find_launch(&launches, &launch_date) else {
        bail!("launch date '{}' is listed more than once", launch_date);
    };
    let flat_type = prompter.flat_type(launch)?;
    let town = prompter.town(launch, flat_type.as_deref())?;

    Ok(Some(
        ScrapeRequest::new(&cli.selection_type, launch_date)
            .with_flat_type(flat_type.as_deref())
            .with_town(town.as_deref()),
    ))
}

/// Scrapes the selection and writes the records
async fn handle_scrape(cli: &Cli, config: &Config, request: &ScrapeRequest) -> anyhow::Result<()> {
    let records = scrape(config, request).await?;

    let path = match &cli.output {
        Some(path) => path.clone(),
        None => PathBuf::from(&config.output.directory).join(default_file_name(request, cli.format)),
    };
    write_records(&records, cli.format, &path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Successfully saved {} units to {}", records.len(), path.display());
    Ok(())
}
