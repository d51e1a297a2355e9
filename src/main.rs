//! `tomes`: ingest scraped book catalogs into a SQLite database and report on them.

mod error;

use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser, Subcommand};
use exn::{OptionExt, ResultExt};
use std::path::PathBuf;
use std::process::ExitCode;
use tomes_catalog::{Database, Thresholds};
use tomes_config::Config;
use tomes_extract::Rating;
use tomes_ingest::{Pipeline, Source, records};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "tomes", version, about = "Ingest scraped book catalogs into a SQLite database")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, value_name = "FILE", env = "TOMES_CONFIG")]
    config: Option<PathBuf>,
    /// Catalog database, overriding the configured one
    #[arg(long, global = true, value_name = "FILE")]
    database: Option<PathBuf>,
    /// More logging (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Less logging (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ingest records from JSON files, saved product pages or directories of pages
    Ingest {
        #[arg(required = true, value_name = "INPUT")]
        inputs: Vec<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the indicators and rating distribution of the catalog
    Report {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories with their identifiers and book counts
    Categories,
    /// List books, optionally only those of one category
    Books {
        /// Category identifier
        #[arg(long, value_name = "ID")]
        category: Option<u32>,
    },
    /// Renumber category identifiers by name
    Compact,
}

/// Choose the log filter: `RUST_LOG` wins, then the configured directives,
/// with `-v`/`-q` moving their default level.
fn log_filter(configured: &str, verbose: u8, quiet: u8) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    configured_filter(configured, verbose, quiet)
}

fn configured_filter(configured: &str, verbose: u8, quiet: u8) -> Result<EnvFilter> {
    EnvFilter::try_new(filter_directives(configured, verbose, quiet).join(",")).or_raise(|| ErrorKind::Config)
}

/// Keep every per-target directive and replace the bare level (info if
/// there is none) with one adjusted by `-v`/`-q`.
fn filter_directives(configured: &str, verbose: u8, quiet: u8) -> Vec<String> {
    let mut directives = configured.split(',').map(str::trim).filter(|d| !d.is_empty()).collect::<Vec<_>>();
    if verbose == 0 && quiet == 0 {
        return directives.into_iter().map(str::to_string).collect();
    }
    let mut base = LevelFilter::INFO;
    directives.retain(|directive| match directive.parse::<LevelFilter>() {
        Ok(level) => {
            base = level;
            false
        },
        Err(_) => true,
    });
    let level = adjust_level(base, verbose, quiet).to_string().to_ascii_lowercase();
    directives.into_iter().map(str::to_string).chain([level]).collect()
}

fn adjust_level(base: LevelFilter, verbose: u8, quiet: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 6] = [
        LevelFilter::OFF,
        LevelFilter::ERROR,
        LevelFilter::WARN,
        LevelFilter::INFO,
        LevelFilter::DEBUG,
        LevelFilter::TRACE,
    ];
    let index = LEVELS.iter().position(|level| *level == base).unwrap_or(3);
    let index = (index + usize::from(verbose)).saturating_sub(usize::from(quiet));
    LEVELS[index.min(LEVELS.len() - 1)]
}

fn thresholds(config: &Config) -> Result<Thresholds> {
    Ok(Thresholds {
        well_rated_min: Rating::new(config.indicators.well_rated_min).ok_or_raise(|| ErrorKind::Config)?,
        critical_stock_max: config.indicators.critical_stock_max,
    })
}

async fn ingest(db: &Database, config: &Config, inputs: &[PathBuf], json: bool) -> Result<()> {
    let mut sources = Vec::with_capacity(inputs.len());
    for input in inputs {
        sources.push(Source::open(input).await.or_raise(|| ErrorKind::Source)?);
    }
    let mut pipeline =
        Pipeline::new(db).with_default_category(config.default_category.clone()).with_thresholds(thresholds(config)?);
    let report = pipeline.run_stream(records(&sources)).await.or_raise(|| ErrorKind::Ingest)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report).or_raise(|| ErrorKind::Output)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

async fn report(db: &Database, config: &Config, json: bool) -> Result<()> {
    let store = db.store();
    let indicators = store.indicators(&thresholds(config)?).await.or_raise(|| ErrorKind::Catalog)?;
    let distribution = store.rating_distribution().await.or_raise(|| ErrorKind::Catalog)?;
    if json {
        let value = serde_json::json!({
            "books": distribution.total(),
            "indicators": indicators,
            "ratings": distribution,
        });
        println!("{}", serde_json::to_string_pretty(&value).or_raise(|| ErrorKind::Output)?);
        return Ok(());
    }
    println!("books:                   {}", distribution.total());
    println!("well rated (%):          {:.2}", indicators.well_rated_pct);
    println!("critical stock (%):      {:.2}", indicators.critical_stock_pct);
    println!("well rated mean price:   {:.2}", indicators.well_rated_mean_price);
    let percentages = distribution.percentages();
    for ((rating, books), percentage) in distribution.iter().zip(percentages) {
        println!("{:<5} {:>6} {:>6.1}%", "*".repeat(usize::from(rating.stars())), books, percentage);
    }
    Ok(())
}

async fn categories(db: &Database) -> Result<()> {
    let categories = db.registry().list().await.or_raise(|| ErrorKind::Catalog)?;
    println!("{:>4}  {:>6}  {:>6}  name", "id", "stored", "books");
    for category in categories {
        println!("{:>4}  {:>6}  {:>6}  {}", category.id, category.occurrences, category.books, category.name);
    }
    Ok(())
}

async fn books(db: &Database, category: Option<u32>) -> Result<()> {
    let store = db.store();
    let books = match category {
        Some(id) => store.list_in_category(id).await,
        None => store.list().await,
    }
    .or_raise(|| ErrorKind::Catalog)?;
    for book in books {
        println!(
            "{:>8.2}  {:>4}  {:<5}  {}  [{}]",
            book.price,
            book.quantity,
            "*".repeat(usize::from(book.rating.stars())),
            book.title,
            book.category
        );
    }
    Ok(())
}

async fn execute(db: &Database, config: &Config, command: &Command) -> Result<()> {
    match command {
        Command::Ingest { inputs, json } => ingest(db, config, inputs, *json).await,
        Command::Report { json } => report(db, config, *json).await,
        Command::Categories => categories(db).await,
        Command::Books { category } => books(db, *category).await,
        Command::Compact => {
            let renumbered = db.registry().compact().await.or_raise(|| ErrorKind::Catalog)?;
            println!("renumbered {renumbered} categories");
            Ok(())
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.log, cli.verbose, cli.quiet)?)
        .with_writer(std::io::stderr)
        .init();

    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Io)?;
    }
    tracing::debug!(database = %config.database.display(), "opening catalog");
    let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Catalog)?;
    let result = execute(&db, &config, &cli.command).await;
    db.close().await;
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}
