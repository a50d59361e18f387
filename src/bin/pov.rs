use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use povfill::batch::BatchDriver;
use povfill::config::BatchConfig;
use povfill::data::{import_tick_file, SqliteStore, TickStore};
use povfill::types::{SeriesKey, Side};

#[derive(Parser)]
#[command(name = "pov", about = "Participation-rate execution simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate every series in a snapshot, both sides
    Run {
        /// Snapshot database
        #[arg(long)]
        db: PathBuf,

        /// TOML config file (defaults apply for anything missing)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory (overrides config)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Participation rate in (0, 1] (overrides config)
        #[arg(long)]
        participation: Option<f64>,
    },

    /// Import a delimited tick file into a snapshot database
    Import {
        /// Tick file with datetime,seq,price_millionths,size_billionths,qualifies columns
        #[arg(long)]
        source: PathBuf,

        /// Destination database path
        #[arg(long)]
        dest: PathBuf,

        /// Instrument identifier (e.g. "ETH-BTC")
        #[arg(long)]
        instrument: String,

        /// Year label
        #[arg(long)]
        year: String,

        /// buy or sell
        #[arg(long)]
        side: Side,

        /// Field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,
    },

    /// List the (instrument, year) series in a snapshot
    Keys {
        /// Snapshot database
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            db,
            config,
            out,
            participation,
        } => cmd_run(db, config, out, participation),
        Commands::Import {
            source,
            dest,
            instrument,
            year,
            side,
            delimiter,
        } => cmd_import(source, dest, SeriesKey::new(instrument, year), side, delimiter),
        Commands::Keys { db } => cmd_keys(db),
    }
}

fn cmd_run(
    db: PathBuf,
    config_path: Option<PathBuf>,
    out: Option<PathBuf>,
    participation: Option<f64>,
) -> Result<()> {
    let mut config = match config_path {
        Some(ref p) => BatchConfig::from_file(p)?,
        None => BatchConfig::default(),
    };
    if let Some(dir) = out {
        config.output.dir = dir;
    }
    if let Some(p) = participation {
        config.participation_rate = p;
    }
    config.validate().context("invalid configuration")?;

    let store = SqliteStore::open_existing(&db)
        .with_context(|| format!("failed to open snapshot at {}", db.display()))?;

    println!(
        "Running participation simulation (p={}, crypto/crypto={}, other={}) -> {}",
        config.participation_rate,
        config.costs.crypto_crypto_rate,
        config.costs.other_rate,
        config.output.dir.display()
    );

    let driver = BatchDriver::new(config);
    let summary = driver.run(&store)?;

    for run in &summary.runs {
        run.print();
    }
    println!();
    println!(
        "{} tables written, {} skipped (no ticks), {} failed",
        summary.runs.len(),
        summary.skipped,
        summary.failed
    );
    println!("Summary: {}", driver.summary_path().display());

    if summary.failed > 0 {
        bail!("{} series failed, see log", summary.failed);
    }
    Ok(())
}

fn cmd_import(source: PathBuf, dest: PathBuf, key: SeriesKey, side: Side, delimiter: char) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("delimiter must be ASCII, got {:?}", delimiter);
    }

    println!("Importing from: {}", source.display());
    println!("Destination:    {}", dest.display());
    println!("Series:         {} {}", key, side);

    let store = SqliteStore::open(&dest)
        .with_context(|| format!("failed to open destination at {}", dest.display()))?;
    store.init().context("failed to initialize destination schema")?;

    let stats = import_tick_file(&source, &store, &key, side, delimiter as u8)
        .context("import failed")?;

    println!();
    println!("Import complete:");
    println!("  Rows read:      {}", stats.rows_read);
    println!("  Ticks imported: {}", stats.ticks_imported);
    println!("  Rows skipped:   {}", stats.rows_skipped);
    println!();

    Ok(())
}

fn cmd_keys(db: PathBuf) -> Result<()> {
    let store = SqliteStore::open_existing(&db)
        .with_context(|| format!("failed to open snapshot at {}", db.display()))?;
    let keys = store.list_keys().context("failed to list series")?;

    println!();
    println!("Series in {}:", db.display());
    println!();
    for key in &keys {
        let buys = store.count_ticks(key, Side::Buy)?;
        let sells = store.count_ticks(key, Side::Sell)?;
        println!("  {:<16} {:<6} buy={:<10} sell={}", key.instrument, key.year, buys, sells);
    }
    println!();
    Ok(())
}
