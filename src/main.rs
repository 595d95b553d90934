use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lootwatch::{
    current_timestamp_ms, format_label, CatalogLoader, Category, EventSummary, HealthSnapshot,
    Settings, SnapshotFile, TopKAggregator,
};

#[derive(Parser, Debug)]
#[command(name = "lootwatch")]
#[command(about = "Ingestion health and bounded rollups for hunting logs")]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank the event log per category
    Summary {
        /// Path to the event CSV
        path: PathBuf,

        /// Data lines to skip before aggregating
        #[arg(long)]
        start_line: Option<u64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the newest hunt records
    Catalog {
        /// Path to the hunt record CSV
        path: PathBuf,

        /// Records to keep (0 for the default)
        #[arg(short, long)]
        max: Option<usize>,

        /// Print JSON instead of labels
        #[arg(long)]
        json: bool,
    },

    /// Show a health snapshot written by the emitter
    Health {
        /// Path to the snapshot JSON
        path: PathBuf,

        /// Keep printing whenever the file is rewritten
        #[arg(short, long)]
        follow: bool,

        /// Poll interval in milliseconds (with --follow)
        #[arg(long, default_value = "500")]
        refresh_ms: u64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    tracing::debug!(?settings, "settings loaded");

    match args.command {
        Command::Summary {
            path,
            start_line,
            json,
        } => run_summary(&path, start_line.unwrap_or(settings.start_line), json, &settings),
        Command::Catalog { path, max, json } => {
            run_catalog(&path, max.unwrap_or(settings.catalog_capacity), json)
        }
        Command::Health {
            path,
            follow,
            refresh_ms,
        } => run_health(&path, follow, Duration::from_millis(refresh_ms)),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_summary(path: &Path, start_line: u64, json: bool, settings: &Settings) -> Result<()> {
    let aggregator = TopKAggregator::new().with_max_keys(settings.max_keys);
    let summary = match aggregator.compute(path, start_line) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(error = %e, "event log unavailable");
            eprintln!("no data: {}", e.path().display());
            EventSummary::default()
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} lines read, {} dropped, {} ignored",
        summary.lines_read, summary.rows_dropped, summary.rows_ignored
    );
    for category in Category::ALL {
        let bucket = summary.category(category);
        println!();
        println!("{:<6} {:>8} rows {:>12.2} total", category, bucket.count, bucket.sum);
        for (rank, key) in bucket.top.iter().enumerate() {
            println!("  {:>2}. {:<40} {:>6} {:>12.2}", rank + 1, key.name, key.count, key.sum);
        }
    }
    Ok(())
}

fn run_catalog(path: &Path, max_items: usize, json: bool) -> Result<()> {
    let entries = match CatalogLoader::new().load(path, max_items) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "hunt catalog unavailable");
            eprintln!("no data: {}", e.path().display());
            Vec::new()
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    // newest first, like a picker
    for entry in entries.iter().rev() {
        println!("{}", format_label(entry));
    }
    Ok(())
}

fn run_health(path: &Path, follow: bool, refresh: Duration) -> Result<()> {
    let mut source = SnapshotFile::new(path);

    loop {
        if let Some(snapshot) = source.poll() {
            print_health(&snapshot);
        } else if !follow {
            let reason = source.error().unwrap_or("no snapshot");
            anyhow::bail!("{}: {}", source.description(), reason);
        }
        if !follow {
            return Ok(());
        }
        std::thread::sleep(refresh);
    }
}

fn print_health(snapshot: &HealthSnapshot) {
    let age_ms = current_timestamp_ms().saturating_sub(snapshot.now_ms);
    println!(
        "{} overall | io {} | lag {} {} ms | {:.2} ev/s | snapshot age {} ms",
        snapshot.overall().symbol(),
        snapshot.io_severity,
        snapshot.lag_severity,
        snapshot.lag_ms,
        snapshot.rate_per_sec(),
        age_ms,
    );
    println!(
        "events {} | io errors {} | parse errors {} | backlog {} B | sink {} B{}",
        snapshot.events,
        snapshot.io_errors,
        snapshot.parse_errors,
        snapshot.source_backlog(),
        snapshot.sink_size,
        if snapshot.rotated { " | rotated" } else { "" },
    );
    for error in &snapshot.errors {
        println!(
            "  {} {} [{}/{}] {}",
            error.severity.symbol(),
            error.timestamp_ms,
            error.code_a,
            error.code_b,
            error.message
        );
    }
}
