//! agrodash - Field data analytics for agricultural extension programmes

mod cli;

use agrodash_core::models::ReportSections;
use agrodash_core::{
    export_officer_performance_to_csv, export_report_to_json, AnalyticsEngine, DataStore,
    EventBus, Settings, SnapshotParser,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cli::{
    format_farm_report, format_farmer_report, format_global_report, format_load_report,
    format_officer_report, OutputFormat,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

#[derive(Parser)]
#[command(
    name = "agrodash",
    version,
    about = "Field data analytics for agricultural extension programmes",
    long_about = "Computes dashboard analytics over officers, farmers, farms and their\n\
                  crop, livestock and agro-allied records.\n\
                  \n\
                  Examples:\n\
                    agrodash --snapshot data.json global           # Dashboard for everything\n\
                    agrodash --snapshot data.json officer o1       # One officer's portfolio\n\
                    agrodash --snapshot data.json farmer f1        # One farmer and their farms\n\
                    agrodash --snapshot data.json farm fm1         # One farm\n\
                    agrodash --snapshot data.json check            # Validate the snapshot\n\
                  \n\
                  Environment Variables:\n\
                    AGRODASH_SNAPSHOT                # Snapshot file\n\
                    AGRODASH_CONFIG                  # Config file\n\
                    AGRODASH_FORMAT                  # Output format: json|table\n\
                    AGRODASH_NO_COLOR                # Disable ANSI colors (log-friendly)\n\
                    RUST_LOG                         # Log filter (overrides --log-level)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Snapshot file (JSON export of all collections)
    #[arg(long, env = "AGRODASH_SNAPSHOT")]
    snapshot: PathBuf,

    /// Config file (default: <config dir>/agrodash/config.toml)
    #[arg(long, env = "AGRODASH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (json|table)
    #[arg(long, env = "AGRODASH_FORMAT", value_parser = ["json", "table"], default_value = "table")]
    format: String,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "AGRODASH_NO_COLOR")]
    no_color: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Mode {
    /// Dashboard across all officers
    Global {
        /// Also write the report as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write the officer performance table as CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// One officer's portfolio and analytics
    Officer {
        /// Officer ID
        id: String,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// One farmer, their farms and records
    Farmer {
        /// Farmer ID
        id: String,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// One farm and its records
    Farm {
        /// Farm ID
        id: String,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Load the snapshot and print validation results
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.parse().unwrap_or_default()),
        )
        .init();

    let settings = load_settings(cli.config.as_deref())?;
    let format = OutputFormat::parse(&cli.format);
    let no_color = cli.no_color;

    let store = DataStore::new(settings.store_config());
    let _events = log_store_events(store.event_bus());
    let report = SnapshotParser::new().load_into(&cli.snapshot, &store).await;

    if let Mode::Check = cli.mode {
        println!("{}", format_load_report(&report));
        if report.has_fatal_errors() {
            bail!("Snapshot {} could not be loaded", cli.snapshot.display());
        }
        return Ok(());
    }

    if report.has_fatal_errors() {
        eprintln!("{}", format_load_report(&report));
        bail!("Snapshot {} could not be loaded", cli.snapshot.display());
    }
    if report.has_errors() {
        let (warnings, errors, _) = report.error_count();
        tracing::warn!(
            warnings,
            errors,
            rejected = report.records_rejected,
            "Snapshot loaded with problems (run `agrodash check` for details)"
        );
    }

    let engine = AnalyticsEngine::new(Arc::new(store), settings.engine);

    match cli.mode {
        Mode::Global { output, csv } => {
            run_global(&engine, output, csv, format, no_color).await?;
        }
        Mode::Officer { id, output } => {
            run_officer(&engine, &id, output, format, no_color).await?;
        }
        Mode::Farmer { id, output } => {
            run_farmer(&engine, &id, output, format, no_color).await?;
        }
        Mode::Farm { id, output } => {
            run_farm(&engine, &id, output, format, no_color).await?;
        }
        Mode::Check => {}
    }

    Ok(())
}

/// Trace store events at debug level until the bus closes
///
/// Resolves to the number of events seen.
fn log_store_events(bus: &EventBus) -> JoinHandle<usize> {
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        let mut seen = 0;
        loop {
            match events.recv().await {
                Ok(event) => {
                    seen += 1;
                    tracing::debug!(?event, "Store event");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Store event log lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    })
}

/// Explicit config paths must exist; the default location is optional
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match dirs::config_dir() {
            Some(dir) => {
                let path = dir.join("agrodash").join("config.toml");
                Settings::load_or_default(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))
            }
            None => Ok(Settings::default()),
        },
    }
}

fn warn_incomplete<R: ReportSections>(report: &R) {
    let failed = report.failures().len();
    if failed > 0 {
        tracing::warn!(failed, "Report is incomplete; some sections could not be computed");
    }
}

async fn run_global(
    engine: &AnalyticsEngine<DataStore>,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
    format: OutputFormat,
    no_color: bool,
) -> Result<()> {
    let report = engine.compute_global_analytics().await;
    warn_incomplete(&report);

    println!("{}", format_global_report(&report, format, no_color));

    if let Some(path) = output {
        export_report_to_json(&report, &path)?;
        eprintln!("Report written to {}", path.display());
    }
    if let Some(path) = csv {
        match report.analytics.officer_performance.ready() {
            Some(rows) => {
                export_officer_performance_to_csv(rows, &path)?;
                eprintln!("Officer performance written to {}", path.display());
            }
            None => bail!("Officer performance is unavailable; CSV not written"),
        }
    }

    Ok(())
}

async fn run_officer(
    engine: &AnalyticsEngine<DataStore>,
    id: &str,
    output: Option<PathBuf>,
    format: OutputFormat,
    no_color: bool,
) -> Result<()> {
    let report = engine.compute_officer_analytics(id).await?;
    warn_incomplete(&report);

    println!("{}", format_officer_report(&report, format, no_color));

    if let Some(path) = output {
        export_report_to_json(&report, &path)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

async fn run_farmer(
    engine: &AnalyticsEngine<DataStore>,
    id: &str,
    output: Option<PathBuf>,
    format: OutputFormat,
    no_color: bool,
) -> Result<()> {
    let report = engine.compute_farmer_details(id).await?;
    warn_incomplete(&report);

    println!("{}", format_farmer_report(&report, format, no_color));

    if let Some(path) = output {
        export_report_to_json(&report, &path)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

async fn run_farm(
    engine: &AnalyticsEngine<DataStore>,
    id: &str,
    output: Option<PathBuf>,
    format: OutputFormat,
    no_color: bool,
) -> Result<()> {
    let report = engine.compute_farm_details(id).await?;
    warn_incomplete(&report);

    println!("{}", format_farm_report(&report, format, no_color));

    if let Some(path) = output {
        export_report_to_json(&report, &path)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}
