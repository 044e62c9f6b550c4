//! CLI entry point for the smart waste dashboard.
//!
//! Reads waste-sorting events from the realtime database (or a JSON export),
//! and reports category counts, the most common category, and the paginated
//! activity listing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use smart_waste::{
    aggregator::filter_by_date_range,
    dashboard::{ActivityRow, DashboardState},
    output::{append_rows, log_summary, print_json, print_pretty},
    source::{SnapshotSource, source_for, subscribe},
};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "smart_waste")]
#[command(about = "Waste-sorting dashboard over a realtime database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one snapshot and report the dashboard view
    Summary {
        /// JSON export path or database URL (defaults to WASTE_DB_URL)
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// First day of the activity listing (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last day of the activity listing, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Page of the activity listing to show
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Log the full view as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Keep the view current, refreshing on a fixed interval until Ctrl+C
    Watch {
        /// JSON export path or database URL (defaults to WASTE_DB_URL)
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// Refresh interval in seconds (at least 1)
        #[arg(short = 'r', long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        refresh_secs: u64,

        /// First day of the activity listing (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last day of the activity listing, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
    /// Append the filtered activity listing to a CSV file
    Export {
        /// JSON export path or database URL (defaults to WASTE_DB_URL)
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// First day to export (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last day to export, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// CSV file to append rows to
        #[arg(short, long, default_value = "waste_logs.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/smart_waste.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("smart_waste.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            source,
            start,
            end,
            page,
            json,
        } => {
            let source = source_for(source.as_deref())?;
            let snapshot = source.fetch_snapshot().await?;

            let mut state = DashboardState::new();
            state.set_date_range(start.as_deref(), end.as_deref());
            state.go_to_page(page, usize::MAX);

            let view = state.view(&snapshot)?;
            log_summary(&view);
            print_pretty(&view);
            if json {
                print_json(&view)?;
            }
        }
        Commands::Watch {
            source,
            refresh_secs,
            start,
            end,
        } => {
            watch(source, refresh_secs, start, end).await?;
        }
        Commands::Export {
            source,
            start,
            end,
            output,
        } => {
            let source = source_for(source.as_deref())?;
            let snapshot = source.fetch_snapshot().await?;

            let mut state = DashboardState::new();
            state.set_date_range(start.as_deref(), end.as_deref());

            let rows: Vec<ActivityRow> = filter_by_date_range(&snapshot.events, state.range())
                .into_iter()
                .map(ActivityRow::from_event)
                .collect();

            append_rows(&output, &rows)?;
            info!(rows = rows.len(), output = %output, "Export complete");
        }
    }

    Ok(())
}

/// Subscribes to the source and logs a fresh view for every new snapshot.
#[tracing::instrument(skip(source, start, end))]
async fn watch(
    source: Option<String>,
    refresh_secs: u64,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let source = source_for(source.as_deref())?;

    let mut state = DashboardState::new();
    state.set_date_range(start.as_deref(), end.as_deref());

    let subscription = subscribe(
        source,
        Duration::from_secs(refresh_secs),
        move |snapshot| match state.view(&snapshot) {
            Ok(view) => log_summary(&view),
            Err(e) => error!(error = %e, "Failed to compute dashboard view"),
        },
    );

    info!(refresh_secs, "Watching for snapshots. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    subscription.unsubscribe();
    info!("Stopped watching");
    Ok(())
}
