//! CLI entry point for the class grades analyzer.
//!
//! Provides subcommands for analysing one or more class spreadsheets,
//! exporting the normalized roster and inspecting how a sheet was read.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use class_grades::analysis::{AnalysisCache, build_report};
use class_grades::config::AnalysisConfig;
use class_grades::fetch::BasicClient;
use class_grades::ingest::SpreadsheetIngestor;
use class_grades::output::{print_pretty, write_report, write_roster_file};
use class_grades::pipeline::{load_dataset, load_sheet};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "class_grades")]
#[command(about = "Analyze semester grade spreadsheets", long_about = None)]
struct Cli {
    /// JSON config file (defaults to $CLASS_GRADES_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one class, or several classes of the same level and stream
    Analyze {
        /// Paths or URLs of the class spreadsheets
        #[arg(value_name = "FILE_OR_URL", required = true)]
        sources: Vec<String>,

        /// JSON report to write
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,
    },
    /// Export the normalized student roster as CSV
    Export {
        #[arg(value_name = "FILE_OR_URL", required = true)]
        sources: Vec<String>,

        #[arg(short, long, default_value = "students.csv")]
        output: PathBuf,
    },
    /// Show how a single spreadsheet is read: header row, metadata, subjects
    Inspect {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/class_grades.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("class_grades.log"));

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
    let config = AnalysisConfig::resolve(cli.config.as_deref())?;
    let ingestor = SpreadsheetIngestor::new(config.ingest.clone());
    let client = BasicClient::new();

    match cli.command {
        Commands::Analyze { sources, output } => {
            let dataset = load_dataset(&client, &ingestor, &sources)
                .await
                .context("failed to load grade spreadsheets")?;

            let mut cache = AnalysisCache::new();
            let report = build_report(&mut cache, &dataset, &config);
            print_pretty(&report);
            write_report(&output, &report)?;

            info!(
                class = %report.metadata.class_name,
                students = report.student_count,
                average = report.global.average,
                success_rate = report.categories.overall_success_rate,
                "Analysis complete"
            );
        }
        Commands::Export { sources, output } => {
            let dataset = load_dataset(&client, &ingestor, &sources)
                .await
                .context("failed to load grade spreadsheets")?;
            write_roster_file(&output, &dataset)?;
        }
        Commands::Inspect { source } => {
            let sheet = load_sheet(&client, &ingestor, &source)
                .await
                .with_context(|| format!("failed to read {source}"))?;
            let meta = &sheet.metadata;

            info!(
                header_row = sheet.report.header_row,
                empty_rows_trimmed = sheet.report.empty_rows_trimmed,
                summary_row_dropped = sheet.report.summary_row_dropped,
                "Layout"
            );
            info!(
                directorate = %meta.directorate,
                school = %meta.school_name,
                year = %meta.school_year,
                semester = %meta.semester,
                level = %meta.level,
                stream = %meta.stream,
                class = %meta.class_number,
                "Metadata"
            );
            info!(
                students = sheet.students.len(),
                candidates = sheet.report.candidate_subjects,
                subjects = ?sheet.subjects,
                "Records"
            );
        }
    }

    Ok(())
}
