use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vitals_core::{
    aggregate, display, filter_patients, paginate, ExportQuery, ExportRange, FilterCriteria,
    MonitorConfig, RecordKind, ReportItem, TimelinePanel, TimelineQuery,
};
use vitals_ingest::{build_report_str, resolve_patients_str, resolve_timeline_str};

#[derive(Parser, Debug)]
#[command(
    name = "vitals-cli",
    about = "Run the patient-vitals pipeline over saved monitoring API payloads."
)]
struct Args {
    /// TOML file overriding the default monitor settings.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a dashboard list payload.
    Dashboard {
        /// Path to the patients JSON payload.
        #[arg(short, long)]
        input: PathBuf,
        /// Keep patients whose name or id contains this text.
        #[arg(short, long, default_value = "")]
        query: String,
        /// Keep only warning, critical or alerting patients.
        #[arg(long)]
        only_warnings: bool,
    },
    /// Render a reading or alert history payload.
    Timeline {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, value_enum)]
        kind: KindArg,
    },
    /// Lay out an export report.
    Report {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, value_enum)]
        kind: KindArg,
        /// Start of the range (inclusive), e.g. 2024-03-01.
        #[arg(long)]
        from: Option<String>,
        /// End of the range (inclusive).
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long, default_value = "Patient")]
        patient: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Readings,
    Alerts,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Readings => RecordKind::Readings,
            KindArg::Alerts => RecordKind::Alerts,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    debug!(?config, "monitor settings");

    match args.command {
        Command::Dashboard {
            input,
            query,
            only_warnings,
        } => run_dashboard(&input, &query, only_warnings),
        Command::Timeline { input, kind } => run_timeline(&config, &input, kind.into()),
        Command::Report {
            input,
            kind,
            from,
            to,
            patient,
        } => run_report(&config, &input, kind.into(), from, to, &patient),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MonitorConfig> {
    let Some(path) = path else {
        return Ok(MonitorConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;
    let config: MonitorConfig = toml::from_str(&text)
        .with_context(|| format!("Could not parse config file {}", path.display()))?;
    info!(path = %path.display(), "loaded monitor config");
    Ok(config)
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read file {}", path.display()))
}

fn run_dashboard(input: &Path, query: &str, only_warnings: bool) -> anyhow::Result<()> {
    let patients = resolve_patients_str(&read_input(input)?)?;
    let counts = aggregate(&patients);
    let visible = filter_patients(&patients, &FilterCriteria::new(query, only_warnings));

    println!(
        "Patients: {}\nCritical: {}\nNormal: {}\nActive devices: {}\n",
        counts.total, counts.critical, counts.normal, counts.active_devices
    );

    for patient in &visible {
        println!(
            "{:<10} {:<12} {:<24} {}  {}",
            patient.badge().text,
            patient.id,
            patient.name,
            patient.vitals.summary_line(),
            display::format_timestamp(patient.timestamp.as_deref()),
        );
    }

    if visible.is_empty() {
        println!("No patients match the current filters.");
    }
    Ok(())
}

fn run_timeline(config: &MonitorConfig, input: &Path, kind: RecordKind) -> anyhow::Result<()> {
    let query = TimelineQuery::new(kind, config);
    debug!(pairs = ?query.pairs(), "timeline request parameters");

    match resolve_timeline_str(&read_input(input)?, kind)? {
        TimelinePanel::Rows { rows } => {
            for row in rows {
                let latest = if row.entry.is_latest { " [Latest]" } else { "" };
                let message = row.entry.message.as_deref().unwrap_or_default();
                println!(
                    "{:<9}{latest} {message}\n  HR: {} | SpO2: {} | Temp: {} | Fall: {}  {}",
                    row.badge.text,
                    row.heart_rate_text,
                    row.spo2_text,
                    row.temperature_text,
                    row.fall_text,
                    row.time_text,
                );
            }
        }
        TimelinePanel::Empty { placeholder } => println!("{placeholder}"),
        TimelinePanel::Loading => println!("Loading..."),
        TimelinePanel::Failed { message } => println!("{message}"),
    }
    Ok(())
}

fn run_report(
    config: &MonitorConfig,
    input: &Path,
    kind: RecordKind,
    from: Option<String>,
    to: Option<String>,
    patient: &str,
) -> anyhow::Result<()> {
    let range = ExportRange::parse(from.as_deref(), to.as_deref())?;

    let query = ExportQuery::new(kind, &range, config);
    debug!(pairs = ?query.pairs(), "export request parameters");

    let report = build_report_str(&read_input(input)?, kind, range, patient)?;
    let today = chrono::Local::now().date_naive();
    println!("File: {}", report.file_name(today));

    for item in paginate(&report, &config.report) {
        match item {
            ReportItem::Title { text, y } | ReportItem::Range { text, y } => {
                println!("{y:>6.1}  {text}");
            }
            ReportItem::PageBreak => println!("------ page break ------"),
            ReportItem::Row {
                tone,
                severity_text,
                vitals_text,
                time_text,
                severity_y,
                vitals_y,
                ..
            } => {
                println!("{severity_y:>6.1}  {severity_text} ({tone:?})");
                println!("{vitals_y:>6.1}  {vitals_text}  {time_text}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: MonitorConfig =
            toml::from_str("refresh_interval_secs = 10\n\n[report]\npage_limit = 270.0\n")
                .unwrap();
        assert_eq!(config.refresh_interval_secs, 10);
        assert_eq!(config.export_limit, 2000);
        assert_eq!(config.report.page_limit, 270.0);
        assert_eq!(config.report.top_margin, 15.0);
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), MonitorConfig::default());
    }
}
