use anyhow::{Context, Result};
use cardio_lib::{
    config::{parse_start_time, AnalysisConfig},
    io::csv as csv_io,
    metrics::summary::Report,
    Dataset, IntervalPolicy, WaveRecord,
};
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Parser)]
#[command(
    name = "cardio",
    version,
    about = "Heart-rate and premature-wave statistics from annotated ECG waves"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
struct RecordingArgs {
    /// Recording as `type,onset_ms,offset_ms,tag` rows; `-` reads stdin
    file_path: PathBuf,
    /// Start time of recording (defaults to now)
    #[arg(long)]
    start_date: Option<String>,
    /// TOML file with analysis settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Drop degenerate RR intervals instead of failing
    #[arg(long)]
    skip_degenerate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a recording and print its premature-wave and heart-rate summary
    EcgAnalyse {
        #[command(flatten)]
        recording: RecordingArgs,
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Print the beat-to-beat heart-rate series as JSON
    BpmSeries {
        #[command(flatten)]
        recording: RecordingArgs,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::EcgAnalyse { recording, format } => cmd_ecg_analyse(&recording, format)?,
        Commands::BpmSeries { recording } => cmd_bpm_series(&recording)?,
    }
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<WaveRecord>> {
    if path == Path::new("-") {
        csv_io::read_waves_from(io::stdin().lock()).context("failed to parse stdin")
    } else {
        csv_io::read_waves(path).with_context(|| format!("failed to load {}", path.display()))
    }
}

fn load_dataset(args: &RecordingArgs) -> Result<Dataset> {
    let config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let start_time = match &args.start_date {
        Some(raw) => parse_start_time(raw)?,
        None => config
            .start_time()?
            .unwrap_or_else(|| Local::now().naive_local()),
    };
    let policy = if args.skip_degenerate {
        IntervalPolicy::Skip
    } else {
        config.degenerate_intervals
    };
    let rows = read_rows(&args.file_path)?;
    log::info!(
        "analysing {} rows from {} (start {})",
        rows.len(),
        args.file_path.display(),
        iso(&start_time)
    );
    Dataset::load_with(rows, start_time, policy)
        .with_context(|| format!("failed to analyse {}", args.file_path.display()))
}

fn cmd_ecg_analyse(args: &RecordingArgs, format: OutputFormat) -> Result<()> {
    let dataset = load_dataset(args)?;
    let report = Report::from_dataset(&dataset)?;
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Text => write_text_report(&mut out, &report)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&report)?)?,
    }
    Ok(())
}

fn write_text_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    writeln!(out, "start_time of recording: {}", iso(&report.start_time))?;
    writeln!(out, "total of premature P wave: {}", report.premature_p)?;
    writeln!(out, "total of premature QRS wave: {}", report.premature_qrs)?;
    writeln!(out, "heartbeat:")?;
    writeln!(out, "- mean: {} bpms", report.mean_bpm)?;
    writeln!(
        out,
        "- max: {} bpms, time: {}",
        report.max.bpm,
        iso(&report.max.time)
    )?;
    writeln!(
        out,
        "- min: {} bpms, time: {}",
        report.min.bpm,
        iso(&report.min.time)
    )?;
    Ok(())
}

#[derive(Serialize)]
struct SeriesEntry {
    peak_time_ms: f64,
    time: NaiveDateTime,
    bpm: f64,
}

fn cmd_bpm_series(args: &RecordingArgs) -> Result<()> {
    let dataset = load_dataset(args)?;
    let series: Vec<SeriesEntry> = dataset
        .heart_rate()
        .iter()
        .map(|point| SeriesEntry {
            peak_time_ms: point.peak_time_ms,
            time: dataset.timestamp_at(point.peak_offset()),
            bpm: point.bpm,
        })
        .collect();
    println!("{}", serde_json::to_string(&series)?);
    Ok(())
}

fn iso(ts: &NaiveDateTime) -> String {
    ts.format(ISO_FORMAT).to_string()
}
