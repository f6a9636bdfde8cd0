//! Riskflux CLI - Command-line interface for Riskfactor Flux
//!
//! Commands:
//! - summary: Metrics and chart series, optionally filtered
//! - records: Normalized records alongside the source headers
//! - validate: Report malformed rows and columns
//! - schema: List the known survey columns

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use riskfactor_flux::encoder::EnvelopeEncoder;
use riskfactor_flux::normalizer::Normalizer;
use riskfactor_flux::schema::{Column, ColumnKind};
use riskfactor_flux::{
    CsvSource, DashboardProcessor, FilterSpec, GridSource, PipelineConfig, PipelineError,
    RowSource,
};
use riskfactor_flux::{FLUX_VERSION, PRODUCER_NAME};

/// Riskflux - Aggregation engine for cervical cancer risk-factor survey dashboards
#[derive(Parser)]
#[command(name = "riskflux")]
#[command(version = FLUX_VERSION)]
#[command(about = "Aggregate risk-factor survey rows into dashboard metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics and chart series, optionally filtered
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        /// Keep records with age >= this value
        #[arg(long)]
        age_min: Option<f64>,

        /// Keep records with age <= this value
        #[arg(long)]
        age_max: Option<f64>,

        /// Keep records with exactly this number of pregnancies
        #[arg(long)]
        pregnancies: Option<f64>,

        /// Keep smokers (1) or non-smokers (0)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
        smoking: Option<u8>,

        /// Keep hormonal contraceptive users (1) or non-users (0)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
        birth_control: Option<u8>,

        /// Filter JSON file; flags given on the command line override its fields
        #[arg(long)]
        filter: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print every normalized record
    Records {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Report malformed rows and columns
    Validate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the known survey columns
    Schema {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "csv")]
    input_format: InputFormat,

    /// Pipeline configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file path (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

impl OutputArgs {
    fn encoder(&self) -> EnvelopeEncoder {
        if self.pretty {
            EnvelopeEncoder::pretty()
        } else {
            EnvelopeEncoder::new()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    /// Comma-separated values with a header line
    Csv,
    /// JSON array of rows, first row holds the column names
    Grid,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RiskfluxCliError> {
    match cli.command {
        Commands::Summary {
            source,
            age_min,
            age_max,
            pregnancies,
            smoking,
            birth_control,
            filter,
            output,
        } => {
            let overrides = FilterSpec {
                age_min,
                age_max,
                pregnancies,
                smoking: smoking.map(|v| v == 1),
                birth_control: birth_control.map(|v| v == 1),
            };
            cmd_summary(&source, filter.as_deref(), &overrides, &output)
        }

        Commands::Records { source, output } => cmd_records(&source, &output),

        Commands::Validate { source, json } => cmd_validate(&source, json),

        Commands::Schema { json } => cmd_schema(json),
    }
}

fn cmd_summary(
    source: &SourceArgs,
    filter_path: Option<&Path>,
    overrides: &FilterSpec,
    output: &OutputArgs,
) -> Result<(), RiskfluxCliError> {
    let base = match filter_path {
        Some(path) => FilterSpec::from_json(&fs::read_to_string(path)?)?,
        None => FilterSpec::new(),
    };
    let spec = base.merged_with(overrides);

    let processor = build_processor(source)?;
    let envelope = if spec.is_unconstrained() {
        processor.summary()
    } else {
        processor.filtered(&spec)
    };

    write_output(&output.output, &output.encoder().encode_to_json(&envelope)?)?;

    match envelope.error {
        Some(message) => Err(RiskfluxCliError::PipelineFailed(message)),
        None => Ok(()),
    }
}

fn cmd_records(source: &SourceArgs, output: &OutputArgs) -> Result<(), RiskfluxCliError> {
    let envelope = build_processor(source)?.records();

    write_output(&output.output, &output.encoder().encode_to_json(&envelope)?)?;

    match envelope.error {
        Some(message) => Err(RiskfluxCliError::PipelineFailed(message)),
        None => Ok(()),
    }
}

fn cmd_validate(source: &SourceArgs, json: bool) -> Result<(), RiskfluxCliError> {
    let config = load_config(source.config.as_deref())?;
    let table = open_source(source)?.fetch_raw_rows()?;
    let issues = Normalizer::new(&config).validate(&table.headers, &table.rows)?;

    let report = ValidationReport {
        total_rows: table.rows.len(),
        valid_rows: table.rows.len() - issues.len(),
        invalid_rows: issues.len(),
        unknown_columns: table
            .headers
            .iter()
            .filter(|h| Column::from_header(h.trim()).is_none())
            .cloned()
            .collect(),
        errors: issues
            .iter()
            .map(|issue| ValidationErrorDetail {
                row: issue.row,
                error: issue.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total rows:   {}", report.total_rows);
        println!("Valid rows:   {}", report.valid_rows);
        println!("Invalid rows: {}", report.invalid_rows);

        if !report.unknown_columns.is_empty() {
            println!("\nUnknown columns: {}", report.unknown_columns.join(", "));
        }

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Row {}: {}", err.row, err.error);
            }
        }
    }

    if report.invalid_rows > 0 {
        Err(RiskfluxCliError::ValidationFailed(report.invalid_rows))
    } else {
        Ok(())
    }
}

fn cmd_schema(json: bool) -> Result<(), RiskfluxCliError> {
    let columns: Vec<ColumnInfo> = Column::ALL
        .iter()
        .map(|column| ColumnInfo {
            header: column.header(),
            kind: match column.kind() {
                ColumnKind::Numeric => "numeric",
                ColumnKind::Flag => "flag",
            },
        })
        .collect();

    if json {
        let report = SchemaReport {
            producer: PRODUCER_NAME,
            version: FLUX_VERSION,
            columns,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Survey columns ({} known)", columns.len());
        println!();
        for info in &columns {
            println!("  {:<8} {}", info.kind, info.header);
        }
        println!();
        println!("Cells holding '?' or left blank are read as unknown.");
        println!("Flag columns accept 0 or 1 only.");
    }

    Ok(())
}

// Helper functions

fn build_processor(
    source: &SourceArgs,
) -> Result<DashboardProcessor<Box<dyn RowSource>>, RiskfluxCliError> {
    let config = load_config(source.config.as_deref())?;
    Ok(DashboardProcessor::with_config(open_source(source)?, &config))
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, RiskfluxCliError> {
    match path {
        Some(path) => Ok(PipelineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn open_source(source: &SourceArgs) -> Result<Box<dyn RowSource>, RiskfluxCliError> {
    let from_stdin = source.input.to_string_lossy() == "-";

    let row_source: Box<dyn RowSource> = match (source.input_format, from_stdin) {
        (InputFormat::Csv, false) => Box::new(CsvSource::from_path(&source.input)),
        (InputFormat::Csv, true) => Box::new(CsvSource::from_text(read_stdin()?)),
        (InputFormat::Grid, false) => {
            Box::new(GridSource::from_json(fs::read_to_string(&source.input)?))
        }
        (InputFormat::Grid, true) => Box::new(GridSource::from_json(read_stdin()?)),
    };

    Ok(row_source)
}

fn read_stdin() -> Result<String, RiskfluxCliError> {
    if atty::is(atty::Stream::Stdin) {
        log::warn!("reading survey rows from an interactive terminal; end input with Ctrl-D");
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn write_output(output: &Path, data: &str) -> Result<(), RiskfluxCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum RiskfluxCliError {
    Io(io::Error),
    Pipeline(PipelineError),
    Json(serde_json::Error),
    PipelineFailed(String),
    ValidationFailed(usize),
}

impl From<io::Error> for RiskfluxCliError {
    fn from(e: io::Error) -> Self {
        RiskfluxCliError::Io(e)
    }
}

impl From<PipelineError> for RiskfluxCliError {
    fn from(e: PipelineError) -> Self {
        RiskfluxCliError::Pipeline(e)
    }
}

impl From<serde_json::Error> for RiskfluxCliError {
    fn from(e: serde_json::Error) -> Self {
        RiskfluxCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RiskfluxCliError> for CliError {
    fn from(e: RiskfluxCliError) -> Self {
        match e {
            RiskfluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RiskfluxCliError::Pipeline(e) => {
                let hint = match &e {
                    PipelineError::SourceUnavailable(_) => {
                        "Check that the input exists and has a header row"
                    }
                    PipelineError::SchemaError(_) => "Run 'riskflux validate' for details",
                    PipelineError::InvalidFilter(_) => {
                        "Filter flags take 0 or 1; ages and pregnancies take numbers"
                    }
                    _ => "Check input format",
                };
                CliError {
                    code: "PIPELINE_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            RiskfluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RiskfluxCliError::PipelineFailed(message) => CliError {
                code: "PIPELINE_FAILED".to_string(),
                message,
                hint: Some("The error envelope was written to the output".to_string()),
            },
            RiskfluxCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_rows: usize,
    valid_rows: usize,
    invalid_rows: usize,
    unknown_columns: Vec<String>,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    row: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct SchemaReport {
    producer: &'static str,
    version: &'static str,
    columns: Vec<ColumnInfo>,
}

#[derive(serde::Serialize)]
struct ColumnInfo {
    header: &'static str,
    kind: &'static str,
}
