//! Seqlabel: a converter for animal vocalization annotations.
//!
//! Seqlabel converts between sequence annotation formats (labeled time
//! intervals over audio) through one intermediate representation (IR), and
//! serializes that IR as a validated "generic-seq" CSV table with one row
//! per segment.
//!
//! # Modules
//!
//! - [`ir`]: Intermediate representation types (Segment, Sequence, Annotation) and format adapters
//! - [`table`]: The column-oriented table and its CSV persistence
//! - [`validation`]: Schema validation of generic-seq tables
//! - [`conversion`]: Conversion reports and format dispatch
//! - [`error`]: Error types for seqlabel operations

pub mod conversion;
pub mod error;
pub mod ir;
pub mod table;
pub mod validation;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use conversion::{ConvertOptions, Format};
pub use error::SeqLabelError;

/// The seqlabel CLI application.
#[derive(Parser)]
#[command(name = "seqlabel")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a generic-seq CSV file against the table schema.
    Validate(ValidateArgs),
    /// Convert annotations between formats.
    Convert(ConvertArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Generic-seq CSV file to validate.
    input: PathBuf,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Source format.
    #[arg(long, value_enum)]
    from: ConvertFormat,

    /// Target format.
    #[arg(long, value_enum)]
    to: ConvertFormat,

    /// Output file (generic-seq, seq-json) or directory (per-file formats).
    #[arg(short, long)]
    output: PathBuf,

    /// Input files or directories (directories are searched recursively).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write annot_path and notated_path as file names only (generic-seq).
    #[arg(long)]
    basename: bool,

    /// Sample rate in Hz, used to derive seconds from TIMIT sample indices.
    #[arg(long, env = "SEQLABEL_SAMPLERATE", value_parser = clap::value_parser!(u32).range(1..))]
    samplerate: Option<u32>,

    /// Proceed even if the target format loses information.
    #[arg(long)]
    allow_lossy: bool,

    /// Output format for the conversion report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// Annotation formats accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ConvertFormat {
    /// Generic-seq CSV (one file, one row per segment).
    #[value(alias = "csv")]
    GenericSeq,
    /// The IR as JSON (one file).
    #[value(alias = "json")]
    SeqJson,
    /// TIMIT .phn files (sample indices).
    #[value(alias = "phn")]
    Timit,
    /// Audacity label tracks (.txt, seconds).
    Audacity,
    /// Simple onset_s,offset_s,label CSV files.
    SimpleSeq,
}

impl From<ConvertFormat> for Format {
    fn from(value: ConvertFormat) -> Self {
        match value {
            ConvertFormat::GenericSeq => Format::GenericSeq,
            ConvertFormat::SeqJson => Format::SeqJson,
            ConvertFormat::Timit => Format::Timit,
            ConvertFormat::Audacity => Format::Audacity,
            ConvertFormat::SimpleSeq => Format::SimpleSeq,
        }
    }
}

/// How reports are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Initializes `env_logger` at a level chosen by the `-v` count.
pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Run the seqlabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), SeqLabelError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            // No subcommand: just print help hint and exit successfully
            println!("seqlabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Converts animal vocalization annotations between formats.");
            println!();
            println!("Run 'seqlabel --help' for usage information.");
            Ok(())
        }
    }
}

/// Summary printed by `validate --output json`.
#[derive(Serialize)]
struct ValidateSummary<'a> {
    valid: bool,
    rows: usize,
    annotations: usize,
    violations: &'a [validation::SchemaViolation],
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), SeqLabelError> {
    let raw = table::io_csv::read_table_csv(&args.input)?;
    let n_rows = raw.n_rows();

    let validated = match validation::validate(raw) {
        Ok(table) => table,
        Err(err) => {
            match args.output {
                ReportFormat::Json => print_json(&ValidateSummary {
                    valid: false,
                    rows: n_rows,
                    annotations: 0,
                    violations: &err.violations,
                })?,
                ReportFormat::Text => {
                    println!("Validation failed: {} violation(s)", err.len());
                    for violation in &err.violations {
                        println!("  - {}", violation);
                    }
                }
            }
            return Err(SeqLabelError::Schema(err));
        }
    };

    // A schema-valid table can still hold rows that do not form segments.
    let annotations = ir::io_generic_seq::table_to_annotations(&validated)?;

    match args.output {
        ReportFormat::Json => print_json(&ValidateSummary {
            valid: true,
            rows: n_rows,
            annotations: annotations.len(),
            violations: &[],
        })?,
        ReportFormat::Text => {
            let columns: Vec<&str> = validated.column_names().collect();
            println!(
                "Validation passed: {} row(s), {} annotation(s)",
                n_rows,
                annotations.len()
            );
            println!("  columns: {}", columns.join(", "));
        }
    }
    Ok(())
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), SeqLabelError> {
    let from = Format::from(args.from);
    let to = Format::from(args.to);
    let opts = ConvertOptions {
        basename: args.basename,
        samplerate: args.samplerate,
    };

    let annotations = conversion::load_annotations(from, &args.inputs, &opts)?;
    let report = conversion::build_conversion_report(&annotations, from, to, &opts);

    match args.report {
        ReportFormat::Json => print_json(&report)?,
        ReportFormat::Text => print!("{}", report),
    }

    if report.is_blocked() {
        return Err(SeqLabelError::ConversionBlocked {
            from: from.name().to_string(),
            to: to.name().to_string(),
            error_count: report.error_count(),
            report: Box::new(report),
        });
    }
    if report.is_lossy() && !args.allow_lossy {
        return Err(SeqLabelError::LossyConversion {
            from: from.name().to_string(),
            to: to.name().to_string(),
            warning_count: report.warning_count(),
            report: Box::new(report),
        });
    }

    let written = conversion::save_annotations(to, &annotations, &args.output, &opts)?;
    if args.report == ReportFormat::Text {
        println!();
        println!(
            "Converted {} annotation(s) from {} to {}: {} file(s) written",
            annotations.len(),
            from.name(),
            to.name(),
            written.len()
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SeqLabelError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| SeqLabelError::SeqJsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", json);
    Ok(())
}
