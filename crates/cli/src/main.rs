// nearcorr CLI - nearest-neighbor correction of tabular series

mod correct;
mod exit_codes;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use nearcorr_engine::{ColumnRef, CorrectionError, DEFAULT_TOLERANCE};

use correct::{InlineJob, RunOptions};
use exit_codes::{correction_exit_code, EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "nearcorr")]
#[command(about = "Subtract the nearest correction within tolerance from each target row")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress the summary, warnings and "wrote" notes
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct a target table from a correction table given on the command line
    #[command(after_help = "\
Examples:
  nearcorr correct --target run1.csv --correction offsets.csv
  nearcorr correct --target run1.xlsx --correction cal.xlsx --tolerance 0.25
  nearcorr correct --target run1.csv --correction cal.csv --target-index depth --target-value reading
  nearcorr correct --target run1.csv --correction cal.csv --json --dry-run
  nearcorr correct --target run1.csv --correction cal.csv --strict -o corrected.csv

Columns accept a header name, a 0-based position, or a column letter.
Defaults: target value A, target index C, correction index C, correction D.")]
    Correct {
        /// Target table (csv, tsv, xlsx, xls, xlsb, ods)
        #[arg(long)]
        target: PathBuf,

        /// Correction table (csv, tsv, xlsx, xls, xlsb, ods)
        #[arg(long)]
        correction: PathBuf,

        /// Maximum index distance for a match (inclusive)
        #[arg(long, default_value_t = DEFAULT_TOLERANCE, allow_negative_numbers = true)]
        tolerance: f64,

        /// Target index column
        #[arg(long, value_name = "COL")]
        target_index: Option<ColumnRef>,

        /// Target value column
        #[arg(long, value_name = "COL")]
        target_value: Option<ColumnRef>,

        /// Correction index column
        #[arg(long, value_name = "COL")]
        correction_index: Option<ColumnRef>,

        /// Correction value column
        #[arg(long, value_name = "COL")]
        correction_value: Option<ColumnRef>,

        /// Sheet to read from a target workbook (default: first sheet)
        #[arg(long)]
        target_sheet: Option<String>,

        /// Sheet to read from a correction workbook (default: first sheet)
        #[arg(long)]
        correction_sheet: Option<String>,

        /// Corrected table path (default: <target>_corrected.<ext>)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Run a correction job from a TOML config file
    #[command(after_help = "\
Examples:
  nearcorr run calibration.correct.toml
  nearcorr run calibration.correct.toml --json
  nearcorr run calibration.correct.toml --report report.json --strict")]
    Run {
        /// Path to the .correct.toml config file
        config: PathBuf,

        /// Corrected table path (overrides [output].file)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Validate a correction job config without running
    #[command(after_help = "\
Examples:
  nearcorr validate calibration.correct.toml")]
    Validate {
        /// Path to the .correct.toml config file
        config: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Print the JSON report to stdout
    #[arg(long)]
    json: bool,

    /// Write the JSON report to a file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Exit 63 when any target row finds no correction within tolerance
    #[arg(long)]
    strict: bool,

    /// Compute and report without writing the corrected table
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    fn into_options(self, output: Option<PathBuf>, quiet: bool) -> RunOptions {
        RunOptions {
            output,
            json: self.json,
            report: self.report,
            strict: self.strict,
            dry_run: self.dry_run,
            quiet,
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  nearcorr-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  nearcorr-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// Logs go to stderr. `RUST_LOG` applies only without -v/-q.
fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Correct {
            target,
            correction,
            tolerance,
            target_index,
            target_value,
            correction_index,
            correction_value,
            target_sheet,
            correction_sheet,
            output,
            run,
        } => correct::cmd_correct(
            InlineJob {
                target,
                correction,
                tolerance,
                target_index,
                target_value,
                correction_index,
                correction_value,
                target_sheet,
                correction_sheet,
            },
            run.into_options(output, cli.quiet),
        ),
        Commands::Run { config, output, run } => {
            correct::cmd_run(config, run.into_options(output, cli.quiet))
        }
        Commands::Validate { config } => correct::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<CorrectionError> for CliError {
    fn from(err: CorrectionError) -> Self {
        let code = correction_exit_code(&err);
        let hint = match &err {
            CorrectionError::MissingColumn { side, .. } => Some(format!(
                "use a header name, 0-based position, or column letter (--{side}-index / --{side}-value)"
            )),
            CorrectionError::TotalColumnFailure { .. } => {
                Some("check the column selection; every value failed to parse as a number".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
