//! `nearcorr correct` and `nearcorr run`: apply a correction table to a target table.

use std::path::{Path, PathBuf};

use serde::Serialize;

use nearcorr_engine::config::{CorrectionSource, OutputConfig, TargetSource};
use nearcorr_engine::model::{CorrectionInput, CorrectionResult};
use nearcorr_engine::{ColumnRef, CorrectionColumns, CorrectionConfig, TargetColumns};
use nearcorr_io::{Table, TableFormat};

use crate::exit_codes::{EXIT_CORRECT_INVALID_CONFIG, EXIT_CORRECT_UNMATCHED};
use crate::CliError;

/// Flags shared by `correct` and `run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub output: Option<PathBuf>,
    pub json: bool,
    pub report: Option<PathBuf>,
    pub strict: bool,
    pub dry_run: bool,
    pub quiet: bool,
}

/// Inline job built from `nearcorr correct` flags.
#[derive(Debug, Clone)]
pub struct InlineJob {
    pub target: PathBuf,
    pub correction: PathBuf,
    pub tolerance: f64,
    pub target_index: Option<ColumnRef>,
    pub target_value: Option<ColumnRef>,
    pub correction_index: Option<ColumnRef>,
    pub correction_value: Option<ColumnRef>,
    pub target_sheet: Option<String>,
    pub correction_sheet: Option<String>,
}

impl InlineJob {
    fn into_config(self) -> CorrectionConfig {
        let target_defaults = TargetColumns::default();
        let correction_defaults = CorrectionColumns::default();

        CorrectionConfig {
            name: self
                .target
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("correction")
                .to_string(),
            tolerance: self.tolerance,
            target: TargetSource {
                file: self.target.to_string_lossy().into_owned(),
                sheet: self.target_sheet,
                columns: TargetColumns {
                    index: self.target_index.unwrap_or(target_defaults.index),
                    value: self.target_value.unwrap_or(target_defaults.value),
                },
            },
            correction: CorrectionSource {
                file: self.correction.to_string_lossy().into_owned(),
                sheet: self.correction_sheet,
                columns: CorrectionColumns {
                    index: self.correction_index.unwrap_or(correction_defaults.index),
                    correction: self.correction_value.unwrap_or(correction_defaults.correction),
                },
            },
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ReportMeta {
    pub job_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub target_file: String,
    pub correction_file: String,
    /// Absent on --dry-run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CorrectionReport<'a> {
    pub meta: ReportMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(flatten)]
    pub result: &'a CorrectionResult,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn cmd_correct(job: InlineJob, opts: RunOptions) -> Result<(), CliError> {
    let config = job.into_config();
    // Flag values are usage errors, not config errors
    config.validate().map_err(|e| CliError::args(e.to_string()))?;
    execute(&config, Path::new(""), &opts)
}

pub fn cmd_run(config_path: PathBuf, opts: RunOptions) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    execute(&config, base_dir, &opts)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let t = &config.target.columns;
    let c = &config.correction.columns;
    eprintln!(
        "valid: job '{}' tolerance={} target={} (index {}, value {}) correction={} (index {}, correction {})",
        config.name,
        config.tolerance,
        config.target.file,
        t.index,
        t.value,
        config.correction.file,
        c.index,
        c.correction,
    );
    Ok(())
}

fn load_config(config_path: &Path) -> Result<CorrectionConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", config_path.display())))?;

    CorrectionConfig::from_toml(&config_str).map_err(|e| CliError {
        code: EXIT_CORRECT_INVALID_CONFIG,
        message: format!("{}: {e}", config_path.display()),
        hint: None,
    })
}

fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, CliError> {
    TableFormat::from_path(path).map_err(CliError::args)?;

    if !path.is_file() {
        return Err(CliError::io(format!("cannot read {}: no such file", path.display()))
            .with_hint("file paths in a job config resolve against the config file's directory"));
    }

    nearcorr_io::import_table(path, sheet).map_err(CliError::parse)
}

/// Read both tables, correct, then write outputs.
fn execute(config: &CorrectionConfig, base_dir: &Path, opts: &RunOptions) -> Result<(), CliError> {
    let tolerance = config.tolerance()?;

    let target_path = base_dir.join(&config.target.file);
    let correction_path = base_dir.join(&config.correction.file);

    let target_table = load_table(&target_path, config.target.sheet.as_deref())?;
    let correction_table = load_table(&correction_path, config.correction.sheet.as_deref())?;
    log::debug!(
        "target: {} rows, correction: {} rows",
        target_table.rows.len(),
        correction_table.rows.len()
    );

    let input = CorrectionInput {
        targets: target_table.target_rows(&config.target.columns)?,
        corrections: correction_table.correction_rows(&config.correction.columns)?,
    };

    let result = nearcorr_engine::run(&input, tolerance)?;
    let diagnostics = &result.diagnostics;

    // Output
    let output_path = match (&opts.output, &config.output.file) {
        (Some(path), _) => path.clone(),
        (None, Some(file)) => base_dir.join(file),
        (None, None) => nearcorr_io::corrected_path(&target_path).map_err(CliError::args)?,
    };

    if opts.dry_run {
        log::info!("dry run: not writing {}", output_path.display());
    } else {
        let corrected = target_table.with_results(&result.rows);
        nearcorr_io::export_table(&corrected, &output_path)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", output_path.display())))?;
        if !opts.quiet {
            eprintln!("wrote {}", output_path.display());
        }
    }

    let warning = diagnostics.warning();
    if let Some(ref w) = warning {
        log::warn!("{w}");
    }

    let report_path = opts
        .report
        .clone()
        .or_else(|| config.output.report.as_ref().map(|r| base_dir.join(r)));

    if opts.json || report_path.is_some() {
        let report = CorrectionReport {
            meta: ReportMeta {
                job_name: config.name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                target_file: target_path.display().to_string(),
                correction_file: correction_path.display().to_string(),
                output_file: (!opts.dry_run).then(|| output_path.display().to_string()),
            },
            warning,
            result: &result,
        };

        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = report_path {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::io(format!("cannot write report: {e}")))?;
            if !opts.quiet {
                eprintln!("wrote {}", path.display());
            }
        }

        if opts.json {
            println!("{json_str}");
        }
    }

    // Human summary to stderr
    if !opts.quiet {
        eprintln!("{}", diagnostics.summary_line());
    }

    if opts.strict && diagnostics.has_unmatched() {
        return Err(CliError {
            code: EXIT_CORRECT_UNMATCHED,
            message: format!("{} unmatched target row(s)", diagnostics.unmatched_count),
            hint: Some(format!("widen --tolerance (currently {tolerance}) or drop --strict")),
        });
    }

    Ok(())
}
