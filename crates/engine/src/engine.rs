use crate::diagnostics::compute_diagnostics;
use crate::error::CorrectionError;
use crate::matcher::{match_nearest, CorrectionLookup};
use crate::model::{
    CorrectionInput, CorrectionRecord, CorrectionResult, TargetRecord, Tolerance,
};
use crate::normalize::{normalize_corrections, normalize_targets};
use crate::projection::project;

/// Normalize both sides, then correct. Column failures abort before matching.
pub fn run(input: &CorrectionInput, tolerance: Tolerance) -> Result<CorrectionResult, CorrectionError> {
    let corrections = normalize_corrections(&input.corrections)?;
    let targets = normalize_targets(&input.targets)?;
    Ok(apply(&targets, &corrections, tolerance))
}

/// Correct already-normalized records. Never fails: an empty lookup just
/// leaves every candidate unmatched.
pub fn apply(
    targets: &[TargetRecord],
    corrections: &[CorrectionRecord],
    tolerance: Tolerance,
) -> CorrectionResult {
    let lookup = CorrectionLookup::build(corrections);
    log::debug!(
        "correction lookup: {} valid of {} rows",
        lookup.len(),
        corrections.len()
    );

    let output = match_nearest(targets, &lookup, tolerance);
    let diagnostics = compute_diagnostics(targets.len(), &lookup, &output, tolerance);
    log::debug!(
        "matched {} of {} candidates (tolerance={})",
        diagnostics.matched_count,
        diagnostics.attempted_count,
        tolerance
    );

    CorrectionResult {
        rows: project(targets, &output),
        diagnostics,
    }
}
