//! Numeric coercion of raw fields.
//!
//! Individual cells never fail: anything that is not a finite number becomes
//! `None`. Only a column where *every* entry fails is an error.

use crate::error::{CorrectionError, Side};
use crate::model::{CorrectionRecord, RawCorrectionRow, RawField, RawTargetRow, TargetRecord};

/// Coerce one raw field to a finite number, or `None`.
pub fn coerce_numeric(field: &RawField) -> Option<f64> {
    let n = match field {
        RawField::Empty | RawField::Bool(_) => return None,
        RawField::Number(n) => *n,
        RawField::DateTime { serial, .. } => *serial,
        RawField::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    n.is_finite().then_some(n)
}

/// Index values additionally fold `-0.0` into `0.0` so equal keys sort together.
fn coerce_index(field: &RawField) -> Option<f64> {
    coerce_numeric(field).map(|n| if n == 0.0 { 0.0 } else { n })
}

/// Normalize target rows, assigning `row_index` from input position.
pub fn normalize_targets(rows: &[RawTargetRow]) -> Result<Vec<TargetRecord>, CorrectionError> {
    let records: Vec<TargetRecord> = rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| TargetRecord {
            row_index,
            index_value: coerce_index(&row.index),
            raw_value: coerce_numeric(&row.value),
        })
        .collect();

    check_column(Side::Target, "index", records.iter().map(|r| r.index_value))?;
    check_column(Side::Target, "value", records.iter().map(|r| r.raw_value))?;
    Ok(records)
}

pub fn normalize_corrections(
    rows: &[RawCorrectionRow],
) -> Result<Vec<CorrectionRecord>, CorrectionError> {
    let records: Vec<CorrectionRecord> = rows
        .iter()
        .map(|row| CorrectionRecord {
            index_value: coerce_index(&row.index),
            correction_value: coerce_numeric(&row.correction),
        })
        .collect();

    check_column(Side::Correction, "index", records.iter().map(|r| r.index_value))?;
    check_column(Side::Correction, "correction", records.iter().map(|r| r.correction_value))?;
    Ok(records)
}

/// A column with entries but no numeric value is structurally wrong input.
/// An empty column (zero rows) passes.
fn check_column(
    side: Side,
    column: &str,
    mut values: impl ExactSizeIterator<Item = Option<f64>>,
) -> Result<(), CorrectionError> {
    if values.len() > 0 && values.all(|v| v.is_none()) {
        return Err(CorrectionError::TotalColumnFailure {
            side,
            column: column.into(),
        });
    }
    Ok(())
}
