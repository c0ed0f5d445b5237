use serde::{Serialize, Serializer};

use crate::error::CorrectionError;

/// Tolerance used when the caller does not supply one.
pub const DEFAULT_TOLERANCE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A single unparsed cell as handed over by a reader.
#[derive(Debug, Clone, PartialEq)]
pub enum RawField {
    Empty,
    Number(f64),
    Text(String),
    /// Workbook boolean. Never numeric.
    Bool(bool),
    /// Workbook date, time or duration: the serial plus the number format
    /// it is written back with.
    DateTime { serial: f64, format: String },
}

impl From<&str> for RawField {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<f64> for RawField {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<Option<f64>> for RawField {
    fn from(n: Option<f64>) -> Self {
        n.map_or(Self::Empty, Self::Number)
    }
}

impl std::fmt::Display for RawField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::DateTime { serial, .. } => write!(f, "{serial}"),
        }
    }
}

/// One row of the series to be corrected, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTargetRow {
    pub index: RawField,
    pub value: RawField,
}

/// One row of the correction table, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCorrectionRow {
    pub index: RawField,
    pub correction: RawField,
}

/// Pre-loaded rows for both sides.
#[derive(Debug, Clone, Default)]
pub struct CorrectionInput {
    pub targets: Vec<RawTargetRow>,
    pub corrections: Vec<RawCorrectionRow>,
}

// ---------------------------------------------------------------------------
// Normalized records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRecord {
    /// Position in the original input. Dense, 0..N-1.
    pub row_index: usize,
    pub index_value: Option<f64>,
    pub raw_value: Option<f64>,
}

impl TargetRecord {
    /// Both fields present, so the row takes part in matching.
    pub fn candidate(&self) -> Option<(f64, f64)> {
        Some((self.index_value?, self.raw_value?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionRecord {
    pub index_value: Option<f64>,
    pub correction_value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

/// Inclusive upper bound on `|target index - correction index|`.
///
/// Serializes as a number, or as the string `"inf"` when unbounded.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Tolerance(f64);

impl Serialize for Tolerance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.serialize_str("inf")
        }
    }
}

impl Tolerance {
    /// Rejects negative and NaN values. `+inf` is allowed and matches everything.
    pub fn new(value: f64) -> Result<Self, CorrectionError> {
        if value.is_nan() || value < 0.0 {
            return Err(CorrectionError::InvalidTolerance(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn admits(&self, distance: f64) -> bool {
        distance <= self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE)
    }
}

impl std::fmt::Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    /// Attempted, but the nearest correction was outside tolerance (or none existed).
    Unmatched,
    /// Index or value failed normalization; no match was attempted.
    NotAttempted,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matched => write!(f, "matched"),
            Self::Unmatched => write!(f, "unmatched"),
            Self::NotAttempted => write!(f, "not_attempted"),
        }
    }
}

/// One output row, one-to-one with the input target rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    pub row_index: usize,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_index: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_correction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_value: Option<f64>,
}

impl MatchResult {
    pub fn matched(row_index: usize, raw_value: f64, point: &CorrectionPoint) -> Self {
        Self {
            row_index,
            status: MatchStatus::Matched,
            matched_index: Some(point.index),
            applied_correction: Some(point.correction),
            corrected_value: Some(raw_value - point.correction),
        }
    }

    pub fn unmatched(row_index: usize) -> Self {
        Self::empty(row_index, MatchStatus::Unmatched)
    }

    pub fn not_attempted(row_index: usize) -> Self {
        Self::empty(row_index, MatchStatus::NotAttempted)
    }

    fn empty(row_index: usize, status: MatchStatus) -> Self {
        Self {
            row_index,
            status,
            matched_index: None,
            applied_correction: None,
            corrected_value: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }
}

/// A valid correction entry in the sorted lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionPoint {
    pub index: f64,
    pub correction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub target_rows: usize,
    /// Target rows with both index and value valid.
    pub attempted_count: usize,
    pub matched_count: usize,
    /// Attempted, but nothing within tolerance.
    pub unmatched_count: usize,
    pub not_attempted_count: usize,
    /// Valid correction entries after collapsing duplicate indices.
    pub lookup_size: usize,
    pub tolerance: Tolerance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionResult {
    pub diagnostics: Diagnostics,
    pub rows: Vec<MatchResult>,
}
