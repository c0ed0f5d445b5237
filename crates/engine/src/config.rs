use serde::Deserialize;

use crate::error::{CorrectionError, Side};
use crate::model::{Tolerance, DEFAULT_TOLERANCE};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A correction job, usually loaded from a `*.correct.toml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    pub target: TargetSource,
    pub correction: CorrectionSource,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "correction".into()
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TargetSource {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: TargetColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionSource {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: CorrectionColumns,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Target table layout. Defaults: value in column A, index in column C.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetColumns {
    #[serde(default = "default_index_col")]
    pub index: ColumnRef,
    #[serde(default = "default_target_value_col")]
    pub value: ColumnRef,
}

impl Default for TargetColumns {
    fn default() -> Self {
        Self {
            index: default_index_col(),
            value: default_target_value_col(),
        }
    }
}

/// Correction table layout. Defaults: index in column C, correction in column D.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CorrectionColumns {
    #[serde(default = "default_index_col")]
    pub index: ColumnRef,
    #[serde(default = "default_correction_col")]
    pub correction: ColumnRef,
}

impl Default for CorrectionColumns {
    fn default() -> Self {
        Self {
            index: default_index_col(),
            correction: default_correction_col(),
        }
    }
}

fn default_index_col() -> ColumnRef {
    ColumnRef::Position(2)
}

fn default_target_value_col() -> ColumnRef {
    ColumnRef::Position(0)
}

fn default_correction_col() -> ColumnRef {
    ColumnRef::Position(3)
}

/// Reference to a table column.
///
/// An integer is a 0-based position. A string is tried as an exact header
/// name, then as an all-digit position, then as a column letter (`A`, `AA`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Position(usize),
    Name(String),
}

impl ColumnRef {
    /// Resolve against a table's header row. `width` is the widest row seen.
    pub fn resolve(&self, headers: &[String], width: usize) -> Option<usize> {
        let width = width.max(headers.len());
        let in_range = |i: usize| (i < width).then_some(i);
        match self {
            Self::Position(i) => in_range(*i),
            Self::Name(name) => {
                if let Some(i) = headers.iter().position(|h| h == name) {
                    return Some(i);
                }
                if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
                    return name.parse().ok().and_then(in_range);
                }
                letter_to_col(name).and_then(in_range)
            }
        }
    }

    pub fn resolve_for(
        &self,
        side: Side,
        headers: &[String],
        width: usize,
    ) -> Result<usize, CorrectionError> {
        self.resolve(headers, width)
            .ok_or_else(|| CorrectionError::MissingColumn { side, column: self.to_string() })
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Name(n) if n.trim().is_empty())
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Position(i) => write!(f, "{}", col_to_letter(*i)),
            Self::Name(n) => write!(f, "{n}"),
        }
    }
}

impl std::str::FromStr for ColumnRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("column reference cannot be empty".into());
        }
        Ok(Self::Name(s.to_string()))
    }
}

/// Column letter to 0-based index (A -> 0, Z -> 25, AA -> 26). Up to three letters.
pub fn letter_to_col(letters: &str) -> Option<usize> {
    if letters.is_empty() || letters.len() > 3 || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let n = letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b.to_ascii_uppercase() - b'A') as usize + 1);
    Some(n - 1)
}

/// Convert column index to letter (0 -> A, 1 -> B, 26 -> AA, etc.)
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Corrected table path. Defaults to `<target>_corrected.<ext>`.
    #[serde(default)]
    pub file: Option<String>,
    /// JSON report path.
    #[serde(default)]
    pub report: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CorrectionConfig {
    pub fn from_toml(input: &str) -> Result<Self, CorrectionError> {
        let config: CorrectionConfig =
            toml::from_str(input).map_err(|e| CorrectionError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CorrectionError> {
        Tolerance::new(self.tolerance).map_err(|e| CorrectionError::ConfigValidation(e.to_string()))?;

        if self.target.file.trim().is_empty() {
            return Err(CorrectionError::ConfigValidation("target.file is empty".into()));
        }
        if self.correction.file.trim().is_empty() {
            return Err(CorrectionError::ConfigValidation("correction.file is empty".into()));
        }

        let columns = [
            ("target.columns.index", &self.target.columns.index),
            ("target.columns.value", &self.target.columns.value),
            ("correction.columns.index", &self.correction.columns.index),
            ("correction.columns.correction", &self.correction.columns.correction),
        ];
        for (key, col) in columns {
            if col.is_blank() {
                return Err(CorrectionError::ConfigValidation(format!("{key} is empty")));
            }
        }

        Ok(())
    }

    /// Validated tolerance.
    pub fn tolerance(&self) -> Result<Tolerance, CorrectionError> {
        Tolerance::new(self.tolerance)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
