use std::fmt;

/// Which input table a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Target,
    Correction,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => write!(f, "target"),
            Self::Correction => write!(f, "correction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CorrectionError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty file name, bad tolerance, etc.).
    ConfigValidation(String),
    /// Tolerance is negative or NaN.
    InvalidTolerance(f64),
    /// A whole column has entries but not one of them is numeric.
    TotalColumnFailure { side: Side, column: String },
    /// A configured column reference does not resolve against the table.
    MissingColumn { side: Side, column: String },
}

impl fmt::Display for CorrectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidTolerance(value) => {
                write!(f, "tolerance must be a non-negative number, got {value}")
            }
            Self::TotalColumnFailure { side, column } => {
                write!(f, "{side} table: column '{column}' has no numeric values after parsing")
            }
            Self::MissingColumn { side, column } => {
                write!(f, "{side} table: missing column '{column}'")
            }
        }
    }
}

impl std::error::Error for CorrectionError {}
