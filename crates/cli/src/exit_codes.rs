//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3       | Universal        | I/O error (unreadable or unwritable file)|
//! | 4       | Universal        | Parse error (malformed table or config)  |
//! | 60-69   | correct          | Correction job codes                     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use nearcorr_engine::CorrectionError;

// =============================================================================
// Universal (0-4)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// I/O error - input missing or unreadable, output not writable.
pub const EXIT_IO: u8 = 3;

/// Parse error - a table file could not be decoded.
pub const EXIT_PARSE: u8 = 4;

// =============================================================================
// Correct (60-69)
// =============================================================================

/// Job config is malformed or fails validation (bad tolerance, empty file name).
pub const EXIT_CORRECT_INVALID_CONFIG: u8 = 60;

/// A selected column holds no numeric value in any row.
pub const EXIT_CORRECT_COLUMN_FAILURE: u8 = 61;

/// A column reference matches no header, position, or letter in the table.
pub const EXIT_CORRECT_MISSING_COLUMN: u8 = 62;

/// Some target rows found no correction within tolerance (only with --strict).
pub const EXIT_CORRECT_UNMATCHED: u8 = 63;

// =============================================================================
// Correction Error Types
// =============================================================================

/// Map a CorrectionError to its exit code.
pub fn correction_exit_code(err: &CorrectionError) -> u8 {
    match err {
        CorrectionError::ConfigParse(_) => EXIT_CORRECT_INVALID_CONFIG,
        CorrectionError::ConfigValidation(_) => EXIT_CORRECT_INVALID_CONFIG,
        CorrectionError::InvalidTolerance(_) => EXIT_USAGE,
        CorrectionError::TotalColumnFailure { .. } => EXIT_CORRECT_COLUMN_FAILURE,
        CorrectionError::MissingColumn { .. } => EXIT_CORRECT_MISSING_COLUMN,
    }
}
