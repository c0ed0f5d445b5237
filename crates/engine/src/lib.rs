//! `nearcorr-engine`: nearest-neighbor correction engine.
//!
//! Pure engine crate: receives pre-loaded rows, returns corrected rows in
//! input order plus diagnostics. No CLI or IO dependencies.

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod projection;

pub use config::{ColumnRef, CorrectionColumns, CorrectionConfig, TargetColumns};
pub use engine::{apply, run};
pub use error::{CorrectionError, Side};
pub use model::{
    CorrectionInput, CorrectionRecord, CorrectionResult, Diagnostics, MatchResult, MatchStatus,
    RawCorrectionRow, RawField, RawTargetRow, TargetRecord, Tolerance, DEFAULT_TOLERANCE,
};
