use crate::matcher::{CorrectionLookup, MatchOutput};
use crate::model::{Diagnostics, Tolerance};

/// Counts for one run, taken from the match pass.
pub fn compute_diagnostics(
    target_rows: usize,
    lookup: &CorrectionLookup,
    output: &MatchOutput,
    tolerance: Tolerance,
) -> Diagnostics {
    Diagnostics {
        target_rows,
        attempted_count: output.attempted,
        matched_count: output.attempted - output.unmatched,
        unmatched_count: output.unmatched,
        not_attempted_count: target_rows - output.attempted,
        lookup_size: lookup.len(),
        tolerance,
    }
}

impl Diagnostics {
    pub fn has_unmatched(&self) -> bool {
        self.unmatched_count > 0
    }

    /// Human-readable warning, present only when some attempted rows went unmatched.
    pub fn warning(&self) -> Option<String> {
        self.has_unmatched().then(|| {
            format!(
                "{} of {} target rows had no correction match within tolerance={}.",
                self.unmatched_count, self.attempted_count, self.tolerance
            )
        })
    }

    /// One-line summary for stderr.
    pub fn summary_line(&self) -> String {
        format!(
            "{} target rows: {} matched, {} unmatched, {} not attempted ({} correction points)",
            self.target_rows,
            self.matched_count,
            self.unmatched_count,
            self.not_attempted_count,
            self.lookup_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(attempted: usize, unmatched: usize) -> Diagnostics {
        Diagnostics {
            target_rows: 5,
            attempted_count: attempted,
            matched_count: attempted - unmatched,
            unmatched_count: unmatched,
            not_attempted_count: 5 - attempted,
            lookup_size: 2,
            tolerance: Tolerance::default(),
        }
    }

    #[test]
    fn warning_only_when_unmatched() {
        assert!(diag(3, 0).warning().is_none());
        assert_eq!(
            diag(3, 1).warning().unwrap(),
            "1 of 3 target rows had no correction match within tolerance=0.5."
        );
    }

    #[test]
    fn counts_from_match_output() {
        let output = MatchOutput { outcomes: vec![], attempted: 4, unmatched: 1 };
        let d = compute_diagnostics(6, &CorrectionLookup::default(), &output, Tolerance::default());
        assert_eq!(d.matched_count, 3);
        assert_eq!(d.not_attempted_count, 2);
        assert_eq!(d.lookup_size, 0);
        assert!(d.summary_line().starts_with("6 target rows: 3 matched"));
    }
}
