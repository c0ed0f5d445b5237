use crate::matcher::MatchOutput;
use crate::model::{MatchResult, TargetRecord};

/// Re-assemble results in the original target order, one per target row.
///
/// Rows that were never candidates come out as `not_attempted`.
pub fn project(targets: &[TargetRecord], output: &MatchOutput) -> Vec<MatchResult> {
    targets
        .iter()
        .map(|t| {
            output
                .outcomes
                .get(t.row_index)
                .copied()
                .flatten()
                .unwrap_or_else(|| MatchResult::not_attempted(t.row_index))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrectionPoint, MatchStatus};

    #[test]
    fn restores_input_order_and_fills_gaps() {
        let targets: Vec<TargetRecord> = (0..3)
            .map(|i| TargetRecord { row_index: i, index_value: None, raw_value: None })
            .collect();
        let point = CorrectionPoint { index: 1.0, correction: 1.0 };
        let output = MatchOutput {
            outcomes: vec![
                Some(MatchResult::unmatched(0)),
                None,
                Some(MatchResult::matched(2, 5.0, &point)),
            ],
            attempted: 2,
            unmatched: 1,
        };

        let rows = project(&targets, &output);
        let statuses: Vec<MatchStatus> = rows.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![MatchStatus::Unmatched, MatchStatus::NotAttempted, MatchStatus::Matched]
        );
        assert_eq!(rows[2].corrected_value, Some(4.0));
        for (i, r) in rows.iter().enumerate() {
            assert_eq!(r.row_index, i);
        }
    }
}
