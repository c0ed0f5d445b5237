//! Nearest-within-tolerance join between target candidates and the
//! correction lookup.

use crate::model::{CorrectionPoint, CorrectionRecord, MatchResult, TargetRecord, Tolerance};

/// Valid correction entries sorted ascending by index, one entry per index value.
///
/// Duplicate indices collapse to the first one in input order: with the
/// smaller-index-then-first tie-break no other duplicate can ever be selected.
#[derive(Debug, Clone, Default)]
pub struct CorrectionLookup {
    points: Vec<CorrectionPoint>,
}

impl CorrectionLookup {
    pub fn build(records: &[CorrectionRecord]) -> Self {
        let mut points: Vec<CorrectionPoint> = records
            .iter()
            .filter_map(|r| {
                let index = r.index_value.filter(|i| i.is_finite())?;
                let correction = r.correction_value.filter(|c| c.is_finite())?;
                Some(CorrectionPoint {
                    // -0.0 and 0.0 must land in the same run
                    index: if index == 0.0 { 0.0 } else { index },
                    correction,
                })
            })
            .collect();

        // Stable sort keeps input order within equal indices.
        points.sort_by(|a, b| a.index.total_cmp(&b.index));
        points.dedup_by(|later, first| later.index == first.index);

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CorrectionPoint] {
        &self.points
    }

    /// Nearest entry by binary search, for one-off lookups.
    pub fn nearest(&self, index: f64) -> Option<(&CorrectionPoint, f64)> {
        let upper = self.points.partition_point(|p| p.index < index);
        self.pick(upper, index)
    }

    /// Choose between the entries either side of `upper` (the first entry with
    /// `entry.index >= index`). Equal distance resolves to the lower entry.
    fn pick(&self, upper: usize, index: f64) -> Option<(&CorrectionPoint, f64)> {
        let below = upper
            .checked_sub(1)
            .and_then(|i| self.points.get(i))
            .map(|p| (p, index - p.index));
        let above = self.points.get(upper).map(|p| (p, p.index - index));

        match (below, above) {
            (Some(b), Some(a)) => Some(if a.1 < b.1 { a } else { b }),
            (b, a) => b.or(a),
        }
    }
}

/// Outcome of matching, indexed by `row_index`.
#[derive(Debug, Clone)]
pub struct MatchOutput {
    /// One slot per target row; `None` means the row was never a candidate.
    pub outcomes: Vec<Option<MatchResult>>,
    pub attempted: usize,
    pub unmatched: usize,
}

/// Match every candidate target (both fields valid) against the lookup.
///
/// Candidates are visited in ascending index order so the lookup cursor only
/// moves forward; the result does not depend on that order.
pub fn match_nearest(
    targets: &[TargetRecord],
    lookup: &CorrectionLookup,
    tolerance: Tolerance,
) -> MatchOutput {
    let mut candidates: Vec<(usize, f64, f64)> = targets
        .iter()
        .filter_map(|t| t.candidate().map(|(index, value)| (t.row_index, index, value)))
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    let slots = targets.iter().map(|t| t.row_index + 1).max().unwrap_or(0);
    let mut outcomes: Vec<Option<MatchResult>> = vec![None; slots];
    let mut unmatched = 0;
    let mut cursor = 0;
    let points = lookup.points();

    for &(row_index, index, value) in &candidates {
        while cursor < points.len() && points[cursor].index < index {
            cursor += 1;
        }

        let result = match lookup.pick(cursor, index) {
            Some((point, distance)) if tolerance.admits(distance) => {
                MatchResult::matched(row_index, value, point)
            }
            _ => {
                unmatched += 1;
                MatchResult::unmatched(row_index)
            }
        };
        outcomes[row_index] = Some(result);
    }

    MatchOutput {
        outcomes,
        attempted: candidates.len(),
        unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchStatus;

    fn corr(index: f64, correction: f64) -> CorrectionRecord {
        CorrectionRecord {
            index_value: Some(index),
            correction_value: Some(correction),
        }
    }

    fn tgt(row_index: usize, index: f64, value: f64) -> TargetRecord {
        TargetRecord {
            row_index,
            index_value: Some(index),
            raw_value: Some(value),
        }
    }

    fn tol(v: f64) -> Tolerance {
        Tolerance::new(v).unwrap()
    }

    #[test]
    fn lookup_drops_incomplete_and_sorts() {
        let records = vec![
            corr(3.0, 30.0),
            CorrectionRecord { index_value: Some(2.0), correction_value: None },
            corr(1.0, 10.0),
            CorrectionRecord { index_value: None, correction_value: Some(5.0) },
        ];
        let lookup = CorrectionLookup::build(&records);
        let idx: Vec<f64> = lookup.points().iter().map(|p| p.index).collect();
        assert_eq!(idx, vec![1.0, 3.0]);
    }

    #[test]
    fn lookup_keeps_first_of_duplicates() {
        let records = vec![corr(2.0, 1.0), corr(1.0, 9.0), corr(2.0, 2.0), corr(2.0, 3.0)];
        let lookup = CorrectionLookup::build(&records);
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.points()[1], CorrectionPoint { index: 2.0, correction: 1.0 });
    }

    #[test]
    fn nearest_prefers_lower_on_tie() {
        let lookup = CorrectionLookup::build(&[corr(6.0, 60.0), corr(4.0, 40.0)]);
        let (p, d) = lookup.nearest(5.0).unwrap();
        assert_eq!(p.index, 4.0);
        assert_eq!(d, 1.0);
    }

    #[test]
    fn nearest_at_edges() {
        let lookup = CorrectionLookup::build(&[corr(1.0, 0.0), corr(2.0, 0.0)]);
        assert_eq!(lookup.nearest(-10.0).unwrap().0.index, 1.0);
        assert_eq!(lookup.nearest(10.0).unwrap().0.index, 2.0);
        assert_eq!(lookup.nearest(2.0).unwrap().1, 0.0);
        assert!(CorrectionLookup::default().nearest(1.0).is_none());
    }

    #[test]
    fn zero_tolerance_requires_exact_equality() {
        let targets = vec![tgt(0, 5.0, 1.0)];
        let exact = CorrectionLookup::build(&[corr(5.0, 0.25)]);
        let near = CorrectionLookup::build(&[corr(5.000_000_1, 0.25)]);

        let out = match_nearest(&targets, &exact, tol(0.0));
        assert_eq!(out.unmatched, 0);
        assert_eq!(out.outcomes[0].unwrap().status, MatchStatus::Matched);

        let out = match_nearest(&targets, &near, tol(0.0));
        assert_eq!(out.unmatched, 1);
        assert_eq!(out.outcomes[0].unwrap().status, MatchStatus::Unmatched);
    }

    #[test]
    fn empty_lookup_leaves_every_candidate_unmatched() {
        let targets = vec![tgt(0, 1.0, 1.0), tgt(1, 2.0, 2.0)];
        let out = match_nearest(&targets, &CorrectionLookup::default(), tol(100.0));
        assert_eq!(out.attempted, 2);
        assert_eq!(out.unmatched, 2);
    }

    #[test]
    fn non_candidates_get_no_slot_value() {
        let targets = vec![
            tgt(0, 1.0, 1.0),
            TargetRecord { row_index: 1, index_value: None, raw_value: Some(3.0) },
        ];
        let lookup = CorrectionLookup::build(&[corr(1.0, 0.5)]);
        let out = match_nearest(&targets, &lookup, tol(0.5));
        assert_eq!(out.attempted, 1);
        assert!(out.outcomes[1].is_none());
    }

    #[test]
    fn cursor_scan_handles_unsorted_targets() {
        let targets = vec![tgt(0, 9.0, 0.0), tgt(1, 1.0, 0.0), tgt(2, 5.1, 0.0)];
        let lookup = CorrectionLookup::build(&[corr(1.0, 1.0), corr(5.0, 5.0), corr(9.0, 9.0)]);
        let out = match_nearest(&targets, &lookup, tol(0.5));
        let picked: Vec<f64> = out
            .outcomes
            .iter()
            .map(|o| o.unwrap().matched_index.unwrap())
            .collect();
        assert_eq!(picked, vec![9.0, 1.0, 5.0]);
    }
}
