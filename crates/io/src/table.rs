// In-memory table: one header row plus raw cells.

use nearcorr_engine::config::{CorrectionColumns, TargetColumns};
use nearcorr_engine::model::{MatchResult, RawCorrectionRow, RawField, RawTargetRow};
use nearcorr_engine::{CorrectionError, Side};

/// Columns appended to the target table on export, in order.
pub const OUTPUT_COLUMNS: [&str; 3] = [
    "matched_correction_index",
    "applied_correction_value",
    "corrected_value",
];

static EMPTY: RawField = RawField::Empty;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    /// Data rows (header row excluded). Rows may be ragged.
    pub rows: Vec<Vec<RawField>>,
    /// Field delimiter the table was read with, for delimited text sources.
    pub delimiter: Option<u8>,
    /// Sheet the table was read from, for workbook sources.
    pub sheet: Option<String>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawField>>) -> Self {
        Self {
            headers,
            rows,
            delimiter: None,
            sheet: None,
        }
    }

    /// Widest row, header included.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.headers.len())
    }

    /// Cell at (row, col); missing cells in ragged rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &RawField {
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    fn column(&self, col: usize) -> impl Iterator<Item = RawField> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, col).clone())
    }

    pub fn target_rows(&self, columns: &TargetColumns) -> Result<Vec<RawTargetRow>, CorrectionError> {
        let width = self.width();
        let index = columns.index.resolve_for(Side::Target, &self.headers, width)?;
        let value = columns.value.resolve_for(Side::Target, &self.headers, width)?;

        Ok(self
            .column(index)
            .zip(self.column(value))
            .map(|(index, value)| RawTargetRow { index, value })
            .collect())
    }

    pub fn correction_rows(
        &self,
        columns: &CorrectionColumns,
    ) -> Result<Vec<RawCorrectionRow>, CorrectionError> {
        let width = self.width();
        let index = columns.index.resolve_for(Side::Correction, &self.headers, width)?;
        let correction = columns
            .correction
            .resolve_for(Side::Correction, &self.headers, width)?;

        Ok(self
            .column(index)
            .zip(self.column(correction))
            .map(|(index, correction)| RawCorrectionRow { index, correction })
            .collect())
    }

    /// Copy of this table with the three result columns filled in.
    ///
    /// A result column already present by name (a re-run on a corrected file)
    /// is overwritten in place; missing ones are appended after padding rows
    /// to a common width. Unmatched and not-attempted rows get empty cells.
    pub fn with_results(&self, results: &[MatchResult]) -> Table {
        let mut headers = self.headers.clone();
        headers.resize(self.width(), String::new());

        let mut slots = [0usize; OUTPUT_COLUMNS.len()];
        for (slot, name) in slots.iter_mut().zip(OUTPUT_COLUMNS) {
            let existing = headers.iter().position(|h| h == name);
            *slot = match existing {
                Some(col) => col,
                None => {
                    headers.push(name.to_string());
                    headers.len() - 1
                }
            };
        }
        let [index_col, applied_col, corrected_col] = slots;

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut out = row.clone();
                out.resize(headers.len(), RawField::Empty);
                let result = results.get(i);
                out[index_col] = result.and_then(|r| r.matched_index).into();
                out[applied_col] = result.and_then(|r| r.applied_correction).into();
                out[corrected_col] = result.and_then(|r| r.corrected_value).into();
                out
            })
            .collect();

        Table {
            headers,
            rows,
            delimiter: self.delimiter,
            sheet: self.sheet.clone(),
        }
    }
}
