// Excel import/export (xlsx, xls, xlsb, ods in; xlsx out)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use nearcorr_engine::config::col_to_letter;
use nearcorr_engine::model::RawField;
use nearcorr_engine::normalize::coerce_numeric;

use crate::table::Table;

/// Sheet name used on export when the source had none.
const DEFAULT_SHEET: &str = "Sheet1";

/// Import one worksheet. `sheet` selects by name; `None` takes the first sheet.
///
/// The first row of the used range is the header row. Columns left of the used
/// range are kept as empty columns so letter references still line up with the
/// sheet.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                format!(
                    "sheet '{}' not found (available: {})",
                    name,
                    sheet_names.join(", ")
                )
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    // Range start offset (data may not begin at A1)
    let (_, data_start_col) = range.start().unwrap_or((0, 0));
    let pad = data_start_col as usize;

    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(row) => std::iter::repeat(String::new())
            .take(pad)
            .chain(row.iter().map(header_text))
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<RawField>> = rows
        .map(|row| {
            std::iter::repeat(RawField::Empty)
                .take(pad)
                .chain(row.iter().map(cell_to_field))
                .collect()
        })
        .collect();

    log::debug!(
        "{}: sheet '{}' has {} data rows, {} columns",
        path.display(),
        sheet_name,
        rows.len(),
        headers.len()
    );

    let mut table = Table::new(headers, rows);
    table.sheet = Some(sheet_name);
    Ok(table)
}

fn cell_to_field(cell: &Data) -> RawField {
    match cell {
        Data::Empty => RawField::Empty,
        Data::String(s) => RawField::from(s.as_str()),
        Data::Float(n) => RawField::Number(*n),
        Data::Int(n) => RawField::Number(*n as f64),
        Data::Bool(b) => RawField::Bool(*b),
        Data::Error(e) => RawField::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            RawField::DateTime {
                serial,
                format: date_format(serial, dt.is_duration()).to_string(),
            }
        }
        Data::DateTimeIso(s) => RawField::Text(s.clone()),
        Data::DurationIso(s) => RawField::Text(s.clone()),
    }
}

/// Number format for a date serial, picked from which parts the serial carries.
fn date_format(serial: f64, is_duration: bool) -> &'static str {
    if is_duration {
        return "[h]:mm:ss";
    }
    let has_date = serial.floor() > 0.0;
    let has_time = serial.fract().abs() > 0.0001;
    match (has_date, has_time) {
        (true, true) => "m/d/yyyy h:mm:ss",
        (false, true) => "h:mm:ss",
        _ => "m/d/yyyy",
    }
}

fn header_text(cell: &Data) -> String {
    match cell_to_field(cell) {
        RawField::Empty => String::new(),
        RawField::Text(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Write the table as a single-sheet xlsx with a bold header row.
///
/// Workbook cells keep their kind. Numeric text from a delimited source is
/// written as numbers; text read from a workbook stays text.
pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    let mut xlsx_workbook = XlsxWorkbook::new();
    let sheet_name = table.sheet.as_deref().unwrap_or(DEFAULT_SHEET);

    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

    let header_format = Format::new().set_bold();
    for (col, header) in table.headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", header, e))?;
    }

    let numeric_text = table.delimiter.is_some();

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col16 = col as u16;
            let written = match cell {
                RawField::Empty => continue,
                RawField::Number(n) => worksheet.write_number(row_num, col16, *n),
                RawField::Bool(b) => worksheet.write_boolean(row_num, col16, *b),
                RawField::DateTime { serial, format } => {
                    let date_format = Format::new().set_num_format(format);
                    worksheet.write_number_with_format(row_num, col16, *serial, &date_format)
                }
                RawField::Text(s) => match coerce_numeric(cell).filter(|_| numeric_text) {
                    Some(n) => worksheet.write_number(row_num, col16, n),
                    None => worksheet.write_string(row_num, col16, s),
                },
            };
            written.map_err(|e| {
                format!("Failed to write cell {}{}: {}", col_to_letter(col), row_num + 1, e)
            })?;
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}
