// File I/O: tabular import, column extraction, corrected-file export

pub mod csv;
pub mod table;
pub mod xlsx;

use std::path::{Path, PathBuf};

pub use table::{Table, OUTPUT_COLUMNS};

/// Suffix inserted before the extension of the default output file.
pub const CORRECTED_SUFFIX: &str = "_corrected";

const SUPPORTED: &str = ".csv, .tsv, .txt, .xlsx, .xlsm, .xls, .xlsb, .ods";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Excel,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" => Ok(TableFormat::Csv),
            "tsv" => Ok(TableFormat::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(TableFormat::Excel),
            "" => Err(format!(
                "{}: no file extension (supported: {})",
                path.display(),
                SUPPORTED
            )),
            other => Err(format!(
                "{}: unsupported format '.{}' (supported: {})",
                path.display(),
                other,
                SUPPORTED
            )),
        }
    }

    /// Extension used when writing a table of this format.
    pub fn output_extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Tsv => "tsv",
            TableFormat::Excel => "xlsx",
        }
    }
}

/// Read a table, dispatching on the file extension.
///
/// `sheet` only applies to workbooks; delimited text ignores it.
pub fn import_table(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let format = TableFormat::from_path(path)?;
    log::debug!("importing {} as {:?}", path.display(), format);

    if sheet.is_some() && format != TableFormat::Excel {
        log::warn!("{}: sheet selection ignored for delimited text", path.display());
    }

    match format {
        TableFormat::Csv => csv::import(path),
        TableFormat::Tsv => csv::import_tsv(path),
        TableFormat::Excel => xlsx::import(path, sheet),
    }
}

/// Write a table, dispatching on the output file extension.
pub fn export_table(table: &Table, path: &Path) -> Result<(), String> {
    let format = TableFormat::from_path(path)?;
    match format {
        TableFormat::Csv => csv::export(table, path),
        TableFormat::Tsv => csv::export_tsv(table, path),
        TableFormat::Excel => {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            if !ext.eq_ignore_ascii_case("xlsx") {
                return Err(format!(
                    "{}: only .xlsx can be written for spreadsheets",
                    path.display()
                ));
            }
            xlsx::export(table, path)
        }
    }?;
    log::info!("wrote {} ({} rows)", path.display(), table.rows.len());
    Ok(())
}

/// Default output path: `<dir>/<base>_corrected.<ext>` beside the target file.
///
/// Spreadsheet inputs of any flavor are written back as xlsx.
pub fn corrected_path(target: &Path) -> Result<PathBuf, String> {
    let format = TableFormat::from_path(target)?;
    let stem = target
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("{}: invalid file name", target.display()))?;

    let name = format!("{}{}.{}", stem, CORRECTED_SUFFIX, format.output_extension());
    Ok(target.with_file_name(name))
}
