use anyhow::{Context, Result, anyhow};
use calamine::{Reader, Xlsx, open_workbook};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use umya_spreadsheet::{Spreadsheet, Worksheet};

use super::{CellValue, HEADER, LedgerSheet, SheetData, SheetRow};

/// Ledger stored in one named sheet of an `.xlsx` workbook.
///
/// Rows are read with calamine. Writes go through umya-spreadsheet, which
/// edits the workbook in place so formulas, styles and other sheets are
/// left as they were.
pub struct XlsxWorkbook {
    path: PathBuf,
    /// Sheet name as spelled in the workbook.
    sheet_name: String,
}

/// Sheet names in a workbook are unique regardless of case.
fn same_sheet(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn find_sheet_name(names: &[String], wanted: &str) -> Option<String> {
    names.iter().find(|name| same_sheet(name, wanted)).cloned()
}

fn write_header(worksheet: &mut Worksheet) {
    for (col, title) in HEADER.iter().enumerate() {
        worksheet
            .get_cell_mut((col as u32 + 1, 1))
            .set_value(title.to_string());
    }
}

fn ledger_worksheet_mut<'a>(book: &'a mut Spreadsheet, name: &str) -> Result<&'a mut Worksheet> {
    book.get_sheet_collection_mut()
        .iter_mut()
        .find(|ws| same_sheet(ws.get_name(), name))
        .with_context(|| format!("Sheet '{}' is missing", name))
}

impl XlsxWorkbook {
    /// Open the workbook, creating the file or the ledger sheet if needed.
    pub fn open(path: &Path, sheet_name: &str) -> Result<Self> {
        if !path.exists() {
            let mut book = umya_spreadsheet::new_file_empty_worksheet();
            let worksheet = book
                .new_sheet(sheet_name)
                .map_err(|e| anyhow!("Cannot create sheet '{}': {}", sheet_name, e))?;
            write_header(worksheet);
            write_book(&book, path)?;
            info!(path = %path.display(), "Created ledger file");

            return Ok(Self {
                path: path.to_path_buf(),
                sheet_name: sheet_name.to_string(),
            });
        }

        let mut workbook = open_calamine(path)?;
        let names = workbook.sheet_names();

        let Some(existing) = find_sheet_name(&names, sheet_name) else {
            let mut book = read_book(path)?;
            let worksheet = book
                .new_sheet(sheet_name)
                .map_err(|e| anyhow!("Cannot create sheet '{}': {}", sheet_name, e))?;
            write_header(worksheet);
            write_book(&book, path)?;
            info!(sheet = sheet_name, path = %path.display(), "Added ledger sheet");

            return Ok(Self {
                path: path.to_path_buf(),
                sheet_name: sheet_name.to_string(),
            });
        };

        let blank = workbook
            .worksheet_range(&existing)
            .with_context(|| format!("Cannot read sheet '{}' in {}", existing, path.display()))?
            .is_empty();
        if blank {
            let mut book = read_book(path)?;
            write_header(ledger_worksheet_mut(&mut book, &existing)?);
            write_book(&book, path)?;
            debug!(sheet = %existing, "Wrote header into blank ledger sheet");
        }

        Ok(Self {
            path: path.to_path_buf(),
            sheet_name: existing,
        })
    }
}

impl LedgerSheet for XlsxWorkbook {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&mut self) -> Result<SheetData> {
        let mut workbook = open_calamine(&self.path)?;
        let range = workbook.worksheet_range(&self.sheet_name).with_context(|| {
            format!(
                "Cannot read sheet '{}' in {}",
                self.sheet_name,
                self.path.display()
            )
        })?;

        let mut data = SheetData::default();
        let Some((last_row, _)) = range.end() else {
            return Ok(data);
        };

        // Positions are absolute, so row 0 is the header wherever the
        // used range starts.
        let cell = |row: u32, col: u32| {
            range
                .get_value((row, col))
                .map(CellValue::from)
                .unwrap_or(CellValue::Empty)
        };
        for row in 1..=last_row {
            data.rows.push(SheetRow {
                row: row as usize + 1,
                date: cell(row, 0),
                value: cell(row, 1),
            });
        }

        debug!(rows = data.rows.len(), path = %self.path.display(), "Read workbook ledger");
        Ok(data)
    }

    fn append_row(&mut self, date: &str, amount: f64) -> Result<()> {
        let mut book = read_book(&self.path)?;
        let worksheet = ledger_worksheet_mut(&mut book, &self.sheet_name)?;

        let row = worksheet.get_highest_row() + 1;
        worksheet.get_cell_mut((1, row)).set_value(date.to_string());
        worksheet.get_cell_mut((2, row)).set_value_number(amount);

        write_book(&book, &self.path)
    }
}

fn open_calamine(path: &Path) -> Result<Xlsx<std::io::BufReader<std::fs::File>>> {
    open_workbook(path).with_context(|| format!("Cannot open {}", path.display()))
}

fn read_book(path: &Path) -> Result<Spreadsheet> {
    umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| anyhow!("Cannot open {}: {}", path.display(), e))
}

fn write_book(book: &Spreadsheet, path: &Path) -> Result<()> {
    umya_spreadsheet::writer::xlsx::write(book, path)
        .map_err(|e| anyhow!("Failed to save {}: {}", path.display(), e))
}
