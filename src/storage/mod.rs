mod cell;
mod csv_sheet;
mod store;
mod xlsx_sheet;

use anyhow::Result;
use std::path::Path;

pub use cell::*;
pub use csv_sheet::*;
pub use store::*;
pub use xlsx_sheet::*;

/// Header row of the ledger sheet.
pub const HEADER: [&str; 2] = ["Date", "Value"];

/// Default name of the ledger sheet inside a workbook.
pub const DEFAULT_SHEET: &str = "Savings";

/// File formats a ledger can be stored in, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFormat {
    Xlsx,
    Csv,
}

impl LedgerFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" => Some(LedgerFormat::Xlsx),
            "csv" => Some(LedgerFormat::Csv),
            _ => None,
        }
    }
}

/// One data row of the ledger sheet, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub row: usize,
    pub date: CellValue,
    pub value: CellValue,
}

/// Everything read from the ledger sheet below the header.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub rows: Vec<SheetRow>,
    /// Rows that could not be decoded into cells.
    pub unreadable: Vec<SkippedRow>,
}

/// A tabular file holding the ledger.
pub trait LedgerSheet {
    fn path(&self) -> &Path;

    /// Read all rows after the header from disk.
    fn read_rows(&mut self) -> Result<SheetData>;

    /// Append one `(date, amount)` row and persist it.
    fn append_row(&mut self, date: &str, amount: f64) -> Result<()>;
}
