use anyhow::{Result, bail};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, trace};

use crate::domain::{Record, total_amount};

use super::{CsvSheet, LedgerFormat, LedgerSheet, SheetData, XlsxWorkbook, resolve_amount, resolve_date};

/// Why a ledger row was left out of the record list.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The date cell matches none of the recognized representations.
    UnparseableDate(String),
    /// The value cell is not a finite number.
    InvalidValue(String),
    /// The row could not be decoded at all.
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnparseableDate(raw) => write!(f, "unparseable date '{}'", raw),
            SkipReason::InvalidValue(raw) => write!(f, "invalid value '{}'", raw),
            SkipReason::Unreadable(err) => write!(f, "unreadable row: {}", err),
        }
    }
}

/// A ledger row excluded while loading. `row` is the 1-based row number in
/// the sheet, the header being row 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: SkipReason,
}

/// Turn raw sheet rows into records.
///
/// Rows with an empty date or value are ignored. Rows whose date or value
/// cannot be interpreted are dropped and reported in the second list.
pub fn load_records(data: SheetData) -> (Vec<Record>, Vec<SkippedRow>) {
    let mut records = Vec::with_capacity(data.rows.len());
    let mut skipped = data.unreadable;

    for row in data.rows {
        if row.date.is_empty() || row.value.is_empty() {
            trace!(row = row.row, "Skipping blank row");
            continue;
        }

        let Some(date) = resolve_date(&row.date) else {
            skipped.push(SkippedRow {
                row: row.row,
                reason: SkipReason::UnparseableDate(row.date.to_field()),
            });
            continue;
        };

        let Some(amount) = resolve_amount(&row.value) else {
            skipped.push(SkippedRow {
                row: row.row,
                reason: SkipReason::InvalidValue(row.value.to_field()),
            });
            continue;
        };

        records.push(Record::new(date, amount));
    }

    skipped.sort_by_key(|s| s.row);
    (records, skipped)
}

/// The ledger: owns the backing file and the authoritative in-memory
/// record list. The file is read on open and on explicit [`reload`];
/// appends update both the file and the list.
///
/// [`reload`]: LedgerStore::reload
pub struct LedgerStore {
    sheet: Box<dyn LedgerSheet>,
    records: Vec<Record>,
    skipped: Vec<SkippedRow>,
}

impl LedgerStore {
    /// Open the ledger at `path`, creating the file (or the sheet, for
    /// workbooks) when missing, and load all records.
    pub fn open(path: impl AsRef<Path>, sheet_name: &str) -> Result<Self> {
        let path = path.as_ref();
        let sheet: Box<dyn LedgerSheet> = match LedgerFormat::from_path(path) {
            Some(LedgerFormat::Xlsx) => Box::new(XlsxWorkbook::open(path, sheet_name)?),
            Some(LedgerFormat::Csv) => Box::new(CsvSheet::open(path)?),
            None => bail!("Unsupported ledger format: {}", path.display()),
        };

        let mut store = Self {
            sheet,
            records: Vec::new(),
            skipped: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-read every record from the backing file.
    pub fn reload(&mut self) -> Result<()> {
        let data = self.sheet.read_rows()?;
        let (records, skipped) = load_records(data);

        for entry in &skipped {
            debug!(row = entry.row, reason = %entry.reason, "Skipped ledger row");
        }
        info!(
            records = records.len(),
            skipped = skipped.len(),
            path = %self.sheet.path().display(),
            "Loaded ledger"
        );

        self.records = records;
        self.skipped = skipped;
        Ok(())
    }

    /// Append one record and persist it immediately.
    pub fn append(&mut self, record: Record) -> Result<()> {
        if !record.amount.is_finite() {
            bail!("Refusing to store non-finite amount {}", record.amount);
        }
        self.sheet.append_row(&record.display_date(), record.amount)?;
        self.records.push(record);
        debug!(date = %record.date, amount = record.amount, "Appended record");
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn skipped_rows(&self) -> &[SkippedRow] {
        &self.skipped
    }

    pub fn total(&self) -> f64 {
        total_amount(&self.records)
    }

    pub fn path(&self) -> &Path {
        self.sheet.path()
    }
}
