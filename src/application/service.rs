use chrono::{Local, NaiveDate};
use std::path::Path;
use tracing::info;

use crate::domain::{Record, parse_amount};
use crate::storage::{LedgerFormat, LedgerStore, SkippedRow};

use super::{AppError, PeriodTotal, SummaryReport, monthly_totals, summarize, weekly_totals};

/// Application service for the savings ledger.
/// This is the primary interface for any client (CLI, TUI, etc.).
pub struct LedgerService {
    store: LedgerStore,
}

impl LedgerService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Open the ledger at `path`, initializing the file or sheet if needed.
    pub fn open(path: impl AsRef<Path>, sheet_name: &str) -> Result<Self, AppError> {
        let path = path.as_ref();
        if LedgerFormat::from_path(path).is_none() {
            return Err(AppError::UnsupportedFormat(path.display().to_string()));
        }
        let store = LedgerStore::open(path, sheet_name)?;
        Ok(Self::new(store))
    }

    /// Validate `input` and record it under `date`.
    /// Invalid input leaves the ledger untouched.
    pub fn save_value(&mut self, input: &str, date: NaiveDate) -> Result<Record, AppError> {
        let amount =
            parse_amount(input).map_err(|_| AppError::InvalidAmount(input.trim().to_string()))?;

        let record = Record::new(date, amount);
        self.store.append(record)?;
        info!(date = %record.date, amount = record.amount, "Saved value");
        Ok(record)
    }

    /// Validate `input` and record it under today's local date.
    pub fn save_value_today(&mut self, input: &str) -> Result<Record, AppError> {
        self.save_value(input, Local::now().date_naive())
    }

    /// Re-read the ledger file.
    pub fn reload(&mut self) -> Result<(), AppError> {
        self.store.reload()?;
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    /// Rows dropped while loading because they could not be interpreted.
    pub fn skipped_rows(&self) -> &[SkippedRow] {
        self.store.skipped_rows()
    }

    /// Running total of every saved value.
    pub fn total(&self) -> f64 {
        self.store.total()
    }

    pub fn ledger_path(&self) -> &Path {
        self.store.path()
    }

    pub fn monthly_report(&self) -> Vec<PeriodTotal> {
        monthly_totals(self.records())
    }

    pub fn weekly_report(&self) -> Vec<PeriodTotal> {
        weekly_totals(self.records())
    }

    pub fn summary(&self) -> SummaryReport {
        summarize(self.records())
    }
}
