use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format used for dates written to the ledger.
pub const LEDGER_DATE_FORMAT: &str = "%d-%m-%Y";

/// A single daily value recorded in the ledger.
/// Records are immutable once persisted and are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub amount: f64,
}

impl Record {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }

    /// Date as it is written to the ledger file, e.g. "05-01-2024".
    pub fn display_date(&self) -> String {
        self.date.format(LEDGER_DATE_FORMAT).to_string()
    }
}

/// Sum of all amounts in the ledger.
pub fn total_amount(records: &[Record]) -> f64 {
    records.iter().map(|r| r.amount).sum()
}
