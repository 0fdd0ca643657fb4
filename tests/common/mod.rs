// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tally::application::LedgerService;
use tempfile::TempDir;

pub const SHEET: &str = "Savings";

/// Helper to open a ledger service on a fresh file in a temporary directory
pub fn test_service(file_name: &str) -> Result<(LedgerService, TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join(file_name);
    let service = LedgerService::open(&path, SHEET)?;
    Ok((service, temp_dir, path))
}

/// Helper to parse a YYYY-MM-DD date
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// A cell written into a fixture workbook.
#[derive(Debug, Clone, Copy)]
pub enum Fixture<'a> {
    Empty,
    Text(&'a str),
    Number(f64),
    /// Serial number formatted as a date, i.e. a native date cell
    Date(f64),
    /// Formula such as `=SUM(A1:A2)`
    Formula(&'a str),
}

/// Write a workbook with one sheet per entry; each sheet gets its rows
/// starting at A1.
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<Fixture>>)]) -> Result<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Fixture::Empty => {}
                    Fixture::Text(s) => {
                        worksheet.write_string(r, c, *s)?;
                    }
                    Fixture::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Fixture::Date(serial) => {
                        worksheet.write_number_with_format(r, c, *serial, &date_format)?;
                    }
                    Fixture::Formula(formula) => {
                        worksheet.write_formula(r, c, *formula)?;
                    }
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Standard ledger header row
pub fn header() -> Vec<Fixture<'static>> {
    vec![Fixture::Text("Date"), Fixture::Text("Value")]
}
