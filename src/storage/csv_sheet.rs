use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{CellValue, HEADER, LedgerSheet, SheetData, SheetRow, SkipReason, SkippedRow};

/// Ledger backed by a plain CSV file with a `Date,Value` header.
/// A CSV file holds a single table, so there is no sheet name.
pub struct CsvSheet {
    path: PathBuf,
}

impl CsvSheet {
    /// Open the file, creating it with a header when missing or empty.
    pub fn open(path: &Path) -> Result<Self> {
        let needs_header = match fs::metadata(path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot access {}", path.display()));
            }
        };

        if needs_header {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            writer.write_record(HEADER)?;
            writer.flush()?;
            info!(path = %path.display(), "Created ledger file");
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// True when the file is non-empty and does not end with a newline,
    /// e.g. after a manual edit.
    fn missing_trailing_newline(file: &mut File) -> Result<bool> {
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::Start(len - 1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }
}

fn line_of(position: Option<&csv::Position>, fallback: usize) -> usize {
    position.map_or(fallback, |p| p.line() as usize)
}

impl LedgerSheet for CsvSheet {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&mut self) -> Result<SheetData> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open {}", self.path.display()))?;

        let mut data = SheetData::default();
        for (index, result) in reader.records().enumerate() {
            // Blank lines yield no record, so the record count is only a
            // fallback for the physical line number.
            let fallback = index + 2;
            match result {
                Ok(record) => data.rows.push(SheetRow {
                    row: line_of(record.position(), fallback),
                    date: CellValue::from_text(record.get(0).unwrap_or("")),
                    value: CellValue::from_text(record.get(1).unwrap_or("")),
                }),
                Err(e) => data.unreadable.push(SkippedRow {
                    row: line_of(e.position(), fallback),
                    reason: SkipReason::Unreadable(e.to_string()),
                }),
            }
        }

        debug!(rows = data.rows.len(), path = %self.path.display(), "Read CSV ledger");
        Ok(data)
    }

    fn append_row(&mut self, date: &str, amount: f64) -> Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Cannot open {} for writing", self.path.display()))?;

        if Self::missing_trailing_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([date.to_string(), amount.to_string()])?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
