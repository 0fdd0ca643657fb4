use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::{LEDGER_DATE_FORMAT, parse_amount};

/// The value of a single spreadsheet cell, independent of the file format.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A native date/time value.
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Classify a raw text field (as found in CSV files).
    /// ISO date/time strings are what native date values serialize to, so
    /// they are read back as dates rather than text.
    pub fn from_text(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return CellValue::Empty;
        }
        if let Some(dt) = parse_iso_datetime(s) {
            return CellValue::DateTime(dt);
        }
        if let Ok(n) = s.parse::<f64>() {
            return CellValue::Number(n);
        }
        CellValue::Text(s.to_string())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text rendering used when a cell has to be written as a plain field.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Resolve a date cell. Three representations are recognized: a native
/// date/time value, a `DD-MM-YYYY` string, or a spreadsheet serial number.
pub fn resolve_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), LEDGER_DATE_FORMAT).ok(),
        CellValue::Number(n) => serial_to_datetime(*n).map(|dt| dt.date()),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

/// Resolve a value cell into a finite amount.
pub fn resolve_amount(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => parse_amount(s).ok(),
        _ => None,
    }
}

fn ymd_midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Last day representable in a spreadsheet, 9999-12-31, as a 1900 serial.
const MAX_SERIAL: f64 = 2_958_466.0;

/// Days between the 1900 and 1904 epochs.
const EPOCH_1904_OFFSET: f64 = 1_462.0;

/// Convert a spreadsheet serial date (1900 date system) into a date/time.
/// Serials below 60 predate the phantom 1900-02-29 and are shifted by a day.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL).contains(&serial) {
        return None;
    }
    let mut days = serial.trunc() as i64;
    if serial > 0.0 && serial < 60.0 {
        days += 1;
    }
    add_days(ymd_midnight(1899, 12, 30), days, serial.fract())
}

/// Convert a serial from a workbook using the 1904 date system, where day 0
/// is 1904-01-01 and there is no phantom leap day.
pub fn serial_1904_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL - EPOCH_1904_OFFSET).contains(&serial) {
        return None;
    }
    add_days(ymd_midnight(1904, 1, 1), serial.trunc() as i64, serial.fract())
}

fn add_days(epoch: NaiveDateTime, days: i64, fraction: f64) -> Option<NaiveDateTime> {
    let millis = (fraction * 86_400_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl From<&calamine::Data> for CellValue {
    fn from(data: &calamine::Data) -> Self {
        use calamine::Data;

        match data {
            Data::Empty => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::DateTime(dt) => {
                let parsed = if dt.is_1904() {
                    serial_1904_to_datetime(dt.as_f64())
                } else {
                    serial_to_datetime(dt.as_f64())
                };
                match parsed {
                    Some(parsed) => CellValue::DateTime(parsed),
                    None => CellValue::Number(dt.as_f64()),
                }
            }
            Data::DateTimeIso(s) => match parse_iso_datetime(s) {
                Some(parsed) => CellValue::DateTime(parsed),
                None => CellValue::Text(s.clone()),
            },
            other => CellValue::Text(other.to_string()),
        }
    }
}
