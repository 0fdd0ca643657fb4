mod common;

use anyhow::Result;
use calamine::{Data, Reader, Xlsx, open_workbook};
use common::{Fixture, SHEET, date, header, write_workbook};
use std::fs;
use tally::domain::Record;
use tally::storage::{LedgerStore, SkipReason};
use tempfile::TempDir;

#[test]
fn test_new_workbook_has_header() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.xlsx");

    let store = LedgerStore::open(&path, SHEET)?;
    assert!(path.exists());
    assert!(store.records().is_empty());

    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    assert_eq!(workbook.sheet_names(), vec![SHEET.to_string()]);
    let range = workbook.worksheet_range(SHEET)?;
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Date".into())));
    assert_eq!(range.get_value((0, 1)), Some(&Data::String("Value".into())));
    assert_eq!(range.height(), 1);

    Ok(())
}

#[test]
fn test_append_then_load_round_trip_xlsx() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.xlsx");

    let mut store = LedgerStore::open(&path, SHEET)?;
    store.append(Record::new(date("2024-01-05"), 10.0))?;
    let last = Record::new(date("2024-01-06"), 12.34);
    store.append(last)?;

    let reopened = LedgerStore::open(&path, SHEET)?;
    assert_eq!(reopened.records().len(), 2);
    assert_eq!(reopened.records().last(), Some(&last));
    assert_eq!(reopened.records(), store.records());

    // Dates are written as DD-MM-YYYY strings
    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    let range = workbook.worksheet_range(SHEET)?;
    assert_eq!(
        range.get_value((1, 0)),
        Some(&Data::String("05-01-2024".into()))
    );
    assert_eq!(range.get_value((2, 1)), Some(&Data::Float(12.34)));

    Ok(())
}

#[test]
fn test_reads_all_date_representations() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.xlsx");

    write_workbook(
        &path,
        &[(
            SHEET,
            vec![
                header(),
                // native date cell
                vec![Fixture::Date(45296.0), Fixture::Number(1.0)],
                // display string
                vec![Fixture::Text("06-01-2024"), Fixture::Number(2.0)],
                // bare serial number
                vec![Fixture::Number(45297.0), Fixture::Number(4.0)],
                // value typed with a comma
                vec![Fixture::Text("07-01-2024"), Fixture::Text("8,5")],
            ],
        )],
    )?;

    let store = LedgerStore::open(&path, SHEET)?;
    assert_eq!(
        store.records(),
        &[
            Record::new(date("2024-01-05"), 1.0),
            Record::new(date("2024-01-06"), 2.0),
            Record::new(date("2024-01-06"), 4.0),
            Record::new(date("2024-01-07"), 8.5),
        ]
    );
    assert!(store.skipped_rows().is_empty());

    Ok(())
}

#[test]
fn test_unparseable_and_blank_rows_skipped() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.xlsx");

    write_workbook(
        &path,
        &[(
            SHEET,
            vec![
                header(),
                vec![Fixture::Text("05-01-2024"), Fixture::Number(10.0)],
                vec![Fixture::Text("2024/01/06"), Fixture::Number(99.0)],
                vec![Fixture::Empty, Fixture::Number(50.0)],
                vec![Fixture::Text("07-01-2024"), Fixture::Empty],
                vec![Fixture::Text("08-01-2024"), Fixture::Number(5.0)],
            ],
        )],
    )?;

    let store = LedgerStore::open(&path, SHEET)?;
    assert_eq!(store.records().len(), 2);
    assert_eq!(store.total(), 15.0);

    // Blank rows are ignored; only the malformed date is reported
    assert_eq!(store.skipped_rows().len(), 1);
    assert_eq!(store.skipped_rows()[0].row, 3);
    assert_eq!(
        store.skipped_rows()[0].reason,
        SkipReason::UnparseableDate("2024/01/06".into())
    );

    Ok(())
}

#[test]
fn test_missing_sheet_is_added_and_other_sheets_kept() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.xlsx");

    write_workbook(
        &path,
        &[(
            "Notes",
            vec![
                vec![Fixture::Text("hello")],
                vec![Fixture::Empty, Fixture::Number(42.0)],
            ],
        )],
    )?;

    let mut store = LedgerStore::open(&path, SHEET)?;
    store.append(Record::new(date("2024-03-01"), 3.0))?;

    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    assert_eq!(
        workbook.sheet_names(),
        vec!["Notes".to_string(), SHEET.to_string()]
    );

    let notes = workbook.worksheet_range("Notes")?;
    assert_eq!(notes.get_value((0, 0)), Some(&Data::String("hello".into())));
    assert_eq!(notes.get_value((1, 1)), Some(&Data::Float(42.0)));

    let ledger = workbook.worksheet_range(SHEET)?;
    assert_eq!(ledger.get_value((0, 0)), Some(&Data::String("Date".into())));
    assert_eq!(
        ledger.get_value((1, 0)),
        Some(&Data::String("01-03-2024".into()))
    );

    Ok(())
}

#[test]
fn test_existing_sheet_reused_as_is() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.xlsx");

    // Older header naming is kept, no migration
    write_workbook(
        &path,
        &[(
            SHEET,
            vec![
                vec![Fixture::Text("Data"), Fixture::Text("Valor")],
                vec![Fixture::Text("02-02-2024"), Fixture::Number(7.0)],
            ],
        )],
    )?;

    let mut store = LedgerStore::open(&path, SHEET)?;
    assert_eq!(store.records(), &[Record::new(date("2024-02-02"), 7.0)]);
    store.append(Record::new(date("2024-02-03"), 1.0))?;

    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    let range = workbook.worksheet_range(SHEET)?;
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Data".into())));
    assert_eq!(range.height(), 3);

    Ok(())
}

#[test]
fn test_append_keeps_formulas_and_date_cells() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.xlsx");

    write_workbook(
        &path,
        &[
            (
                SHEET,
                vec![
                    header(),
                    vec![Fixture::Date(45296.0), Fixture::Number(1.0)],
                ],
            ),
            (
                "Budget",
                vec![
                    vec![Fixture::Number(100.0)],
                    vec![Fixture::Number(250.0)],
                    vec![Fixture::Formula("=SUM(A1:A2)")],
                ],
            ),
        ],
    )?;

    let mut store = LedgerStore::open(&path, SHEET)?;
    store.append(Record::new(date("2024-01-06"), 2.0))?;

    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    assert_eq!(
        workbook.sheet_names(),
        vec![SHEET.to_string(), "Budget".to_string()]
    );

    let formulas = workbook.worksheet_formula("Budget")?;
    let formula = formulas.get_value((2, 0)).cloned().unwrap_or_default();
    assert!(formula.contains("SUM(A1:A2)"), "formula lost: {formula:?}");

    // The existing date cell is still a native date, not a bare number
    let ledger = workbook.worksheet_range(SHEET)?;
    assert!(matches!(ledger.get_value((1, 0)), Some(Data::DateTime(_))));
    assert_eq!(
        ledger.get_value((2, 0)),
        Some(&Data::String("06-01-2024".into()))
    );

    let reopened = LedgerStore::open(&path, SHEET)?;
    assert_eq!(
        reopened.records(),
        &[
            Record::new(date("2024-01-05"), 1.0),
            Record::new(date("2024-01-06"), 2.0),
        ]
    );

    Ok(())
}

#[test]
fn test_sheet_name_matches_regardless_of_case() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.xlsx");

    let mut store = LedgerStore::open(&path, SHEET)?;
    store.append(Record::new(date("2024-01-05"), 10.0))?;

    let mut lower = LedgerStore::open(&path, "savings")?;
    assert_eq!(lower.records(), store.records());
    lower.append(Record::new(date("2024-01-06"), 5.0))?;

    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    assert_eq!(workbook.sheet_names(), vec![SHEET.to_string()]);
    assert_eq!(workbook.worksheet_range(SHEET)?.height(), 3);

    let reopened = LedgerStore::open(&path, "SAVINGS")?;
    assert_eq!(reopened.total(), 15.0);

    Ok(())
}

#[test]
fn test_csv_skipped_row_is_physical_line() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.csv");

    fs::write(&path, "Date,Value\n05-01-2024,1\n\n\nbad,2\n06-01-2024,3\n")?;

    let store = LedgerStore::open(&path, SHEET)?;
    assert_eq!(store.records().len(), 2);
    assert_eq!(store.skipped_rows().len(), 1);
    assert_eq!(store.skipped_rows()[0].row, 5);
    assert_eq!(
        store.skipped_rows()[0].reason,
        SkipReason::UnparseableDate("bad".into())
    );

    Ok(())
}

#[test]
fn test_csv_ledger_round_trip() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.csv");

    let mut store = LedgerStore::open(&path, SHEET)?;
    assert_eq!(fs::read_to_string(&path)?, "Date,Value\n");

    store.append(Record::new(date("2024-01-05"), 10.0))?;
    store.append(Record::new(date("2024-01-06"), 2.5))?;
    assert_eq!(
        fs::read_to_string(&path)?,
        "Date,Value\n05-01-2024,10\n06-01-2024,2.5\n"
    );

    let reopened = LedgerStore::open(&path, SHEET)?;
    assert_eq!(
        reopened.records().last(),
        Some(&Record::new(date("2024-01-06"), 2.5))
    );

    Ok(())
}

#[test]
fn test_csv_ledger_mixed_dates() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.csv");

    // Hand-edited file without a trailing newline
    fs::write(
        &path,
        "Date,Value\n2024-01-05 00:00:00,1\n45297,2\nnext tuesday,3\n07-01-2024,\"4,5\"",
    )?;

    let mut store = LedgerStore::open(&path, SHEET)?;
    assert_eq!(
        store.records(),
        &[
            Record::new(date("2024-01-05"), 1.0),
            Record::new(date("2024-01-06"), 2.0),
            Record::new(date("2024-01-07"), 4.5),
        ]
    );
    assert_eq!(store.skipped_rows().len(), 1);
    assert_eq!(store.skipped_rows()[0].row, 4);

    store.append(Record::new(date("2024-01-08"), 1.0))?;
    store.reload()?;
    assert_eq!(store.records().len(), 4);
    assert!(fs::read_to_string(&path)?.ends_with("\"4,5\"\n08-01-2024,1\n"));

    Ok(())
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ledger.txt");
    assert!(LedgerStore::open(&path, SHEET).is_err());
    assert!(!path.exists());
}
