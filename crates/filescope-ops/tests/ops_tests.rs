use chrono::{Datelike, Duration};
use filescope_core::{FileRecord, local_time};
use filescope_ops::{
    CopyError, CopyOptions, CopyOutcome, FreshnessError, Granularity, check_freshness, copy_file,
    is_fresh, read_table, write_table,
};
use std::fs::{self, File, FileTimes};
use std::path::Path;
use std::time::SystemTime;
use tempfile::TempDir;

fn record(dir: &str, name: &str, size_kb: f64, score: Option<f64>) -> FileRecord {
    let report = local_time::parse("2024-02-29 23:59:59").unwrap();
    let created = report - Duration::days(400);
    FileRecord {
        directory: dir.to_string(),
        filename: name.into(),
        size_kb,
        owner: "carol".into(),
        created_at: created,
        days_since_created: 400,
        modified_at: report - Duration::days(3),
        days_since_modified: 3,
        accessed_at: report,
        days_since_accessed: 0,
        score,
        report_instant: report,
    }
}

fn set_modified(path: &Path, at: SystemTime) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_times(FileTimes::new().set_modified(at).set_accessed(at))
        .unwrap();
}

#[test]
fn test_table_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("reports/inventory.csv");
    let records = vec![
        record("/srv/a", "report, final.txt", 12.345, Some(100.0)),
        record("/srv/b", "notes.md", 0.001, Some(0.0)),
        record("/srv/b", "unscored.bin", 7.0, None),
    ];

    write_table(&path, &records).unwrap();
    let back = read_table(&path).unwrap();

    assert_eq!(back, records);
}

#[test]
fn test_table_header_and_timestamp_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("inventory.csv");
    write_table(&path, &[record("/srv", "a.txt", 1.5, Some(42.0))]).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), FileRecord::COLUMNS.join(","));

    let row = lines.next().unwrap();
    assert!(row.starts_with("/srv,a.txt,1.5,carol,"));
    assert!(row.ends_with(",2024-02-29 23:59:59"));
    assert!(lines.next().is_none());
}

#[test]
fn test_table_overwrites_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("inventory.csv");

    write_table(&path, &[record("/x", "one", 1.0, None), record("/x", "two", 2.0, None)]).unwrap();
    write_table(&path, &[record("/x", "three", 3.0, None)]).unwrap();

    let back = read_table(&path).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].filename, "three");
}

#[test]
fn test_copy_creates_destination_directories() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("source.txt");
    fs::write(&src, "payload").unwrap();
    let dst = temp.path().join("deep/er/copy.txt");

    let outcome = copy_file(&src, &dst, CopyOptions { validate_presence: true });

    assert!(outcome.is_copied());
    assert!(matches!(outcome, CopyOutcome::Copied { bytes: 7 }));
    assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
}

#[test]
fn test_copy_validate_presence_skips_missing() {
    let temp = TempDir::new().unwrap();
    let dst = temp.path().join("out/copy.txt");

    let outcome = copy_file(
        temp.path().join("absent.txt"),
        &dst,
        CopyOptions { validate_presence: true },
    );

    assert!(matches!(outcome, CopyOutcome::Skipped(CopyError::SourceAbsent { .. })));
    assert!(!dst.exists());
    assert!(!temp.path().join("out").exists());
}

#[test]
fn test_freshness_by_granularity() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("daily.csv");
    fs::write(&path, "x").unwrap();

    let modified = local_time::parse("2023-07-14 12:00:00").unwrap();
    set_modified(&path, modified.into());
    let dir = temp.path();

    assert!(check_freshness(dir, "daily.csv", Granularity::Year, 2023).unwrap());
    assert!(!check_freshness(dir, "daily.csv", Granularity::Year, 2024).unwrap());
    assert!(check_freshness(dir, "daily.csv", Granularity::YearMonth, 202307).unwrap());
    assert!(!check_freshness(dir, "daily.csv", Granularity::YearMonth, 202308).unwrap());
    assert!(check_freshness(dir, "daily.csv", Granularity::YearMonthDay, 20230714).unwrap());
    assert!(check_freshness(dir, "daily.csv", Granularity::YearMonthDay, 20230101).unwrap());
    assert!(!check_freshness(dir, "daily.csv", Granularity::YearMonthDay, 20230715).unwrap());
}

#[test]
fn test_freshness_soft_failures() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("f.txt"), "x").unwrap();
    let year = local_time::now().year() as u64;

    assert!(is_fresh(temp.path(), "f.txt", "year", year));
    assert!(!is_fresh(temp.path(), "f.txt", "decade", year));
    assert!(!is_fresh(temp.path(), "f.txt", "yearmonth", year));
    assert!(!is_fresh(temp.path(), "missing.txt", "year", year));

    assert!(matches!(
        check_freshness(temp.path(), "missing.txt", Granularity::Year, year),
        Err(FreshnessError::Unreadable { .. })
    ));
}
