use calamine::{open_workbook, Reader, Xlsx};
use jobscrape::{output::write_xlsx, JobRecord, SENTINEL};
use std::fs;
use std::path::{Path, PathBuf};

fn tmp_file(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("jobscrape_{}_{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p.push("jobs.xlsx");
    p
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn record(title: &str, salary: &str) -> JobRecord {
    JobRecord {
        title: title.to_string(),
        company: "Acme Inc".to_string(),
        location: "Leeds".to_string(),
        salary: salary.to_string(),
        link: "https://jobs.example.com/jobs/1".to_string(),
    }
}

#[test]
fn test_rows_follow_header_and_scrape_order() {
    let path = tmp_file("rows");
    let records = vec![record("First", "£30,000"), record("Second", SENTINEL)];

    write_xlsx(&records, &path).unwrap();
    let rows = read_rows(&path);

    assert_eq!(rows[0], vec!["Title", "Company", "Location", "Salary", "Job Link"]);
    assert_eq!(
        rows[1],
        vec!["First", "Acme Inc", "Leeds", "£30,000", "https://jobs.example.com/jobs/1"]
    );
    assert_eq!(rows[2][0], "Second");
    assert_eq!(rows[2][3], SENTINEL);
    assert_eq!(rows.len(), 3);
}

#[test]
fn test_existing_file_is_overwritten() {
    let path = tmp_file("overwrite");

    write_xlsx(&[record("Old 1", "£1"), record("Old 2", "£2")], &path).unwrap();
    write_xlsx(&[record("New", "£3")], &path).unwrap();
    let rows = read_rows(&path);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "New");
}

#[test]
fn test_empty_collection_writes_header_only() {
    let path = tmp_file("empty");

    write_xlsx(&[], &path).unwrap();
    let rows = read_rows(&path);

    assert_eq!(rows, vec![vec!["Title", "Company", "Location", "Salary", "Job Link"]]);
}
