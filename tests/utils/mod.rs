#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use member_cleaner::{Membership, PipelineConfig, RawStudentRow, ReferenceData, StudentRecord};
use rust_xlsxwriter::Workbook;

/// Reference file shipped with the crate
const BUNDLED_REFERENCE: &str = include_str!("../../data/reference.toml");

/// Columns of a monthly export, in export order
pub const EXPORT_COLUMNS: &[&str] = &[
    "Last Name",
    "First Name",
    "Student Code",
    "Service Type",
    "Consultant",
    "Email",
    "Mobile",
    "Start Date",
    "End Date",
    "Date of Birth",
    "Contract Status",
    "Start Level",
    "Current Level",
    "Gender",
];

/// Bundled reference data plus a consultant → center mapping for tests
#[must_use]
pub fn reference() -> Arc<ReferenceData> {
    let contents = format!("{BUNDLED_REFERENCE}\n\"SITI RAHAYU\" = \"LW\"\n");
    Arc::new(ReferenceData::from_toml_str(&contents).expect("test reference parses"))
}

/// Parse an ISO date
#[must_use]
pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

/// A raw export row with the required columns filled
#[must_use]
pub fn raw(last: &str, first: &str, code: &str, service: &str, consultant: &str) -> RawStudentRow {
    RawStudentRow {
        last_name: Some(last.to_string()),
        first_name: Some(first.to_string()),
        student_code: Some(code.to_string()),
        service_type: Some(service.to_string()),
        consultant: Some(consultant.to_string()),
        ..RawStudentRow::default()
    }
}

/// A cleaned record that passes every validation check on its own
#[must_use]
pub fn record(code: &str, name: &str, membership: Membership, center: &str, area: &str) -> StudentRecord {
    StudentRecord::new(code.to_string(), name.to_string())
        .with_membership(membership)
        .with_center(center.to_string())
        .with_area(area.to_string())
}

/// A small cleaned table covering every tier and the corporate pseudo-area
#[must_use]
pub fn valid_records() -> Vec<StudentRecord> {
    vec![
        record("DOE JANE - (GC)101", "JANE DOE", Membership::Deluxe, "GC", "JKT 2"),
        record("ROE RICK - (GO)102", "RICK ROE", Membership::Go, "Online Center", "Online Center"),
        record("LEE ANN - (KK)103", "ANN LEE", Membership::Vip, "KK", "JKT 3"),
        record("TAN BEN - CPT 104", "BEN TAN", Membership::Deluxe, "Corporate", "Corporate").with_cpt(true),
    ]
}

/// Raw rows that clean into a table passing every validation check
#[must_use]
pub fn valid_raw_rows() -> Vec<RawStudentRow> {
    vec![
        RawStudentRow {
            email: Some(" Jane.Doe@Mail.com ".to_string()),
            end_date: Some("2024-05-31".to_string()),
            ..raw("Doe", "Jane", "(DLX GC)101", "Standard", "Budi")
        },
        RawStudentRow {
            end_date: Some("2024-06-30".to_string()),
            ..raw("Roe", "Rick", "(GO)102", "Standard", "Budi")
        },
        RawStudentRow {
            end_date: Some("2024-07-31".to_string()),
            ..raw("Lee", "Ann", "(KK)103", "VIP", "Budi")
        },
        RawStudentRow {
            end_date: Some("2024-08-31".to_string()),
            ..raw("Tan", "Ben", "104", "Standard", "Zulfadli Zulfadli")
        },
        RawStudentRow {
            end_date: Some("2024-09-30".to_string()),
            ..raw("Wu", "Mei", "105", "VIP", "Siti Rahayu")
        },
    ]
}

/// Configuration rooted in a scratch folder
#[must_use]
pub fn config_in(root: &Path) -> PipelineConfig {
    PipelineConfig {
        month: "2024-05".to_string(),
        input_dir: root.join("input"),
        output_dir: root.join("output"),
        ..PipelineConfig::default()
    }
}

/// Write a monthly export the way the source system lays it out:
/// `header_rows` metadata rows, a header row, then the data rows
pub fn write_export(path: &Path, header_rows: u32, rows: &[Vec<&str>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    sheet.write_string(0, 0, "Student Export").expect("metadata cell");
    for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
        sheet
            .write_string(header_rows, col as u16, *name)
            .expect("header cell");
    }
    for (idx, row) in rows.iter().enumerate() {
        let row_num = header_rows + 1 + idx as u32;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let col = col as u16;
            match value.parse::<f64>() {
                Ok(number) => sheet.write_number(row_num, col, number),
                Err(_) => sheet.write_string(row_num, col, *value),
            }
            .expect("data cell");
        }
    }

    workbook.save(path).expect("export saved");
}

/// Export rows matching [`valid_raw_rows`], in [`EXPORT_COLUMNS`] order
#[must_use]
pub fn valid_export_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["Doe", "Jane", "(DLX GC)101", "Standard", "Budi", "jane.doe@mail.com", "+62-811", "2024-01-01", "2024-05-31", "1990-01-02", "Valid", "3", "4.5", "F"],
        vec!["Roe", "Rick", "(GO)102", "Standard", "Budi", "", "", "", "2024-06-30", "", "Valid", "", "", "M"],
        vec!["Lee", "Ann", "(KK)103", "VIP", "Budi", "", "", "", "2024-07-31", "", "Valid", "", "", "F"],
        vec!["Tan", "Ben", "104", "Standard", "Zulfadli Zulfadli", "", "", "", "2024-08-31", "", "Valid", "", "", "M"],
        vec!["Wu", "Mei", "105", "VIP", "Siti Rahayu", "", "", "", "2024-09-30", "", "Valid", "", "", "F"],
    ]
}
