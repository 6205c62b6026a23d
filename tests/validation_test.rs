mod utils;

use member_cleaner::algorithm::validation::ValidationFailure;
use member_cleaner::{CleanerError, Membership, StudentRecord, ValidationSuite};

use utils::{record, valid_records};

#[test]
fn test_valid_table_passes_every_check() {
    let suite = ValidationSuite::new(utils::reference(), true);
    let report = suite.run(&valid_records());

    assert!(report.is_valid(), "{report}");
    assert!(report.into_result().is_ok());
}

#[test]
fn test_unspecified_tier_is_reported() {
    let mut records = valid_records();
    records.push(record("NEW ONE - (PP)9", "ONE NEW", Membership::Unspecified, "PP", "JKT 1"));

    assert_eq!(
        ValidationSuite::memberships_filled(&records),
        Err(ValidationFailure::MembershipsNotFilled {
            unexpected: vec!["Unspecified".to_string()],
            missing: Vec::new(),
        })
    );
}

#[test]
fn test_missing_tier_is_reported() {
    let records: Vec<StudentRecord> = valid_records()
        .into_iter()
        .filter(|r| r.membership != Membership::Go)
        .collect();

    assert_eq!(
        ValidationSuite::memberships_filled(&records),
        Err(ValidationFailure::MembershipsNotFilled {
            unexpected: Vec::new(),
            missing: vec!["Go".to_string()],
        })
    );
}

#[test]
fn test_unknown_centers_and_areas_are_listed() {
    let suite = ValidationSuite::new(utils::reference(), true);
    let mut records = valid_records();
    records.push(record("A - 1", "A", Membership::Deluxe, "NONE", "NONE"));
    records.push(record("B - 2", "B", Membership::Deluxe, "XYZ", "NONE"));
    records.push(record("C - 3", "C", Membership::Deluxe, "NONE", "NONE"));

    assert_eq!(
        suite.centers_filled(&records),
        Err(ValidationFailure::CentersNotFilled(vec!["NONE".to_string(), "XYZ".to_string()]))
    );
    assert_eq!(
        suite.areas_filled(&records),
        Err(ValidationFailure::AreasNotFilled(vec!["NONE".to_string()]))
    );
}

#[test]
fn test_cpt_outside_corporate() {
    let records = vec![
        record("A - 1", "A", Membership::Deluxe, "GC", "JKT 2").with_cpt(true),
        record("B - 2", "B", Membership::Deluxe, "Corporate", "JKT 2").with_cpt(true),
        record("C - 3", "C", Membership::Deluxe, "Corporate", "Corporate").with_cpt(true),
    ];

    assert_eq!(
        ValidationSuite::cpt_in_corporate_area(&records),
        Err(ValidationFailure::CptOutsideCorporate(vec![
            "A - 1".to_string(),
            "B - 2".to_string()
        ]))
    );
}

#[test]
fn test_non_cpt_inside_corporate() {
    let records = vec![
        record("A - 1", "A", Membership::Deluxe, "Corporate", "Corporate"),
        record("B - 2", "B", Membership::Deluxe, "GC", "Corporate"),
        record("C - 3", "C", Membership::Deluxe, "GC", "JKT 2"),
    ];

    assert_eq!(
        ValidationSuite::non_cpt_not_in_corporate_area(&records),
        Err(ValidationFailure::NonCptInCorporate(vec![
            "A - 1".to_string(),
            "B - 2".to_string()
        ]))
    );
}

#[test]
fn test_one_code_one_name_lists_codes() {
    let mut records = valid_records();
    records.push(record("DOE JANE - (GC)101", "JANE DOE FREEZE", Membership::Deluxe, "GC", "JKT 2"));

    assert_eq!(
        ValidationSuite::one_code_one_name(&records),
        Err(ValidationFailure::MultipleNamesPerCode(vec!["DOE JANE - (GC)101".to_string()]))
    );

    let without_name_check = ValidationSuite::new(utils::reference(), false);
    assert!(without_name_check.run(&records).is_valid());

    let with_name_check = ValidationSuite::new(utils::reference(), true);
    assert!(!with_name_check.run(&records).is_valid());
}

#[test]
fn test_run_collects_every_failure() {
    let suite = ValidationSuite::new(utils::reference(), true);
    let records = vec![
        record("A - 1", "A", Membership::Unspecified, "NONE", "NONE").with_cpt(true),
        record("A - 1", "B", Membership::Deluxe, "Corporate", "Corporate"),
    ];

    let report = suite.run(&records);
    let checks: Vec<&str> = report.failures.iter().map(ValidationFailure::check_name).collect();
    assert_eq!(
        checks,
        vec![
            "memberships_filled",
            "centers_filled",
            "areas_filled",
            "cpt_in_corporate_area",
            "non_cpt_not_in_corporate_area",
            "one_code_one_name",
        ]
    );

    match report.into_result() {
        Err(CleanerError::Validation(report)) => assert_eq!(report.failures.len(), 6),
        other => panic!("expected a validation error, got {other:?}"),
    }
}
