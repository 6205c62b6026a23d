mod utils;

use std::collections::BTreeSet;

use member_cleaner::models::StreetTalkPolicy;
use member_cleaner::{CleanerError, CleaningPipeline, Membership, PipelineConfig, RawStudentRow, ReferenceData};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use utils::raw;

const SURNAMES: &[&str] = &["WU", "LIM", "TAN", "ONG", "YAP"];
const GIVEN: &[&str] = &["ANA", "BEN", "MEI", "RIA", "TOM"];
const END_DATES: &[&str] = &["2024-05-31", "2024-06-30", "31/07/2024"];

/// One person per index, cycling through every classification path, each
/// with one to three enrollments on random end dates
fn synthetic_rows(rng: &mut StdRng, people: usize) -> Vec<RawStudentRow> {
    let mut rows = Vec::new();
    for i in 0..people {
        let last = SURNAMES[rng.random_range(0..SURNAMES.len())];
        let first = GIVEN[rng.random_range(0..GIVEN.len())];
        let (code, service, consultant) = match i % 5 {
            0 => (format!("(DLX GC){i}"), "Standard", "Budi"),
            1 => (format!("(GO){i}"), "Standard", "Budi"),
            2 => (format!("(KK){i}"), "VIP", "Budi"),
            3 => (format!("{i}"), "Standard", "Zulfadli Zulfadli"),
            _ => (format!("{i}"), "VIP", "Siti Rahayu"),
        };

        for _ in 0..rng.random_range(1..=3) {
            rows.push(RawStudentRow {
                end_date: Some(END_DATES[rng.random_range(0..END_DATES.len())].to_string()),
                email: Some(format!("{}.{}@mail.com", first, last)),
                ..raw(last, first, &code, service, consultant)
            });
        }
    }
    rows
}

fn pipeline() -> CleaningPipeline {
    CleaningPipeline::new(&PipelineConfig::default(), utils::reference())
}

#[test]
fn test_valid_rows_pass() {
    let (records, stats) = pipeline().run(&utils::valid_raw_rows()).unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(stats.raw_rows, 5);
    assert_eq!(stats.output_rows, 5);
    assert_eq!(stats.cpt_rows, 1);
    assert_eq!(stats.tiers.get(&Membership::Deluxe), Some(&2));
    assert_eq!(stats.tiers.get(&Membership::Go), Some(&1));
    assert_eq!(stats.tiers.get(&Membership::Vip), Some(&2));
    assert_eq!(stats.center_rules.get("consultant-lookup"), Some(&1));
    assert_eq!(stats.unresolved_total(), 0);

    let wu = records.iter().find(|r| r.student_code == "WU MEI - 105").unwrap();
    assert_eq!(wu.center, "LW");
    assert_eq!(wu.area, "JKT 2");
}

#[test]
fn test_output_keeps_source_order() {
    let (records, _) = pipeline().run(&utils::valid_raw_rows()).unwrap();
    let codes: Vec<&str> = records.iter().map(|r| r.student_code.as_str()).collect();

    assert_eq!(
        codes,
        vec![
            "DOE JANE - (DLX GC)101",
            "ROE RICK - (GO)102",
            "LEE ANN - (KK)103",
            "TAN BEN - 104",
            "WU MEI - 105",
        ]
    );
}

#[test]
fn test_rerun_is_identical() {
    let mut rng = StdRng::seed_from_u64(42);
    let rows = synthetic_rows(&mut rng, 60);
    let pipeline = pipeline();

    let (first, first_stats) = pipeline.run(&rows).unwrap();
    let (second, second_stats) = pipeline.run(&rows).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
}

#[test]
fn test_invariants_hold_on_shuffled_input() {
    let mut rng = StdRng::seed_from_u64(7);
    let rows = synthetic_rows(&mut rng, 60);
    let reference = utils::reference();
    let pipeline = CleaningPipeline::new(&PipelineConfig::default(), reference.clone());

    let (baseline, _) = pipeline.run(&rows).unwrap();
    let baseline_codes: BTreeSet<String> = baseline.iter().map(|r| r.student_code.clone()).collect();

    for _ in 0..5 {
        let mut shuffled = rows.clone();
        shuffled.shuffle(&mut rng);
        let (records, _) = pipeline.run(&shuffled).unwrap();

        let codes: BTreeSet<String> = records.iter().map(|r| r.student_code.clone()).collect();
        assert_eq!(codes, baseline_codes);
        assert_invariants(&reference, &records);
    }
}

fn assert_invariants(reference: &ReferenceData, records: &[member_cleaner::StudentRecord]) {
    let mut keys = BTreeSet::new();
    for record in records {
        assert!(record.membership.is_valid());
        assert_eq!(record.is_cpt, record.center == "Corporate");
        assert_eq!(record.is_cpt, record.area == "Corporate");
        assert_eq!(reference.taxonomy.area_of(&record.center), Some(record.area.as_str()));
        assert!(
            keys.insert((record.student_code.clone(), record.end_date)),
            "duplicate enrollment for {}",
            record.student_code
        );
    }
}

#[test]
fn test_street_talk_policies_change_row_count() {
    let mut rows = utils::valid_raw_rows();
    rows.push(raw("Ong", "Ria", "Street Talk 7", "Standard", "Budi"));

    let classify = pipeline();
    let (records, _) = classify.run(&rows).unwrap();
    let street = records.iter().find(|r| r.student_code.contains("Street Talk")).unwrap();
    assert_eq!(street.center, "Street Talk");
    assert_eq!(street.area, "Other");

    let config = PipelineConfig {
        street_talk: StreetTalkPolicy::Exclude,
        ..PipelineConfig::default()
    };
    let exclude = CleaningPipeline::new(&config, utils::reference());
    let (records, stats) = exclude.run(&rows).unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(stats.dedup.street_talk_dropped, 1);
}

#[test]
fn test_unresolved_duplicate_names_abort_the_run() {
    // surname left blank and both names typed into the given-name column:
    // same code "DOE JANE - (DLX GC)101", different name "DOE JANE"
    let swapped = RawStudentRow {
        last_name: None,
        email: Some("other@mail.com".to_string()),
        end_date: Some("2024-12-31".to_string()),
        ..raw("", "Doe Jane", "(DLX GC)101", "Standard", "Budi")
    };

    let mut rows = utils::valid_raw_rows();
    rows.push(swapped.clone());

    let (_, stats) = pipeline().clean(&rows);
    assert_eq!(stats.dedup.unresolved_codes, vec!["DOE JANE - (DLX GC)101".to_string()]);

    match pipeline().run(&rows) {
        Err(CleanerError::Validation(report)) => {
            assert_eq!(report.failures.len(), 1);
            assert_eq!(report.failures[0].check_name(), "one_code_one_name");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }

    // an invalid contract settles the clash when the emails differ
    let mut rows = utils::valid_raw_rows();
    rows.push(RawStudentRow {
        contract_status: Some("Invalid".to_string()),
        ..swapped
    });
    let (records, stats) = pipeline().run(&rows).unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(stats.dedup.disambiguation_dropped, 1);
}
