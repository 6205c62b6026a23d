mod utils;

use member_cleaner::algorithm::taxonomy::{AreaDefinition, CenterTaxonomy};
use member_cleaner::{CleanerError, ReferenceData};

fn minimal_areas() -> Vec<AreaDefinition> {
    vec![
        AreaDefinition::new("JKT 1", &["PP", "SDC"]),
        AreaDefinition::pseudo("Corporate", &["Corporate"]),
        AreaDefinition::pseudo("Online Center", &["Online Center"]),
    ]
}

#[test]
fn test_bundled_taxonomy_areas_in_declaration_order() {
    let reference = ReferenceData::bundled().unwrap();
    let areas: Vec<&str> = reference.taxonomy.area_names().collect();

    assert_eq!(
        areas,
        vec!["JKT 1", "JKT 2", "JKT 3", "BDG", "SBY", "Other", "Corporate", "Online Center"]
    );
}

#[test]
fn test_area_of_center() {
    let reference = ReferenceData::bundled().unwrap();
    let taxonomy = &reference.taxonomy;

    assert_eq!(taxonomy.area_of("GC"), Some("JKT 2"));
    assert_eq!(taxonomy.area_of("DG"), Some("BDG"));
    assert_eq!(taxonomy.area_of("Street Talk"), Some("Other"));
    assert_eq!(taxonomy.area_of("Corporate"), Some("Corporate"));
    assert_eq!(taxonomy.area_of("XYZ"), None);
    assert!(taxonomy.contains_center("Online Center"));
    assert!(taxonomy.contains_area("SBY"));
    assert!(!taxonomy.contains_area("NONE"));
}

#[test]
fn test_pseudo_areas_are_not_markers() {
    let reference = ReferenceData::bundled().unwrap();
    let markers: Vec<&str> = reference.taxonomy.marker_codes().collect();

    assert!(markers.contains(&"PP"));
    assert!(markers.contains(&"PKW"));
    assert!(!markers.contains(&"HO"));
    assert!(!markers.contains(&"Corporate"));
    assert!(!markers.contains(&"Online Center"));
}

#[test]
fn test_duplicate_center_is_rejected() {
    let mut areas = minimal_areas();
    areas.push(AreaDefinition::new("JKT 2", &["GC", "PP"]));

    assert!(matches!(CenterTaxonomy::new(areas), Err(CleanerError::ConfigError(_))));
}

#[test]
fn test_empty_area_is_rejected() {
    let mut areas = minimal_areas();
    areas.push(AreaDefinition::new("BDG", &[]));

    assert!(CenterTaxonomy::new(areas).is_err());
}

#[test]
fn test_missing_corporate_area_is_rejected() {
    let areas = vec![
        AreaDefinition::new("JKT 1", &["PP"]),
        AreaDefinition::pseudo("Online Center", &["Online Center"]),
    ];

    assert!(CenterTaxonomy::new(areas).is_err());
}

#[test]
fn test_reference_from_json() {
    let json = r#"{
        "cpt_consultants": ["zulfadli zulfadli"],
        "consultant_centers": {"Siti Rahayu": "LW"},
        "areas": [
            {"name": "JKT 2", "centers": ["LW"]},
            {"name": "Corporate", "centers": ["Corporate"], "markers": false},
            {"name": "Online Center", "centers": ["Online Center"], "markers": false}
        ]
    }"#;
    let reference = ReferenceData::from_json_str(json).unwrap();

    assert!(reference.is_cpt_consultant("ZULFADLI ZULFADLI"));
    assert_eq!(reference.center_for_consultant("SITI RAHAYU"), Some("LW"));
    assert_eq!(reference.center_for_consultant("NOBODY"), None);
}

#[test]
fn test_fixture_reference_carries_lookup() {
    let reference = utils::reference();
    assert_eq!(reference.center_for_consultant("SITI RAHAYU"), Some("LW"));
    assert_eq!(reference.consultant_center_count(), 1);
    assert_eq!(reference.cpt_consultant_count(), 1);
}
