use std::fs;

use serde_json::Value;
use vitals_core::{aggregate, classify, filter_patients, DashboardCounts, FilterCriteria};
use vitals_ingest::resolve_patients_str;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn load(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture should be readable")
}

#[test]
fn dashboard_payload_matches_golden_view() {
    let patients = resolve_patients_str(&load("dashboard_patients.json"))
        .expect("fixture should resolve");

    let actual = serde_json::to_value(&patients).expect("view should serialize");
    let expected: Value =
        serde_json::from_str(&load("dashboard_patients_view.json")).expect("golden is valid JSON");

    assert_eq!(actual, expected);
}

#[test]
fn dashboard_counts_and_badges() {
    let patients = resolve_patients_str(&load("dashboard_patients.json")).unwrap();

    assert_eq!(
        aggregate(&patients),
        DashboardCounts {
            total: 5,
            critical: 2,
            normal: 2,
            active_devices: 5,
        }
    );

    let badges: Vec<(&str, &str)> = patients
        .iter()
        .map(|patient| {
            let badge = classify(patient);
            (badge.text, badge.css_class())
        })
        .collect();
    assert_eq!(
        badges,
        [
            ("ALERT", "b-critical"),
            ("CRITICAL", "b-critical"),
            ("WARNING", "b-warning"),
            ("NORMAL", "b-normal"),
            ("NORMAL", "b-normal"),
        ]
    );
}

#[test]
fn dashboard_filters_without_refetch() {
    let patients = resolve_patients_str(&load("dashboard_patients.json")).unwrap();

    let warnings = filter_patients(&patients, &FilterCriteria::new("", true));
    let names: Vec<&str> = warnings.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Amira Haddad", "Jonas Berg", "Lina Ortiz"]);

    let by_id = filter_patients(&patients, &FilterCriteria::new(" 65F0 ", false));
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].name, "Jonas Berg");

    let both = filter_patients(&patients, &FilterCriteria::new("p-100", true));
    let ids: Vec<&str> = both.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["P-1001"]);
}
