//! Monitoring API JSON to the typed dashboard view model.
//!
//! Payload functions come in pairs like the rest of the pipeline: a `_str`
//! variant that parses JSON text (and is the only place a whole payload can
//! fail), and a `Value` variant that never fails and degrades field by field.

use serde_json::Value;
use tracing::debug;
use vitals_core::{
    ExportRange, MonitorError, PatientReport, PatientView, RecordKind, TimelineEntry,
    TimelinePanel,
};

pub mod envelope;
pub mod record;
pub mod response;
pub mod timeline;

pub use envelope::{list_items, single_item, Envelope};
pub use record::{resolve_patient, RawRecord};
pub use response::{failure_from_response, failure_message, parse_body, signed_in_as, Endpoint};
pub use timeline::{resolve_entries, resolve_entry, EntryMode};

/// Parse payload text.
pub fn parse_payload(text: &str) -> Result<Value, MonitorError> {
    serde_json::from_str(text).map_err(|err| MonitorError::Parse(err.to_string()))
}

/// Resolve the dashboard list from JSON text.
pub fn resolve_patients_str(text: &str) -> Result<Vec<PatientView>, MonitorError> {
    Ok(resolve_patients(&parse_payload(text)?))
}

/// Resolve the dashboard list from a bare array, `{patients: [...]}` or
/// `{data: [...]}`.
pub fn resolve_patients(payload: &Value) -> Vec<PatientView> {
    let patients: Vec<PatientView> = list_items(payload, envelope::PATIENT_LIST_KEYS)
        .iter()
        .map(resolve_patient)
        .collect();
    debug!(count = patients.len(), "resolved patient list");
    patients
}

/// Resolve the detail page header from `{latest: {...}}`, `{data: {...}}` or
/// a bare object.
pub fn resolve_latest(payload: &Value) -> PatientView {
    resolve_patient(single_item(payload))
}

pub fn resolve_timeline_str(text: &str, kind: RecordKind) -> Result<TimelinePanel, MonitorError> {
    Ok(resolve_timeline(&parse_payload(text)?, kind))
}

/// Resolve a history or alert payload straight into display rows.
pub fn resolve_timeline(payload: &Value, kind: RecordKind) -> TimelinePanel {
    vitals_core::format_timeline(resolve_entries(payload, kind, EntryMode::Detail), kind)
}

/// Records of an export payload, in source order.
pub fn resolve_export(payload: &Value, kind: RecordKind) -> Vec<TimelineEntry> {
    resolve_entries(payload, kind, EntryMode::Export)
}

/// Build an export report for `patient_name` from JSON text.
pub fn build_report_str(
    text: &str,
    kind: RecordKind,
    range: ExportRange,
    patient_name: &str,
) -> Result<PatientReport, MonitorError> {
    build_report(&parse_payload(text)?, kind, range, patient_name)
}

pub fn build_report(
    payload: &Value,
    kind: RecordKind,
    range: ExportRange,
    patient_name: &str,
) -> Result<PatientReport, MonitorError> {
    let entries = resolve_export(payload, kind);
    PatientReport::new(patient_name, kind, range, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            resolve_patients_str("{not json"),
            Err(MonitorError::Parse(_))
        ));
    }

    #[test]
    fn latest_payload_shapes() {
        let wrapped = json!({"latest": {"patientId": "P-9", "finalSeverity": "info"}});
        let view = resolve_latest(&wrapped);
        assert_eq!(view.id, "P-9");
        assert_eq!(view.severity, vitals_core::Severity::Info);

        let bare = json!({"patientId": "P-9", "alertActive": true});
        let view = resolve_latest(&bare);
        assert_eq!(view.id, "P-9");
        assert!(view.alert_active);
    }

    #[test]
    fn empty_timeline_payload_shows_placeholder() {
        let panel = resolve_timeline(&json!({"alerts": []}), RecordKind::Alerts);
        assert_eq!(
            panel,
            TimelinePanel::Empty {
                placeholder: "No alerts"
            }
        );
    }
}
