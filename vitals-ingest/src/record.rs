//! Field resolution over loosely shaped patient records.
//!
//! Each canonical field has an ordered chain of candidate paths. The first
//! path holding a usable value wins; when none does, the field takes its
//! sentinel default. Nothing here fails on a missing container.

use serde_json::Value;
use vitals_core::{PatientView, Severity, Vitals, UNKNOWN_PATIENT_ID, UNKNOWN_PATIENT_NAME};

/// Keys walked from the record root.
pub type FieldPath = &'static [&'static str];

pub const ID_CHAIN: &[FieldPath] = &[&["patientId"], &["id"], &["_id"]];
pub const NAME_CHAIN: &[FieldPath] = &[&["patientName"], &["name"], &["patient", "name"]];
pub const VITALS_CHAIN: &[FieldPath] = &[&["vitals"], &["latest", "vitals"]];
pub const SEVERITY_CHAIN: &[FieldPath] =
    &[&["finalSeverity"], &["severity"], &["latest", "finalSeverity"]];
pub const ALERT_FLAGS: &[FieldPath] = &[&["alertActive"], &["latest", "alertActive"]];
pub const TIMESTAMP_CHAIN: &[FieldPath] = &[
    &["timestamp"],
    &["latest", "timestamp"],
    &["updatedAt"],
    &["createdAt"],
];
pub const MESSAGE_CHAIN: &[FieldPath] = &[&["message"], &["latest", "message"]];

const HEART_RATE_CHAIN: &[FieldPath] = &[&["heartRate"], &["hr"]];
const SPO2_CHAIN: &[FieldPath] = &[&["spo2"]];
const TEMPERATURE_CHAIN: &[FieldPath] = &[&["temperature"]];
const FALL_CHAIN: &[FieldPath] = &[&["fallDetected"]];

/// Borrowed view of one record of unknown shape.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    value: &'a Value,
}

impl<'a> RawRecord<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Value at `path`, if every intermediate container exists.
    pub fn at(&self, path: FieldPath) -> Option<&'a Value> {
        path.iter()
            .try_fold(self.value, |current, key| current.as_object()?.get(*key))
    }

    /// First value along `chain` that `extract` accepts.
    pub fn resolve<T>(
        &self,
        chain: &[FieldPath],
        extract: impl Fn(&'a Value) -> Option<T>,
    ) -> Option<T> {
        chain
            .iter()
            .find_map(|path| self.at(*path).and_then(&extract))
    }

    pub fn text(&self, chain: &[FieldPath]) -> Option<String> {
        self.resolve(chain, text_value)
    }

    pub fn number(&self, chain: &[FieldPath]) -> Option<f64> {
        self.resolve(chain, number_value)
    }

    /// Nested record found along `chain`.
    pub fn nested(&self, chain: &[FieldPath]) -> Option<RawRecord<'a>> {
        self.resolve(chain, |value| value.is_object().then(|| RawRecord::new(value)))
    }

    /// True when any path in `paths` holds a truthy value.
    pub fn any_truthy(&self, paths: &[FieldPath]) -> bool {
        paths
            .iter()
            .any(|path| self.at(*path).is_some_and(is_truthy))
    }

    pub fn vitals(&self) -> Vitals {
        Vitals {
            heart_rate: self.number(HEART_RATE_CHAIN),
            spo2: self.number(SPO2_CHAIN),
            temperature: self.number(TEMPERATURE_CHAIN),
            fall_detected: self.resolve(FALL_CHAIN, Value::as_bool),
        }
    }

    pub fn severity(&self, chain: &[FieldPath], fallback: Severity) -> Severity {
        Severity::normalize_or(self.text(chain).as_deref(), fallback)
    }
}

/// Non-empty strings, and non-zero numbers rendered as text. Zero is falsy
/// to the API's clients, so a chain moves past it.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if is_truthy(value) => Some(number.to_string()),
        _ => None,
    }
}

/// JSON numbers, or strings that parse as a finite number.
pub fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Truthiness as the monitoring API's JavaScript clients see it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Resolve one dashboard record into its canonical view.
pub fn resolve_patient(value: &Value) -> PatientView {
    let record = RawRecord::new(value);

    let vitals = record
        .nested(VITALS_CHAIN)
        .map(|nested| nested.vitals())
        .unwrap_or_default();

    PatientView {
        id: record
            .text(ID_CHAIN)
            .unwrap_or_else(|| UNKNOWN_PATIENT_ID.to_string()),
        name: record
            .text(NAME_CHAIN)
            .unwrap_or_else(|| UNKNOWN_PATIENT_NAME.to_string()),
        vitals,
        severity: record.severity(SEVERITY_CHAIN, Severity::Normal),
        alert_active: record.any_truthy(ALERT_FLAGS),
        timestamp: record.text(TIMESTAMP_CHAIN),
        message: record.text(MESSAGE_CHAIN).unwrap_or_default(),
    }
}
