//! Typed view model for the patient-vitals dashboard.
//!
//! Records arrive from the monitoring API in loosely shaped JSON and are
//! resolved by `vitals-ingest` into the types defined here. Everything
//! downstream (badges, counts, filters, timelines, export reports) works on
//! these types only and never on raw strings.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod aggregate;
pub mod classify;
pub mod display;
pub mod filter;
pub mod report;
pub mod session;
pub mod timeline;

pub use aggregate::{aggregate, DashboardCounts};
pub use classify::{classify, style_for, Badge, BadgeStyle, ALERT_BADGE_TEXT};
pub use filter::{filter_patients, FilterCriteria};
pub use report::{
    paginate, ExportQuery, ExportRange, PatientReport, ReportItem, ReportLayout, ReportRow,
    ReportTone,
};
pub use session::{
    DashboardSession, DashboardView, FetchDisposition, FetchFailure, FetchTicket, FetchTrigger,
    SessionStatus,
};
pub use timeline::{
    format_timeline, RecordKind, TimelineEntry, TimelinePanel, TimelineQuery, TimelineRow,
};

/// Identifier used when a record carries no usable id.
pub const UNKNOWN_PATIENT_ID: &str = "Unknown";

/// Display name used when a record carries no usable name.
pub const UNKNOWN_PATIENT_NAME: &str = "Unknown Patient";

/// Runtime settings shared by the dashboard, detail page and export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between timer-driven dashboard refreshes.
    pub refresh_interval_secs: u64,
    /// Number of readings requested for the detail page history.
    pub history_limit: u32,
    /// Number of alerts requested for the detail page.
    pub alerts_limit: u32,
    /// Upper bound on records requested for a report export.
    pub export_limit: u32,
    /// Vertical layout of exported reports.
    pub report: ReportLayout,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 5,
            history_limit: 200,
            alerts_limit: 50,
            export_limit: 2000,
            report: ReportLayout::default(),
        }
    }
}

impl MonitorConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Record limit the transport should request for a timeline of `kind`.
    pub fn timeline_limit(&self, kind: RecordKind) -> u32 {
        match kind {
            RecordKind::Readings => self.history_limit,
            RecordKind::Alerts => self.alerts_limit,
        }
    }
}

/// Classified health-risk level of a reading.
///
/// Declared from least to most severe, so `Ord` follows clinical urgency.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Normal,
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Normal,
        Severity::Info,
        Severity::Warning,
        Severity::Critical,
    ];

    /// Single normalization point for severity text coming off the wire.
    ///
    /// Matching ignores case and surrounding whitespace. Anything that is not
    /// one of the four levels degrades to `Normal`.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or(Severity::Normal)
    }

    /// Like [`Severity::normalize`], with `fallback` used when no value was sent.
    pub fn normalize_or(raw: Option<&str>, fallback: Severity) -> Self {
        match raw {
            Some(text) if !text.trim().is_empty() => Self::normalize(text),
            _ => fallback,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal => "NORMAL",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }

    /// `Warning` and `Critical` readings need attention.
    pub fn is_elevated(self) -> bool {
        matches!(self, Severity::Warning | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One set of vital signs. Any reading may be missing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub heart_rate: Option<f64>,
    pub spo2: Option<f64>,
    pub temperature: Option<f64>,
    pub fall_detected: Option<bool>,
}

impl Vitals {
    /// `HR: 72 | SpO2: 98 | Temp: 36.6 | Fall: No`
    pub fn summary_line(&self) -> String {
        format!(
            "HR: {} | SpO2: {} | Temp: {} | Fall: {}",
            display::format_reading(self.heart_rate),
            display::format_reading(self.spo2),
            display::format_reading(self.temperature),
            display::fall_text(self.fall_detected, display::MISSING_READING),
        )
    }
}

/// Latest known state of one patient, as shown on the dashboard grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
    pub id: String,
    pub name: String,
    pub vitals: Vitals,
    pub severity: Severity,
    pub alert_active: bool,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl Default for PatientView {
    fn default() -> Self {
        Self {
            id: UNKNOWN_PATIENT_ID.to_string(),
            name: UNKNOWN_PATIENT_NAME.to_string(),
            vitals: Vitals::default(),
            severity: Severity::Normal,
            alert_active: false,
            timestamp: None,
            message: String::new(),
        }
    }
}

impl PatientView {
    /// Badge shown next to this patient.
    pub fn badge(&self) -> Badge {
        classify(self)
    }

    /// Elevated severity or an open alert.
    pub fn needs_attention(&self) -> bool {
        self.severity.is_elevated() || self.alert_active
    }
}

/// Errors raised for whole payloads. Individual records never fail.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Could not read payload: {0}")]
    Parse(String),
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
    #[error("No data to export")]
    NoExportData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_normalization_is_case_insensitive() {
        assert_eq!(Severity::normalize("critical"), Severity::Critical);
        assert_eq!(Severity::normalize(" Warning "), Severity::Warning);
        assert_eq!(Severity::normalize("INFO"), Severity::Info);
        assert_eq!(Severity::normalize("high"), Severity::Normal);
        assert_eq!(Severity::normalize(""), Severity::Normal);
    }

    #[test]
    fn missing_severity_uses_fallback() {
        assert_eq!(Severity::normalize_or(None, Severity::Info), Severity::Info);
        assert_eq!(
            Severity::normalize_or(Some("  "), Severity::Info),
            Severity::Info
        );
        assert_eq!(
            Severity::normalize_or(Some("bogus"), Severity::Info),
            Severity::Normal
        );
    }

    #[test]
    fn patient_view_serializes_with_wire_names() {
        let view = PatientView {
            severity: Severity::Warning,
            alert_active: true,
            vitals: Vitals {
                heart_rate: Some(72.0),
                ..Vitals::default()
            },
            ..PatientView::default()
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["severity"], "WARNING");
        assert_eq!(value["alertActive"], true);
        assert_eq!(value["vitals"]["heartRate"], 72.0);
        assert_eq!(value["id"], "Unknown");
    }

    #[test]
    fn vitals_summary_uses_placeholders() {
        let vitals = Vitals {
            heart_rate: Some(72.0),
            temperature: Some(36.6),
            fall_detected: Some(false),
            ..Vitals::default()
        };
        assert_eq!(
            vitals.summary_line(),
            "HR: 72 | SpO2: -- | Temp: 36.6 | Fall: No"
        );
    }

    #[test]
    fn default_config_refreshes_every_five_seconds() {
        let config = MonitorConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.timeline_limit(RecordKind::Readings), 200);
        assert_eq!(config.timeline_limit(RecordKind::Alerts), 50);
    }
}
