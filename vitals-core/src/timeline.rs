//! Patient detail timelines: reading history and alert history.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::display::{self, MISSING_READING};
use crate::{Badge, MonitorConfig, MonitorError, Severity, Vitals};

/// Which per-patient record stream a timeline or export covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Readings,
    Alerts,
}

impl RecordKind {
    /// Severity assumed when a record carries none.
    pub fn default_severity(self) -> Severity {
        match self {
            RecordKind::Readings => Severity::Normal,
            RecordKind::Alerts => Severity::Info,
        }
    }

    pub fn empty_placeholder(self) -> &'static str {
        match self {
            RecordKind::Readings => "No readings",
            RecordKind::Alerts => "No alerts",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RecordKind::Readings => "Readings",
            RecordKind::Alerts => "Alerts",
        }
    }
}

impl FromStr for RecordKind {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "readings" | "history" => Ok(RecordKind::Readings),
            "alerts" => Ok(RecordKind::Alerts),
            other => Err(MonitorError::Parse(format!(
                "unknown record kind {other:?}, expected readings or alerts"
            ))),
        }
    }
}

/// Transport parameters for a detail page timeline request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineQuery {
    pub kind: RecordKind,
    pub limit: u32,
}

impl TimelineQuery {
    pub fn new(kind: RecordKind, config: &MonitorConfig) -> Self {
        Self {
            kind,
            limit: config.timeline_limit(kind),
        }
    }

    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![("limit", self.limit.to_string())]
    }
}

/// One point in a patient's history, newest first as delivered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub vitals: Vitals,
    pub severity: Severity,
    pub timestamp: Option<String>,
    pub message: Option<String>,
    /// Set by [`format_timeline`] on position 0 only.
    #[serde(default)]
    pub is_latest: bool,
}

/// A timeline entry with its display strings.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRow {
    #[serde(flatten)]
    pub entry: TimelineEntry,
    pub badge: Badge,
    pub time_text: String,
    pub heart_rate_text: String,
    pub spo2_text: String,
    pub temperature_text: String,
    pub fall_text: &'static str,
}

impl TimelineRow {
    fn from_entry(entry: TimelineEntry) -> Self {
        let vitals = entry.vitals;
        Self {
            badge: Badge::for_severity(entry.severity),
            time_text: display::format_timestamp(entry.timestamp.as_deref()),
            heart_rate_text: display::format_reading(vitals.heart_rate),
            spo2_text: display::format_reading(vitals.spo2),
            temperature_text: display::format_reading(vitals.temperature),
            fall_text: display::fall_text(vitals.fall_detected, MISSING_READING),
            entry,
        }
    }
}

/// What a timeline panel currently shows.
///
/// `Empty` means the source answered with no records; it is never used for
/// a pending or failed request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum TimelinePanel {
    Loading,
    Failed { message: String },
    Empty { placeholder: &'static str },
    Rows { rows: Vec<TimelineRow> },
}

impl TimelinePanel {
    pub fn rows(&self) -> &[TimelineRow] {
        match self {
            TimelinePanel::Rows { rows } => rows,
            _ => &[],
        }
    }
}

/// Build display rows, flagging the first entry as the latest.
///
/// Entries are trusted to be newest-first already and are not re-sorted.
pub fn format_timeline(entries: Vec<TimelineEntry>, kind: RecordKind) -> TimelinePanel {
    if entries.is_empty() {
        return TimelinePanel::Empty {
            placeholder: kind.empty_placeholder(),
        };
    }

    let rows = entries
        .into_iter()
        .enumerate()
        .map(|(index, mut entry)| {
            entry.is_latest = index == 0;
            TimelineRow::from_entry(entry)
        })
        .collect();

    TimelinePanel::Rows { rows }
}
