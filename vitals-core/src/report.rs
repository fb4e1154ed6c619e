//! Export reports: flat rows, date ranges and page layout.
//!
//! The PDF collaborator draws exactly what [`paginate`] emits: each item
//! carries its vertical offset in millimetres, and a [`ReportItem::PageBreak`]
//! tells it to start a new page before the next row.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::display::{self, parse_timestamp};
use crate::{MonitorConfig, MonitorError, RecordKind, Severity, TimelineEntry};

/// Text colour family for a report row. Kept apart from the dashboard badge
/// styles: reports only distinguish three tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportTone {
    Critical,
    Warning,
    Default,
}

impl ReportTone {
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => ReportTone::Critical,
            Severity::Warning => ReportTone::Warning,
            Severity::Normal | Severity::Info => ReportTone::Default,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ReportTone::Critical => (200, 0, 0),
            ReportTone::Warning => (180, 120, 0),
            ReportTone::Default => (0, 0, 0),
        }
    }
}

/// One exported reading or alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub severity: Severity,
    pub heart_rate: Option<f64>,
    pub spo2: Option<f64>,
    pub temperature: Option<f64>,
    pub fall_detected: Option<bool>,
    pub timestamp: Option<String>,
    pub tone: ReportTone,
}

impl From<&TimelineEntry> for ReportRow {
    fn from(entry: &TimelineEntry) -> Self {
        Self {
            severity: entry.severity,
            heart_rate: entry.vitals.heart_rate,
            spo2: entry.vitals.spo2,
            temperature: entry.vitals.temperature,
            fall_detected: entry.vitals.fall_detected,
            timestamp: entry.timestamp.clone(),
            tone: ReportTone::for_severity(entry.severity),
        }
    }
}

impl ReportRow {
    pub fn severity_line(&self) -> String {
        format!("Severity: {}", self.severity)
    }

    pub fn vitals_line(&self) -> String {
        format!(
            "HR: {} | SpO2: {} | Temp: {} | Fall: {}",
            display::format_reading(self.heart_rate),
            display::format_reading(self.spo2),
            display::format_reading(self.temperature),
            display::fall_text(self.fall_detected, display::MISSING_READING),
        )
    }

    pub fn time_text(&self) -> String {
        display::format_timestamp(self.timestamp.as_deref())
    }
}

/// Inclusive `from`/`to` bounds picked on the detail page. Either side may
/// be open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRange {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    from_label: Option<String>,
    to_label: Option<String>,
}

impl ExportRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parse picker values. Blank or absent values leave that side open.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, MonitorError> {
        let (from, from_label) = parse_bound("from", from)?;
        let (to, to_label) = parse_bound("to", to)?;

        if let (Some(start), Some(end)) = (from, to) {
            if start > end {
                return Err(MonitorError::InvalidRange(format!(
                    "from {start} is after to {end}"
                )));
            }
        }

        Ok(Self {
            from,
            to,
            from_label,
            to_label,
        })
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    pub fn is_bounded(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Whether a record stamped `timestamp` falls inside the range.
    ///
    /// With any bound set, records without a readable timestamp are left out.
    pub fn contains(&self, timestamp: Option<&str>) -> bool {
        if !self.is_bounded() {
            return true;
        }

        let Some(at) = timestamp.and_then(parse_timestamp) else {
            return false;
        };

        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }

    /// `Range: 2024-03-01 to Any`
    pub fn label(&self) -> String {
        format!(
            "Range: {} to {}",
            self.from_label.as_deref().unwrap_or("Any"),
            self.to_label.as_deref().unwrap_or("Any")
        )
    }
}

fn parse_bound(
    side: &str,
    raw: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<String>), MonitorError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok((None, None));
    };

    let at = parse_timestamp(raw)
        .ok_or_else(|| MonitorError::InvalidRange(format!("cannot read {side} date {raw:?}")))?;
    Ok((Some(at), Some(raw.to_string())))
}

/// Query parameters the transport sends when fetching records for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportQuery {
    pub kind: RecordKind,
    pub limit: u32,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ExportQuery {
    pub fn new(kind: RecordKind, range: &ExportRange, config: &MonitorConfig) -> Self {
        Self {
            kind,
            limit: config.export_limit,
            from: range.from(),
            to: range.to(),
        }
    }

    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        if let Some(from) = self.from {
            pairs.push(("from", from.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        if let Some(to) = self.to {
            pairs.push(("to", to.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        pairs
    }
}

/// Vertical metrics of an exported A4 page, in millimetres.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportLayout {
    /// Offset of the first line on every page.
    pub top_margin: f64,
    /// A row starting below this offset moves to a new page.
    pub page_limit: f64,
    pub title_advance: f64,
    pub range_advance: f64,
    pub severity_advance: f64,
    pub vitals_advance: f64,
    pub rule_advance: f64,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            top_margin: 15.0,
            page_limit: 280.0,
            title_advance: 10.0,
            range_advance: 10.0,
            severity_advance: 7.0,
            vitals_advance: 8.0,
            rule_advance: 8.0,
        }
    }
}

/// Drawing directive handed to the PDF collaborator.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReportItem {
    Title {
        text: String,
        y: f64,
    },
    Range {
        text: String,
        y: f64,
    },
    PageBreak,
    #[serde(rename_all = "camelCase")]
    Row {
        index: usize,
        tone: ReportTone,
        severity_text: String,
        vitals_text: String,
        time_text: String,
        severity_y: f64,
        vitals_y: f64,
        rule_y: f64,
    },
}

/// A filtered, ready-to-draw export for one patient.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientReport {
    pub patient_name: String,
    pub kind: RecordKind,
    pub range: ExportRange,
    pub rows: Vec<ReportRow>,
}

impl PatientReport {
    /// Keep the entries inside `range`. An export with nothing left fails
    /// with [`MonitorError::NoExportData`].
    pub fn new(
        patient_name: &str,
        kind: RecordKind,
        range: ExportRange,
        entries: &[TimelineEntry],
    ) -> Result<Self, MonitorError> {
        let rows: Vec<ReportRow> = entries
            .iter()
            .filter(|entry| range.contains(entry.timestamp.as_deref()))
            .map(ReportRow::from)
            .collect();

        if rows.is_empty() {
            return Err(MonitorError::NoExportData);
        }

        let patient_name = match patient_name.trim() {
            "" => "Patient".to_string(),
            name => name.to_string(),
        };

        Ok(Self {
            patient_name,
            kind,
            range,
            rows,
        })
    }

    /// `Jane Doe - Readings`
    pub fn title(&self) -> String {
        format!("{} - {}", self.patient_name, self.kind.title())
    }

    /// `Jane Doe-Readings-2024-03-01.pdf`
    pub fn file_name(&self, generated_on: NaiveDate) -> String {
        format!(
            "{}-{}-{}.pdf",
            self.patient_name,
            self.kind.title(),
            generated_on.format("%Y-%m-%d")
        )
    }
}

/// Lay the report out top to bottom, breaking pages as rows overflow.
pub fn paginate(report: &PatientReport, layout: &ReportLayout) -> Vec<ReportItem> {
    let mut items = Vec::with_capacity(report.rows.len() + 2);
    let mut y = layout.top_margin;

    items.push(ReportItem::Title {
        text: report.title(),
        y,
    });
    y += layout.title_advance;

    items.push(ReportItem::Range {
        text: report.range.label(),
        y,
    });
    y += layout.range_advance;

    for (index, row) in report.rows.iter().enumerate() {
        if y > layout.page_limit {
            items.push(ReportItem::PageBreak);
            y = layout.top_margin;
        }

        let severity_y = y;
        y += layout.severity_advance;
        let vitals_y = y;
        y += layout.vitals_advance;
        let rule_y = y;
        y += layout.rule_advance;

        items.push(ReportItem::Row {
            index,
            tone: row.tone,
            severity_text: row.severity_line(),
            vitals_text: row.vitals_line(),
            time_text: row.time_text(),
            severity_y,
            vitals_y,
            rule_y,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vitals;

    fn entry(severity: Severity, timestamp: &str) -> TimelineEntry {
        TimelineEntry {
            severity,
            timestamp: Some(timestamp.to_string()),
            vitals: Vitals {
                heart_rate: Some(88.0),
                spo2: Some(97.0),
                temperature: Some(36.9),
                fall_detected: Some(false),
            },
            ..TimelineEntry::default()
        }
    }

    #[test]
    fn tones_follow_three_tiers() {
        assert_eq!(ReportTone::for_severity(Severity::Critical).rgb(), (200, 0, 0));
        assert_eq!(ReportTone::for_severity(Severity::Warning).rgb(), (180, 120, 0));
        assert_eq!(ReportTone::for_severity(Severity::Info), ReportTone::Default);
        assert_eq!(ReportTone::for_severity(Severity::Normal), ReportTone::Default);
    }

    #[test]
    fn blank_bounds_are_unbounded() {
        let range = ExportRange::parse(Some(""), None).unwrap();
        assert!(!range.is_bounded());
        assert!(range.contains(None));
        assert!(range.contains(Some("garbage")));
        assert_eq!(range.label(), "Range: Any to Any");
    }

    #[test]
    fn bounded_range_is_inclusive() {
        let range = ExportRange::parse(Some("2024-03-01"), Some("2024-03-02T12:00")).unwrap();
        assert!(range.contains(Some("2024-03-01T00:00:00Z")));
        assert!(range.contains(Some("2024-03-02T12:00:00Z")));
        assert!(!range.contains(Some("2024-02-29T23:59:59Z")));
        assert!(!range.contains(Some("2024-03-02T12:00:01Z")));
        assert!(!range.contains(Some("garbage")));
        assert!(!range.contains(None));
        assert_eq!(range.label(), "Range: 2024-03-01 to 2024-03-02T12:00");
    }

    #[test]
    fn reversed_or_unreadable_bounds_fail() {
        assert!(matches!(
            ExportRange::parse(Some("2024-03-05"), Some("2024-03-01")),
            Err(MonitorError::InvalidRange(_))
        ));
        assert!(matches!(
            ExportRange::parse(Some("last week"), None),
            Err(MonitorError::InvalidRange(_))
        ));
    }

    #[test]
    fn export_query_pairs() {
        let range = ExportRange::parse(Some("2024-03-01"), None).unwrap();
        let query = ExportQuery::new(RecordKind::Alerts, &range, &MonitorConfig::default());
        assert_eq!(
            query.pairs(),
            vec![
                ("limit", "2000".to_string()),
                ("from", "2024-03-01T00:00:00.000Z".to_string()),
            ]
        );
    }

    #[test]
    fn empty_export_is_an_error() {
        let range = ExportRange::parse(Some("2025-01-01"), None).unwrap();
        let entries = vec![entry(Severity::Normal, "2024-03-01T08:00:00Z")];
        assert!(matches!(
            PatientReport::new("Jane", RecordKind::Readings, range, &entries),
            Err(MonitorError::NoExportData)
        ));
    }

    #[test]
    fn report_naming() {
        let entries = vec![entry(Severity::Warning, "2024-03-01T08:00:00Z")];
        let report =
            PatientReport::new("  ", RecordKind::Alerts, ExportRange::unbounded(), &entries)
                .unwrap();
        assert_eq!(report.title(), "Patient - Alerts");
        let day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(report.file_name(day), "Patient-Alerts-2024-03-02.pdf");
        assert_eq!(report.rows[0].tone, ReportTone::Warning);
        assert_eq!(
            report.rows[0].vitals_line(),
            "HR: 88 | SpO2: 97 | Temp: 36.9 | Fall: No"
        );
    }

    #[test]
    fn rows_overflow_onto_new_pages() {
        let entries: Vec<TimelineEntry> = (0..12)
            .map(|i| entry(Severity::Critical, &format!("2024-03-01T{:02}:00:00Z", i)))
            .collect();
        let report =
            PatientReport::new("Jane", RecordKind::Readings, ExportRange::unbounded(), &entries)
                .unwrap();
        let items = paginate(&report, &ReportLayout::default());

        // Header ends at 35mm and each row takes 23mm, so rows 0..=10 start at
        // or above 265mm and row 11 would start at 288mm.
        let breaks: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches!(item, ReportItem::PageBreak))
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(breaks, vec![13]);

        match &items[14] {
            ReportItem::Row {
                index, severity_y, ..
            } => {
                assert_eq!(*index, 11);
                assert_eq!(*severity_y, 15.0);
            }
            other => panic!("expected a row after the page break, got {other:?}"),
        }
    }
}
