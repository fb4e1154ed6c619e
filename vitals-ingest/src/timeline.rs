//! Reading and alert history records.

use serde_json::Value;
use vitals_core::{RecordKind, TimelineEntry, Vitals};

use crate::envelope::{list_items, ALERT_KEYS, HISTORY_KEYS};
use crate::record::{FieldPath, RawRecord, MESSAGE_CHAIN};

const READING_SEVERITY_CHAIN: &[FieldPath] = &[&["finalSeverity"], &["severity"]];
const ALERT_SEVERITY_CHAIN: &[FieldPath] = &[&["severity"], &["finalSeverity"]];
const ENTRY_TIMESTAMP_CHAIN: &[FieldPath] = &[&["timestamp"], &["createdAt"]];
const ENTRY_VITALS: &[FieldPath] = &[&["vitals"]];

/// Alert text used when the backend sends none.
pub const DEFAULT_ALERT_MESSAGE: &str = "Alert";

/// Where an entry is headed. Exported readings may carry their vitals flat
/// on the record instead of under `vitals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Detail,
    Export,
}

pub fn list_keys(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Readings => HISTORY_KEYS,
        RecordKind::Alerts => ALERT_KEYS,
    }
}

/// Resolve one history or alert record.
pub fn resolve_entry(value: &Value, kind: RecordKind, mode: EntryMode) -> TimelineEntry {
    let record = RawRecord::new(value);

    let vitals = match (record.nested(ENTRY_VITALS), kind, mode) {
        (Some(nested), _, _) => nested.vitals(),
        (None, RecordKind::Readings, EntryMode::Export) => record.vitals(),
        (None, _, _) => Vitals::default(),
    };

    let severity_chain = match kind {
        RecordKind::Readings => READING_SEVERITY_CHAIN,
        RecordKind::Alerts => ALERT_SEVERITY_CHAIN,
    };

    let message = match kind {
        RecordKind::Readings => record.text(MESSAGE_CHAIN),
        RecordKind::Alerts => Some(
            record
                .text(MESSAGE_CHAIN)
                .unwrap_or_else(|| DEFAULT_ALERT_MESSAGE.to_string()),
        ),
    };

    TimelineEntry {
        vitals,
        severity: record.severity(severity_chain, kind.default_severity()),
        timestamp: record.text(ENTRY_TIMESTAMP_CHAIN),
        message,
        is_latest: false,
    }
}

/// Resolve every record of a timeline payload, keeping the source order.
pub fn resolve_entries(payload: &Value, kind: RecordKind, mode: EntryMode) -> Vec<TimelineEntry> {
    list_items(payload, list_keys(kind))
        .iter()
        .map(|item| resolve_entry(item, kind, mode))
        .collect()
}
