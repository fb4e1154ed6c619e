//! Response envelopes.
//!
//! The backend wraps the same data differently per endpoint and version:
//! a bare array, `{patients: [...]}`, `{history: [...]}`, `{data: [...]}`,
//! and so on. [`Envelope::open`] names which shape arrived so every caller
//! unwraps them the same way.

use serde_json::Value;
use tracing::debug;

/// Keys that may carry the dashboard list.
pub const PATIENT_LIST_KEYS: &[&str] = &["patients", "data"];
/// Keys that may carry a reading history.
pub const HISTORY_KEYS: &[&str] = &["history", "data"];
/// Keys that may carry an alert history.
pub const ALERT_KEYS: &[&str] = &["alerts", "data"];
/// Keys that may carry a single latest snapshot.
pub const LATEST_KEYS: &[&str] = &["latest", "data"];

/// Shape of a list payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope<'a> {
    Bare(&'a [Value]),
    Keyed { key: &'static str, items: &'a [Value] },
    Unrecognized,
}

impl<'a> Envelope<'a> {
    /// Identify the list inside `payload`, trying `keys` in order.
    pub fn open(payload: &'a Value, keys: &[&'static str]) -> Self {
        if let Some(items) = payload.as_array() {
            return Envelope::Bare(items);
        }

        keys.iter()
            .find_map(|key| {
                payload
                    .get(*key)
                    .and_then(Value::as_array)
                    .map(|items| Envelope::Keyed { key: *key, items })
            })
            .unwrap_or(Envelope::Unrecognized)
    }

    /// The wrapped records; empty when the shape was not recognized.
    pub fn items(self) -> &'a [Value] {
        match self {
            Envelope::Bare(items) | Envelope::Keyed { items, .. } => items,
            Envelope::Unrecognized => &[],
        }
    }
}

/// Records of a list payload. Unknown shapes yield an empty slice.
pub fn list_items<'a>(payload: &'a Value, keys: &[&'static str]) -> &'a [Value] {
    let envelope = Envelope::open(payload, keys);
    if envelope == Envelope::Unrecognized {
        debug!(?keys, "list payload has no recognized envelope");
    }
    envelope.items()
}

/// The single record inside a `{latest: {...}}`, `{data: {...}}` or bare
/// object payload.
pub fn single_item(payload: &Value) -> &Value {
    LATEST_KEYS
        .iter()
        .find_map(|key| payload.get(*key).filter(|inner| inner.is_object()))
        .unwrap_or(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_all_list_shapes() {
        let bare = json!([{"id": 1}]);
        let keyed = json!({"patients": [{"id": 1}, {"id": 2}]});
        let data = json!({"data": [{"id": 1}]});

        assert!(matches!(
            Envelope::open(&bare, PATIENT_LIST_KEYS),
            Envelope::Bare(items) if items.len() == 1
        ));
        assert!(matches!(
            Envelope::open(&keyed, PATIENT_LIST_KEYS),
            Envelope::Keyed { key: "patients", items } if items.len() == 2
        ));
        assert!(matches!(
            Envelope::open(&data, PATIENT_LIST_KEYS),
            Envelope::Keyed { key: "data", .. }
        ));
    }

    #[test]
    fn specific_key_wins_over_data() {
        let payload = json!({"alerts": [{"a": 1}], "data": [{"a": 1}, {"a": 2}]});
        assert_eq!(list_items(&payload, ALERT_KEYS).len(), 1);
    }

    #[test]
    fn unknown_shapes_are_empty() {
        assert!(list_items(&json!({"patients": "none"}), PATIENT_LIST_KEYS).is_empty());
        assert!(list_items(&json!(null), HISTORY_KEYS).is_empty());
        assert!(list_items(&json!({"history": []}), ALERT_KEYS).is_empty());
    }

    #[test]
    fn single_item_unwraps_latest_or_data() {
        let latest = json!({"latest": {"patientId": "P-1"}});
        assert_eq!(single_item(&latest)["patientId"], "P-1");

        let data = json!({"data": {"patientId": "P-2"}});
        assert_eq!(single_item(&data)["patientId"], "P-2");

        let bare = json!({"patientId": "P-3", "latest": null});
        assert_eq!(single_item(&bare)["patientId"], "P-3");
    }
}
