//! Badge classification for the live dashboard.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::{PatientView, Severity};

/// Badge text shown for an open alert that has no classified severity.
pub const ALERT_BADGE_TEXT: &str = "ALERT";

/// CSS class family applied to a badge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStyle {
    Critical,
    Warning,
    Info,
    Normal,
}

impl BadgeStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            BadgeStyle::Critical => "b-critical",
            BadgeStyle::Warning => "b-warning",
            BadgeStyle::Info => "b-info",
            BadgeStyle::Normal => "b-normal",
        }
    }
}

/// Text and style of a severity badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub text: &'static str,
    pub style: BadgeStyle,
}

impl Badge {
    pub fn for_severity(severity: Severity) -> Self {
        Self {
            text: severity.as_str(),
            style: style_for(severity),
        }
    }

    pub fn css_class(&self) -> &'static str {
        self.style.css_class()
    }
}

impl Serialize for Badge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Badge", 3)?;
        state.serialize_field("text", self.text)?;
        state.serialize_field("style", &self.style)?;
        state.serialize_field("className", self.css_class())?;
        state.end()
    }
}

pub fn style_for(severity: Severity) -> BadgeStyle {
    match severity {
        Severity::Critical => BadgeStyle::Critical,
        Severity::Warning => BadgeStyle::Warning,
        Severity::Info => BadgeStyle::Info,
        Severity::Normal => BadgeStyle::Normal,
    }
}

/// Derive the dashboard badge for a patient.
///
/// An active alert overrides a `Normal` (stale or absent) severity and is
/// labelled `ALERT` rather than `CRITICAL`, so it stays distinguishable from
/// a reading the backend actually classified as critical.
pub fn classify(patient: &PatientView) -> Badge {
    if patient.alert_active && patient.severity == Severity::Normal {
        return Badge {
            text: ALERT_BADGE_TEXT,
            style: style_for(Severity::Critical),
        };
    }
    Badge::for_severity(patient.severity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(severity: Severity, alert_active: bool) -> PatientView {
        PatientView {
            severity,
            alert_active,
            ..PatientView::default()
        }
    }

    #[test]
    fn active_alert_without_severity_shows_alert_badge() {
        let badge = classify(&patient(Severity::Normal, true));
        assert_eq!(badge.text, "ALERT");
        assert_eq!(badge.css_class(), "b-critical");
    }

    #[test]
    fn classified_severity_wins_over_alert_flag() {
        let badge = classify(&patient(Severity::Warning, true));
        assert_eq!(badge.text, "WARNING");
        assert_eq!(badge.css_class(), "b-warning");

        let badge = classify(&patient(Severity::Critical, false));
        assert_eq!(badge.text, "CRITICAL");
        assert_eq!(badge.css_class(), "b-critical");
    }

    #[test]
    fn badge_serializes_class_name() {
        let value = serde_json::to_value(classify(&patient(Severity::Normal, true))).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"text": "ALERT", "style": "critical", "className": "b-critical"})
        );
    }

    #[test]
    fn quiet_patients_get_plain_badges() {
        assert_eq!(classify(&patient(Severity::Normal, false)).css_class(), "b-normal");
        assert_eq!(classify(&patient(Severity::Info, false)).css_class(), "b-info");
    }
}
