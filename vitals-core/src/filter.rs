//! Client-side filtering of the dashboard list.

use serde::{Deserialize, Serialize};

use crate::PatientView;

/// Search text and the warnings-only toggle.
///
/// The query is stored trimmed and lowercased; build through
/// [`FilterCriteria::new`] to keep that invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    query: String,
    only_warnings: bool,
}

impl FilterCriteria {
    pub fn new(query: &str, only_warnings: bool) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            only_warnings,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn only_warnings(&self) -> bool {
        self.only_warnings
    }

    /// No query and no warnings-only toggle.
    pub fn is_pass_through(&self) -> bool {
        self.query.is_empty() && !self.only_warnings
    }

    pub fn matches(&self, patient: &PatientView) -> bool {
        if self.only_warnings && !patient.needs_attention() {
            return false;
        }

        if self.query.is_empty() {
            return true;
        }

        patient.name.to_lowercase().contains(&self.query)
            || patient.id.to_lowercase().contains(&self.query)
    }
}

/// Keep the patients matching `criteria`, in their original order.
pub fn filter_patients(patients: &[PatientView], criteria: &FilterCriteria) -> Vec<PatientView> {
    patients
        .iter()
        .filter(|patient| criteria.matches(patient))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    fn patient(id: &str, name: &str, severity: Severity, alert_active: bool) -> PatientView {
        PatientView {
            id: id.to_string(),
            name: name.to_string(),
            severity,
            alert_active,
            ..PatientView::default()
        }
    }

    fn ward() -> Vec<PatientView> {
        vec![
            patient("P-001", "Amira Haddad", Severity::Normal, false),
            patient("P-002", "Jonas Berg", Severity::Warning, false),
            patient("P-003", "Lina Haddad", Severity::Normal, true),
            patient("P-004", "Omar Said", Severity::Critical, false),
            patient("P-005", "Maya Chen", Severity::Info, false),
        ]
    }

    fn ids(list: &[PatientView]) -> Vec<&str> {
        list.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn query_is_trimmed_and_lowercased() {
        let criteria = FilterCriteria::new("  HADDAD ", false);
        assert_eq!(criteria.query(), "haddad");
        assert_eq!(ids(&filter_patients(&ward(), &criteria)), ["P-001", "P-003"]);
    }

    #[test]
    fn query_matches_id() {
        let criteria = FilterCriteria::new("p-00", false);
        assert_eq!(filter_patients(&ward(), &criteria).len(), 5);
        let criteria = FilterCriteria::new("p-004", false);
        assert_eq!(ids(&filter_patients(&ward(), &criteria)), ["P-004"]);
    }

    #[test]
    fn warnings_only_keeps_elevated_and_alerting() {
        let criteria = FilterCriteria::new("", true);
        assert_eq!(
            ids(&filter_patients(&ward(), &criteria)),
            ["P-002", "P-003", "P-004"]
        );
    }

    #[test]
    fn filters_intersect() {
        let criteria = FilterCriteria::new("haddad", true);
        assert_eq!(ids(&filter_patients(&ward(), &criteria)), ["P-003"]);
    }

    #[test]
    fn pass_through_returns_input() {
        let criteria = FilterCriteria::new("   ", false);
        assert!(criteria.is_pass_through());
        assert_eq!(filter_patients(&ward(), &criteria), ward());
    }
}
