//! Summary counts over the dashboard list.

use serde::{Deserialize, Serialize};

use crate::{PatientView, Severity};

/// Headline numbers shown above the dashboard grid.
///
/// `critical + normal <= total`: a `Warning`/`Info` patient without an open
/// alert counts toward neither bucket.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total: usize,
    pub critical: usize,
    pub normal: usize,
    /// Every known record counts as one device. There is no heartbeat tracking.
    pub active_devices: usize,
}

pub fn aggregate(patients: &[PatientView]) -> DashboardCounts {
    let mut counts = DashboardCounts {
        total: patients.len(),
        active_devices: patients.len(),
        ..DashboardCounts::default()
    };

    for patient in patients {
        if patient.severity == Severity::Critical || patient.alert_active {
            counts.critical += 1;
        } else if patient.severity == Severity::Normal {
            counts.normal += 1;
        }
    }

    counts
}
