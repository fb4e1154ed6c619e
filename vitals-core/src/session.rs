//! Dashboard session state.
//!
//! The dashboard list is written from two directions: the refresh timer and
//! user-driven reloads. Every fetch is tagged with a monotonically increasing
//! sequence number, and only [`DashboardSession::complete`] writes the list.
//! A completion older than the last applied one is dropped, so a slow
//! response can never replace newer data.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{aggregate, filter_patients, DashboardCounts, FilterCriteria, PatientView};

/// Message shown when the transport could not reach the backend.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error while loading patients.";

/// What asked for a fetch.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FetchTrigger {
    Initial,
    Timer,
    FilterChange,
    Manual,
}

/// Issued by [`DashboardSession::begin_fetch`], returned on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    trigger: FetchTrigger,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn trigger(&self) -> FetchTrigger {
        self.trigger
    }
}

/// Why a whole fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The backend answered with a non-success status.
    Status { status: u16, message: String },
    /// The request never completed.
    Network,
    /// The credential was rejected; the caller should send the user to login.
    Unauthorized,
}

impl FetchFailure {
    pub fn message(&self) -> String {
        match self {
            FetchFailure::Status { message, .. } => message.clone(),
            FetchFailure::Network => NETWORK_ERROR_MESSAGE.to_string(),
            FetchFailure::Unauthorized => "Session expired. Please sign in again.".to_string(),
        }
    }
}

/// Result of handing a completion to the session.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FetchDisposition {
    Applied,
    /// A newer fetch had already been applied.
    Discarded,
}

/// Status line under the dashboard header.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loaded {
        count: usize,
    },
    Failed {
        message: String,
    },
    LoginRequired,
}

/// Everything the dashboard renders after a fetch or filter change.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub patients: Vec<PatientView>,
    /// Counts over the whole applied list, not just the visible rows.
    pub counts: DashboardCounts,
    pub status: SessionStatus,
    pub refreshing: bool,
}

#[derive(Debug, Default)]
pub struct DashboardSession {
    next_seq: u64,
    applied_seq: u64,
    in_flight: Option<u64>,
    patients: Vec<PatientView>,
    criteria: FilterCriteria,
    status: SessionStatus,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch. A timer tick while another fetch is outstanding is
    /// skipped and yields `None`.
    pub fn begin_fetch(&mut self, trigger: FetchTrigger) -> Option<FetchTicket> {
        if trigger == FetchTrigger::Timer {
            if let Some(pending) = self.in_flight {
                debug!(pending, "skipping refresh tick, fetch still in flight");
                return None;
            }
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight = Some(seq);
        debug!(seq, ?trigger, "fetch started");
        Some(FetchTicket { seq, trigger })
    }

    /// Apply a finished fetch unless a newer one already landed.
    ///
    /// Failures clear the list so stale patients are never shown as current.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<PatientView>, FetchFailure>,
    ) -> FetchDisposition {
        if self.in_flight.is_some_and(|pending| ticket.seq >= pending) {
            self.in_flight = None;
        }

        if ticket.seq <= self.applied_seq {
            warn!(
                seq = ticket.seq,
                applied = self.applied_seq,
                "discarding out-of-order fetch completion"
            );
            return FetchDisposition::Discarded;
        }
        self.applied_seq = ticket.seq;

        match outcome {
            Ok(patients) => {
                info!(seq = ticket.seq, count = patients.len(), "patient list updated");
                self.status = SessionStatus::Loaded {
                    count: patients.len(),
                };
                self.patients = patients;
            }
            Err(failure) => {
                warn!(seq = ticket.seq, ?failure, "patient fetch failed, clearing list");
                self.patients.clear();
                self.status = match failure {
                    FetchFailure::Unauthorized => SessionStatus::LoginRequired,
                    other => SessionStatus::Failed {
                        message: other.message(),
                    },
                };
            }
        }

        FetchDisposition::Applied
    }

    /// Replace the filter. Works on the list already held; nothing is fetched.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn patients(&self) -> &[PatientView] {
        &self.patients
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn needs_login(&self) -> bool {
        self.status == SessionStatus::LoginRequired
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            patients: filter_patients(&self.patients, &self.criteria),
            counts: aggregate(&self.patients),
            status: self.status.clone(),
            refreshing: self.is_refreshing(),
        }
    }
}
