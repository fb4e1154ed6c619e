//! Framework-neutral WASM <-> JavaScript bridge for the vitals dashboard.
//!
//! The page script keeps doing the network calls and DOM work; it hands the
//! raw JSON it received to these functions and renders what comes back.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_wasm_bindgen::{from_value, Serializer};
use vitals_core::{
    aggregate, filter_patients, paginate, Badge, DashboardCounts, DashboardSession, ExportQuery,
    ExportRange, FetchDisposition, FetchFailure, FetchTicket, FetchTrigger, FilterCriteria,
    MonitorConfig, MonitorError, PatientView, RecordKind, ReportItem, ReportLayout,
    SessionStatus, TimelineQuery,
};
use vitals_ingest::Endpoint;
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsMonitorConfig {
    #[serde(default)]
    refresh_interval_secs: Option<u64>,
    #[serde(default)]
    history_limit: Option<u32>,
    #[serde(default)]
    alerts_limit: Option<u32>,
    #[serde(default)]
    export_limit: Option<u32>,
    /// Partial layouts keep the default for every missing metric.
    #[serde(default)]
    report: Option<ReportLayout>,
}

impl From<JsMonitorConfig> for MonitorConfig {
    fn from(cfg: JsMonitorConfig) -> Self {
        let mut base = MonitorConfig::default();
        if let Some(secs) = cfg.refresh_interval_secs {
            base.refresh_interval_secs = secs;
        }
        if let Some(limit) = cfg.history_limit {
            base.history_limit = limit;
        }
        if let Some(limit) = cfg.alerts_limit {
            base.alerts_limit = limit;
        }
        if let Some(limit) = cfg.export_limit {
            base.export_limit = limit;
        }
        if let Some(layout) = cfg.report {
            base.report = layout;
        }
        base
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsPatientCard<'a> {
    #[serde(flatten)]
    patient: &'a PatientView,
    badge: Badge,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDashboard<'a> {
    patients: Vec<JsPatientCard<'a>>,
    counts: DashboardCounts,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsSessionView<'a> {
    patients: Vec<JsPatientCard<'a>>,
    counts: DashboardCounts,
    status: &'a SessionStatus,
    refreshing: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsReport {
    title: String,
    range_label: String,
    file_name: String,
    row_count: usize,
    items: Vec<ReportItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsFailure {
    message: String,
    login_required: bool,
}

fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_json(input: JsValue, what: &str) -> Result<Value, JsValue> {
    from_value::<Value>(input)
        .map_err(|err| JsValue::from_str(&format!("Could not read {what} JSON: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<MonitorConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsMonitorConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            Ok(MonitorConfig::from(cfg))
        }
        _ => Ok(MonitorConfig::default()),
    }
}

/// Maps (including flattened structs) become plain objects, not `Map`s.
fn write_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize result: {err}")))
}

fn format_monitor_error(err: MonitorError) -> JsValue {
    JsValue::from_str(&format!("Monitor error: {err}"))
}

fn cards(patients: &[PatientView]) -> Vec<JsPatientCard<'_>> {
    patients
        .iter()
        .map(|patient| JsPatientCard {
            patient,
            badge: patient.badge(),
        })
        .collect()
}

/// Resolve a dashboard list payload into patient views.
#[wasm_bindgen(js_name = resolvePatients)]
pub fn resolve_patients(payload: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let payload = read_json(payload, "patients")?;
    write_js(&vitals_ingest::resolve_patients(&payload))
}

/// Resolve a single-patient `latest` payload.
#[wasm_bindgen(js_name = resolveLatest)]
pub fn resolve_latest(payload: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let payload = read_json(payload, "latest")?;
    let patient = vitals_ingest::resolve_latest(&payload);
    write_js(&JsPatientCard {
        badge: patient.badge(),
        patient: &patient,
    })
}

/// Badged, filtered cards and counts for a dashboard payload.
#[wasm_bindgen(js_name = summarizeDashboard)]
pub fn summarize_dashboard(
    payload: JsValue,
    query: &str,
    only_warnings: bool,
) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let payload = read_json(payload, "patients")?;
    let patients = vitals_ingest::resolve_patients(&payload);
    let visible = filter_patients(&patients, &FilterCriteria::new(query, only_warnings));

    write_js(&JsDashboard {
        patients: cards(&visible),
        counts: aggregate(&patients),
    })
}

/// Badge for one raw patient record.
#[wasm_bindgen(js_name = classifyPatient)]
pub fn classify_patient(record: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let record = read_json(record, "patient")?;
    write_js(&vitals_ingest::resolve_patient(&record).badge())
}

/// Display panel for a history (`readings`) or alert (`alerts`) payload.
#[wasm_bindgen(js_name = formatTimeline)]
pub fn format_timeline(payload: JsValue, kind: &str) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let kind: RecordKind = kind.parse().map_err(format_monitor_error)?;
    let payload = read_json(payload, "timeline")?;
    write_js(&vitals_ingest::resolve_timeline(&payload, kind))
}

/// Laid-out export report. `generated_on` is the local `YYYY-MM-DD` date
/// used in the file name.
#[wasm_bindgen(js_name = buildReport)]
pub fn build_report(
    payload: JsValue,
    kind: &str,
    from: Option<String>,
    to: Option<String>,
    patient_name: &str,
    generated_on: &str,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let cfg = read_config(config)?;
    let kind: RecordKind = kind.parse().map_err(format_monitor_error)?;
    let range = ExportRange::parse(from.as_deref(), to.as_deref()).map_err(format_monitor_error)?;
    let generated_on = NaiveDate::parse_from_str(generated_on.trim(), "%Y-%m-%d")
        .map_err(|err| JsValue::from_str(&format!("Could not read report date: {err}")))?;

    let payload = read_json(payload, "export")?;
    let report = vitals_ingest::build_report(&payload, kind, range, patient_name)
        .map_err(format_monitor_error)?;

    write_js(&JsReport {
        title: report.title(),
        range_label: report.range.label(),
        file_name: report.file_name(generated_on),
        row_count: report.rows.len(),
        items: paginate(&report, &cfg.report),
    })
}

/// Transport query pairs for an export request.
#[wasm_bindgen(js_name = exportQuery)]
pub fn export_query(
    kind: &str,
    from: Option<String>,
    to: Option<String>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let cfg = read_config(config)?;
    let kind: RecordKind = kind.parse().map_err(format_monitor_error)?;
    let range = ExportRange::parse(from.as_deref(), to.as_deref()).map_err(format_monitor_error)?;
    let query = ExportQuery::new(kind, &range, &cfg);
    let pairs: HashMap<&str, String> = query.pairs().into_iter().collect();
    write_js(&pairs)
}

/// Transport query pairs for a detail page timeline request.
#[wasm_bindgen(js_name = timelineQuery)]
pub fn timeline_query(kind: &str, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let cfg = read_config(config)?;
    let kind: RecordKind = kind.parse().map_err(format_monitor_error)?;
    let query = TimelineQuery::new(kind, &cfg);
    let pairs: HashMap<&str, String> = query.pairs().into_iter().collect();
    write_js(&pairs)
}

/// Message for a failed response and whether the user must log in again.
#[wasm_bindgen(js_name = failureMessage)]
pub fn failure_message(status: u16, body: JsValue, endpoint: &str) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let endpoint: Endpoint = endpoint.parse().map_err(format_monitor_error)?;
    let body = read_json(body, "response").unwrap_or(Value::Null);
    let failure = vitals_ingest::failure_from_response(status, &body, endpoint);

    write_js(&JsFailure {
        login_required: failure == FetchFailure::Unauthorized,
        message: failure.message(),
    })
}

/// Dashboard session owned by the page script.
///
/// `beginFetch` hands out a sequence number; the script passes it back with
/// the response, and completions older than the last applied one are dropped.
#[wasm_bindgen]
pub struct DashboardHandle {
    session: DashboardSession,
    config: MonitorConfig,
    tickets: HashMap<u64, FetchTicket>,
}

#[wasm_bindgen]
impl DashboardHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<JsValue>) -> Result<DashboardHandle, JsValue> {
        init_panic_hook();
        Ok(Self {
            session: DashboardSession::new(),
            config: read_config(config)?,
            tickets: HashMap::new(),
        })
    }

    /// Milliseconds between timer refreshes.
    #[wasm_bindgen(js_name = refreshIntervalMs)]
    pub fn refresh_interval_ms(&self) -> f64 {
        self.config.refresh_interval().as_millis() as f64
    }

    /// Sequence number for a new fetch, or `undefined` when a timer tick is
    /// skipped because a fetch is still outstanding.
    #[wasm_bindgen(js_name = beginFetch)]
    pub fn begin_fetch(&mut self, trigger: &str) -> Result<Option<f64>, JsValue> {
        let trigger = match trigger {
            "initial" => FetchTrigger::Initial,
            "timer" => FetchTrigger::Timer,
            "filter" => FetchTrigger::FilterChange,
            "manual" => FetchTrigger::Manual,
            other => return Err(JsValue::from_str(&format!("Unknown fetch trigger {other:?}"))),
        };

        Ok(self.session.begin_fetch(trigger).map(|ticket| {
            self.tickets.insert(ticket.seq(), ticket);
            ticket.seq() as f64
        }))
    }

    /// Hand over a successful response. Returns whether it was applied.
    #[wasm_bindgen(js_name = completeFetch)]
    pub fn complete_fetch(&mut self, seq: f64, payload: JsValue) -> Result<bool, JsValue> {
        let Some(ticket) = self.take_ticket(seq)? else {
            return Ok(false);
        };
        let payload = read_json(payload, "patients")?;
        let patients = vitals_ingest::resolve_patients(&payload);
        Ok(self.apply(ticket, Ok(patients)))
    }

    /// Hand over a failed fetch. A missing `status` means the request never
    /// reached the backend.
    #[wasm_bindgen(js_name = failFetch)]
    pub fn fail_fetch(
        &mut self,
        seq: f64,
        status: Option<u16>,
        body: JsValue,
    ) -> Result<bool, JsValue> {
        let Some(ticket) = self.take_ticket(seq)? else {
            return Ok(false);
        };
        let failure = match status {
            Some(status) => {
                let body = read_json(body, "response").unwrap_or(Value::Null);
                vitals_ingest::failure_from_response(status, &body, Endpoint::Patients)
            }
            None => FetchFailure::Network,
        };
        Ok(self.apply(ticket, Err(failure)))
    }

    #[wasm_bindgen(js_name = setCriteria)]
    pub fn set_criteria(&mut self, query: &str, only_warnings: bool) {
        self.session
            .set_criteria(FilterCriteria::new(query, only_warnings));
    }

    #[wasm_bindgen(js_name = needsLogin)]
    pub fn needs_login(&self) -> bool {
        self.session.needs_login()
    }

    /// Current cards, counts and status line.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let view = self.session.view();
        write_js(&JsSessionView {
            patients: cards(&view.patients),
            counts: view.counts,
            status: &view.status,
            refreshing: view.refreshing,
        })
    }
}

impl DashboardHandle {
    /// `None` for a ticket already superseded by a newer applied fetch.
    fn take_ticket(&mut self, seq: f64) -> Result<Option<FetchTicket>, JsValue> {
        let seq = seq as u64;
        match self.tickets.remove(&seq) {
            Some(ticket) => Ok(Some(ticket)),
            None if seq <= self.session.applied_seq() => Ok(None),
            None => Err(JsValue::from_str(&format!("Unknown fetch sequence {seq}"))),
        }
    }

    fn apply(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<PatientView>, FetchFailure>,
    ) -> bool {
        let disposition = self.session.complete(ticket, outcome);
        let applied = self.session.applied_seq();
        self.tickets.retain(|&seq, _| seq > applied);
        disposition == FetchDisposition::Applied
    }
}
