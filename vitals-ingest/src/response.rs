//! Non-success responses and the signed-in user line.

use serde_json::Value;
use vitals_core::FetchFailure;

use crate::record::{text_value, FieldPath, RawRecord};

const FAILURE_MESSAGE_CHAIN: &[FieldPath] = &[&["message"], &["error"]];
const EMAIL_CHAIN: &[FieldPath] = &[&["user", "email"], &["email"]];

/// Backend endpoint a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Patients,
    Latest,
    History,
    Alerts,
    Profile,
}

impl Endpoint {
    /// Message shown when a failed response carries none.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Endpoint::Patients => "Failed to load patients",
            Endpoint::Latest => "Failed to load latest",
            Endpoint::History => "Failed to load history",
            Endpoint::Alerts => "Failed to load alerts",
            Endpoint::Profile => "Failed to load profile",
        }
    }
}

impl std::str::FromStr for Endpoint {
    type Err = vitals_core::MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patients" => Ok(Endpoint::Patients),
            "latest" => Ok(Endpoint::Latest),
            "history" => Ok(Endpoint::History),
            "alerts" => Ok(Endpoint::Alerts),
            "profile" | "me" => Ok(Endpoint::Profile),
            other => Err(vitals_core::MonitorError::Parse(format!(
                "unknown endpoint {other:?}"
            ))),
        }
    }
}

/// Body of a response, or an empty object when it is not JSON.
pub fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Default::default()))
}

/// User-facing message for a failed response.
pub fn failure_message(body: &Value, endpoint: Endpoint) -> String {
    RawRecord::new(body)
        .resolve(FAILURE_MESSAGE_CHAIN, text_value)
        .unwrap_or_else(|| endpoint.fallback_message().to_string())
}

/// Classify a non-success response. Rejected credentials become
/// [`FetchFailure::Unauthorized`] so the caller can send the user to login.
/// The session cannot continue without a profile, so any failed profile
/// load counts as rejected.
pub fn failure_from_response(status: u16, body: &Value, endpoint: Endpoint) -> FetchFailure {
    match (status, endpoint) {
        (401 | 403, _) | (_, Endpoint::Profile) => FetchFailure::Unauthorized,
        _ => FetchFailure::Status {
            status,
            message: failure_message(body, endpoint),
        },
    }
}

/// `Signed in as: nurse@example.org`
pub fn signed_in_as(profile: &Value) -> String {
    let email = RawRecord::new(profile)
        .text(EMAIL_CHAIN)
        .unwrap_or_else(|| "Unknown".to_string());
    format!("Signed in as: {email}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_message_wins() {
        let body = json!({"message": "Patient not found"});
        assert_eq!(failure_message(&body, Endpoint::Latest), "Patient not found");
        assert_eq!(
            failure_message(&json!({}), Endpoint::Alerts),
            "Failed to load alerts"
        );
    }

    #[test]
    fn non_json_body_degrades_to_empty_object() {
        let body = parse_body("<html>Bad gateway</html>");
        assert_eq!(
            failure_from_response(502, &body, Endpoint::History),
            FetchFailure::Status {
                status: 502,
                message: "Failed to load history".to_string()
            }
        );
    }

    #[test]
    fn rejected_token_requires_login() {
        assert_eq!(
            failure_from_response(401, &json!({"message": "jwt expired"}), Endpoint::Patients),
            FetchFailure::Unauthorized
        );
    }

    #[test]
    fn failed_profile_load_requires_login() {
        assert_eq!(
            failure_from_response(500, &json!({}), Endpoint::Profile),
            FetchFailure::Unauthorized
        );
        assert_eq!(
            failure_from_response(404, &parse_body("not found"), Endpoint::Profile),
            FetchFailure::Unauthorized
        );
        assert!(matches!(
            failure_from_response(500, &json!({}), Endpoint::Patients),
            FetchFailure::Status { status: 500, .. }
        ));
    }

    #[test]
    fn signed_in_line() {
        let profile = json!({"user": {"email": "nurse@example.org"}});
        assert_eq!(signed_in_as(&profile), "Signed in as: nurse@example.org");
        assert_eq!(signed_in_as(&json!({"user": null})), "Signed in as: Unknown");
    }

    #[test]
    fn endpoint_names() {
        assert_eq!("alerts".parse::<Endpoint>().unwrap(), Endpoint::Alerts);
        assert!("vitals".parse::<Endpoint>().is_err());
    }
}
