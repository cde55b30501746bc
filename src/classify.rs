//! Inbound message classification.
//!
//! Every `(topic, payload)` pair delivered by the broker link is routed by
//! topic alone:
//!
//! | Topic                | Result                                 |
//! |----------------------|----------------------------------------|
//! | enrollment result    | [`Incoming::Report`] (parsed JSON)     |
//! | unlock log           | [`Incoming::UnlockLog`] (opaque text)  |
//! | anything else        | [`Incoming::Ignored`]                  |
//!
//! Status reports look like `{"status":"success","type":"finger","id":7}`.
//! Field values may be JSON strings or numbers; both are read as text.

use core::fmt;

use serde_json::Value;

use crate::config::TopicConfig;
use crate::enrollment::{CaptureStep, CredentialKind};
use crate::registry::CredentialKey;

/// A routed inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Report(EnrollmentReport),
    UnlockLog(String),
    Ignored,
}

/// Device-side enrollment status, one per result message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentReport {
    /// Capture in progress; prompt the operator.
    Step(CaptureStep),
    /// A credential was captured and stored on the device.
    Success { kind: CredentialKind, key: CredentialKey },
    /// The credential is already enrolled on the device.
    Exists,
    /// Device credential memory is full.
    Full,
    /// Capture failed; `msg` is the device's reason (may be empty).
    Failed { msg: String },
    /// Missing or unknown `status`; carries whatever was there.
    Unrecognized(String),
}

/// Why a result payload could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Payload is not a JSON object.
    Malformed,
    /// A `success` report lacks the identifier for its credential type.
    MissingField(&'static str),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed status payload"),
            Self::MissingField(field) => write!(f, "missing field `{field}`"),
        }
    }
}

/// Route a message by topic.  Only the enrollment-result topic can fail.
pub fn classify(
    topics: &TopicConfig,
    topic: &str,
    payload: &str,
) -> Result<Incoming, ClassifyError> {
    if topic == topics.add_result {
        parse_report(payload).map(Incoming::Report)
    } else if topic == topics.lock_log {
        Ok(Incoming::UnlockLog(payload.to_owned()))
    } else {
        Ok(Incoming::Ignored)
    }
}

/// Parse one enrollment status payload.
pub fn parse_report(payload: &str) -> Result<EnrollmentReport, ClassifyError> {
    let json: Value = serde_json::from_str(payload).map_err(|_| ClassifyError::Malformed)?;
    if !json.is_object() {
        return Err(ClassifyError::Malformed);
    }

    let status = field(&json, "status");
    let report = match status.as_str() {
        "step1" => EnrollmentReport::Step(CaptureStep::Place),
        "step2" => EnrollmentReport::Step(CaptureStep::Lift),
        "step3" => EnrollmentReport::Step(CaptureStep::PlaceAgain),
        "success" => {
            if field(&json, "type") == "finger" {
                let id = field(&json, "id");
                if id.is_empty() {
                    return Err(ClassifyError::MissingField("id"));
                }
                EnrollmentReport::Success {
                    kind: CredentialKind::Finger,
                    key: CredentialKey::finger(&id),
                }
            } else {
                let uid = field(&json, "uid");
                if uid.is_empty() {
                    return Err(ClassifyError::MissingField("uid"));
                }
                EnrollmentReport::Success {
                    kind: CredentialKind::Rfid,
                    key: CredentialKey::rfid(&uid),
                }
            }
        }
        "exist" => EnrollmentReport::Exists,
        "full" => EnrollmentReport::Full,
        "fail" => EnrollmentReport::Failed {
            msg: field(&json, "msg"),
        },
        _ => EnrollmentReport::Unrecognized(status),
    };
    Ok(report)
}

/// Read a field as text: strings verbatim, numbers and booleans formatted,
/// anything else (missing, null, nested) as the empty string.
fn field(json: &Value, name: &str) -> String {
    match json.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
