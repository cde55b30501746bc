//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: print to the operator console,
//! write to the log, etc.

use crate::app::ports::CommsError;
use crate::classify::ClassifyError;
use crate::enrollment::{CaptureStep, CredentialKind, Rejection};
use crate::registry::CredentialKey;

/// Broker link state shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Offline,
    Connecting,
    Online,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The broker link state changed.
    LinkChanged(LinkState),

    /// A transport operation failed.
    CommsFailed(CommsError),

    /// An enrollment command was published; waiting for the device.
    EnrollmentStarted { name: String, kind: CredentialKind },

    /// A pending enrollment was overwritten by a newer one.
    EnrollmentDisplaced { name: String },

    /// Device progress prompt during a capture.
    CapturePrompt(CaptureStep),

    /// A credential was registered under a name.
    Enrolled { name: String, key: CredentialKey },

    /// The device reported success but no enrollment was pending.
    UnclaimedCredential { key: CredentialKey },

    /// The device ended the capture without storing a credential.
    EnrollmentRejected(Rejection),

    /// An unlock happened; `text` already carries display names.
    Unlock { text: String },

    /// A result payload could not be interpreted.
    MalformedReport { payload: String, error: ClassifyError },

    /// Enrollment requires an online broker link.
    NotConnected,

    /// Enrollment requires a non-empty name.
    NameRequired,

    /// Registry contents, as requested by the operator.
    UserList(Vec<(CredentialKey, String)>),

    /// All registry entries were removed.
    RegistryCleared,
}
