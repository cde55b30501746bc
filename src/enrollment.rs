//! Enrollment session: the single-slot pending name and protocol phase.
//!
//! ```text
//!  Idle ──begin(name)──▶ WaitingCapture ──stepN──▶ Capturing(step) ─┐
//!   ▲                          │                      ▲   │ stepN  │
//!   │                          │                      └───┘        │
//!   └──── success / exist / full / fail ◀──────────────────────────┘
//! ```
//!
//! Only one enrollment can be in flight.  Starting a second one replaces the
//! pending name.  There is no timeout and no cancel; the device ends a
//! capture by reporting a result.

use core::fmt;

/// Which kind of credential is being captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Rfid,
    Finger,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfid => write!(f, "RFID card"),
            Self::Finger => write!(f, "fingerprint"),
        }
    }
}

/// Capture step reported by the device (`step1`..`step3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    /// `step1`: place the finger on the sensor.
    Place,
    /// `step2`: lift the finger.
    Lift,
    /// `step3`: place the same finger again.
    PlaceAgain,
}

impl CaptureStep {
    /// Operator-facing instruction for this step.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Place => "Place finger on the sensor...",
            Self::Lift => "Lift finger...",
            Self::PlaceAgain => "Place the same finger again...",
        }
    }
}

/// Where the session is in the capture protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    WaitingCapture,
    Capturing(CaptureStep),
}

/// A name waiting for the device to report a captured credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEnrollment {
    pub name: String,
    pub kind: CredentialKind,
}

/// How a capture ended without registering anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Exists,
    Full,
    Failed(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists => write!(f, "Already enrolled"),
            Self::Full => write!(f, "Device memory full"),
            Self::Failed(msg) if msg.is_empty() => write!(f, "Enrollment failed"),
            Self::Failed(msg) => write!(f, "Enrollment failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginError {
    /// The display name is empty after trimming.
    EmptyName,
}

/// Explicit session context; owned by the application service.
#[derive(Debug)]
pub struct EnrollmentSession {
    pending: Option<PendingEnrollment>,
    phase: Phase,
}

impl Default for EnrollmentSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrollmentSession {
    pub fn new() -> Self {
        Self {
            pending: None,
            phase: Phase::Idle,
        }
    }

    /// Start waiting for a capture on behalf of `name`.
    ///
    /// Returns the enrollment this one displaced, if any.
    pub fn begin(
        &mut self,
        name: &str,
        kind: CredentialKind,
    ) -> Result<Option<PendingEnrollment>, BeginError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BeginError::EmptyName);
        }
        let displaced = self.pending.replace(PendingEnrollment {
            name: name.to_owned(),
            kind,
        });
        self.phase = Phase::WaitingCapture;
        Ok(displaced)
    }

    /// Record a progress report.  Never touches the pending name.
    pub fn step(&mut self, step: CaptureStep) {
        self.phase = Phase::Capturing(step);
    }

    /// The device stored a credential.  Hands back the pending name, if
    /// one was waiting, and returns to `Idle`.
    pub fn succeed(&mut self) -> Option<PendingEnrollment> {
        self.phase = Phase::Idle;
        self.pending.take()
    }

    /// The device refused or failed the capture.  The pending name is
    /// dropped so it cannot attach to a later unrelated success.
    pub fn reject(&mut self) -> Option<PendingEnrollment> {
        self.phase = Phase::Idle;
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&PendingEnrollment> {
        self.pending.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}
