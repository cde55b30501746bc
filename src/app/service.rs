//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the link state, the enrollment session and the
//! credential registry.  Transport and event sink are injected at call
//! sites, so the whole service is testable with mock adapters.
//!
//! ```text
//!  LinkEvent ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                │         AppService         │
//! AppCommand ──▶ │ Classifier · Session · Reg │ ──▶ TransportPort
//!                └────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::annotate::annotate;
use crate::channels::LinkEvent;
use crate::classify::{EnrollmentReport, Incoming, classify};
use crate::config::{ConsoleConfig, RfidCommandMode, TopicConfig};
use crate::enrollment::{BeginError, CredentialKind, EnrollmentSession, Rejection};
use crate::registry::{CredentialKey, CredentialRegistry};

use super::commands::AppCommand;
use super::events::{AppEvent, LinkState};
use super::ports::{EventSink, StoragePort, TransportPort};

/// Command string the lock expects on the RFID enrollment topic.
pub const CMD_ADD_RFID: &str = "CMD_ADD";

/// Command string the lock expects on the fingerprint enrollment topic.
pub const CMD_ADD_FINGER: &str = "CMD_ADD_FINGER";

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<S: StoragePort> {
    registry: CredentialRegistry<S>,
    session: EnrollmentSession,
    link: LinkState,
    topics: TopicConfig,
    rfid_command: RfidCommandMode,
}

impl<S: StoragePort> AppService<S> {
    /// Construct the service; the registry is loaded from `store`.
    pub fn new(config: &ConsoleConfig, store: S) -> Self {
        let registry =
            CredentialRegistry::open(store, &config.registry_namespace, &config.unknown_name);
        Self {
            registry,
            session: EnrollmentSession::new(),
            link: LinkState::Offline,
            topics: config.topics.clone(),
            rfid_command: config.rfid_command,
        }
    }

    // ── Broker link ───────────────────────────────────────────

    /// Process one event from the broker link.
    pub fn handle_link_event(
        &mut self,
        event: LinkEvent,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        match event {
            LinkEvent::Connected => {
                // Clean sessions drop subscriptions, so resubscribe every time.
                for topic in [&self.topics.lock_log, &self.topics.add_result] {
                    if let Err(e) = transport.subscribe(topic) {
                        warn!("AppService: subscribe {} failed: {}", topic, e);
                        sink.emit(&AppEvent::CommsFailed(e));
                    }
                }
                self.set_link(LinkState::Online, sink);
            }
            LinkEvent::ConnectionLost(reason) => {
                if self.link != LinkState::Offline {
                    warn!("AppService: connection lost ({})", reason);
                }
                self.set_link(LinkState::Offline, sink);
            }
            LinkEvent::Message { topic, payload } => {
                self.handle_message(&topic, &payload, sink);
            }
        }
    }

    /// Classify one inbound message and act on it.
    pub fn handle_message(&mut self, topic: &str, payload: &str, sink: &mut impl EventSink) {
        match classify(&self.topics, topic, payload) {
            Ok(Incoming::Report(report)) => self.handle_report(report, sink),
            Ok(Incoming::UnlockLog(text)) => {
                let text = annotate(&text, |key| self.registry.get(key));
                sink.emit(&AppEvent::Unlock { text });
            }
            Ok(Incoming::Ignored) => debug!("AppService: ignoring message on {}", topic),
            Err(error) => {
                warn!("AppService: bad report on {}: {} ({:?})", topic, error, payload);
                sink.emit(&AppEvent::MalformedReport {
                    payload: payload.to_owned(),
                    error,
                });
            }
        }
    }

    fn handle_report(&mut self, report: EnrollmentReport, sink: &mut impl EventSink) {
        match report {
            EnrollmentReport::Step(step) => {
                self.session.step(step);
                sink.emit(&AppEvent::CapturePrompt(step));
            }
            EnrollmentReport::Success { kind, key } => match self.session.succeed() {
                Some(pending) => {
                    if pending.kind != kind {
                        warn!(
                            "AppService: expected {} but device enrolled {}",
                            pending.kind, kind
                        );
                    }
                    self.registry.put(&key, &pending.name);
                    info!("AppService: enrolled {} as {}", key, pending.name);
                    sink.emit(&AppEvent::Enrolled {
                        name: pending.name,
                        key,
                    });
                }
                None => {
                    warn!("AppService: success for {} with no pending enrollment", key);
                    sink.emit(&AppEvent::UnclaimedCredential { key });
                }
            },
            EnrollmentReport::Exists => self.reject(Rejection::Exists, sink),
            EnrollmentReport::Full => self.reject(Rejection::Full, sink),
            EnrollmentReport::Failed { msg } => self.reject(Rejection::Failed(msg), sink),
            EnrollmentReport::Unrecognized(status) => {
                debug!("AppService: ignoring status {:?}", status);
            }
        }
    }

    fn reject(&mut self, rejection: Rejection, sink: &mut impl EventSink) {
        if let Some(pending) = self.session.reject() {
            info!("AppService: enrollment for {} ended: {}", pending.name, rejection);
        }
        sink.emit(&AppEvent::EnrollmentRejected(rejection));
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Connect => {
                if self.link != LinkState::Offline {
                    return;
                }
                self.set_link(LinkState::Connecting, sink);
                if let Err(e) = transport.connect() {
                    sink.emit(&AppEvent::CommsFailed(e));
                    self.set_link(LinkState::Offline, sink);
                }
            }
            AppCommand::Disconnect => {
                // Offline after a lost link still has a transport retrying
                // in the background; stop it as well.
                if let Err(e) = transport.disconnect() {
                    sink.emit(&AppEvent::CommsFailed(e));
                }
                self.set_link(LinkState::Offline, sink);
            }
            AppCommand::Enroll { kind, name } => {
                self.start_enrollment(kind, &name, transport, sink);
            }
            AppCommand::ListUsers => {
                sink.emit(&AppEvent::UserList(self.registry.enumerate()));
            }
            AppCommand::ClearUsers => {
                self.registry.clear_all();
                sink.emit(&AppEvent::RegistryCleared);
            }
            AppCommand::Quit => {
                // Handled by the console loop.
            }
        }
    }

    fn start_enrollment(
        &mut self,
        kind: CredentialKind,
        name: &str,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        if self.link != LinkState::Online {
            sink.emit(&AppEvent::NotConnected);
            return;
        }

        let displaced = match self.session.begin(name, kind) {
            Ok(displaced) => displaced,
            Err(BeginError::EmptyName) => {
                sink.emit(&AppEvent::NameRequired);
                return;
            }
        };
        if let Some(old) = displaced {
            warn!("AppService: enrollment for {} replaced", old.name);
            sink.emit(&AppEvent::EnrollmentDisplaced { name: old.name });
        }

        let name = name.trim();
        let (topic, payload) = match kind {
            CredentialKind::Finger => (&self.topics.finger_add, CMD_ADD_FINGER),
            CredentialKind::Rfid => match self.rfid_command {
                RfidCommandMode::Fixed => (&self.topics.rfid_add, CMD_ADD_RFID),
                RfidCommandMode::Name => (&self.topics.rfid_add, name),
            },
        };
        // The pending name stays set even if the publish fails; the device
        // may still have received the command.
        if let Err(e) = transport.publish(topic, payload) {
            warn!("AppService: publish to {} failed: {}", topic, e);
            sink.emit(&AppEvent::CommsFailed(e));
        }
        sink.emit(&AppEvent::EnrollmentStarted {
            name: name.to_owned(),
            kind,
        });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn session(&self) -> &EnrollmentSession {
        &self.session
    }

    pub fn registry(&self) -> &CredentialRegistry<S> {
        &self.registry
    }

    /// Display name for a key, as shown in unlock logs.
    pub fn name_of(&self, key: &CredentialKey) -> &str {
        self.registry.get(key)
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_link(&mut self, state: LinkState, sink: &mut impl EventSink) {
        if self.link != state {
            info!("AppService: link {:?} -> {:?}", self.link, state);
            self.link = state;
            sink.emit(&AppEvent::LinkChanged(state));
        }
    }
}
