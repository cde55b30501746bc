//! Mock broker link and event sink for integration tests.
//!
//! Records every transport call so tests can assert on the full publish /
//! subscribe history, and every emitted event in order.

use lockconsole::adapters::kv_store::KvStoreAdapter;
use lockconsole::app::events::AppEvent;
use lockconsole::app::ports::{CommsError, EventSink, TransportPort};
use lockconsole::app::service::AppService;
use lockconsole::channels::LinkEvent;
use lockconsole::config::ConsoleConfig;

// ── Transport call record ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCall {
    Connect,
    Disconnect,
    Publish { topic: String, payload: String },
    Subscribe { topic: String },
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockTransport {
    pub calls: Vec<LinkCall>,
    pub fail_connect: bool,
    pub fail_publish: bool,
    pub fail_subscribe: bool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(&str, &str)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                LinkCall::Publish { topic, payload } => Some((topic.as_str(), payload.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn subscriptions(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                LinkCall::Subscribe { topic } => Some(topic.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TransportPort for MockTransport {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.calls.push(LinkCall::Connect);
        if self.fail_connect {
            return Err(CommsError::ConnectFailed);
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), CommsError> {
        self.calls.push(LinkCall::Disconnect);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        self.calls.push(LinkCall::Publish {
            topic: topic.into(),
            payload: payload.into(),
        });
        if self.fail_publish {
            return Err(CommsError::PublishFailed);
        }
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        self.calls.push(LinkCall::Subscribe {
            topic: topic.into(),
        });
        if self.fail_subscribe {
            return Err(CommsError::SubscribeFailed);
        }
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }

    pub fn take(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub type TestApp = AppService<KvStoreAdapter>;

pub const RESULT_TOPIC: &str = "esp32/rfid_add_result";
pub const LOCK_TOPIC: &str = "esp32/lock";

/// Service over an empty in-memory store, not yet connected.
pub fn offline_app() -> (TestApp, MockTransport, RecordingSink) {
    let app = AppService::new(&ConsoleConfig::default(), KvStoreAdapter::in_memory());
    (app, MockTransport::new(), RecordingSink::new())
}

/// Service that has seen a broker `Connected`; mock history is cleared.
pub fn online_app() -> (TestApp, MockTransport, RecordingSink) {
    let (mut app, mut link, mut sink) = offline_app();
    app.handle_link_event(LinkEvent::Connected, &mut link, &mut sink);
    link.calls.clear();
    sink.events.clear();
    (app, link, sink)
}

/// Deliver a status report on the enrollment-result topic.
#[allow(dead_code)]
pub fn report(app: &mut TestApp, link: &mut MockTransport, sink: &mut RecordingSink, json: &str) {
    app.handle_link_event(
        LinkEvent::Message {
            topic: RESULT_TOPIC.into(),
            payload: json.into(),
        },
        link,
        sink,
    );
}
