//! Operator console event sink.
//!
//! Implements [`EventSink`] by rendering each application event as one
//! operator log line, `[HH:MM:SS] <Tag>: <text>`, on stdout, and mirroring
//! it to the `log` facade.

use std::io::Write;

use chrono::Local;
use log::debug;

use crate::app::events::{AppEvent, LinkState};
use crate::app::ports::EventSink;

/// Category shown in front of every operator log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Sys,
    Err,
    Warn,
    Info,
    Add,
    Unlock,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sys => "Sys",
            Self::Err => "Err",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Add => "Add",
            Self::Unlock => "Unlock",
        }
    }
}

/// Operator-facing text for an event.
pub fn render(event: &AppEvent) -> (Tag, String) {
    match event {
        AppEvent::LinkChanged(LinkState::Online) => (Tag::Sys, "Online".into()),
        AppEvent::LinkChanged(LinkState::Connecting) => (Tag::Sys, "Connecting...".into()),
        AppEvent::LinkChanged(LinkState::Offline) => (Tag::Sys, "Offline".into()),
        AppEvent::CommsFailed(e) => (Tag::Err, format!("Broker error: {e}")),
        AppEvent::EnrollmentStarted { name, kind } => {
            (Tag::Info, format!("Waiting for {kind} scan for: {name}..."))
        }
        AppEvent::EnrollmentDisplaced { name } => {
            (Tag::Warn, format!("Enrollment for {name} was replaced"))
        }
        AppEvent::CapturePrompt(step) => (Tag::Info, step.prompt().into()),
        AppEvent::Enrolled { name, key } => (Tag::Add, format!("Added {name} ({key})")),
        AppEvent::UnclaimedCredential { key } => (
            Tag::Warn,
            format!("Device enrolled {key} but no name was pending"),
        ),
        AppEvent::EnrollmentRejected(rejection) => (Tag::Warn, rejection.to_string()),
        AppEvent::Unlock { text } => (Tag::Unlock, text.clone()),
        AppEvent::MalformedReport { payload, error } => {
            (Tag::Err, format!("Bad status report ({error}): {payload}"))
        }
        AppEvent::NotConnected => (Tag::Err, "Not connected!".into()),
        AppEvent::NameRequired => (Tag::Err, "A name is required".into()),
        AppEvent::UserList(entries) if entries.is_empty() => (Tag::Info, "List is empty".into()),
        AppEvent::UserList(entries) => {
            let mut text = format!("Users ({})", entries.len());
            for (key, name) in entries {
                text.push_str(&format!("\n- {name} [{key}]"));
            }
            (Tag::Info, text)
        }
        AppEvent::RegistryCleared => (Tag::Sys, "User list cleared".into()),
    }
}

/// Adapter that prints every [`AppEvent`] to the operator console.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        let (tag, text) = render(event);
        debug!("{} | {}", tag.as_str(), text);
        let time = Local::now().format("%H:%M:%S");
        // A closed stdout must not take the console loop down.
        let _ = writeln!(self.out, "[{time}] {}: {text}", tag.as_str());
        let _ = self.out.flush();
    }
}
