//! Inbound commands to the application service.
//!
//! These represent actions requested by the operator that the
//! [`AppService`](super::service::AppService) interprets and acts upon.
//! The console adapter produces them from text lines via [`AppCommand::parse`].

use crate::enrollment::CredentialKind;
use crate::error::{Error, Result};

/// Commands that the operator can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Connect to the broker if offline.
    Connect,

    /// Drop the broker link.
    Disconnect,

    /// Ask the device to capture a credential for `name`.
    Enroll { kind: CredentialKind, name: String },

    /// Show every registered credential.
    ListUsers,

    /// Remove every registered credential.
    ClearUsers,

    /// Leave the console loop.
    Quit,
}

impl AppCommand {
    /// Parse one console line.
    ///
    /// ```text
    /// connect | disconnect | list | clear | quit
    /// add-rfid <name...> | add-finger <name...>
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "connect" => Ok(Self::Connect),
            "disconnect" => Ok(Self::Disconnect),
            "list" | "ls" => Ok(Self::ListUsers),
            "clear" => Ok(Self::ClearUsers),
            "quit" | "exit" => Ok(Self::Quit),
            "add-rfid" | "add-finger" => {
                if rest.is_empty() {
                    return Err(Error::Command("a name is required"));
                }
                let kind = if verb == "add-finger" {
                    CredentialKind::Finger
                } else {
                    CredentialKind::Rfid
                };
                Ok(Self::Enroll {
                    kind,
                    name: rest.to_owned(),
                })
            }
            "" => Err(Error::Command("empty command")),
            _ => Err(Error::Command("unknown command")),
        }
    }
}
