//! Unlock-log annotation.
//!
//! The lock reports unlocks as free text, e.g. `"FINGER 12 unlocked"` or
//! `"RFID A1B2C3 unlocked"`.  [`find_identifiers`] extracts the credential
//! references; [`annotate`] swaps each one for `"<name> (<id>)"`.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::registry::CredentialKey;

static FINGER_REGEX: OnceLock<Regex> = OnceLock::new();
static RFID_REGEX: OnceLock<Regex> = OnceLock::new();

fn finger_regex() -> &'static Regex {
    FINGER_REGEX.get_or_init(|| Regex::new(r"FINGER ([0-9]+)").unwrap())
}

fn rfid_regex() -> &'static Regex {
    RFID_REGEX.get_or_init(|| Regex::new(r"RFID ([0-9A-F]+)").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Finger,
    Rfid,
}

/// One credential reference found in unlock text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier<'a> {
    pub kind: IdentifierKind,
    /// The bare id: fingerprint slot digits or RFID UID.
    pub id: &'a str,
    /// Byte range of the whole `"FINGER <id>"` / `"RFID <id>"` match.
    pub span: Range<usize>,
}

impl Identifier<'_> {
    /// Registry key this reference resolves through.
    pub fn key(&self) -> CredentialKey {
        match self.kind {
            IdentifierKind::Finger => CredentialKey::finger(self.id),
            IdentifierKind::Rfid => CredentialKey::rfid(self.id),
        }
    }
}

/// Every credential reference in `text`, ordered by position.
///
/// Spans never overlap: an RFID uid can swallow the `F` of a following
/// `FINGER`, and the leftmost match wins.
pub fn find_identifiers(text: &str) -> Vec<Identifier<'_>> {
    let mut found = Vec::new();
    for (kind, re) in [
        (IdentifierKind::Finger, finger_regex()),
        (IdentifierKind::Rfid, rfid_regex()),
    ] {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            found.push(Identifier {
                kind,
                id: id.as_str(),
                span: whole.range(),
            });
        }
    }
    found.sort_by_key(|ident| ident.span.start);

    let mut end = 0;
    found.retain(|ident| {
        let keep = ident.span.start >= end;
        if keep {
            end = ident.span.end;
        }
        keep
    });
    found
}

/// Replace every credential reference with `"<name> (<id>)"`.
///
/// `name_of` resolves a key to a display name (typically
/// [`CredentialRegistry::get`](crate::registry::CredentialRegistry::get)).
/// Text without references is returned unchanged.
pub fn annotate<'n>(text: &str, mut name_of: impl FnMut(&CredentialKey) -> &'n str) -> String {
    let idents = find_identifiers(text);
    if idents.is_empty() {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len() + idents.len() * 16);
    let mut cursor = 0;
    for ident in idents {
        out.push_str(&text[cursor..ident.span.start]);
        let name = name_of(&ident.key());
        out.push_str(name);
        out.push_str(" (");
        out.push_str(ident.id);
        out.push(')');
        cursor = ident.span.end;
    }
    out.push_str(&text[cursor..]);
    out
}
