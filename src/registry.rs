//! Credential registry: durable credential key → display name map.
//!
//! The registry mirrors one storage namespace (default `"UserDB"`) into an
//! in-memory map.  Writes go to storage synchronously before returning.
//! Every operation is total: storage failures are logged and the in-memory
//! view stays authoritative for the rest of the session.

use std::collections::BTreeMap;
use std::fmt;

use log::{error, info, warn};

use crate::app::ports::StoragePort;

/// Prefix distinguishing fingerprint slots from RFID UIDs.
pub const FINGER_KEY_PREFIX: &str = "FINGER_";

/// Identifier of an enrolled credential: a hex RFID UID or `FINGER_<slot>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CredentialKey(String);

impl CredentialKey {
    /// Key for a fingerprint slot reported by the device.
    pub fn finger(id: &str) -> Self {
        Self(format!("{FINGER_KEY_PREFIX}{id}"))
    }

    /// Key for an RFID card UID (used verbatim).
    pub fn rfid(uid: &str) -> Self {
        Self(uid.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage-backed credential name lookup.
pub struct CredentialRegistry<S: StoragePort> {
    store: S,
    namespace: String,
    unknown_name: String,
    entries: BTreeMap<String, String>,
}

impl<S: StoragePort> CredentialRegistry<S> {
    /// Load every entry of `namespace` from `store`.
    ///
    /// Entries that are not valid UTF-8 are skipped with a warning.
    pub fn open(store: S, namespace: &str, unknown_name: &str) -> Self {
        let mut entries = BTreeMap::new();
        match store.keys(namespace) {
            Ok(keys) => {
                for key in keys {
                    match store.read(namespace, &key) {
                        Ok(bytes) => match String::from_utf8(bytes) {
                            Ok(name) => {
                                entries.insert(key, name);
                            }
                            Err(_) => warn!("Registry: skipping non-UTF-8 name for {}", key),
                        },
                        Err(e) => warn!("Registry: cannot read {}: {}", key, e),
                    }
                }
            }
            Err(e) => error!("Registry: cannot list namespace {}: {}", namespace, e),
        }
        info!("Registry: {} credential(s) loaded from {}", entries.len(), namespace);

        Self {
            store,
            namespace: namespace.to_owned(),
            unknown_name: unknown_name.to_owned(),
            entries,
        }
    }

    /// Insert or overwrite the name for `key`.
    pub fn put(&mut self, key: &CredentialKey, name: &str) {
        if let Err(e) = self.store.write(&self.namespace, key.as_str(), name.as_bytes()) {
            error!("Registry: persisting {} failed: {}", key, e);
        }
        self.entries.insert(key.as_str().to_owned(), name.to_owned());
    }

    /// Display name for `key`, or the unknown-credential label.
    pub fn get(&self, key: &CredentialKey) -> &str {
        self.lookup(key).unwrap_or(&self.unknown_name)
    }

    /// Display name for `key` if it is registered.
    pub fn lookup(&self, key: &CredentialKey) -> Option<&str> {
        self.entries.get(key.as_str()).map(String::as_str)
    }

    /// All `(key, name)` pairs.  Ordered by key, but callers should not
    /// depend on the order.
    pub fn enumerate(&self) -> Vec<(CredentialKey, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (CredentialKey(k.clone()), v.clone()))
            .collect()
    }

    /// Remove every entry.  Irreversible.
    pub fn clear_all(&mut self) {
        if let Err(e) = self.store.erase_namespace(&self.namespace) {
            error!("Registry: erasing {} failed: {}", self.namespace, e);
        }
        self.entries.clear();
        info!("Registry: cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Label returned by [`get`](Self::get) for unregistered keys.
    pub fn unknown_name(&self) -> &str {
        &self.unknown_name
    }

    /// Backing store (for inspection in tests and diagnostics).
    pub fn store(&self) -> &S {
        &self.store
    }
}
