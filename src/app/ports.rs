//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (broker link, event sinks, storage, config file) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes them
//! via generics, so the domain core never touches sockets or files directly.

use crate::config::ConsoleConfig;

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe capability of the broker link.
///
/// Inbound messages do not flow through this trait; adapters deliver them
/// as [`LinkEvent`](crate::channels::LinkEvent)s to the consuming loop.
pub trait TransportPort {
    /// Start connecting.  Completion is reported later as
    /// `LinkEvent::Connected`.
    fn connect(&mut self) -> Result<(), CommsError>;

    /// Tear the link down.  Safe to call when already disconnected.
    fn disconnect(&mut self) -> Result<(), CommsError>;

    /// Publish a UTF-8 payload.
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError>;

    /// Subscribe to a topic.
    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → operator log)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (console, log, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists console configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration.
    /// Returns [`ConsoleConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<ConsoleConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ConsoleConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ key-value store)
// ───────────────────────────────────────────────────────────────

/// Persistent namespaced key-value storage.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - A write has reached durable storage when it returns `Ok`.
pub trait StoragePort {
    /// Read a value.
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a value.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// All keys currently stored in `namespace`.
    fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError>;

    /// Remove every key in `namespace`.
    fn erase_namespace(&mut self, namespace: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the backing file.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Backing file exists but could not be decoded.
    Corrupted,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`TransportPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Connection attempt could not be started.
    ConnectFailed,
    /// Operation needs a link that is not up.
    NotConnected,
    PublishFailed,
    SubscribeFailed,
    DisconnectFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Corrupted => write!(f, "store corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for CommsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::NotConnected => write!(f, "not connected"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::DisconnectFailed => write!(f, "disconnect failed"),
        }
    }
}
