//! Console configuration parameters
//!
//! All tunable parameters for the lock console.
//! Values can be overridden from a JSON config file or the command line.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Payload published on the RFID enrollment topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfidCommandMode {
    /// Publish the fixed `CMD_ADD` command string.
    Fixed,
    /// Publish the operator-entered display name as raw text.
    Name,
}

/// MQTT topic names shared with the lock firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Unlock-log text from the lock (subscribe).
    pub lock_log: String,
    /// RFID enrollment command (publish).
    pub rfid_add: String,
    /// Fingerprint enrollment command (publish).
    pub finger_add: String,
    /// Enrollment status reports (subscribe).
    pub add_result: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            lock_log: "esp32/lock".into(),
            rfid_add: "esp32/rfid_add".into(),
            finger_add: "esp32/finger_add".into(),
            add_result: "esp32/rfid_add_result".into(),
        }
    }
}

/// Core console configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    // --- Broker ---
    pub broker_host: String,
    pub broker_port: u16,
    /// Client id is `<prefix>_<unix millis>`.
    pub client_id_prefix: String,
    pub keep_alive_secs: u16,
    /// QoS for subscriptions and publishes (0, 1 or 2).
    pub qos: u8,
    /// Upper bound for the reconnect backoff (seconds).
    pub reconnect_max_secs: u16,

    // --- Protocol ---
    pub topics: TopicConfig,
    pub rfid_command: RfidCommandMode,

    // --- Registry ---
    /// Storage namespace holding credential key → display name.
    pub registry_namespace: String,
    /// Label shown for credentials that are not in the registry.
    pub unknown_name: String,
    /// Key-value store file.  `None` keeps the registry in memory only.
    pub store_path: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            // Broker
            broker_host: "broker.hivemq.com".into(),
            broker_port: 1883,
            client_id_prefix: "lockconsole".into(),
            keep_alive_secs: 30,
            qos: 1,
            reconnect_max_secs: 30,

            // Protocol
            topics: TopicConfig::default(),
            rfid_command: RfidCommandMode::Fixed,

            // Registry
            registry_namespace: "UserDB".into(),
            unknown_name: "Unknown".into(),
            store_path: Some("lockconsole.db".into()),
        }
    }
}

impl ConsoleConfig {
    /// Range-check every field.  Called before persisting and after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker_host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("broker_host must not be empty"));
        }
        if self.broker_port == 0 {
            return Err(ConfigError::ValidationFailed("broker_port must be 1–65535"));
        }
        if self.client_id_prefix.is_empty() || self.client_id_prefix.len() > 40 {
            return Err(ConfigError::ValidationFailed(
                "client_id_prefix must be 1–40 characters",
            ));
        }
        if !(5..=3600).contains(&self.keep_alive_secs) {
            return Err(ConfigError::ValidationFailed("keep_alive_secs must be 5–3600"));
        }
        if self.qos > 2 {
            return Err(ConfigError::ValidationFailed("qos must be 0, 1 or 2"));
        }
        if !(1..=600).contains(&self.reconnect_max_secs) {
            return Err(ConfigError::ValidationFailed("reconnect_max_secs must be 1–600"));
        }
        let t = &self.topics;
        for topic in [&t.lock_log, &t.rfid_add, &t.finger_add, &t.add_result] {
            if topic.is_empty() || topic.contains(['+', '#']) {
                return Err(ConfigError::ValidationFailed(
                    "topics must be non-empty and free of wildcards",
                ));
            }
        }
        if t.lock_log == t.add_result {
            return Err(ConfigError::ValidationFailed(
                "lock_log and add_result topics must differ",
            ));
        }
        if self.registry_namespace.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "registry_namespace must not be empty",
            ));
        }
        if self.unknown_name.is_empty() {
            return Err(ConfigError::ValidationFailed("unknown_name must not be empty"));
        }
        Ok(())
    }
}
