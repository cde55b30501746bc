//! MQTT broker link adapter.
//!
//! Implements [`TransportPort`] on top of the `rumqttc` blocking client.
//! `connect()` spawns one I/O thread that drives the client's event loop
//! and forwards everything the console cares about to
//! [`LINK_CHANNEL`](crate::channels::LINK_CHANNEL):
//!
//! ```text
//!  rumqttc Connection ──▶ I/O thread ──LinkEvent──▶ console loop
//!                               │
//!                        error: ConnectionLost, sleep (1s..cap), retry
//! ```
//!
//! The event loop reconnects on its own after an error, so a dropped
//! broker shows up as `ConnectionLost` followed by `Connected`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};

use crate::app::ports::{CommsError, TransportPort};
use crate::channels::{LinkEvent, send_link_event};
use crate::config::ConsoleConfig;

/// Capacity of the client → event loop request queue.
const REQUEST_CAP: usize = 16;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

pub struct MqttAdapter {
    host: String,
    port: u16,
    client_id_prefix: String,
    keep_alive: Duration,
    qos: QoS,
    backoff_cap: Duration,
    client: Option<Client>,
    stop: Arc<AtomicBool>,
}

impl MqttAdapter {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            host: config.broker_host.clone(),
            port: config.broker_port,
            client_id_prefix: config.client_id_prefix.clone(),
            keep_alive: Duration::from_secs(u64::from(config.keep_alive_secs)),
            qos: qos_from_level(config.qos),
            backoff_cap: Duration::from_secs(u64::from(config.reconnect_max_secs)),
            client: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_started(&self) -> bool {
        self.client.is_some()
    }
}

impl TransportPort for MqttAdapter {
    fn connect(&mut self) -> Result<(), CommsError> {
        if self.client.is_some() {
            return Ok(());
        }

        let client_id = client_id(&self.client_id_prefix, chrono::Utc::now().timestamp_millis());
        let mut options = MqttOptions::new(client_id.clone(), self.host.clone(), self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);

        let (client, connection) = Client::new(options, REQUEST_CAP);
        let stop = Arc::new(AtomicBool::new(false));
        let pump_stop = Arc::clone(&stop);
        let backoff_cap = self.backoff_cap;

        thread::Builder::new()
            .name("mqtt-io".into())
            .spawn(move || pump(connection, &pump_stop, backoff_cap))
            .map_err(|e| {
                warn!("MQTT: cannot spawn I/O thread: {}", e);
                CommsError::ConnectFailed
            })?;

        info!("MQTT: connecting to {}:{} as {}", self.host, self.port, client_id);
        self.client = Some(client);
        self.stop = stop;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), CommsError> {
        self.stop.store(true, Ordering::Release);
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        info!("MQTT: disconnecting");
        // Dropping the client closes the request queue, which ends the
        // I/O thread even if the DISCONNECT packet never leaves.
        client.disconnect().map_err(|e| {
            warn!("MQTT: disconnect failed: {}", e);
            CommsError::DisconnectFailed
        })
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::NotConnected)?;
        client
            .publish(topic, self.qos, false, payload.as_bytes().to_vec())
            .map_err(|e| {
                warn!("MQTT: publish to {} failed: {}", topic, e);
                CommsError::PublishFailed
            })?;
        debug!("MQTT: published {:?} to {}", payload, topic);
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::NotConnected)?;
        client.subscribe(topic, self.qos).map_err(|e| {
            warn!("MQTT: subscribe to {} failed: {}", topic, e);
            CommsError::SubscribeFailed
        })?;
        info!("MQTT: subscribed to {}", topic);
        Ok(())
    }
}

impl Drop for MqttAdapter {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}

/// I/O thread body: drive the event loop until stopped or the client is gone.
fn pump(mut connection: Connection, stop: &AtomicBool, backoff_cap: Duration) {
    let mut backoff = INITIAL_BACKOFF;
    for notification in connection.iter() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                backoff = INITIAL_BACKOFF;
                info!("MQTT: connected");
                send_link_event(LinkEvent::Connected);
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                send_link_event(LinkEvent::Message {
                    topic: publish.topic,
                    payload,
                });
            }
            Ok(_) => {}
            Err(e) => {
                warn!("MQTT: connection error: {} (retry in {:?})", e, backoff);
                send_link_event(LinkEvent::ConnectionLost(e.to_string()));
                thread::sleep(backoff);
                backoff = (backoff * 2).min(backoff_cap);
            }
        }
    }
    debug!("MQTT: I/O thread finished");
}

fn client_id(prefix: &str, unix_millis: i64) -> String {
    format!("{}_{}", prefix, unix_millis)
}

fn qos_from_level(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}
