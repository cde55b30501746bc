//! Inter-thread communication channels.
//!
//! Uses `embassy-sync` bounded MPMC channels to bridge the blocking I/O
//! threads with the single consuming console loop.  Every inbound item is
//! processed one at a time, in arrival order per producer.
//!
//! ```text
//! ┌──────────────┐  LinkEvent   ┌──────────────┐
//! │  MQTT thread │────────────▶│              │
//! └──────────────┘              │ Console loop │
//! ┌──────────────┐  AppCommand  │  (consumer)  │
//! │ stdin thread │────────────▶│              │
//! └──────────────┘              └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future;

use crate::app::commands::AppCommand;

/// Something the broker link reports to the console loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Broker acknowledged the connection (also after a reconnect).
    Connected,
    /// Link dropped; the adapter keeps retrying unless stopped.
    ConnectionLost(String),
    /// A publish arrived on a subscribed topic.
    Message { topic: String, payload: String },
}

/// One item taken off the inbound channels.
#[derive(Debug)]
pub enum Inbound {
    Link(LinkEvent),
    Operator(AppCommand),
}

/// Channel depth for link (broker) events.
const LINK_DEPTH: usize = 32;

/// Channel depth for operator commands.
const OPERATOR_DEPTH: usize = 8;

/// Broker link → console loop.
pub static LINK_CHANNEL: Channel<CriticalSectionRawMutex, LinkEvent, LINK_DEPTH> = Channel::new();

/// Operator input → console loop.
pub static OPERATOR_CHANNEL: Channel<CriticalSectionRawMutex, AppCommand, OPERATOR_DEPTH> =
    Channel::new();

/// Block the calling thread until either channel yields an item.
/// Link events win ties so device reports are never starved by typing.
pub fn next_inbound() -> Inbound {
    future::block_on(future::or(
        async { Inbound::Link(LINK_CHANNEL.receive().await) },
        async { Inbound::Operator(OPERATOR_CHANNEL.receive().await) },
    ))
}

/// Blocking send from an I/O thread.  Applies back-pressure when full.
pub fn send_link_event(event: LinkEvent) {
    future::block_on(LINK_CHANNEL.send(event));
}

/// Blocking send from the operator input thread.
pub fn send_operator_command(cmd: AppCommand) {
    future::block_on(OPERATOR_CHANNEL.send(cmd));
}
