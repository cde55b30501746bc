//! Lock console library.
//!
//! Operator front-end for the ESP32 door lock: credential enrollment over
//! MQTT, a persistent name registry and annotated unlock logs. The binary
//! in `main.rs` only wires adapters to [`app::service::AppService`]; all
//! logic lives here so the integration tests can drive it with mocks.

#![deny(unused_must_use)]

pub mod adapters;
pub mod annotate;
pub mod app;
pub mod channels;
pub mod classify;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod registry;

pub use error::{Error, Result};
