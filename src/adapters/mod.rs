//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements    | Connects to                     |
//! |----------------|---------------|---------------------------------|
//! | `config_file`  | ConfigPort    | JSON file on disk               |
//! | `console_sink` | EventSink     | Operator terminal (stdout)      |
//! | `kv_store`     | StoragePort   | postcard file / in-memory map   |
//! | `mqtt`         | TransportPort | MQTT broker (rumqttc)           |

pub mod config_file;
pub mod console_sink;
pub mod kv_store;
pub mod mqtt;
