//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the lock console: link state,
//! enrollment protocol and credential naming.  All interaction with the
//! broker, the store and the operator happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without a broker.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
