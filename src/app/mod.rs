//! Application core — pure session logic, zero I/O.
//!
//! This module contains the business rules for one device session:
//! command forwarding, state mirroring, and notification fan-out.
//! All interaction with the radio happens through the **port trait**
//! defined in [`ports`], keeping this layer fully testable without a
//! real device.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
