//! Application core: domain logic behind port traits.
//!
//! This module holds the business rules of the pool controller: mode
//! changes, mode detection and the command surface.  All interaction
//! with hardware happens through the **port traits** defined in
//! [`ports`], keeping this layer fully testable without a real bus.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
