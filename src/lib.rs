//! Pool/spa controller library.
//!
//! Drives valves, pumps, a heater, a light and thermometers through an
//! auxiliary controller on a shared I2C bus.  Named operating modes are
//! static plans executed strictly in order; the active mode is inferred
//! back from live readings.
//!
//! Everything that touches the outside world sits behind the port
//! traits in [`app::ports`], so the whole stack runs against a simulated
//! bus in tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod bus;
pub mod config;
pub mod drivers;
pub mod error;
pub mod plan;
pub mod protocol;
pub mod reconcile;
pub mod wiring;

pub use error::{BusError, Error, Result};
