//! Register protocol codec for the auxiliary controller.
//!
//! ```text
//!   Operation ──encode──▶ Command ──▶ SharedBus ──▶ raw bytes ──decode──▶ Reply
//! ```
//!
//! [`command`] packs a logical operation (equipment class, instance,
//! value) into a register byte plus big-endian payload; [`reply`] turns
//! the fixed-width register reads back into typed results.

pub mod command;
pub mod reply;

pub use command::{Coefficients, Command, Limit, Operation, encode};
pub use reply::{
    DegreeLimits, HeaterStatus, LightStatus, PumpStatus, Reply, Temperature, TravelTimes,
    ValveState, ValveStatus,
};
