//! Circulation / booster pump relay driver.
//!
//! Three speeds switched by the auxiliary controller: 0 off, 1 low,
//! 2 high.  The speed travels in the `arg` bits of the register byte, so
//! a speed change is a single-byte write.
//!
//! ## Safety contract
//!
//! The main pump must never start against a moving valve.  Enforced by
//! plan ordering; this driver is a dumb actuator.

use std::sync::Arc;

use log::debug;

use crate::app::ports::BusPort;
use crate::bus::SharedBus;
use crate::error::Result;
use crate::protocol::{Operation, PumpStatus, encode};

pub const SPEED_OFF: u8 = 0;
pub const SPEED_LOW: u8 = 1;
pub const SPEED_HIGH: u8 = 2;

pub struct Pump<B> {
    bus: Arc<SharedBus<B>>,
    index: u8,
}

impl<B: BusPort> Pump<B> {
    pub fn new(bus: Arc<SharedBus<B>>, index: u8) -> Self {
        Self { bus, index }
    }

    pub async fn status(&self) -> PumpStatus {
        self.bus
            .read(&encode(Operation::PumpStatus { pump: self.index }))
            .await
    }

    /// Set the speed, clamped to high.  Returns the speed actually sent.
    pub async fn set_speed(&self, speed: u8) -> Result<u8> {
        let speed = speed.min(SPEED_HIGH);
        debug!("pump {} speed {}", self.index, speed);
        self.bus
            .write(&encode(Operation::PumpSetSpeed {
                pump: self.index,
                speed,
            }))
            .await?;
        Ok(speed)
    }
}
