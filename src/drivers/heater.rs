//! Heater enable relay and set point.
//!
//! The auxiliary controller runs the thermostat itself: "enabled" arms
//! the heater, "active" reports whether it is currently firing.

use std::sync::Arc;

use log::{debug, info};

use crate::app::ports::BusPort;
use crate::bus::SharedBus;
use crate::error::Result;
use crate::protocol::{HeaterStatus, Operation, encode};

pub struct Heater<B> {
    bus: Arc<SharedBus<B>>,
    index: u8,
}

impl<B: BusPort> Heater<B> {
    pub fn new(bus: Arc<SharedBus<B>>, index: u8) -> Self {
        Self { bus, index }
    }

    pub async fn status(&self) -> HeaterStatus {
        self.bus
            .read(&encode(Operation::HeaterStatus {
                heater: self.index,
            }))
            .await
    }

    pub async fn enable(&self, on: bool) -> Result<()> {
        debug!("heater {} enable={}", self.index, on);
        self.bus
            .write(&encode(Operation::HeaterEnable {
                heater: self.index,
                on,
            }))
            .await
    }

    /// Set point in tenths of a degree.
    pub async fn config(&self, tenths: u16) -> Result<()> {
        info!("heater {} set point {}.{}", self.index, tenths / 10, tenths % 10);
        self.bus
            .write(&encode(Operation::HeaterConfig {
                heater: self.index,
                tenths,
            }))
            .await
    }
}
