//! Thermistor channel on the auxiliary controller.
//!
//! Resistance-to-temperature conversion happens on the auxiliary
//! controller using the Steinhart–Hart coefficients written by
//! [`Thermometer::config`]; reads come back already in tenths of a degree.

use std::sync::Arc;

use log::info;

use crate::app::ports::BusPort;
use crate::bus::SharedBus;
use crate::error::Result;
use crate::protocol::{Coefficients, Operation, Temperature, encode};

pub struct Thermometer<B> {
    bus: Arc<SharedBus<B>>,
    index: u8,
}

impl<B: BusPort> Thermometer<B> {
    pub fn new(bus: Arc<SharedBus<B>>, index: u8) -> Self {
        Self { bus, index }
    }

    pub async fn read(&self) -> Temperature {
        self.bus
            .read(&encode(Operation::ThermometerRead {
                thermometer: self.index,
            }))
            .await
    }

    pub async fn config(&self, coefficients: Coefficients) -> Result<()> {
        info!("thermometer {} coefficients {:?}", self.index, coefficients);
        self.bus
            .write(&encode(Operation::ThermometerConfig {
                thermometer: self.index,
                coefficients,
            }))
            .await
    }
}
