//! Pool light relay.

use std::sync::Arc;

use log::debug;

use crate::app::ports::BusPort;
use crate::bus::SharedBus;
use crate::error::Result;
use crate::protocol::{LightStatus, Operation, encode};

pub struct Light<B> {
    bus: Arc<SharedBus<B>>,
    index: u8,
}

impl<B: BusPort> Light<B> {
    pub fn new(bus: Arc<SharedBus<B>>, index: u8) -> Self {
        Self { bus, index }
    }

    pub async fn status(&self) -> LightStatus {
        self.bus
            .read(&encode(Operation::LightStatus { light: self.index }))
            .await
    }

    pub async fn control(&self, on: bool) -> Result<()> {
        debug!("light {} on={}", self.index, on);
        self.bus
            .write(&encode(Operation::LightControl {
                light: self.index,
                on,
            }))
            .await
    }
}
