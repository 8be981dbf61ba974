//! Resource adapters and the equipment registry.
//!
//! One driver per equipment class, each holding only its instance index
//! and a handle to the [`SharedBus`].  No driver caches hardware state:
//! every `status()` is a fresh bus read.
//!
//! [`Equipment`] is the explicit registry handed to the plan engine and
//! reconciler at construction.  It maps the named plan resources
//! (`heater`, `valve0`, …) onto driver calls with the range clamps
//! applied.

pub mod heater;
pub mod light;
pub mod pump;
pub mod thermometer;
pub mod valve;

use std::sync::Arc;

use log::warn;

use crate::app::ports::BusPort;
use crate::bus::SharedBus;
use crate::error::Result;
use crate::plan::Resource;
use crate::protocol::{Operation, encode};
use crate::wiring::{HEATER_COUNT, LIGHT_COUNT, PUMP_COUNT, THERMOMETER_COUNT, VALVE_COUNT};
use heater::Heater;
use light::Light;
use pump::Pump;
use thermometer::Thermometer;
use valve::Valve;

/// A live reading of one plan resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub value: u16,
    /// The read failed and `value` is a substituted zero.
    pub stale: bool,
}

/// Every driver on the bus, created once at startup.
pub struct Equipment<B> {
    bus: Arc<SharedBus<B>>,
    valves: [Valve<B>; VALVE_COUNT],
    pumps: [Pump<B>; PUMP_COUNT],
    heaters: [Heater<B>; HEATER_COUNT],
    lights: [Light<B>; LIGHT_COUNT],
    thermometers: [Thermometer<B>; THERMOMETER_COUNT],
}

impl<B: BusPort> Equipment<B> {
    pub fn new(port: B) -> Self {
        let bus = Arc::new(SharedBus::new(port));
        Self {
            valves: core::array::from_fn(|i| Valve::new(bus.clone(), i as u8)),
            pumps: core::array::from_fn(|i| Pump::new(bus.clone(), i as u8)),
            heaters: core::array::from_fn(|i| Heater::new(bus.clone(), i as u8)),
            lights: core::array::from_fn(|i| Light::new(bus.clone(), i as u8)),
            thermometers: core::array::from_fn(|i| Thermometer::new(bus.clone(), i as u8)),
            bus,
        }
    }

    pub fn bus(&self) -> &SharedBus<B> {
        &self.bus
    }

    pub fn valve(&self, index: usize) -> Option<&Valve<B>> {
        self.valves.get(index)
    }

    pub fn pump(&self, index: usize) -> Option<&Pump<B>> {
        self.pumps.get(index)
    }

    pub fn heater(&self, index: usize) -> Option<&Heater<B>> {
        self.heaters.get(index)
    }

    pub fn light(&self, index: usize) -> Option<&Light<B>> {
        self.lights.get(index)
    }

    pub fn thermometer(&self, index: usize) -> Option<&Thermometer<B>> {
        self.thermometers.get(index)
    }

    /// Wipe the auxiliary controller's calibration and set points and
    /// reboot it.
    pub async fn factory_reset(&self) -> Result<()> {
        warn!("factory reset requested");
        self.bus.write(&encode(Operation::SystemReset)).await
    }

    /// Drive a plan resource to `value`, clamped to its range.
    /// Returns the value actually commanded.
    pub async fn set(&self, resource: Resource, value: u16) -> Result<u16> {
        match resource {
            Resource::Heater => {
                let on = value != 0;
                self.heaters[0].enable(on).await?;
                Ok(u16::from(on))
            }
            Resource::Valve0 | Resource::Valve1 => {
                self.valves[resource.instance()].move_to(value).await
            }
            Resource::Pump0 | Resource::Pump1 => {
                let speed = value.min(u16::from(u8::MAX)) as u8;
                let sent = self.pumps[resource.instance()].set_speed(speed).await?;
                Ok(u16::from(sent))
            }
            Resource::Light => {
                let on = value != 0;
                self.lights[0].control(on).await?;
                Ok(u16::from(on))
            }
        }
    }

    /// Read back the value a plan would have set on `resource`.
    pub async fn get(&self, resource: Resource) -> Observation {
        match resource {
            Resource::Heater => {
                let s = self.heaters[0].status().await;
                Observation {
                    value: u16::from(s.enabled),
                    stale: s.stale,
                }
            }
            Resource::Valve0 | Resource::Valve1 => {
                let s = self.valves[resource.instance()].status().await;
                Observation {
                    value: s.position,
                    stale: s.stale,
                }
            }
            Resource::Pump0 | Resource::Pump1 => {
                let s = self.pumps[resource.instance()].status().await;
                Observation {
                    value: u16::from(s.status),
                    stale: s.stale,
                }
            }
            Resource::Light => {
                let s = self.lights[0].status().await;
                Observation {
                    value: u16::from(s.status),
                    stale: s.stale,
                }
            }
        }
    }

    /// The valve driver behind a valve resource.
    pub fn valve_for(&self, resource: Resource) -> Option<&Valve<B>> {
        match resource {
            Resource::Valve0 | Resource::Valve1 => self.valves.get(resource.instance()),
            _ => None,
        }
    }
}
