//! Motorised three-way valve, driven by the auxiliary controller.
//!
//! The auxiliary controller runs the valve state machine (calibration,
//! timed moves to position, limit seeks); this driver only issues
//! commands and reads back the state code and estimated position.
//!
//! ## Safety contract
//!
//! A move returns as soon as the command is acknowledged, long before the
//! valve is seated.  Anything that must not run against a half-open valve
//! (pumps) has to wait for quiescence first; see
//! [`quiescence`](crate::plan::quiescence).

use std::sync::Arc;

use log::{debug, info};

use crate::app::ports::BusPort;
use crate::bus::SharedBus;
use crate::error::Result;
use crate::protocol::reply::Degrees;
use crate::protocol::{DegreeLimits, Limit, Operation, TravelTimes, ValveStatus, encode};
use crate::wiring::VALVE_MAX_DEGREES;

pub struct Valve<B> {
    bus: Arc<SharedBus<B>>,
    index: u8,
}

impl<B: BusPort> Valve<B> {
    pub fn new(bus: Arc<SharedBus<B>>, index: u8) -> Self {
        Self { bus, index }
    }

    /// Current state-machine code, previous code and position.
    pub async fn status(&self) -> ValveStatus {
        self.bus
            .read(&encode(Operation::ValveStatus { valve: self.index }))
            .await
    }

    /// Start a timed move.  Targets beyond the mechanical sweep are
    /// clamped; returns the target actually sent.
    pub async fn move_to(&self, degrees: u16) -> Result<u16> {
        let target = degrees.min(VALVE_MAX_DEGREES);
        debug!("valve {} move to {} deg", self.index, target);
        self.bus
            .write(&encode(Operation::ValveMove {
                valve: self.index,
                degrees: target,
            }))
            .await?;
        Ok(target)
    }

    /// Kick off the auxiliary controller's calibration sequence.
    pub async fn calibrate(&self) -> Result<()> {
        info!("valve {} calibration requested", self.index);
        self.bus
            .write(&encode(Operation::ValveCalibrate { valve: self.index }))
            .await
    }

    /// Calibrated full-sweep times, in tenths of a second.
    pub async fn travel_times(&self) -> TravelTimes {
        self.bus
            .read(&encode(Operation::ValveTravelTimes { valve: self.index }))
            .await
    }

    /// Calibrated travel stops.  Two reads, one per stop.
    pub async fn degrees(&self) -> DegreeLimits {
        let min: Degrees = self
            .bus
            .read(&encode(Operation::ValveDegrees {
                valve: self.index,
                limit: Limit::Min,
            }))
            .await;
        let max: Degrees = self
            .bus
            .read(&encode(Operation::ValveDegrees {
                valve: self.index,
                limit: Limit::Max,
            }))
            .await;
        DegreeLimits {
            min: min.degrees,
            max: max.degrees,
            stale: min.stale || max.stale,
        }
    }
}
