//! Inbound commands to the controller.
//!
//! Requests arrive as slash-separated paths, one per line, mirroring the
//! routes the dashboard uses:
//!
//! ```text
//!   mode/set/spa           valve/0/move/90        heater/0/enable/1
//!   mode/check             pump/1/set/2           therm/0/config/1,2,3,4,5,6
//! ```
//!
//! Parsing is pure and bounds-checks every instance index against the
//! board population in [`wiring`](crate::wiring).

use core::fmt;
use core::str::FromStr;

use crate::protocol::Coefficients;
use crate::wiring::{HEATER_COUNT, LIGHT_COUNT, PUMP_COUNT, THERMOMETER_COUNT, VALVE_COUNT};

/// Longest mode name accepted on the command surface.
pub const MAX_MODE_NAME: usize = 16;

pub type ModeName = heapless::String<MAX_MODE_NAME>;

/// Commands that external adapters can send into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Run a mode plan.  The name is checked against the plan table by
    /// the controller, not here.
    SetMode(ModeName),
    /// Identify the active mode from live readings.
    CheckMode,

    ValveStatus(usize),
    ValveCalibrate(usize),
    ValveDegrees(usize),
    ValveTravelTimes(usize),
    ValveMove(usize, u16),

    PumpStatus(usize),
    PumpSet(usize, u8),

    HeaterStatus(usize),
    HeaterEnable(usize, bool),
    /// Set point in tenths of a degree.
    HeaterConfig(usize, u16),

    LightStatus(usize),
    LightControl(usize, bool),

    ThermometerRead(usize),
    ThermometerConfig(usize, Coefficients),

    /// Factory-reset the auxiliary controller.
    SystemReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Device class unknown or instance index out of range.
    UnknownDevice,
    /// Path shape or argument did not parse.
    Malformed,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDevice => write!(f, "unknown device"),
            Self::Malformed => write!(f, "malformed command"),
        }
    }
}

impl std::error::Error for CommandError {}

fn index(s: &str, count: usize) -> Result<usize, CommandError> {
    let i: usize = s.parse().map_err(|_| CommandError::Malformed)?;
    if i < count {
        Ok(i)
    } else {
        Err(CommandError::UnknownDevice)
    }
}

fn number<T: FromStr>(s: &str) -> Result<T, CommandError> {
    s.parse().map_err(|_| CommandError::Malformed)
}

fn flag(s: &str) -> Result<bool, CommandError> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(CommandError::Malformed),
    }
}

fn is_device_class(s: &str) -> bool {
    matches!(
        s,
        "mode" | "valve" | "pump" | "heater" | "light" | "therm" | "system"
    )
}

fn coefficients(s: &str) -> Result<Coefficients, CommandError> {
    let mut it = s.split(',');
    let mut next = || it.next().ok_or(CommandError::Malformed);
    let c = Coefficients {
        t_a: number(next()?)?,
        t_b: number(next()?)?,
        t_c: number(next()?)?,
        r_a: number(next()?)?,
        r_b: number(next()?)?,
        r_c: number(next()?)?,
    };
    if it.next().is_some() {
        return Err(CommandError::Malformed);
    }
    Ok(c)
}

impl FromStr for AppCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let path = line.trim().trim_matches('/');
        let mut parts = heapless::Vec::<&str, 5>::new();
        for part in path.split('/') {
            parts.push(part).map_err(|_| CommandError::Malformed)?;
        }

        match parts.as_slice() {
            ["mode", "set", name] => {
                let name = ModeName::try_from(*name).map_err(|()| CommandError::Malformed)?;
                Ok(Self::SetMode(name))
            }
            ["mode", "check"] => Ok(Self::CheckMode),

            ["valve", i, "status"] => Ok(Self::ValveStatus(index(i, VALVE_COUNT)?)),
            ["valve", i, "calibrate"] => Ok(Self::ValveCalibrate(index(i, VALVE_COUNT)?)),
            ["valve", i, "degrees"] => Ok(Self::ValveDegrees(index(i, VALVE_COUNT)?)),
            ["valve", i, "travel"] => Ok(Self::ValveTravelTimes(index(i, VALVE_COUNT)?)),
            ["valve", i, "move", deg] => Ok(Self::ValveMove(index(i, VALVE_COUNT)?, number(deg)?)),

            ["pump", i, "status"] => Ok(Self::PumpStatus(index(i, PUMP_COUNT)?)),
            ["pump", i, "set", speed] => Ok(Self::PumpSet(index(i, PUMP_COUNT)?, number(speed)?)),

            ["heater", i, "status"] => Ok(Self::HeaterStatus(index(i, HEATER_COUNT)?)),
            ["heater", i, "enable", on] => Ok(Self::HeaterEnable(index(i, HEATER_COUNT)?, flag(on)?)),
            ["heater", i, "config", tenths] => {
                Ok(Self::HeaterConfig(index(i, HEATER_COUNT)?, number(tenths)?))
            }

            ["light", i, "status"] => Ok(Self::LightStatus(index(i, LIGHT_COUNT)?)),
            ["light", i, "control", on] => Ok(Self::LightControl(index(i, LIGHT_COUNT)?, flag(on)?)),

            ["therm", i, "read"] => Ok(Self::ThermometerRead(index(i, THERMOMETER_COUNT)?)),
            ["therm", i, "config", c] => Ok(Self::ThermometerConfig(
                index(i, THERMOMETER_COUNT)?,
                coefficients(c)?,
            )),

            ["system", "reset"] => Ok(Self::SystemReset),

            [device, ..] if !device.is_empty() && !is_device_class(device) => {
                Err(CommandError::UnknownDevice)
            }
            _ => Err(CommandError::Malformed),
        }
    }
}
