//! Bus addressing and equipment population for the pool controller board.
//!
//! Every driver references this module rather than
//! hard-coding addresses or instance counts.

// ---------------------------------------------------------------------------
// I²C bus
// ---------------------------------------------------------------------------

/// Linux character device of the bus the auxiliary controller sits on.
pub const DEFAULT_BUS_PATH: &str = "/dev/i2c-1";
/// 7-bit slave address of the auxiliary controller.
pub const AUX_CONTROLLER_ADDR: u8 = 0x20;

// ---------------------------------------------------------------------------
// Equipment population
// ---------------------------------------------------------------------------

/// Valve 0 switches the jets, valve 1 the drains/returns.
pub const VALVE_COUNT: usize = 2;
/// Pump 0 is the main circulation pump, pump 1 the booster.
pub const PUMP_COUNT: usize = 2;
pub const HEATER_COUNT: usize = 1;
pub const LIGHT_COUNT: usize = 1;
pub const THERMOMETER_COUNT: usize = 1;

/// The register map reserves two bits for the instance index.
pub const MAX_INSTANCES: usize = 4;

// ---------------------------------------------------------------------------
// Valve positions (degrees)
// ---------------------------------------------------------------------------

pub const VALVE_0_SPA: u16 = 0;
pub const VALVE_0_POOL: u16 = 180;
pub const VALVE_0_BOTH: u16 = 90;

pub const VALVE_1_SPA: u16 = 0;
pub const VALVE_1_POOL: u16 = 180;
pub const VALVE_1_BOTH: u16 = 90;

/// Full mechanical sweep of a valve.
pub const VALVE_MAX_DEGREES: u16 = 180;
