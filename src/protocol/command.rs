//! Command encoding for the auxiliary controller register map.
//!
//! Every command starts with one register byte:
//!
//! ```text
//!   7 6 5   4   3 2   1 0
//!   -----   -   ---   ---
//!   family  w   arg   index
//! ```
//!
//! The family selects the equipment class, `w` distinguishes writes from
//! reads, `arg` carries a sub-selector (pump speed, on/off bit, limit) and
//! the low two bits select the instance.  Multi-byte payloads are sent
//! big-endian, high byte first.

use heapless::Vec;

// ---------------------------------------------------------------------------
// Register families
// ---------------------------------------------------------------------------

pub const VALVE_STATUS: u8 = 0x00;
pub const VALVE_TRAVEL_TIMES: u8 = 0x04;
pub const VALVE_DEGREES_MIN: u8 = 0x08;
pub const VALVE_DEGREES_MAX: u8 = 0x0C;
pub const VALVE_CALIBRATE: u8 = 0x30;
pub const VALVE_MOVE: u8 = 0x50;
pub const PUMP_STATUS: u8 = 0x60;
pub const PUMP_SET_SPEED: u8 = 0x70;
pub const THERMOMETER_READ: u8 = 0x80;
pub const THERMOMETER_CONFIG: u8 = 0x90;
pub const HEATER_STATUS: u8 = 0xA0;
pub const HEATER_ENABLE: u8 = 0xB0;
pub const HEATER_CONFIG: u8 = 0xB8;
pub const LIGHT_STATUS: u8 = 0xC0;
pub const LIGHT_CONTROL: u8 = 0xD0;
pub const SYSTEM_RESET: u8 = 0xF0;

/// Low bits reserved for the instance index.
pub const INDEX_MASK: u8 = 0x03;
/// Shift of the two-bit `arg` sub-selector.
pub const ARG_SHIFT: u8 = 2;

/// Largest payload in the register map (thermometer coefficients).
pub const MAX_PAYLOAD: usize = 9;
/// Register byte plus the largest payload.
pub const MAX_FRAME: usize = MAX_PAYLOAD + 1;

pub type Payload = Vec<u8, MAX_PAYLOAD>;
pub type Frame = Vec<u8, MAX_FRAME>;

// ---------------------------------------------------------------------------
// Logical operations
// ---------------------------------------------------------------------------

/// Which calibrated travel stop of a valve to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Min,
    Max,
}

/// Steinhart–Hart calibration block for a thermometer: three reference
/// temperatures (whole degrees) and the thermistor resistance at each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coefficients {
    pub t_a: u8,
    pub t_b: u8,
    pub t_c: u8,
    pub r_a: u16,
    pub r_b: u16,
    pub r_c: u16,
}

impl Coefficients {
    fn to_payload(self) -> Payload {
        let [ra_hi, ra_lo] = self.r_a.to_be_bytes();
        let [rb_hi, rb_lo] = self.r_b.to_be_bytes();
        let [rc_hi, rc_lo] = self.r_c.to_be_bytes();
        let mut payload = Payload::new();
        // Exactly MAX_PAYLOAD bytes; cannot overflow.
        let _ = payload.extend_from_slice(&[
            self.t_a, self.t_b, self.t_c, ra_hi, ra_lo, rb_hi, rb_lo, rc_hi, rc_lo,
        ]);
        payload
    }
}

/// One logical operation against one piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ValveStatus { valve: u8 },
    ValveTravelTimes { valve: u8 },
    ValveDegrees { valve: u8, limit: Limit },
    ValveCalibrate { valve: u8 },
    ValveMove { valve: u8, degrees: u16 },
    PumpStatus { pump: u8 },
    PumpSetSpeed { pump: u8, speed: u8 },
    HeaterStatus { heater: u8 },
    HeaterEnable { heater: u8, on: bool },
    HeaterConfig { heater: u8, tenths: u16 },
    LightStatus { light: u8 },
    LightControl { light: u8, on: bool },
    ThermometerRead { thermometer: u8 },
    ThermometerConfig { thermometer: u8, coefficients: Coefficients },
    SystemReset,
}

// ---------------------------------------------------------------------------
// Encoded command
// ---------------------------------------------------------------------------

/// A register-addressed bus command, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register write, optionally followed by data bytes.
    Write { register: u8, payload: Payload },
    /// Register select followed by a read of `len` bytes, issued as one
    /// combined transaction.
    Read { register: u8, len: usize },
}

impl Command {
    pub fn register(&self) -> u8 {
        match self {
            Self::Write { register, .. } | Self::Read { register, .. } => *register,
        }
    }

    /// Wire bytes of a write: the register followed by its payload.
    /// Writes without data still carry a single zero data byte, which is
    /// what the auxiliary controller firmware expects.
    pub fn frame(&self) -> Frame {
        let mut frame = Frame::new();
        let _ = frame.push(self.register());
        if let Self::Write { payload, .. } = self {
            if payload.is_empty() {
                let _ = frame.push(0);
            } else {
                let _ = frame.extend_from_slice(payload);
            }
        }
        frame
    }
}

fn indexed(family: u8, index: u8) -> u8 {
    family | (index & INDEX_MASK)
}

fn with_arg(family: u8, arg: u8, index: u8) -> u8 {
    family | ((arg & 0x03) << ARG_SHIFT) | (index & INDEX_MASK)
}

fn be_payload(value: u16) -> Payload {
    let mut payload = Payload::new();
    let _ = payload.extend_from_slice(&value.to_be_bytes());
    payload
}

fn write(register: u8) -> Command {
    Command::Write {
        register,
        payload: Payload::new(),
    }
}

/// Map a logical operation onto its register byte and payload.
pub fn encode(op: Operation) -> Command {
    use super::reply;

    match op {
        Operation::ValveStatus { valve } => Command::Read {
            register: indexed(VALVE_STATUS, valve),
            len: reply::VALVE_STATUS_LEN,
        },
        Operation::ValveTravelTimes { valve } => Command::Read {
            register: indexed(VALVE_TRAVEL_TIMES, valve),
            len: reply::TRAVEL_TIMES_LEN,
        },
        Operation::ValveDegrees { valve, limit } => Command::Read {
            register: indexed(
                match limit {
                    Limit::Min => VALVE_DEGREES_MIN,
                    Limit::Max => VALVE_DEGREES_MAX,
                },
                valve,
            ),
            len: reply::DEGREES_LEN,
        },
        Operation::ValveCalibrate { valve } => write(indexed(VALVE_CALIBRATE, valve)),
        Operation::ValveMove { valve, degrees } => Command::Write {
            register: indexed(VALVE_MOVE, valve),
            payload: be_payload(degrees),
        },
        Operation::PumpStatus { pump } => Command::Read {
            register: indexed(PUMP_STATUS, pump),
            len: reply::PUMP_STATUS_LEN,
        },
        Operation::PumpSetSpeed { pump, speed } => write(with_arg(PUMP_SET_SPEED, speed, pump)),
        Operation::HeaterStatus { heater } => Command::Read {
            register: indexed(HEATER_STATUS, heater),
            len: reply::HEATER_STATUS_LEN,
        },
        Operation::HeaterEnable { heater, on } => {
            write(with_arg(HEATER_ENABLE, u8::from(on), heater))
        }
        Operation::HeaterConfig { heater, tenths } => Command::Write {
            register: indexed(HEATER_CONFIG, heater),
            payload: be_payload(tenths),
        },
        Operation::LightStatus { light } => Command::Read {
            register: indexed(LIGHT_STATUS, light),
            len: reply::LIGHT_STATUS_LEN,
        },
        Operation::LightControl { light, on } => write(with_arg(LIGHT_CONTROL, u8::from(on), light)),
        Operation::ThermometerRead { thermometer } => Command::Read {
            register: indexed(THERMOMETER_READ, thermometer),
            len: reply::TEMPERATURE_LEN,
        },
        Operation::ThermometerConfig {
            thermometer,
            coefficients,
        } => Command::Write {
            register: indexed(THERMOMETER_CONFIG, thermometer),
            payload: coefficients.to_payload(),
        },
        Operation::SystemReset => write(SYSTEM_RESET),
    }
}
