//! Typed replies decoded from auxiliary controller register reads.
//!
//! Every reply type knows its wire length and how to decode itself from
//! raw bytes.  A failed read is normalised to the all-zero reply with the
//! `stale` flag set, so callers can tell a substituted zero from a real
//! one.

use serde::Serialize;

pub const VALVE_STATUS_LEN: usize = 4;
pub const TRAVEL_TIMES_LEN: usize = 4;
pub const DEGREES_LEN: usize = 2;
pub const PUMP_STATUS_LEN: usize = 1;
pub const HEATER_STATUS_LEN: usize = 4;
pub const LIGHT_STATUS_LEN: usize = 1;
pub const TEMPERATURE_LEN: usize = 2;

/// Longest reply in the register map.
pub const MAX_REPLY: usize = 4;

/// A fixed-width register reply.
pub trait Reply: Sized {
    /// Number of bytes the auxiliary controller returns.
    const LEN: usize;

    /// Decode from raw bytes.  Missing bytes read as zero.
    fn decode(raw: &[u8]) -> Self;

    /// Flag this reply as a substituted value.
    fn into_stale(self) -> Self;

    /// The zero reply used when a read fails.
    fn stale() -> Self {
        Self::decode(&[]).into_stale()
    }
}

fn byte(raw: &[u8], i: usize) -> u8 {
    raw.get(i).copied().unwrap_or(0)
}

/// `value = (byte0 << 8) | byte1`
pub fn be16(raw: &[u8], i: usize) -> u16 {
    (u16::from(byte(raw, i)) << 8) | u16::from(byte(raw, i + 1))
}

fn is_false(b: &bool) -> bool {
    !*b
}

// ---------------------------------------------------------------------------
// Valve
// ---------------------------------------------------------------------------

/// State-machine code reported by a valve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveState {
    /// Not moving; mechanically settled.
    Inactive,
    /// A move to a position failed.
    SeekFail,
    /// One of the calibration sub-phases (codes 100–150).
    Calibrating(u8),
    /// Driving to a travel stop (codes 200–203, 230–233).
    SeekingLimit(u8),
    /// Timed move to a target position (codes 210–211).
    MovingToPosition(u8),
    Unknown(u8),
}

impl ValveState {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Inactive,
            1 => Self::SeekFail,
            100..=150 => Self::Calibrating(code),
            210 | 211 => Self::MovingToPosition(code),
            200..=203 | 230..=233 => Self::SeekingLimit(code),
            _ => Self::Unknown(code),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::SeekFail => 1,
            Self::Calibrating(c)
            | Self::SeekingLimit(c)
            | Self::MovingToPosition(c)
            | Self::Unknown(c) => c,
        }
    }

    pub fn is_inactive(self) -> bool {
        self == Self::Inactive
    }

    /// Human-readable description of the state-machine code.
    pub fn describe(self) -> &'static str {
        match self.code() {
            0 => "Valve Inactive",
            1 => "Seek Fail",
            100 => "Cal. Start",
            120 => "Cal. Start - 3 seconds negative",
            121 => "Cal. Start - 3 seconds positive",
            122 => "Cal. Start - quiescent",
            101 => "Cal. Known State (neg) Seek",
            102 => "Cal. Known State (neg) Initiation - spin-up",
            103 => "Cal. Looking for Known State (neg) Limit",
            104 => "Cal. Looking for Known State (neg) Limit - settling",
            105 => "Cal. Found Known State (neg) Limit",
            106 => "Cal. Positive Benchmark",
            107 => "Cal. Positive Initiation - spin-up",
            108 => "Cal. Looking for Positive Limit",
            109 => "Cal. Looking for Positive Limit - settling",
            110 => "Cal. Found Positive Limit",
            111 => "Cal. Negative Benchmark",
            112 => "Cal. Negative Initiation - spin-up",
            113 => "Cal. Looking for Negative Limit",
            114 => "Cal. Looking for Negative Limit - settling",
            115 => "Cal. Found Negative Limit",
            150 => "Cal. End",
            200 => "Move Low Limit Initiate",
            201 => "Move Low Limit Current Wait",
            202 => "Move Low Limit Current check",
            203 => "Move Low Limit Done",
            230 => "Move High Limit Initiate",
            231 => "Move High Limit Current Wait",
            232 => "Move High Limit Current check",
            233 => "Move High Limit Done",
            210 => "Move to Position Initiate (timed)",
            211 => "Move to Position Done",
            _ => "Unknown",
        }
    }
}

impl Serialize for ValveState {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(self.code())
    }
}

/// `{state, prev, position}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValveStatus {
    pub state: ValveState,
    pub prev: ValveState,
    pub position: u16,
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
}

impl Reply for ValveStatus {
    const LEN: usize = VALVE_STATUS_LEN;

    fn decode(raw: &[u8]) -> Self {
        Self {
            state: ValveState::from_code(byte(raw, 0)),
            prev: ValveState::from_code(byte(raw, 1)),
            position: be16(raw, 2),
            stale: false,
        }
    }

    fn into_stale(self) -> Self {
        Self { stale: true, ..self }
    }
}

/// Calibrated full-sweep times in tenths of a second: `{pos, neg}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TravelTimes {
    pub pos: u16,
    pub neg: u16,
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
}

impl Reply for TravelTimes {
    const LEN: usize = TRAVEL_TIMES_LEN;

    fn decode(raw: &[u8]) -> Self {
        Self {
            pos: be16(raw, 0),
            neg: be16(raw, 2),
            stale: false,
        }
    }

    fn into_stale(self) -> Self {
        Self { stale: true, ..self }
    }
}

/// One calibrated travel stop, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degrees {
    pub degrees: u16,
    pub stale: bool,
}

impl Reply for Degrees {
    const LEN: usize = DEGREES_LEN;

    fn decode(raw: &[u8]) -> Self {
        Self {
            degrees: be16(raw, 0),
            stale: false,
        }
    }

    fn into_stale(self) -> Self {
        Self { stale: true, ..self }
    }
}

/// `{min, max}` travel stops of a valve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DegreeLimits {
    pub min: u16,
    pub max: u16,
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
}

// ---------------------------------------------------------------------------
// Pump, light
// ---------------------------------------------------------------------------

/// `{status}`: pump speed (0 off, 1 low, 2 high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PumpStatus {
    pub status: u8,
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
}

impl Reply for PumpStatus {
    const LEN: usize = PUMP_STATUS_LEN;

    fn decode(raw: &[u8]) -> Self {
        Self {
            status: byte(raw, 0),
            stale: false,
        }
    }

    fn into_stale(self) -> Self {
        Self { stale: true, ..self }
    }
}

/// `{status}`: light relay (0 off, 1 on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightStatus {
    pub status: u8,
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
}

impl Reply for LightStatus {
    const LEN: usize = LIGHT_STATUS_LEN;

    fn decode(raw: &[u8]) -> Self {
        Self {
            status: byte(raw, 0),
            stale: false,
        }
    }

    fn into_stale(self) -> Self {
        Self { stale: true, ..self }
    }
}

// ---------------------------------------------------------------------------
// Heater
// ---------------------------------------------------------------------------

/// `{enabled, active, setPoint}`, set point in tenths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterStatus {
    pub enabled: u8,
    pub active: u8,
    pub set_point: u16,
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
}

impl Reply for HeaterStatus {
    const LEN: usize = HEATER_STATUS_LEN;

    fn decode(raw: &[u8]) -> Self {
        Self {
            enabled: byte(raw, 0),
            active: byte(raw, 1),
            set_point: be16(raw, 2),
            stale: false,
        }
    }

    fn into_stale(self) -> Self {
        Self { stale: true, ..self }
    }
}

// ---------------------------------------------------------------------------
// Thermometer
// ---------------------------------------------------------------------------

/// `{temp}` in tenths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Temperature {
    pub temp: u16,
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
}

impl Reply for Temperature {
    const LEN: usize = TEMPERATURE_LEN;

    fn decode(raw: &[u8]) -> Self {
        Self {
            temp: be16(raw, 0),
            stale: false,
        }
    }

    fn into_stale(self) -> Self {
        Self { stale: true, ..self }
    }
}
