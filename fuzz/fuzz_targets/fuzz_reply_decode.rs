//! Fuzz target: register reply decoding
//!
//! Decodes arbitrary bytes as every reply type.  Short input pads with
//! zero, long input is truncated; neither may panic or come back stale.
//!
//! cargo fuzz run fuzz_reply_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use poolctl::protocol::reply::{
    Degrees, HeaterStatus, LightStatus, PumpStatus, Reply, Temperature, TravelTimes, ValveStatus,
};

fuzz_target!(|data: &[u8]| {
    let valve = ValveStatus::decode(data);
    assert!(!valve.stale);
    let _ = valve.state.describe();
    assert_eq!(
        valve.state,
        poolctl::protocol::reply::ValveState::from_code(valve.state.code())
    );

    assert!(!TravelTimes::decode(data).stale);
    assert!(!Degrees::decode(data).stale);
    assert!(!PumpStatus::decode(data).stale);
    assert!(!HeaterStatus::decode(data).stale);
    assert!(!LightStatus::decode(data).stale);
    assert!(!Temperature::decode(data).stale);
});
