//! Fuzz target: console command parser
//!
//! Feeds arbitrary UTF-8 lines to `AppCommand::from_str`.  Any accepted
//! command must carry an in-range instance index.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use poolctl::app::commands::AppCommand;
use poolctl::wiring::{HEATER_COUNT, LIGHT_COUNT, PUMP_COUNT, THERMOMETER_COUNT, VALVE_COUNT};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(cmd) = line.parse::<AppCommand>() else {
        return;
    };
    match cmd {
        AppCommand::ValveStatus(i)
        | AppCommand::ValveCalibrate(i)
        | AppCommand::ValveDegrees(i)
        | AppCommand::ValveTravelTimes(i)
        | AppCommand::ValveMove(i, _) => assert!(i < VALVE_COUNT),
        AppCommand::PumpStatus(i) | AppCommand::PumpSet(i, _) => assert!(i < PUMP_COUNT),
        AppCommand::HeaterStatus(i)
        | AppCommand::HeaterEnable(i, _)
        | AppCommand::HeaterConfig(i, _) => assert!(i < HEATER_COUNT),
        AppCommand::LightStatus(i) | AppCommand::LightControl(i, _) => assert!(i < LIGHT_COUNT),
        AppCommand::ThermometerRead(i) | AppCommand::ThermometerConfig(i, _) => {
            assert!(i < THERMOMETER_COUNT)
        }
        AppCommand::SetMode(_) | AppCommand::CheckMode | AppCommand::SystemReset => {}
    }
});
