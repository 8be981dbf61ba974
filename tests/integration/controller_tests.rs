//! Console command paths through `Controller::handle`, checked against
//! the JSON each one answers with.

use futures_lite::future::block_on;

use poolctl::app::commands::{AppCommand, CommandError};

use super::mock_bus::{Harness, MockAux, harness};

fn send(h: &Harness, line: &str) -> String {
    let cmd: AppCommand = line.parse().expect("command parses");
    serde_json::to_string(&block_on(h.ctl.handle(cmd))).unwrap()
}

// ── Modes ─────────────────────────────────────────────────────

#[test]
fn mode_set_and_check() {
    let h = harness(MockAux::new());
    assert_eq!(
        send(&h, "/mode/set/allOff"),
        r#"{"accepted":true,"completed":true}"#
    );
    assert!(send(&h, "/mode/check").starts_with(r#"{"mode":"allOff","settings":{"#));
}

#[test]
fn unknown_mode_is_rejected_without_bus_traffic() {
    let h = harness(MockAux::new());
    assert_eq!(
        send(&h, "/mode/set/bogus"),
        r#"{"accepted":false,"reason":"unknown mode"}"#
    );
    assert!(h.aux.log().is_empty());
}

#[test]
fn failed_plan_reports_step_and_reason() {
    let aux = MockAux::new();
    aux.state().valves[1].stuck = true;
    let h = harness(aux);
    assert_eq!(
        send(&h, "/mode/set/low"),
        r#"{"accepted":true,"completed":false,"failedStep":4,"reason":"valve1 did not settle within 6s"}"#
    );
}

// ── Valves ────────────────────────────────────────────────────

#[test]
fn valve_move_then_status_reports_position() {
    let h = harness(MockAux::new());
    assert_eq!(send(&h, "/valve/0/move/180"), r#"{"result":true}"#);
    assert_eq!(
        send(&h, "/valve/0/status"),
        r#"{"state":0,"prev":210,"position":180}"#
    );
}

#[test]
fn valve_moves_are_clamped_to_the_sweep() {
    let h = harness(MockAux::new());
    assert_eq!(send(&h, "/valve/1/move/400"), r#"{"result":true}"#);
    assert_eq!(h.aux.writes(), vec![vec![0x51, 0x00, 0xB4]]);
}

#[test]
fn valve_calibration_and_limits() {
    let aux = MockAux::new();
    aux.state().valves[0].travel = (42, 39);
    aux.state().valves[0].limits = (3, 177);
    let h = harness(aux);

    assert_eq!(send(&h, "/valve/0/calibrate"), r#"{"result":true}"#);
    assert_eq!(h.aux.state().valves[0].state, 100);
    assert_eq!(send(&h, "/valve/0/travel"), r#"{"pos":42,"neg":39}"#);
    assert_eq!(send(&h, "/valve/0/degrees"), r#"{"min":3,"max":177}"#);
}

// ── Pumps, heater, light ──────────────────────────────────────

#[test]
fn pump_speed_is_clamped_and_read_back() {
    let h = harness(MockAux::new());
    assert_eq!(send(&h, "/pump/1/set/7"), r#"{"result":true}"#);
    assert_eq!(h.aux.writes(), vec![vec![0x79, 0]]);
    assert_eq!(send(&h, "/pump/1/status"), r#"{"status":2}"#);
}

#[test]
fn heater_enable_config_and_status() {
    let h = harness(MockAux::new());
    assert_eq!(send(&h, "/heater/0/enable/1"), r#"{"status":1}"#);
    assert_eq!(send(&h, "/heater/0/config/385"), r#"{"status":1}"#);
    assert_eq!(h.aux.writes()[1], vec![0xB8, 0x01, 0x81]);
    assert_eq!(
        send(&h, "/heater/0/status"),
        r#"{"enabled":1,"active":0,"setPoint":385}"#
    );
}

#[test]
fn light_control_and_status() {
    let h = harness(MockAux::new());
    assert_eq!(send(&h, "/light/0/control/1"), r#"{"result":true}"#);
    assert_eq!(h.aux.writes(), vec![vec![0xD4, 0]]);
    assert_eq!(send(&h, "/light/0/status"), r#"{"status":1}"#);
}

// ── Thermometer ───────────────────────────────────────────────

#[test]
fn thermometer_read_and_config() {
    let h = harness(MockAux::new());
    h.aux.state().temperature = 412;
    assert_eq!(send(&h, "/therm/0/read"), r#"{"temp":412}"#);

    assert_eq!(
        send(&h, "/therm/0/config/25,50,75,10000,3600,1500"),
        r#"{"status":1}"#
    );
    assert_eq!(
        h.aux.state().coefficients.as_deref(),
        Some(&[25, 50, 75, 0x27, 0x10, 0x0E, 0x10, 0x05, 0xDC][..])
    );
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn failed_writes_answer_false_or_zero() {
    let aux = MockAux::new();
    aux.fail_register(0xD4);
    aux.fail_register(0xB8);
    let h = harness(aux);

    assert_eq!(send(&h, "/light/0/control/1"), r#"{"result":false}"#);
    assert_eq!(send(&h, "/heater/0/config/300"), r#"{"status":0}"#);
    assert_eq!(h.ctl.bus_stats().write_failures, 2);
}

#[test]
fn failed_reads_answer_zero_flagged_stale() {
    let aux = MockAux::new();
    aux.state().pumps = [2, 0];
    aux.fail_register(0x60);
    let h = harness(aux);

    assert_eq!(send(&h, "/pump/0/status"), r#"{"status":0,"stale":true}"#);
    h.aux.heal();
    assert_eq!(send(&h, "/pump/0/status"), r#"{"status":2}"#);
}

#[test]
fn system_reset_clears_outputs() {
    let aux = MockAux::new();
    aux.state().pumps = [2, 1];
    aux.state().heater_enabled = 1;
    let h = harness(aux);

    assert_eq!(send(&h, "/system/reset"), r#"{"result":true}"#);
    assert_eq!(h.aux.writes(), vec![vec![0xF0, 0]]);
    assert_eq!(h.aux.state().resets, 1);
    assert_eq!(h.aux.state().pumps, [0, 0]);
    assert_eq!(h.aux.state().heater_enabled, 0);
}

// ── Parsing ───────────────────────────────────────────────────

#[test]
fn bad_paths_never_reach_the_bus() {
    assert_eq!(
        "/sprinkler/0/status".parse::<AppCommand>(),
        Err(CommandError::UnknownDevice)
    );
    assert_eq!(
        "/valve/2/status".parse::<AppCommand>(),
        Err(CommandError::UnknownDevice)
    );
    assert_eq!(
        "/heater/0/enable/maybe".parse::<AppCommand>(),
        Err(CommandError::Malformed)
    );
    assert_eq!("".parse::<AppCommand>(), Err(CommandError::Malformed));
}
