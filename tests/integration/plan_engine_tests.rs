//! Mode plans executed end to end against the simulated controller.

use std::time::Duration;

use futures_lite::future::{block_on, zip};

use poolctl::app::events::AppEvent;
use poolctl::config::SystemConfig;
use poolctl::error::{BusError, Error};
use poolctl::plan::{ModeId, PlanState};
use poolctl::protocol::{Operation, encode};

use super::mock_bus::{MockAux, harness, harness_with};

// ── Ordering ──────────────────────────────────────────────────

#[test]
fn spa_moves_valves_then_pumps_then_heater() {
    let aux = MockAux::new();
    aux.state().valves[0].position = 180;
    aux.state().valves[1].position = 180;
    let h = harness(aux);

    let outcome = block_on(h.ctl.set_mode("spa"));
    assert!(outcome.accepted);
    assert_eq!(outcome.completed, Some(true));

    assert_eq!(
        h.aux.writes(),
        vec![
            vec![0x50, 0, 0],
            vec![0x51, 0, 0],
            vec![0x71, 0],
            vec![0x78, 0],
            vec![0xB4, 0],
        ]
    );
    assert_eq!(h.aux.state().valves[0].position, 0);
    assert_eq!(h.aux.state().heater_enabled, 1);
    // Valves settled on the first poll; the only wait is flow before heat.
    assert_eq!(h.delay.calls(), 1);
    assert_eq!(h.delay.total(), Duration::from_secs(5));
}

#[test]
fn all_off_touches_no_valve() {
    let h = harness(MockAux::new());
    h.aux.state().pumps = [2, 1];
    h.aux.state().light = 1;

    assert_eq!(block_on(h.ctl.set_mode("allOff")).completed, Some(true));
    assert_eq!(
        h.aux.writes(),
        vec![vec![0xB0, 0], vec![0x71, 0], vec![0x70, 0], vec![0xD0, 0]]
    );
    assert_eq!(h.aux.state().pumps, [0, 0]);
    assert_eq!(h.aux.state().light, 0);
}

#[test]
fn events_trace_every_step() {
    let h = harness(MockAux::new());
    block_on(h.ctl.set_mode("allOff"));

    let events = h.sink.events();
    assert!(matches!(
        events.first(),
        Some(AppEvent::PlanStarted {
            mode: ModeId::AllOff,
            steps: 4
        })
    ));
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::StepCompleted { .. })),
        4
    );
    assert!(matches!(
        events.last(),
        Some(AppEvent::PlanCompleted {
            mode: ModeId::AllOff
        })
    ));
    assert_eq!(
        h.ctl.plan_state(),
        PlanState::Completed {
            mode: ModeId::AllOff,
            rejected: 0
        }
    );
}

// ── Rejection ─────────────────────────────────────────────────

#[test]
fn unknown_mode_issues_no_transaction() {
    let h = harness(MockAux::new());
    let outcome = block_on(h.ctl.set_mode("party"));

    assert!(!outcome.accepted);
    assert_eq!(outcome.reason.as_deref(), Some("unknown mode"));
    assert!(h.aux.log().is_empty());
    assert_eq!(h.ctl.bus_stats().transactions, 0);
    assert_eq!(h.ctl.plan_state(), PlanState::Idle);
}

#[test]
fn second_mode_change_is_refused_while_one_runs() {
    let h = harness(MockAux::new().with_settle_polls(2));

    let (first, second) = block_on(zip(h.ctl.set_mode("high"), h.ctl.set_mode("spa")));

    assert_eq!(first.completed, Some(true));
    assert!(!second.accepted);
    assert_eq!(
        second.reason.as_deref(),
        Some("a mode change is already in progress")
    );
    // Only the winning plan reached the heater.
    assert_eq!(h.aux.writes_to(0xB0), vec![vec![0xB0, 0]]);
    assert_eq!(h.aux.state().pumps, [2, 0]);
}

#[test]
fn next_mode_change_is_accepted_once_a_plan_ends() {
    let h = harness(MockAux::new());
    assert_eq!(block_on(h.ctl.set_mode("low")).completed, Some(true));
    assert_eq!(block_on(h.ctl.set_mode("high")).completed, Some(true));
    assert_eq!(h.aux.state().pumps[0], 2);
}

// ── Quiescence ────────────────────────────────────────────────

#[test]
fn valves_that_settle_within_budget_let_the_plan_finish() {
    let h = harness(MockAux::new().with_settle_polls(3));

    assert_eq!(block_on(h.ctl.set_mode("high")).completed, Some(true));
    assert_eq!(h.aux.reads_of(0x00), 4);
    assert_eq!(h.aux.reads_of(0x01), 4);
    assert_eq!(h.delay.calls(), 6);
    assert_eq!(h.aux.state().valves[0].position, 90);
    assert_eq!(h.aux.state().valves[1].position, 180);
}

#[test]
fn stuck_valve_times_out_after_its_budget() {
    let aux = MockAux::new();
    aux.state().valves[0].stuck = true;
    let h = harness(aux);

    let outcome = block_on(h.ctl.set_mode("spa"));

    assert!(outcome.accepted);
    assert_eq!(outcome.completed, Some(false));
    assert_eq!(outcome.failed_step, Some(2));
    assert_eq!(
        outcome.reason.as_deref(),
        Some("valve0 did not settle within 6s")
    );
    // (30 + 30) tenths: six polls, five pauses between them.
    assert_eq!(h.aux.reads_of(0x00), 6);
    assert_eq!(h.delay.calls(), 5);
    assert!(h.aux.writes_to(0x70).is_empty());
    assert!(h.aux.writes_to(0xB0).is_empty());
    assert!(matches!(
        h.ctl.plan_state(),
        PlanState::Failed {
            mode: ModeId::Spa,
            step: 2,
            reason: Error::QuiescenceTimeout { budget_secs: 6, .. },
        }
    ));
}

#[test]
fn unreadable_travel_times_fall_back_to_configured_budget() {
    let aux = MockAux::new();
    aux.state().valves[0].stuck = true;
    aux.fail_register(0x04);
    let config = SystemConfig {
        fallback_quiescence_secs: 3,
        ..SystemConfig::default()
    };
    let h = harness_with(aux, &config);

    let outcome = block_on(h.ctl.set_mode("high"));

    assert_eq!(outcome.failed_step, Some(3));
    assert_eq!(
        outcome.reason.as_deref(),
        Some("valve0 did not settle within 3s")
    );
    assert_eq!(h.aux.reads_of(0x00), 3);
}

#[test]
fn failing_status_reads_never_count_as_settled() {
    let aux = MockAux::new();
    aux.fail_register(0x00);
    let h = harness(aux);

    let outcome = block_on(h.ctl.set_mode("spaClean"));

    assert_eq!(outcome.completed, Some(false));
    assert_eq!(outcome.failed_step, Some(3));
    assert_eq!(h.aux.reads_of(0x00), 6);
    assert!(h.aux.writes_to(0x70).is_empty());
}

// ── Write failures ────────────────────────────────────────────

#[test]
fn rejected_pump_write_does_not_stop_the_plan() {
    let aux = MockAux::new();
    aux.fail_register(0x78);
    let h = harness(aux);

    let outcome = block_on(h.ctl.set_mode("spa"));

    assert_eq!(outcome.completed, Some(true));
    assert_eq!(outcome.rejected_steps, vec![5]);
    assert_eq!(outcome.failed_step, None);
    assert_eq!(h.aux.writes_to(0xB0), vec![vec![0xB4, 0]]);
    assert_eq!(h.delay.total(), Duration::from_secs(5));
    assert_eq!(
        h.ctl.plan_state(),
        PlanState::Completed {
            mode: ModeId::Spa,
            rejected: 1
        }
    );
    assert!(h.sink.events().iter().any(|e| matches!(
        e,
        AppEvent::StepRejected {
            step: 5,
            reason: Error::Bus(BusError::Nack),
            ..
        }
    )));
    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::PlanFailed(_))), 0);
}

#[test]
fn all_off_with_a_refused_heater_still_stops_pumps_and_light() {
    let aux = MockAux::new();
    {
        let mut s = aux.state();
        s.pumps = [2, 1];
        s.light = 1;
        s.heater_enabled = 1;
    }
    aux.fail_register(0xB0);
    let h = harness(aux);

    let outcome = block_on(h.ctl.set_mode("allOff"));

    assert_eq!(outcome.completed, Some(true));
    assert_eq!(outcome.rejected_steps, vec![0]);
    assert_eq!(h.aux.state().pumps, [0, 0]);
    assert_eq!(h.aux.state().light, 0);
    assert_eq!(h.aux.state().heater_enabled, 1);
    assert_eq!(h.ctl.bus_stats().write_failures, 1);
}

// ── Bus serialization ─────────────────────────────────────────

#[test]
fn try_execute_refuses_while_the_bus_is_held() {
    let h = harness(MockAux::new());
    let bus = h.ctl.equipment().bus();
    let cmd = encode(Operation::PumpStatus { pump: 0 });

    let refused = block_on(bus.with_port(|_| bus.try_execute(&cmd)));
    assert!(matches!(refused, Err(Error::BusContention)));
    assert!(h.aux.log().is_empty());

    assert!(bus.try_execute(&cmd).is_ok());
    assert_eq!(h.aux.reads_of(0x60), 1);
}
