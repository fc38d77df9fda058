//! Climate regulation and egg turning through the full service cycle.

use chrono::Duration;
use incubator::adapters::nvs::NvsEeprom;
use incubator::app::commands::Button;
use incubator::app::events::{Actuator, AppEvent};
use incubator::app::service::IncubatorService;
use incubator::config::timing::TELEMETRY_EVERY_CYCLES;
use incubator::fsm::MenuState;
use incubator::sensors::ClimateSample;

use super::mock_hw::{ActuatorCall, MockHardware, RecordingSink, step, steps, tap, tap_n};

fn boot() -> (IncubatorService<NvsEeprom>, MockHardware, RecordingSink) {
    let mut svc = IncubatorService::new(NvsEeprom::new().unwrap());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    svc.start(&mut hw, &mut sink);
    (svc, hw, sink)
}

/// Boot and start a run from the menu, back on Home afterwards.
fn boot_running() -> (IncubatorService<NvsEeprom>, MockHardware, RecordingSink) {
    let (mut svc, mut hw, mut sink) = boot();
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 7);
    tap(&mut svc, &mut hw, &mut sink, Button::Up);
    tap(&mut svc, &mut hw, &mut sink, Button::Left);
    assert_eq!(svc.menu_state(), MenuState::Home);
    assert!(svc.run_state().running);
    sink.clear();
    (svc, hw, sink)
}

#[test]
fn heater_fan_scenario() {
    let (mut svc, mut hw, mut sink) = boot();

    hw.set_climate(35.0, 50.0);
    step(&mut svc, &mut hw, &mut sink);
    assert!(svc.outputs().heater && !svc.outputs().fan);

    hw.set_climate(38.5, 50.0);
    step(&mut svc, &mut hw, &mut sink);
    assert!(!svc.outputs().heater && svc.outputs().fan);

    hw.set_climate(37.0, 50.0);
    step(&mut svc, &mut hw, &mut sink);
    assert!(!svc.outputs().heater && svc.outputs().fan);
}

#[test]
fn only_changed_outputs_are_written() {
    let (mut svc, mut hw, mut sink) = boot();
    hw.calls.clear();

    hw.set_climate(35.0, 50.0);
    steps(&mut svc, &mut hw, &mut sink, 10);
    assert_eq!(hw.calls, vec![ActuatorCall::Heater(true)]);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::ActuatorChanged {
                actuator: Actuator::Heater,
                on: true
            }
        )),
        1
    );
}

#[test]
fn humidifier_follows_humidity_band() {
    let (mut svc, mut hw, mut sink) = boot();
    hw.set_climate(37.0, 40.0);
    step(&mut svc, &mut hw, &mut sink);
    assert!(hw.output(ActuatorCall::Humidifier));

    hw.set_climate(37.0, 55.0);
    step(&mut svc, &mut hw, &mut sink);
    assert!(hw.output(ActuatorCall::Humidifier));

    hw.set_climate(37.0, 59.0);
    step(&mut svc, &mut hw, &mut sink);
    assert!(!hw.output(ActuatorCall::Humidifier));
}

#[test]
fn sensor_failure_holds_outputs() {
    let (mut svc, mut hw, mut sink) = boot();
    hw.set_climate(35.0, 40.0);
    step(&mut svc, &mut hw, &mut sink);

    hw.sample = ClimateSample::UNDEFINED;
    steps(&mut svc, &mut hw, &mut sink, 5);
    assert!(svc.outputs().heater);
    assert!(svc.outputs().humidifier);
    assert!(hw.row(0).starts_with("T:--.-C"));
}

#[test]
fn no_turning_while_stopped() {
    let (mut svc, mut hw, mut sink) = boot();
    hw.jump(Duration::hours(5));
    steps(&mut svc, &mut hw, &mut sink, 3);
    assert!(!svc.motor_on());
    assert!(!hw.output(ActuatorCall::Motor));
}

#[test]
fn turn_fires_after_interval_and_lasts_two_seconds() {
    let (mut svc, mut hw, mut sink) = boot_running();

    hw.jump(Duration::minutes(119));
    step(&mut svc, &mut hw, &mut sink);
    assert!(!svc.motor_on());

    hw.jump(Duration::minutes(1));
    step(&mut svc, &mut hw, &mut sink);
    assert!(svc.motor_on());
    assert!(hw.output(ActuatorCall::Motor));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RotationStarted { day: 0 })),
        1
    );

    // 19 × 100 ms later the pulse is still on; the 20th cycle ends it.
    steps(&mut svc, &mut hw, &mut sink, 19);
    assert!(svc.motor_on());
    step(&mut svc, &mut hw, &mut sink);
    assert!(!svc.motor_on());
    assert!(!hw.output(ActuatorCall::Motor));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RotationFinished)), 1);
}

#[test]
fn buttons_work_during_a_turn() {
    let (mut svc, mut hw, mut sink) = boot_running();
    hw.jump(Duration::hours(2));
    step(&mut svc, &mut hw, &mut sink);
    assert!(svc.motor_on());

    tap(&mut svc, &mut hw, &mut sink, Button::Right);
    assert!(svc.motor_on());
    assert_eq!(svc.menu_state(), MenuState::SetTempMin);
}

#[test]
fn long_gap_fires_a_single_turn() {
    let (mut svc, mut hw, mut sink) = boot_running();
    hw.jump(Duration::hours(9));
    steps(&mut svc, &mut hw, &mut sink, 40);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RotationStarted { .. })),
        1
    );
}

#[test]
fn turning_stops_after_program_but_run_stays_on() {
    let (mut svc, mut hw, mut sink) = boot_running();
    hw.jump(Duration::days(18));
    steps(&mut svc, &mut hw, &mut sink, 3);
    hw.jump(Duration::hours(4));
    steps(&mut svc, &mut hw, &mut sink, 3);

    assert!(svc.run_state().running);
    assert!(!svc.motor_on());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ProgramComplete)), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RotationStarted { .. })),
        0
    );
}

#[test]
fn stopping_mid_pulse_still_ends_the_pulse() {
    let (mut svc, mut hw, mut sink) = boot_running();
    hw.jump(Duration::hours(2));
    step(&mut svc, &mut hw, &mut sink);
    assert!(svc.motor_on());

    // Right×7 then Up to stop: well over 2 s of cycles.
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 7);
    tap(&mut svc, &mut hw, &mut sink, Button::Up);
    assert!(!svc.run_state().running);
    assert!(!svc.motor_on());
}

#[test]
fn run_started_before_first_clock_read_anchors_on_recovery() {
    let mut svc = IncubatorService::new(NvsEeprom::new().unwrap());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    hw.clock_fails = true;
    svc.start(&mut hw, &mut sink);

    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 7);
    tap(&mut svc, &mut hw, &mut sink, Button::Up);
    tap(&mut svc, &mut hw, &mut sink, Button::Left);
    assert!(svc.run_state().running);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RunStarted { .. })), 0);

    hw.jump(Duration::hours(5));
    steps(&mut svc, &mut hw, &mut sink, 3);
    assert!(!svc.motor_on());

    hw.clock_fails = false;
    step(&mut svc, &mut hw, &mut sink);
    let recovered = hw.now;
    assert_eq!(svc.run_state().start_time, recovered);
    assert_eq!(sink.count(|e| *e == AppEvent::RunStarted { at: recovered }), 1);
    assert!(!svc.motor_on());

    hw.jump(Duration::hours(2));
    step(&mut svc, &mut hw, &mut sink);
    assert!(svc.motor_on());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ProgramComplete)), 0);
}

#[test]
fn stopping_a_deferred_run_cancels_it() {
    let mut svc = IncubatorService::new(NvsEeprom::new().unwrap());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    hw.clock_fails = true;
    svc.start(&mut hw, &mut sink);

    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 7);
    tap_n(&mut svc, &mut hw, &mut sink, Button::Up, 2);
    assert!(!svc.run_state().running);

    hw.clock_fails = false;
    steps(&mut svc, &mut hw, &mut sink, 2);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RunStarted { .. })), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RunStopped)), 1);
}

#[test]
fn home_screen_shows_run_day() {
    let (mut svc, mut hw, mut sink) = boot_running();
    hw.jump(Duration::days(3));
    step(&mut svc, &mut hw, &mut sink);
    assert!(hw.row(3).starts_with("RUN day 3"));
}

#[test]
fn telemetry_every_fifty_cycles() {
    let (mut svc, mut hw, mut sink) = boot();
    steps(&mut svc, &mut hw, &mut sink, 2 * TELEMETRY_EVERY_CYCLES as usize);
    let telemetry: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 2);
    assert_eq!(telemetry[0].cycle, TELEMETRY_EVERY_CYCLES);
    assert_eq!(telemetry[0].run_day, None);
}

#[test]
fn clock_failure_keeps_last_time() {
    let (mut svc, mut hw, mut sink) = boot();
    step(&mut svc, &mut hw, &mut sink);
    let row = hw.row(3);
    hw.clock_fails = true;
    hw.jump(Duration::minutes(10));
    steps(&mut svc, &mut hw, &mut sink, 3);
    assert_eq!(hw.row(3), row);
}

#[test]
fn display_failure_recovers_with_full_redraw() {
    let (mut svc, mut hw, mut sink) = boot();
    step(&mut svc, &mut hw, &mut sink);
    hw.display_fails = true;
    hw.set_climate(36.0, 50.0);
    step(&mut svc, &mut hw, &mut sink);
    assert!(svc.screen().is_none());

    hw.display_fails = false;
    let writes = hw.row_writes;
    step(&mut svc, &mut hw, &mut sink);
    assert_eq!(hw.row_writes, writes + 4);
    assert!(svc.screen().is_some());
}

#[test]
fn new_reading_rewrites_only_its_row() {
    let (mut svc, mut hw, mut sink) = boot();
    step(&mut svc, &mut hw, &mut sink);
    let writes = hw.row_writes;

    hw.set_climate(37.4, 50.0);
    step(&mut svc, &mut hw, &mut sink);
    assert_eq!(hw.row_writes, writes + 1);
    assert!(hw.row(0).starts_with("T:37.4C"));
}
