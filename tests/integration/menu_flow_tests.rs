//! Menu navigation through the full service cycle: debounced buttons →
//! menu state machine → settings store → display.

use incubator::adapters::nvs::NvsEeprom;
use incubator::app::commands::Button;
use incubator::app::events::AppEvent;
use incubator::app::service::IncubatorService;
use incubator::fsm::MenuState;

use super::mock_hw::{MockHardware, RecordingSink, step, steps, tap, tap_n};

fn boot() -> (IncubatorService<NvsEeprom>, MockHardware, RecordingSink) {
    let mut svc = IncubatorService::new(NvsEeprom::new().unwrap());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    svc.start(&mut hw, &mut sink);
    step(&mut svc, &mut hw, &mut sink);
    (svc, hw, sink)
}

#[test]
fn right_seven_times_reaches_start_stop() {
    let (mut svc, mut hw, mut sink) = boot();
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 7);
    assert_eq!(svc.menu_state(), MenuState::StartStop);

    let changes = sink.count(|e| matches!(e, AppEvent::MenuChanged { .. }));
    assert_eq!(changes, 7);
}

#[test]
fn held_button_counts_once() {
    let (mut svc, mut hw, mut sink) = boot();
    hw.hold(Button::Right);
    steps(&mut svc, &mut hw, &mut sink, 30);
    hw.release(Button::Right);
    steps(&mut svc, &mut hw, &mut sink, 2);
    assert_eq!(svc.menu_state(), MenuState::SetTempMin);
}

#[test]
fn start_run_and_leave_saves_running_flag() {
    let (mut svc, mut hw, mut sink) = boot();
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 7);
    tap(&mut svc, &mut hw, &mut sink, Button::Up);

    assert!(svc.run_state().running);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::RunStarted { .. }))
    );
    // Not persisted until the menu is left.
    assert_eq!(svc.store().load().unwrap(), None);

    tap(&mut svc, &mut hw, &mut sink, Button::Left);
    assert_eq!(svc.menu_state(), MenuState::Home);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ConfigSaved { .. })),
        1
    );
    let stored = svc.store().load().unwrap().unwrap();
    assert!(stored.incubation_running);
}

#[test]
fn toggling_twice_stops_the_run() {
    let (mut svc, mut hw, mut sink) = boot();
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 7);
    tap(&mut svc, &mut hw, &mut sink, Button::Up);
    tap(&mut svc, &mut hw, &mut sink, Button::Down);
    assert!(!svc.run_state().running);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RunStopped)), 1);
}

#[test]
fn edit_temp_min_and_save_from_first_page() {
    let (mut svc, mut hw, mut sink) = boot();
    tap(&mut svc, &mut hw, &mut sink, Button::Right);
    tap_n(&mut svc, &mut hw, &mut sink, Button::Up, 3);

    assert!((svc.config().temp_min - 36.8).abs() < 1e-3);
    assert_eq!(hw.row(0), "Set Temp Min        ");
    assert_eq!(hw.row(1), "> 36.8 C            ");

    tap(&mut svc, &mut hw, &mut sink, Button::Left);
    assert_eq!(svc.menu_state(), MenuState::Home);
    let stored = svc.store().load().unwrap().unwrap();
    assert!((stored.temp_min - 36.8).abs() < 1e-3);
}

#[test]
fn left_from_middle_page_does_not_save() {
    let (mut svc, mut hw, mut sink) = boot();
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 3);
    tap(&mut svc, &mut hw, &mut sink, Button::Up);
    tap(&mut svc, &mut hw, &mut sink, Button::Left);

    assert_eq!(svc.menu_state(), MenuState::SetTempMax);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ConfigSaved { .. })), 0);
}

#[test]
fn program_days_clamp_at_bounds() {
    let (mut svc, mut hw, mut sink) = boot();
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 6);
    assert_eq!(svc.menu_state(), MenuState::SetRotationDays);

    tap_n(&mut svc, &mut hw, &mut sink, Button::Up, 15);
    assert_eq!(svc.config().rotation_program_days, 30);
    tap_n(&mut svc, &mut hw, &mut sink, Button::Down, 25);
    assert_eq!(svc.config().rotation_program_days, 12);
}

#[test]
fn rotation_hours_never_drop_below_one() {
    let (mut svc, mut hw, mut sink) = boot();
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 5);
    tap_n(&mut svc, &mut hw, &mut sink, Button::Down, 4);
    assert_eq!(svc.config().rotation_interval_hours, 1);
    assert_eq!(hw.row(1), "> 1 hours           ");
}

#[test]
fn every_state_change_clears_the_display() {
    let (mut svc, mut hw, mut sink) = boot();
    let clears = hw.clears;
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 2);
    tap(&mut svc, &mut hw, &mut sink, Button::Left);
    assert_eq!(hw.clears, clears + 3);
}

#[test]
fn idle_cycles_rewrite_nothing() {
    let (mut svc, mut hw, mut sink) = boot();
    let writes = hw.row_writes;
    // Same minute, same readings: no row differs.
    steps(&mut svc, &mut hw, &mut sink, 5);
    assert_eq!(hw.row_writes, writes);
}
