//! Settings persistence across simulated power cycles.

use chrono::Duration;
use incubator::adapters::nvs::NvsEeprom;
use incubator::app::commands::Button;
use incubator::app::events::AppEvent;
use incubator::app::ports::ByteStorePort;
use incubator::app::service::IncubatorService;
use incubator::config::IncubatorConfig;
use incubator::error::StorageError;
use incubator::fsm::MenuState;
use incubator::store::{SettingsStore, VALID_MARKER};

use super::mock_hw::{MockHardware, RecordingSink, step, steps, tap, tap_n};

fn boot_from(
    eeprom: NvsEeprom,
    hw: &mut MockHardware,
) -> (IncubatorService<NvsEeprom>, RecordingSink) {
    let mut svc = IncubatorService::new(eeprom);
    let mut sink = RecordingSink::new();
    svc.start(hw, &mut sink);
    step(&mut svc, hw, &mut sink);
    (svc, sink)
}

/// Take the store image out of a running service, as a power cut would.
fn power_cycle(svc: &IncubatorService<NvsEeprom>) -> NvsEeprom {
    NvsEeprom::from_image(svc.store().backend().image())
}

#[test]
fn blank_store_boots_with_defaults() {
    let mut hw = MockHardware::new();
    let (svc, sink) = boot_from(NvsEeprom::blank(), &mut hw);

    assert!(!svc.loaded_from_store());
    assert_eq!(*svc.config(), IncubatorConfig::default());
    assert_eq!(sink.events[0], AppEvent::Started { from_store: false });
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RunResumed { .. })), 0);
}

#[test]
fn edited_settings_survive_power_cycle() {
    let mut hw = MockHardware::new();
    let (mut svc, mut sink) = boot_from(NvsEeprom::blank(), &mut hw);

    // Hum max: Right×4, Up×3, then walk back to the first page and save.
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 4);
    tap_n(&mut svc, &mut hw, &mut sink, Button::Up, 3);
    tap_n(&mut svc, &mut hw, &mut sink, Button::Left, 4);
    assert_eq!(svc.menu_state(), MenuState::Home);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ConfigSaved { .. })), 1);

    let eeprom = power_cycle(&svc);
    let mut hw = MockHardware::new();
    let (svc, sink) = boot_from(eeprom, &mut hw);

    assert!(svc.loaded_from_store());
    assert_eq!(svc.config().hum_max, 58.0);
    assert_eq!(sink.events[0], AppEvent::Started { from_store: true });
}

#[test]
fn leaving_without_save_loses_edits() {
    let mut hw = MockHardware::new();
    let (mut svc, mut sink) = boot_from(NvsEeprom::blank(), &mut hw);

    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 2);
    tap(&mut svc, &mut hw, &mut sink, Button::Up);
    assert!((svc.config().temp_max - 37.6).abs() < 1e-4);

    let eeprom = power_cycle(&svc);
    let mut hw = MockHardware::new();
    let (svc, _) = boot_from(eeprom, &mut hw);
    assert!(!svc.loaded_from_store());
    assert_eq!(svc.config().temp_max, 37.5);
}

#[test]
fn running_run_resumes_with_rebased_start() {
    let mut hw = MockHardware::new();
    let (mut svc, mut sink) = boot_from(NvsEeprom::blank(), &mut hw);
    tap_n(&mut svc, &mut hw, &mut sink, Button::Right, 7);
    tap(&mut svc, &mut hw, &mut sink, Button::Up);
    tap(&mut svc, &mut hw, &mut sink, Button::Left);

    let eeprom = power_cycle(&svc);

    // Power comes back five days later.
    let mut hw = MockHardware::new();
    hw.jump(Duration::days(5));
    let restart = hw.now;
    let mut svc = IncubatorService::new(eeprom);
    let mut sink = RecordingSink::new();
    svc.start(&mut hw, &mut sink);

    assert!(svc.run_state().running);
    assert_eq!(svc.run_state().start_time, restart);
    assert_eq!(
        sink.events,
        vec![
            AppEvent::Started { from_store: true },
            AppEvent::RunResumed { at: restart },
        ]
    );
}

#[test]
fn resumed_run_turns_one_interval_after_restart() {
    let mut config = IncubatorConfig::default();
    config.incubation_running = true;
    let mut store = SettingsStore::new(NvsEeprom::blank());
    store.save(&config).unwrap();
    let eeprom = NvsEeprom::from_image(store.backend().image());

    let mut hw = MockHardware::new();
    let (mut svc, mut sink) = boot_from(eeprom, &mut hw);
    assert!(!svc.motor_on());

    hw.jump(Duration::hours(2));
    step(&mut svc, &mut hw, &mut sink);
    assert!(svc.motor_on());
}

#[test]
fn resume_waits_for_a_readable_clock() {
    let mut config = IncubatorConfig::default();
    config.incubation_running = true;
    let mut store = SettingsStore::new(NvsEeprom::blank());
    store.save(&config).unwrap();

    let mut hw = MockHardware::new();
    hw.clock_fails = true;
    let mut svc = IncubatorService::new(NvsEeprom::from_image(store.backend().image()));
    let mut sink = RecordingSink::new();
    svc.start(&mut hw, &mut sink);
    steps(&mut svc, &mut hw, &mut sink, 3);
    assert!(svc.run_state().running);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RunResumed { .. })), 0);

    hw.clock_fails = false;
    step(&mut svc, &mut hw, &mut sink);
    let recovered = hw.now;
    assert_eq!(svc.run_state().start_time, recovered);
    assert_eq!(
        sink.count(|e| *e == AppEvent::RunResumed { at: recovered }),
        1
    );

    hw.jump(Duration::hours(3));
    steps(&mut svc, &mut hw, &mut sink, 5);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RotationStarted { day: 0 })),
        1
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ProgramComplete)), 0);
}

#[test]
fn unchanged_save_writes_nothing() {
    let mut hw = MockHardware::new();
    let (mut svc, mut sink) = boot_from(NvsEeprom::blank(), &mut hw);

    tap(&mut svc, &mut hw, &mut sink, Button::Right);
    tap(&mut svc, &mut hw, &mut sink, Button::Left);
    tap(&mut svc, &mut hw, &mut sink, Button::Right);
    tap(&mut svc, &mut hw, &mut sink, Button::Left);

    let saves: Vec<usize> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ConfigSaved { bytes } => Some(*bytes),
            _ => None,
        })
        .collect();
    assert_eq!(saves.len(), 2);
    assert!(saves[0] > 0);
    assert_eq!(saves[1], 0);
}

#[test]
fn corrupted_marker_falls_back_to_defaults() {
    let mut store = SettingsStore::new(NvsEeprom::blank());
    let mut config = IncubatorConfig::default();
    config.temp_min = 30.0;
    store.save(&config).unwrap();

    let mut image = store.backend().image();
    assert_eq!(image[0], VALID_MARKER);
    image[0] = 0x00;

    let mut hw = MockHardware::new();
    let (svc, _) = boot_from(NvsEeprom::from_image(image), &mut hw);
    assert!(!svc.loaded_from_store());
    assert_eq!(svc.config().temp_min, 36.5);
}

/// Backend whose writes always fail.
struct ReadOnlyStore;

impl ByteStorePort for ReadOnlyStore {
    fn capacity(&self) -> usize {
        64
    }

    fn read_byte(&self, _addr: usize) -> Result<u8, StorageError> {
        Ok(0xFF)
    }

    fn write_byte(&mut self, _addr: usize, _value: u8) -> Result<(), StorageError> {
        Err(StorageError::IoError)
    }
}

#[test]
fn failed_save_is_reported_and_menu_still_leaves() {
    let mut hw = MockHardware::new();
    let mut svc = IncubatorService::new(ReadOnlyStore);
    let mut sink = RecordingSink::new();
    svc.start(&mut hw, &mut sink);

    tap(&mut svc, &mut hw, &mut sink, Button::Right);
    tap(&mut svc, &mut hw, &mut sink, Button::Left);

    assert_eq!(svc.menu_state(), MenuState::Home);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SaveFailed)), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ConfigSaved { .. })), 0);
}
