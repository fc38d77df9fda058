//! Fuzz target: settings record decode and store reload.
//!
//! Loads arbitrary EEPROM images through `SettingsStore` and checks that a
//! decoded record re-encodes to the same bytes, up to normalised running
//! and reserved bytes, and that saving it back touches only those.
//!
//! cargo fuzz run fuzz_settings_record

#![no_main]

use incubator::adapters::nvs::{EEPROM_SIZE, NvsEeprom};
use incubator::store::{RECORD_LEN, RESERVED_OFFSETS, SettingsStore, decode, encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut image = [0xFFu8; EEPROM_SIZE];
    let n = data.len().min(EEPROM_SIZE);
    image[..n].copy_from_slice(&data[..n]);

    let mut record = [0u8; RECORD_LEN];
    record.copy_from_slice(&image[..RECORD_LEN]);

    let Some(config) = decode(&record) else {
        return;
    };

    // Encode normalises the running byte to 0/1 and zeroes reserved bytes.
    let mut expected = record;
    expected[RECORD_LEN - 1] = u8::from(record[RECORD_LEN - 1] != 0);
    for off in RESERVED_OFFSETS {
        expected[off] = 0;
    }
    assert_eq!(encode(&config), expected);

    let mut store = SettingsStore::new(NvsEeprom::from_image(image));
    assert!(matches!(store.load(), Ok(Some(_))));
    if let Ok(written) = store.save(&config) {
        assert!(
            written <= 1 + RESERVED_OFFSETS.len(),
            "re-saving a loaded record rewrote {written} bytes"
        );
    }
});
