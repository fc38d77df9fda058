//! Fuzz target: DHT22 frame decoding.
//!
//! Any 5-byte frame either fails the checksum or decodes to readings
//! within the sensor's raw encoding range.
//!
//! cargo fuzz run fuzz_dht_frame

#![no_main]

use incubator::sensors::dht22::decode_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|frame: [u8; 5]| {
    if let Ok((t, h)) = decode_frame(frame) {
        assert!(t.is_finite() && h.is_finite());
        assert!((-3276.8..=3276.8).contains(&t));
        assert!((0.0..=6553.5).contains(&h));
    }
});
