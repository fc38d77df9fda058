//! DHT22 (AM2302) single-wire temperature / humidity sensor.
//!
//! The host pulls the line low for 3 ms, releases it, and the sensor
//! answers with an 80 µs low / 80 µs high preamble followed by 40 bits.
//! A bit is a ~50 µs low followed by a high pulse: ~27 µs for `0`,
//! ~70 µs for `1`.
//!
//! ```text
//!  byte 0..1  humidity × 10      (big endian)
//!  byte 2..3  temperature × 10   (big endian, bit 15 = sign)
//!  byte 4     checksum = (b0 + b1 + b2 + b3) & 0xFF
//! ```
//!
//! The sensor must not be polled faster than every 2 s; the driver caches
//! the last result and returns it for calls inside that window.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-banged with `gpio_get_level` / `ets_delay_us`.
//! On host/test: decodes a frame injected through [`sim_set_frame`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::SensorError;

/// Minimum spacing between two bus transactions (ms).
pub const MIN_READ_INTERVAL_MS: u32 = 2000;

const FRAME_LEN: usize = 5;

/// Bit 63 set = sensor does not answer.
#[cfg(not(target_os = "espidf"))]
const SIM_NO_RESPONSE: u64 = 1 << 63;

/// Raw 5-byte frame in the low 40 bits; starts out silent.
#[cfg(not(target_os = "espidf"))]
static SIM_FRAME: AtomicU64 = AtomicU64::new(SIM_NO_RESPONSE);

/// Inject the next raw frame the simulated sensor returns.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_frame(frame: [u8; FRAME_LEN]) {
    let mut packed = 0u64;
    for b in frame {
        packed = (packed << 8) | u64::from(b);
    }
    SIM_FRAME.store(packed, Ordering::Relaxed);
}

/// Inject a well-formed frame carrying `temperature` °C and `humidity` %RH.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(temperature: f32, humidity: f32) {
    sim_set_frame(encode_frame(temperature, humidity));
}

/// Make the simulated sensor stop answering.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_no_response() {
    SIM_FRAME.store(SIM_NO_RESPONSE, Ordering::Relaxed);
}

// ═══════════════════════════════════════════════════════════════
//  Frame codec
// ═══════════════════════════════════════════════════════════════

/// Decode a received frame into `(temperature °C, humidity %RH)`.
pub fn decode_frame(data: [u8; FRAME_LEN]) -> Result<(f32, f32), SensorError> {
    let sum = data[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != data[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = f32::from(u16::from_be_bytes([data[0], data[1]])) / 10.0;

    let magnitude = f32::from(u16::from_be_bytes([data[2] & 0x7F, data[3]])) / 10.0;
    let temperature = if data[2] & 0x80 != 0 { -magnitude } else { magnitude };

    Ok((temperature, humidity))
}

/// Build the frame a sensor would send for the given values.
pub fn encode_frame(temperature: f32, humidity: f32) -> [u8; FRAME_LEN] {
    let h = (humidity * 10.0).round().clamp(0.0, 1000.0) as u16;
    let t = (temperature.abs() * 10.0).round().min(f32::from(0x7FFF_u16)) as u16;
    let [h_hi, h_lo] = h.to_be_bytes();
    let [mut t_hi, t_lo] = t.to_be_bytes();
    if temperature < 0.0 {
        t_hi |= 0x80;
    }
    let sum = h_hi
        .wrapping_add(h_lo)
        .wrapping_add(t_hi)
        .wrapping_add(t_lo);
    [h_hi, h_lo, t_hi, t_lo, sum]
}

// ═══════════════════════════════════════════════════════════════
//  Driver
// ═══════════════════════════════════════════════════════════════

pub struct Dht22 {
    gpio: i32,
    last: Option<(u32, Result<(f32, f32), SensorError>)>,
}

impl Dht22 {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, last: None }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Read the sensor, or return the cached result if the previous bus
    /// transaction was less than [`MIN_READ_INTERVAL_MS`] ago.
    pub fn read(&mut self, now_ms: u32) -> Result<(f32, f32), SensorError> {
        if let Some((at, cached)) = self.last {
            if now_ms.wrapping_sub(at) < MIN_READ_INTERVAL_MS {
                return cached;
            }
        }
        let result = self.read_frame().and_then(decode_frame);
        self.last = Some((now_ms, result));
        result
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&self) -> Result<[u8; FRAME_LEN], SensorError> {
        let packed = SIM_FRAME.load(Ordering::Relaxed);
        if packed & SIM_NO_RESPONSE != 0 {
            return Err(SensorError::Timeout);
        }
        let bytes = packed.to_be_bytes();
        let mut frame = [0u8; FRAME_LEN];
        frame.copy_from_slice(&bytes[3..8]);
        Ok(frame)
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&self) -> Result<[u8; FRAME_LEN], SensorError> {
        use esp_idf_svc::sys::*;

        let mut data = [0u8; FRAME_LEN];

        // SAFETY: the DHT line is owned by this driver and only touched
        // from the main loop; the sys calls are plain register accesses.
        unsafe {
            gpio_set_direction(self.gpio, gpio_mode_t_GPIO_MODE_OUTPUT);
            gpio_set_level(self.gpio, 0);
            ets_delay_us(3000);
            gpio_set_level(self.gpio, 1);
            ets_delay_us(25);
            gpio_set_direction(self.gpio, gpio_mode_t_GPIO_MODE_INPUT);
        }

        // Preamble: ~80 µs low, ~80 µs high.
        self.wait_while(0, 85)?;
        self.wait_while(1, 85)?;

        for bit in 0..40 {
            self.wait_while(0, 56)?;
            let high_us = self.wait_while(1, 75)?;
            if high_us > 40 {
                data[bit / 8] |= 1 << (7 - (bit % 8));
            }
        }

        Ok(data)
    }

    /// Busy-wait while the line sits at `level`; returns the time spent in µs.
    #[cfg(target_os = "espidf")]
    fn wait_while(&self, level: i32, max_us: u32) -> Result<u32, SensorError> {
        use esp_idf_svc::sys::*;

        let mut us = 0;
        // SAFETY: see read_frame().
        while unsafe { gpio_get_level(self.gpio) } == level {
            us += 1;
            if us > max_us {
                return Err(SensorError::Timeout);
            }
            unsafe { ets_delay_us(1) };
        }
        Ok(us)
    }
}
