//! Persistent settings record.
//!
//! Fixed 22-byte layout, independent of the in-memory struct:
//!
//! ```text
//!  off  len  field
//!  ───  ───  ──────────────────────────────
//!   0    1   validity marker (0xA5)
//!   1    4   temp_min   f32 LE
//!   5    4   temp_max   f32 LE
//!   9    4   hum_min    f32 LE
//!  13    4   hum_max    f32 LE
//!  17    1   rotation_interval_hours
//!  18    1   reserved (0)
//!  19    1   rotation_program_days
//!  20    1   reserved (0)
//!  21    1   incubation_running (0 / 1)
//! ```
//!
//! Writes go through an "update" pass: each byte is read back first and
//! only physically written when it differs.  There is no versioning and
//! no atomicity; a record is either marked valid or ignored.

use log::{info, warn};

use crate::app::ports::ByteStorePort;
use crate::config::IncubatorConfig;
use crate::error::Error;

/// Size of the persisted record in bytes.
pub const RECORD_LEN: usize = 22;
/// Marker byte identifying an initialised record.
pub const VALID_MARKER: u8 = 0xA5;

const OFF_MARKER: usize = 0;
const OFF_TEMP_MIN: usize = 1;
const OFF_TEMP_MAX: usize = 5;
const OFF_HUM_MIN: usize = 9;
const OFF_HUM_MAX: usize = 13;
const OFF_HOURS: usize = 17;
const OFF_DAYS: usize = 19;
const OFF_RUNNING: usize = 21;

/// High bytes of the 16-bit hours/days fields.  Written as zero, ignored
/// on read.
pub const RESERVED_OFFSETS: [usize; 2] = [OFF_HOURS + 1, OFF_DAYS + 1];

// ═══════════════════════════════════════════════════════════════
//  Codec
// ═══════════════════════════════════════════════════════════════

/// Serialise `config` into the on-store record.
pub fn encode(config: &IncubatorConfig) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    buf[OFF_MARKER] = VALID_MARKER;
    put_f32(&mut buf, OFF_TEMP_MIN, config.temp_min);
    put_f32(&mut buf, OFF_TEMP_MAX, config.temp_max);
    put_f32(&mut buf, OFF_HUM_MIN, config.hum_min);
    put_f32(&mut buf, OFF_HUM_MAX, config.hum_max);
    buf[OFF_HOURS] = config.rotation_interval_hours;
    buf[OFF_DAYS] = config.rotation_program_days;
    buf[OFF_RUNNING] = u8::from(config.incubation_running);
    buf
}

/// Parse a record.  Returns `None` when the marker is missing.
///
/// Field values are taken as stored; any non-zero running byte counts
/// as running.
pub fn decode(buf: &[u8; RECORD_LEN]) -> Option<IncubatorConfig> {
    if buf[OFF_MARKER] != VALID_MARKER {
        return None;
    }
    Some(IncubatorConfig {
        temp_min: get_f32(buf, OFF_TEMP_MIN),
        temp_max: get_f32(buf, OFF_TEMP_MAX),
        hum_min: get_f32(buf, OFF_HUM_MIN),
        hum_max: get_f32(buf, OFF_HUM_MAX),
        rotation_interval_hours: buf[OFF_HOURS],
        rotation_program_days: buf[OFF_DAYS],
        incubation_running: buf[OFF_RUNNING] != 0,
    })
}

fn put_f32(buf: &mut [u8; RECORD_LEN], off: usize, v: f32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

fn get_f32(buf: &[u8; RECORD_LEN], off: usize) -> f32 {
    f32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

// ═══════════════════════════════════════════════════════════════
//  Store
// ═══════════════════════════════════════════════════════════════

/// Settings persistence over a byte-addressable store.
pub struct SettingsStore<S: ByteStorePort> {
    backend: S,
    /// Record base address inside the backend.
    base: usize,
}

impl<S: ByteStorePort> SettingsStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend, base: 0 }
    }

    /// Place the record at `base` instead of address 0.
    pub fn at(backend: S, base: usize) -> Self {
        Self { backend, base }
    }

    /// Read the stored record.  `Ok(None)` means no valid record.
    pub fn load(&self) -> Result<Option<IncubatorConfig>, Error> {
        let mut buf = [0u8; RECORD_LEN];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.backend.read_byte(self.base + i)?;
        }
        Ok(decode(&buf))
    }

    /// Load the record, falling back to defaults.
    ///
    /// Returns the configuration and whether it came from the store.
    /// Never fails: read errors are logged and treated as "no record".
    pub fn load_or_default(&self) -> (IncubatorConfig, bool) {
        match self.load() {
            Ok(Some(config)) => {
                info!("Settings loaded from store");
                (config, true)
            }
            Ok(None) => {
                info!("No valid settings record, using defaults");
                (IncubatorConfig::default(), false)
            }
            Err(e) => {
                warn!("Settings read failed ({}), using defaults", e);
                (IncubatorConfig::default(), false)
            }
        }
    }

    /// Persist `config`, writing only the bytes that changed.
    ///
    /// Returns the number of bytes physically written.
    pub fn save(&mut self, config: &IncubatorConfig) -> Result<usize, Error> {
        let record = encode(config);
        let mut written = 0;
        for (i, &b) in record.iter().enumerate() {
            let addr = self.base + i;
            if self.backend.read_byte(addr)? != b {
                self.backend.write_byte(addr, b)?;
                written += 1;
            }
        }
        self.backend.flush()?;
        info!("Settings saved ({} bytes updated)", written);
        Ok(written)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }
}
