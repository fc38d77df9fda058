//! NVS-backed emulated EEPROM.
//!
//! Implements [`ByteStorePort`] as a small byte array mirrored into one
//! NVS blob.  Reads come from the RAM shadow; writes mark it dirty and
//! [`flush`](ByteStorePort::flush) commits the whole blob.
//!
//! Fresh flash reads as erased (`0xFF`), like a new EEPROM, so the
//! settings marker is absent on first boot.
//!
//! On non-espidf targets the shadow is the whole store; tests move it
//! across "power cycles" with [`NvsEeprom::image`] / [`NvsEeprom::from_image`].

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::ByteStorePort;
use crate::error::StorageError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Emulated EEPROM size.  The settings record needs 22 bytes.
pub const EEPROM_SIZE: usize = 64;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"incubator\0";
#[cfg(target_os = "espidf")]
const BLOB_KEY: &[u8] = b"eeprom\0";

pub struct NvsEeprom {
    shadow: [u8; EEPROM_SIZE],
    dirty: bool,
    /// Physical byte writes since construction.
    writes: usize,
}

impl NvsEeprom {
    /// Initialise NVS flash and load the blob, if any.
    ///
    /// Returns `Err(StorageError::IoError)` if flash initialisation fails
    /// unrecoverably.  A full or outdated partition is erased and
    /// re-initialised.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, StorageError> {
        // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
        // single main-task context before any concurrent NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
            warn!("NVS: erasing and re-initialising flash partition");
            if unsafe { nvs_flash_erase() } != ESP_OK as i32 || unsafe { nvs_flash_init() } != ESP_OK as i32 {
                return Err(StorageError::IoError);
            }
        } else if ret != ESP_OK as i32 {
            return Err(StorageError::IoError);
        }

        let mut shadow = [0xFFu8; EEPROM_SIZE];
        match Self::with_nvs_handle(false, |handle| {
            let mut size = EEPROM_SIZE;
            // SAFETY: buffer and size describe `shadow`; key is NUL-terminated.
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    BLOB_KEY.as_ptr() as *const _,
                    shadow.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(size)
        }) {
            Ok(size) => info!("NvsEeprom: loaded {} bytes", size),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => info!("NvsEeprom: blank store"),
            Err(e) => warn!("NvsEeprom: read error {}, starting blank", e),
        }

        Ok(Self {
            shadow,
            dirty: false,
            writes: 0,
        })
    }

    /// Blank simulated store.
    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, StorageError> {
        info!("NvsEeprom: simulation backend");
        Ok(Self::blank())
    }

    /// Erased store.  On target, used as a RAM-only fallback when NVS is
    /// unusable; `flush` still tries to commit.
    pub fn blank() -> Self {
        Self {
            shadow: [0xFF; EEPROM_SIZE],
            dirty: false,
            writes: 0,
        }
    }

    /// Simulated store restored from a previous [`image`](Self::image).
    #[cfg(not(target_os = "espidf"))]
    pub fn from_image(image: [u8; EEPROM_SIZE]) -> Self {
        Self {
            shadow: image,
            dirty: false,
            writes: 0,
        }
    }

    /// Current contents.
    pub fn image(&self) -> [u8; EEPROM_SIZE] {
        self.shadow
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: NAMESPACE is NUL-terminated; handle is closed below.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn commit(&self) -> Result<(), StorageError> {
        let shadow = &self.shadow;
        Self::with_nvs_handle(true, |handle| {
            // SAFETY: pointer and length describe the shadow buffer.
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    BLOB_KEY.as_ptr() as *const _,
                    shadow.as_ptr() as *const _,
                    shadow.len(),
                )
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|e| {
            warn!("NvsEeprom: NVS write error {}", e);
            StorageError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn commit(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

impl ByteStorePort for NvsEeprom {
    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }

    fn read_byte(&self, addr: usize) -> Result<u8, StorageError> {
        self.shadow
            .get(addr)
            .copied()
            .ok_or(StorageError::OutOfBounds(addr))
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), StorageError> {
        let slot = self
            .shadow
            .get_mut(addr)
            .ok_or(StorageError::OutOfBounds(addr))?;
        *slot = value;
        self.dirty = true;
        self.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        self.commit()?;
        self.dirty = false;
        Ok(())
    }
}
