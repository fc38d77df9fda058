//! Egg Incubator Firmware: Main Entry Point
//!
//! Single-threaded cooperative control loop over a hexagonal core.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter                LogEventSink     NvsEeprom     │
//! │  (Input+Sensor+Actuator+        (EventSink)      (ByteStore)   │
//! │   Clock+Display)                                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           IncubatorService (pure logic)                │    │
//! │  │  Menu FSM · Hysteresis · Rotation · Debounce · Store   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use incubator::adapters::hardware::HardwareAdapter;
use incubator::adapters::log_sink::LogEventSink;
use incubator::adapters::nvs::NvsEeprom;
use incubator::adapters::time::MonotonicClock;
use incubator::app::service::IncubatorService;
use incubator::config::timing::CYCLE_DELAY_MS;
use incubator::drivers::hw_init;
use incubator::drivers::lcd::{Lcd, PCF8574_ADDR};
use incubator::drivers::rtc::Ds3231;
use incubator::pins;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Incubator v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. GPIO: buttons, relays (all off), DHT line ──────────
    if let Err(e) = hw_init::init_peripherals() {
        // Outputs stay at their reset level; keep running so the
        // display and logs still show what is going on.
        error!("HAL init failed: {}, continuing degraded", e);
    }

    // ── 3. I²C buses: LCD on bus 0, RTC on bus 1 ──────────────
    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ));

    // SAFETY: the pin numbers come from `pins` and are used by no other driver.
    let lcd_bus = unsafe {
        I2cDriver::new(
            peripherals.i2c0,
            AnyIOPin::new(pins::LCD_I2C_SDA_GPIO),
            AnyIOPin::new(pins::LCD_I2C_SCL_GPIO),
            &i2c_config,
        )?
    };
    // SAFETY: as above.
    let rtc_bus = unsafe {
        I2cDriver::new(
            peripherals.i2c1,
            AnyIOPin::new(pins::RTC_I2C_SDA_GPIO),
            AnyIOPin::new(pins::RTC_I2C_SCL_GPIO),
            &i2c_config,
        )?
    };

    let mut lcd = Lcd::new(lcd_bus, Ets, PCF8574_ADDR);
    if let Err(e) = lcd.init() {
        error!("LCD init failed: {}", e);
    }
    let rtc = Ds3231::new(rtc_bus);

    // ── 4. Persistent settings ────────────────────────────────
    let eeprom = NvsEeprom::new().unwrap_or_else(|e| {
        // Run with a blank RAM store; nothing will survive reboot until
        // NVS recovers.
        warn!("NVS init failed ({}), settings will not persist", e);
        NvsEeprom::blank()
    });

    // ── 5. Wire adapters and start the service ────────────────
    let mut hw = HardwareAdapter::new(lcd, rtc, MonotonicClock::new());
    let mut sink = LogEventSink::new();
    let mut service = IncubatorService::new(eeprom);
    service.start(&mut hw, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        service.cycle(&mut hw, &mut sink);
        FreeRtos::delay_ms(CYCLE_DELAY_MS);
    }
}
