//! GPIO / peripheral pin assignments for the incubator controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Front-panel buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_UP_GPIO: i32 = 4;
pub const BUTTON_DOWN_GPIO: i32 = 5;
pub const BUTTON_LEFT_GPIO: i32 = 6;
pub const BUTTON_RIGHT_GPIO: i32 = 7;

/// Button lines indexed by `Button as usize`.
pub const BUTTON_GPIOS: [i32; 4] = [
    BUTTON_UP_GPIO,
    BUTTON_DOWN_GPIO,
    BUTTON_LEFT_GPIO,
    BUTTON_RIGHT_GPIO,
];

// ---------------------------------------------------------------------------
// Relay outputs (active HIGH)
// ---------------------------------------------------------------------------

pub const HEATER_GPIO: i32 = 10;
pub const FAN_GPIO: i32 = 11;
pub const HUMIDIFIER_GPIO: i32 = 12;
/// Egg-turning motor relay.
pub const MOTOR_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (external 10 kΩ pull-up).
pub const DHT22_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// I²C buses
// ---------------------------------------------------------------------------

/// Bus 0: 20×4 LCD behind a PCF8574 backpack.
pub const LCD_I2C_SDA_GPIO: i32 = 8;
pub const LCD_I2C_SCL_GPIO: i32 = 9;

/// Bus 1: DS3231 real-time clock.
pub const RTC_I2C_SDA_GPIO: i32 = 16;
pub const RTC_I2C_SCL_GPIO: i32 = 17;

/// Both buses run at standard mode.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;
