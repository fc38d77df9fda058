//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                    |
//! |----------------|--------------------|--------------------------------|
//! | `hardware`     | InputPort          | ESP32 GPIO (buttons)           |
//! |                | ClimateSensorPort  | DHT22                          |
//! |                | ActuatorPort       | ESP32 GPIO (relays)            |
//! |                | ClockPort          | esp_timer + DS3231 RTC         |
//! |                | DisplayPort        | HD44780 LCD over I²C           |
//! | `log_sink`     | EventSink          | Serial log output              |
//! | `nvs`          | ByteStorePort      | NVS blob / in-memory store     |
//! | `time`         | (used by hardware) | ESP32 system timer             |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
