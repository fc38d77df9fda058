//! DS3231 battery-backed real-time clock over I²C.
//!
//! Time registers 0x00–0x06 hold BCD seconds, minutes, hours, weekday,
//! date, month (bit 7 = century) and two-digit year.  The chip keeps
//! running on its coin cell, so wall-clock time survives power loss.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use embedded_hal::i2c::I2c;

use crate::error::ClockError;

/// Fixed 7-bit bus address.
pub const DS3231_ADDR: u8 = 0x68;

const REG_SECONDS: u8 = 0x00;
const HOUR_12H: u8 = 0x40;
const HOUR_PM: u8 = 0x20;
const MONTH_CENTURY: u8 = 0x80;

pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Read the current date and time.
    pub fn now(&mut self) -> Result<NaiveDateTime, ClockError> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(DS3231_ADDR, &[REG_SECONDS], &mut regs)
            .map_err(|_| ClockError::Bus)?;
        decode_registers(&regs)
    }

    /// Set the clock.  Always written in 24 h mode.
    pub fn set(&mut self, t: NaiveDateTime) -> Result<(), ClockError> {
        let year = t.year();
        if !(2000..2200).contains(&year) {
            return Err(ClockError::InvalidTime);
        }
        let century = if year >= 2100 { MONTH_CENTURY } else { 0 };
        let frame = [
            REG_SECONDS,
            to_bcd(t.second() as u8),
            to_bcd(t.minute() as u8),
            to_bcd(t.hour() as u8),
            t.weekday().number_from_sunday() as u8,
            to_bcd(t.day() as u8),
            to_bcd(t.month() as u8) | century,
            to_bcd((year % 100) as u8),
        ];
        self.i2c
            .write(DS3231_ADDR, &frame)
            .map_err(|_| ClockError::Bus)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// Turn the seven time registers into a calendar time.
pub fn decode_registers(regs: &[u8; 7]) -> Result<NaiveDateTime, ClockError> {
    let sec = from_bcd(regs[0] & 0x7F);
    let min = from_bcd(regs[1] & 0x7F);

    let hour_reg = regs[2];
    let hour = if hour_reg & HOUR_12H != 0 {
        let h12 = from_bcd(hour_reg & 0x1F) % 12;
        if hour_reg & HOUR_PM != 0 { h12 + 12 } else { h12 }
    } else {
        from_bcd(hour_reg & 0x3F)
    };

    let day = from_bcd(regs[4] & 0x3F);
    let month = from_bcd(regs[5] & 0x1F);
    let century = if regs[5] & MONTH_CENTURY != 0 { 2100 } else { 2000 };
    let year = century + i32::from(from_bcd(regs[6]));

    NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
        .and_then(|d| d.and_hms_opt(u32::from(hour), u32::from(min), u32::from(sec)))
        .ok_or(ClockError::InvalidTime)
}

fn from_bcd(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}

fn to_bcd(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}
