//! HD44780 20×4 character LCD behind a PCF8574 I²C backpack.
//!
//! ## Backpack wiring
//!
//! | PCF8574 bit | LCD pin   |
//! |-------------|-----------|
//! | P0          | RS        |
//! | P1          | RW        |
//! | P2          | EN        |
//! | P3          | backlight |
//! | P4–P7       | D4–D7     |
//!
//! The controller runs in 4-bit mode: every byte is sent as two nibbles,
//! each latched by an EN pulse.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::DisplayPort;
use crate::error::DisplayError;

/// Default backpack address (A0–A2 open).
pub const PCF8574_ADDR: u8 = 0x27;

pub const COLS: u8 = 20;
pub const ROWS: u8 = 4;

/// DDRAM start address of each visible row.
const ROW_OFFSETS: [u8; ROWS as usize] = [0x00, 0x40, 0x14, 0x54];

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // increment, no shift
const CMD_DISPLAY_ON: u8 = 0x0C; // display on, cursor off, blink off
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

pub struct Lcd<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
    backlight: u8,
}

impl<I2C: I2c, D: DelayNs> Lcd<I2C, D> {
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Self {
        Self {
            i2c,
            delay,
            addr,
            backlight: BACKLIGHT,
        }
    }

    /// Power-on initialisation into 4-bit, two-line mode.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);

        // Three 8-bit "function set" nibbles force a known state,
        // then switch to 4-bit.
        for _ in 0..3 {
            self.write_nibble(0x03 << 4, 0)?;
            self.delay.delay_us(4500);
        }
        self.write_nibble(0x02 << 4, 0)?;
        self.delay.delay_us(150);

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE)?;
        log::info!("LCD: {}x{} ready at 0x{:02X}", COLS, ROWS, self.addr);
        Ok(())
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.expander_write(0)
    }

    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col >= COLS || row >= ROWS {
            return Err(DisplayError::OutOfBounds { col, row });
        }
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[row as usize] + col))
    }

    // ── Low-level transfer ───────────────────────────────────────

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.send(cmd, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, RS)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble(byte & 0xF0, mode)?;
        self.write_nibble((byte << 4) & 0xF0, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), DisplayError> {
        self.expander_write(nibble | mode)?;
        self.expander_write(nibble | mode | EN)?;
        self.delay.delay_us(1);
        self.expander_write(nibble | mode)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.addr, &[bits | self.backlight])
            .map_err(|_| DisplayError::Bus)
    }
}

impl<I2C: I2c, D: DelayNs> DisplayPort for Lcd<I2C, D> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        // Clear is the one slow command (1.52 ms).
        self.delay.delay_ms(2);
        Ok(())
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(col, row)?;
        let room = usize::from(COLS - col);
        for ch in text.chars().take(room) {
            // The HD44780 ROM has ASCII in 0x20..0x7F and the degree sign at 0xDF.
            let code = match ch {
                '°' => 0xDF,
                c if c.is_ascii() && !c.is_ascii_control() => c as u8,
                _ => b'?',
            };
            self.data(code)?;
        }
        Ok(())
    }
}
