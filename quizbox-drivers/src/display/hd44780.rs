//! HD44780 16x2 LCD behind a PCF8574 I2C backpack
//!
//! The backpack maps expander bits to the LCD as:
//!
//! | Bit | 7..4   | 3         | 2  | 1  | 0  |
//! |-----|--------|-----------|----|----|----|
//! | LCD | D7..D4 | backlight | EN | RW | RS |
//!
//! so the controller runs in 4-bit mode: every byte is sent as two
//! nibbles, each latched by pulsing EN. One I2C write carries the whole
//! pulse sequence for a byte.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use quizbox_core::traits::{CharDisplay, DisplayError, LCD_COLS, LCD_ROWS};

/// Usual backpack address (A0-A2 open)
pub const DEFAULT_ADDRESS: u8 = 0x27;

const BACKLIGHT: u8 = 0x08;
const ENABLE: u8 = 0x04;
const RS_DATA: u8 = 0x01;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_INCREMENT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of each row start
const ROW_OFFSETS: [u8; LCD_ROWS] = [0x00, 0x40];

/// Blocking HD44780 driver
pub struct Lcd1602<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    backlight: u8,
}

impl<I2C: I2c, D: DelayNs> Lcd1602<I2C, D> {
    /// Create a driver; call [`Lcd1602::init`] before use
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight: BACKLIGHT,
        }
    }

    /// Run the 4-bit initialization sequence and clear the screen
    pub fn init(&mut self) -> Result<(), DisplayError> {
        // Power-on settle
        self.delay.delay_ms(50);

        // Three times 8-bit mode puts the controller in a known state
        for _ in 0..3 {
            self.write_nibble(0x30, 0)?;
            self.delay.delay_ms(5);
        }
        self.write_nibble(0x20, 0)?;
        self.delay.delay_ms(1);

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_ENTRY_INCREMENT)?;
        self.clear()
    }

    /// Switch the backlight
    pub fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.expander_write(&[self.backlight])
    }

    /// Give the bus and delay back
    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.write_byte(cmd, 0)?;
        // Longest non-clear instruction is 37 µs
        self.delay.delay_us(50);
        Ok(())
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.write_byte(byte, RS_DATA)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8, rs: u8) -> Result<(), DisplayError> {
        let flags = self.backlight | rs;
        let high = (byte & 0xF0) | flags;
        let low = ((byte << 4) & 0xF0) | flags;
        self.expander_write(&[high | ENABLE, high, low | ENABLE, low])
    }

    fn write_nibble(&mut self, nibble: u8, rs: u8) -> Result<(), DisplayError> {
        let bits = (nibble & 0xF0) | self.backlight | rs;
        self.expander_write(&[bits | ENABLE, bits])
    }

    fn expander_write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|_| DisplayError::Bus)
    }
}

impl<I2C: I2c, D: DelayNs> CharDisplay for Lcd1602<I2C, D> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.write_byte(CMD_CLEAR, 0)?;
        // Clear takes 1.52 ms
        self.delay.delay_ms(2);
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if usize::from(col) >= LCD_COLS || usize::from(row) >= LCD_ROWS {
            return Err(DisplayError::OutOfBounds);
        }
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[usize::from(row)] + col))
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            let byte = if c.is_ascii() && !c.is_ascii_control() {
                c as u8
            } else {
                b'?'
            };
            self.data(byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.fill(0),
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn lcd() -> Lcd1602<MockI2c, MockDelay> {
        Lcd1602::new(MockI2c::default(), MockDelay::default(), DEFAULT_ADDRESS)
    }

    #[test]
    fn test_byte_split_into_nibbles() {
        let mut lcd = lcd();
        lcd.write_str("A").unwrap();
        let (i2c, _) = lcd.free();
        // 'A' = 0x41, data register, backlight on
        assert_eq!(i2c.writes, vec![(0x27, vec![0x4D, 0x49, 0x1D, 0x19])]);
    }

    #[test]
    fn test_init_sequence() {
        let mut lcd = lcd();
        lcd.init().unwrap();
        let (i2c, delay) = lcd.free();
        let first: Vec<u8> = i2c.writes.iter().map(|(_, b)| b[1]).collect();
        // Three 8-bit wakeups, 4-bit switch, then function/display/entry/clear high nibbles
        assert_eq!(first, vec![0x38, 0x38, 0x38, 0x28, 0x28, 0x08, 0x08, 0x08]);
        assert!(delay.total_ns >= 65_000_000);
    }

    #[test]
    fn test_cursor_addresses_rows() {
        let mut lcd = lcd();
        lcd.set_cursor(3, 1).unwrap();
        let (i2c, _) = lcd.free();
        // 0x80 | 0x43 = 0xC3
        assert_eq!(i2c.writes[0].1, vec![0xCC, 0xC8, 0x3C, 0x38]);
    }

    #[test]
    fn test_cursor_out_of_bounds() {
        let mut lcd = lcd();
        assert_eq!(lcd.set_cursor(16, 0), Err(DisplayError::OutOfBounds));
        assert_eq!(lcd.set_cursor(0, 2), Err(DisplayError::OutOfBounds));
    }

    #[test]
    fn test_non_ascii_written_as_question_mark() {
        let mut lcd = lcd();
        lcd.write_str("è").unwrap();
        let (i2c, _) = lcd.free();
        // '?' = 0x3F
        assert_eq!(i2c.writes[0].1, vec![0x3D, 0x39, 0xFD, 0xF9]);
    }

    #[test]
    fn test_bus_error_mapped() {
        let mut lcd = lcd();
        lcd.i2c.fail = true;
        assert_eq!(lcd.clear(), Err(DisplayError::Bus));
    }

    #[test]
    fn test_backlight_off_clears_bit() {
        let mut lcd = lcd();
        lcd.set_backlight(false).unwrap();
        lcd.write_str("A").unwrap();
        let (i2c, _) = lcd.free();
        assert_eq!(i2c.writes[0].1, vec![0x00]);
        assert_eq!(i2c.writes[1].1, vec![0x45, 0x41, 0x15, 0x11]);
    }
}
