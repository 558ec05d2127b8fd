//! Character display trait for the 16x2 LCD

/// Visible columns per line
pub const LCD_COLS: usize = 16;

/// Visible lines
pub const LCD_ROWS: usize = 2;

/// Errors that can occur with display communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed (NACK, arbitration loss)
    Bus,
    /// Cursor position outside the visible area
    OutOfBounds,
}

/// Trait for character display surfaces
///
/// The display is a dumb surface: layout and scrolling decisions are
/// made by the presenter, which only ever writes whole 16-column lines.
pub trait CharDisplay {
    /// Clear the entire screen and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor
    ///
    /// - `col`: Column number (0-15)
    /// - `row`: Row number (0-1)
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Write a run of ASCII characters at the cursor
    fn write_str(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Write a full line starting at column 0
    fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(0, row)?;
        self.write_str(text)
    }
}
