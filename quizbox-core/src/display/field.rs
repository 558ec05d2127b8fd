//! One text field and its layout on the LCD
//!
//! A field is static when it fits, split over both lines when it is a
//! question that breaks cleanly at a space, and a marquee otherwise.

use heapless::String;

use crate::traits::LCD_COLS;

use super::text::{to_lcd_text, LcdText};

/// Appended once to marquee text so the wraparound point is visible
pub const SCROLL_SEPARATOR: &str = " *** ";

/// Longest text that may be split over both lines
const SPLIT_MAX: usize = 2 * LCD_COLS;

/// One rendered LCD line, always exactly [`LCD_COLS`] characters
pub type Line = String<LCD_COLS>;

/// How a field is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layout {
    /// Fits on one line
    Static,
    /// Two static lines, broken at the space at byte index `at`
    Split {
        /// Index of the space replaced by the line break
        at: usize,
    },
    /// Marquee on one line
    Scroll,
}

/// A bounded text buffer with derived layout and marquee cursor
#[derive(Debug, Clone)]
pub struct TextField {
    /// LCD text; has the separator appended when scrolling
    text: LcdText,
    layout: Layout,
    /// Marquee window start, always < text length when scrolling
    cursor: usize,
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl TextField {
    /// Create an empty static field
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            layout: Layout::Static,
            cursor: 0,
        }
    }

    /// Replace the text of a question field
    ///
    /// Questions may use both lines: 17-32 characters are split at the
    /// last space at or before column 16 when both halves fit.
    pub fn set_question(&mut self, raw: &str) {
        self.replace(raw, true);
    }

    /// Replace the text of a single-line field
    pub fn set_line(&mut self, raw: &str) {
        self.replace(raw, false);
    }

    fn replace(&mut self, raw: &str, may_split: bool) {
        self.text = to_lcd_text(raw);
        self.cursor = 0;
        self.layout = choose_layout(&self.text, may_split);

        if self.layout == Layout::Scroll {
            // Capacity reserves room for the separator
            let _ = self.text.push_str(SCROLL_SEPARATOR);
        }
    }

    /// Get the layout chosen for the current text
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Check if the field runs as a marquee
    pub fn is_scrolling(&self) -> bool {
        self.layout == Layout::Scroll
    }

    /// Characters in one full marquee cycle (0 when static)
    pub fn scroll_len(&self) -> usize {
        if self.is_scrolling() {
            self.text.len()
        } else {
            0
        }
    }

    /// The text as entered, without the marquee separator
    pub fn text(&self) -> &str {
        if self.is_scrolling() {
            &self.text[..self.text.len() - SCROLL_SEPARATOR.len()]
        } else {
            &self.text
        }
    }

    /// Current marquee cursor
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the marquee one character along, wrapping
    pub fn advance(&mut self) {
        if self.is_scrolling() {
            self.cursor = (self.cursor + 1) % self.text.len();
        }
    }

    /// Restart the marquee from the beginning
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Render one of the lines this field occupies
    ///
    /// `part` 0 is the first line; part 1 is only non-blank for split text.
    pub fn render(&self, part: usize) -> Line {
        match (self.layout, part) {
            (Layout::Static, 0) => padded(&self.text),
            (Layout::Split { at }, 0) => padded(&self.text[..at]),
            (Layout::Split { at }, 1) => padded(&self.text[at + 1..]),
            (Layout::Scroll, 0) => self.window(),
            _ => padded(""),
        }
    }

    /// The visible marquee window, wrapping circularly through the text
    fn window(&self) -> Line {
        let bytes = self.text.as_bytes();
        let mut line = Line::new();
        for i in 0..LCD_COLS {
            let b = bytes[(self.cursor + i) % bytes.len()];
            let _ = line.push(b as char);
        }
        line
    }
}

/// Decide static, split or marquee for LCD text
fn choose_layout(text: &str, may_split: bool) -> Layout {
    let len = text.len();
    if len <= LCD_COLS {
        return Layout::Static;
    }
    if !may_split || len > SPLIT_MAX {
        return Layout::Scroll;
    }

    match text[..=LCD_COLS].rfind(' ') {
        Some(at) if len - at - 1 <= LCD_COLS => Layout::Split { at },
        _ => Layout::Scroll,
    }
}

/// Left-align text in a full-width line, blanking the rest
fn padded(text: &str) -> Line {
    let mut line = Line::new();
    for c in text.chars().take(LCD_COLS) {
        let _ = line.push(c);
    }
    while line.len() < LCD_COLS {
        let _ = line.push(' ');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> TextField {
        let mut f = TextField::new();
        f.set_question(text);
        f
    }

    #[test]
    fn test_short_text_is_static() {
        let f = question("Capitale?!");
        assert_eq!(f.layout(), Layout::Static);
        assert_eq!(f.render(0).as_str(), "Capitale?!      ");
        assert_eq!(f.render(1).as_str(), "                ");
    }

    #[test]
    fn test_exactly_sixteen_is_static() {
        let f = question("0123456789abcdef");
        assert_eq!(f.layout(), Layout::Static);
        assert_eq!(f.render(0).as_str(), "0123456789abcdef");
    }

    #[test]
    fn test_forty_chars_scroll() {
        let f = question("This question is forty characters long!!");
        assert_eq!(f.text().len(), 40);
        assert!(f.is_scrolling());
        assert_eq!(f.scroll_len(), 40 + SCROLL_SEPARATOR.len());
    }

    #[test]
    fn test_twenty_chars_split_at_space() {
        let f = question("abcdefghij klmnopqrs");
        assert_eq!(f.layout(), Layout::Split { at: 10 });
        assert_eq!(f.render(0).as_str(), "abcdefghij      ");
        assert_eq!(f.render(1).as_str(), "klmnopqrs       ");
    }

    #[test]
    fn test_twenty_chars_without_early_space_scroll() {
        let f = question("abcdefghijklmnopq rs");
        assert!(f.is_scrolling());
        let f = question("abcdefghijklmnopqrst");
        assert!(f.is_scrolling());
    }

    #[test]
    fn test_split_at_column_sixteen() {
        let f = question("0123456789abcdef tail");
        assert_eq!(f.layout(), Layout::Split { at: 16 });
        assert_eq!(f.render(0).as_str(), "0123456789abcdef");
    }

    #[test]
    fn test_split_tail_too_long_scrolls() {
        // Last usable space leaves a 20-char tail
        let f = question("ab cdefghijklmnopqrstuv");
        assert!(f.is_scrolling());
    }

    #[test]
    fn test_answers_never_split() {
        let mut f = TextField::new();
        f.set_line("abcdefghij klmnopqrs");
        assert!(f.is_scrolling());
    }

    #[test]
    fn test_marquee_window_wraps() {
        let mut f = TextField::new();
        f.set_line("0123456789abcdefXY");
        assert_eq!(f.render(0).as_str(), "0123456789abcdef");

        f.advance();
        assert_eq!(f.render(0).as_str(), "123456789abcdefX");

        // Cycle length is text + separator; jump to near the end
        for _ in 1..f.scroll_len() - 2 {
            f.advance();
        }
        assert_eq!(f.cursor(), f.scroll_len() - 2);
        assert_eq!(f.render(0).as_str(), "* 0123456789abcd");

        f.advance();
        f.advance();
        assert_eq!(f.cursor(), 0);
    }

    #[test]
    fn test_text_excludes_separator() {
        let mut f = TextField::new();
        f.set_line("a long answer that scrolls");
        assert_eq!(f.text(), "a long answer that scrolls");
    }

    #[test]
    fn test_replacing_text_recomputes_layout() {
        let mut f = TextField::new();
        f.set_line("a long answer that scrolls");
        f.advance();
        f.set_line("Roma");
        assert!(!f.is_scrolling());
        assert_eq!(f.cursor(), 0);
        assert_eq!(f.text(), "Roma");
    }

    #[test]
    fn test_static_advance_is_noop() {
        let mut f = question("Roma");
        f.advance();
        assert_eq!(f.cursor(), 0);
    }
}
