//! Two-page LCD presenter
//!
//! Lays quiz text out on the 16x2 character display. Short text is shown
//! statically, longer text runs as a marquee, and the question and answers
//! pages alternate on a content-dependent timer.

pub mod field;
pub mod presenter;
pub mod text;

pub use field::{Layout, Line, TextField, SCROLL_SEPARATOR};
pub use presenter::{
    Page, Presenter, PresenterTiming, DEFAULT_PAGE_INTERVAL_MS, DEFAULT_SCROLL_INTERVAL_MS,
    IDLE_QUESTION,
};
pub use text::{to_lcd_text, LcdText, MAX_TEXT_CHARS};
