//! Page multiplexing and refresh timing
//!
//! The presenter alternates between a question page and an answers page.
//! A page stays up for the base interval, or long enough for its longest
//! marquee to complete one full cycle. All timing is a deadline check
//! against the millisecond clock passed in by the control loop.

use crate::traits::{CharDisplay, DisplayError, LCD_ROWS};

use super::field::{Line, TextField};

/// Default marquee step interval
pub const DEFAULT_SCROLL_INTERVAL_MS: u32 = 400;

/// Default dwell for pages without a marquee
pub const DEFAULT_PAGE_INTERVAL_MS: u32 = 4000;

/// Question shown until the bot publishes a quiz
pub const IDLE_QUESTION: &str = "Waiting for quiz";

/// Display page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Page {
    /// Question text (may use both lines)
    Question,
    /// Answer 1 on the first line, answer 2 on the second
    Answers,
}

impl Page {
    /// The other page
    pub fn other(self) -> Self {
        match self {
            Page::Question => Page::Answers,
            Page::Answers => Page::Question,
        }
    }
}

/// Presenter timing constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresenterTiming {
    /// Marquee step interval in milliseconds
    pub scroll_interval_ms: u32,
    /// Base page dwell in milliseconds
    pub page_interval_ms: u32,
}

impl Default for PresenterTiming {
    fn default() -> Self {
        Self {
            scroll_interval_ms: DEFAULT_SCROLL_INTERVAL_MS,
            page_interval_ms: DEFAULT_PAGE_INTERVAL_MS,
        }
    }
}

/// Two-page quiz presenter
#[derive(Debug, Clone)]
pub struct Presenter {
    question: TextField,
    answers: [TextField; 2],
    page: Page,
    timing: PresenterTiming,
    last_swap_ms: u64,
    last_scroll_ms: u64,
    /// Clear the surface before the next draw
    needs_clear: bool,
    /// Draw on the next refresh regardless of the scroll tick
    needs_redraw: bool,
}

impl Presenter {
    /// Create a presenter showing the idle question
    pub fn new(timing: PresenterTiming) -> Self {
        let mut question = TextField::new();
        question.set_question(IDLE_QUESTION);
        Self {
            question,
            answers: [TextField::new(), TextField::new()],
            page: Page::Question,
            timing,
            last_swap_ms: 0,
            last_scroll_ms: 0,
            needs_clear: true,
            needs_redraw: true,
        }
    }

    /// Replace the question text
    pub fn set_question(&mut self, text: &str) {
        self.question.set_question(text);
        self.needs_redraw = true;
    }

    /// Replace the first answer
    pub fn set_answer1(&mut self, text: &str) {
        self.answers[0].set_line(text);
        self.needs_redraw = true;
    }

    /// Replace the second answer
    pub fn set_answer2(&mut self, text: &str) {
        self.answers[1].set_line(text);
        self.needs_redraw = true;
    }

    /// Replace both answers
    pub fn set_answers(&mut self, first: &str, second: &str) {
        self.set_answer1(first);
        self.set_answer2(second);
    }

    /// Jump to the question page now, restarting every marquee
    pub fn show_question(&mut self, now_ms: u64) {
        self.enter_page(Page::Question, now_ms);
    }

    fn enter_page(&mut self, page: Page, now_ms: u64) {
        self.page = page;
        self.last_swap_ms = now_ms;
        self.question.reset_cursor();
        for answer in &mut self.answers {
            answer.reset_cursor();
        }
        self.needs_clear = true;
        self.needs_redraw = true;
    }

    /// Get the active page
    pub fn page(&self) -> Page {
        self.page
    }

    /// Get the question field
    pub fn question(&self) -> &TextField {
        &self.question
    }

    /// Get an answer field (0 or 1)
    pub fn answer(&self, index: usize) -> Option<&TextField> {
        self.answers.get(index)
    }

    /// How long a page stays up
    ///
    /// The base interval, or one full cycle of the page's longest
    /// marquee if that is longer.
    pub fn dwell_ms(&self, page: Page) -> u32 {
        let longest = match page {
            Page::Question => self.question.scroll_len(),
            Page::Answers => self.answers[0].scroll_len().max(self.answers[1].scroll_len()),
        };
        let cycle = (longest as u32).saturating_mul(self.timing.scroll_interval_ms);
        cycle.max(self.timing.page_interval_ms)
    }

    /// Lines currently visible on the active page
    pub fn rows(&self) -> [Line; LCD_ROWS] {
        match self.page {
            Page::Question => [self.question.render(0), self.question.render(1)],
            Page::Answers => [self.answers[0].render(0), self.answers[1].render(0)],
        }
    }

    fn advance_marquees(&mut self) {
        match self.page {
            Page::Question => self.question.advance(),
            Page::Answers => {
                for answer in &mut self.answers {
                    answer.advance();
                }
            }
        }
    }

    /// Run the presenter for one control-loop iteration
    ///
    /// Swaps the page when its dwell has elapsed (clearing the surface),
    /// then redraws if the scroll tick is due or content changed.
    ///
    /// # Returns
    /// `true` if the display was redrawn
    pub fn refresh<D: CharDisplay>(
        &mut self,
        now_ms: u64,
        display: &mut D,
    ) -> Result<bool, DisplayError> {
        let dwell = u64::from(self.dwell_ms(self.page));
        if now_ms.saturating_sub(self.last_swap_ms) >= dwell {
            self.enter_page(self.page.other(), now_ms);
        }

        let tick_due = now_ms.saturating_sub(self.last_scroll_ms)
            >= u64::from(self.timing.scroll_interval_ms);
        if !self.needs_redraw && !tick_due {
            return Ok(false);
        }

        let rows = self.rows();
        self.advance_marquees();
        self.needs_redraw = false;
        self.last_scroll_ms = now_ms;

        // Failed transfers are not retried; the next tick redraws anyway
        if self.needs_clear {
            self.needs_clear = false;
            display.clear()?;
        }
        for (row, line) in rows.iter().enumerate() {
            display.write_line(row as u8, line)?;
        }
        Ok(true)
    }
}
