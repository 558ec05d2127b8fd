//! HTTP command surface
//!
//! The network side parses a request line into a [`Command`], hands it to
//! the control loop, and writes back the [`Reply`] it gets. Nothing here
//! touches apparatus state.

pub mod reply;
pub mod request;

pub use reply::{ContentType, Reply, ReplyBody, ResponseHead, StatusCode};
pub use request::{decode, parse_request};

/// Capacity of one decoded query value in bytes
///
/// Enough for the LCD text limit even when every character is a two-byte
/// accented letter.
pub const QUERY_TEXT_LEN: usize = 2 * crate::display::MAX_TEXT_CHARS;

/// Decoded query value
pub type QueryText = heapless::String<QUERY_TEXT_LEN>;

/// Request rejected before reaching the apparatus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Request line could not be parsed
    Malformed,
    /// Known path, but not a GET
    MethodNotAllowed,
    /// No endpoint at this path
    NotFound,
    /// `/move` without a `steps` value
    MissingSteps,
    /// `steps` is not an integer
    InvalidSteps,
}

/// Text fields supplied to `/quiz`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizUpdate {
    /// New question text (`q`)
    pub question: Option<QueryText>,
    /// New first answer, shown for sensor A (`a1`)
    pub answer1: Option<QueryText>,
    /// New second answer, shown for sensor B (`a2`)
    pub answer2: Option<QueryText>,
}

/// One parsed request for the control loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `GET /`: status report
    Status,
    /// `GET /step`: fixed relative move
    LegacyStep,
    /// `GET /move?steps=n`: relative move
    Move { steps: i32 },
    /// `GET /quiz?q=..&a1=..&a2=..`: replace display text
    SetQuiz(QuizUpdate),
    /// `GET /poll_votes`: report and reset the vote counters
    PollVotes,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Command {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Command::Status => defmt::write!(f, "Status"),
            Command::LegacyStep => defmt::write!(f, "LegacyStep"),
            Command::Move { steps } => defmt::write!(f, "Move({})", steps),
            Command::SetQuiz(update) => defmt::write!(
                f,
                "SetQuiz(q={}, a1={}, a2={})",
                update.question.is_some(),
                update.answer1.is_some(),
                update.answer2.is_some()
            ),
            Command::PollVotes => defmt::write!(f, "PollVotes"),
        }
    }
}
