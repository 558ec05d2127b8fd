//! The apparatus: every piece of mutable application state
//!
//! Owned by the control loop. Requests are applied with
//! [`Apparatus::execute`]; everything time-driven happens in
//! [`Apparatus::tick`], which the loop calls once per iteration.

use crate::command::{Command, QuizUpdate, Reply};
use crate::config::QuizboxConfig;
use crate::display::{Page, Presenter};
use crate::motion::{MotionController, MotionError};
use crate::traits::{CharDisplay, CoilDriver, DisplayError, LightSensor};
use crate::voting::{Side, VoteMonitor, VoteTally};

/// What happened during one tick, for the caller to log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// A move is still outstanding after this tick
    pub moving: bool,
    /// The pointer reached its target during this tick
    pub arrived: bool,
    /// A vote was accepted
    pub vote: Option<Side>,
    /// The vote's feedback move was rejected
    pub feedback_error: Option<MotionError>,
    /// The display was redrawn
    pub redrawn: bool,
    /// The display refresh failed
    pub display_error: Option<DisplayError>,
    /// The page that is now shown, if it changed
    pub page_swap: Option<Page>,
}

/// Motion, voting and display state behind the HTTP surface
pub struct Apparatus<C> {
    motion: MotionController<C>,
    monitor: VoteMonitor,
    tally: VoteTally,
    presenter: Presenter,
    legacy_step: i32,
    vote_step: i32,
}

impl<C: CoilDriver> Apparatus<C> {
    /// Build the apparatus from a validated configuration
    pub fn new(coils: C, config: &QuizboxConfig) -> Self {
        Self {
            motion: MotionController::new(
                coils,
                config.motion.profile(),
                config.motion.max_move_steps,
            ),
            monitor: VoteMonitor::new(config.voting.trigger_level, config.voting.cooldown_ms),
            tally: VoteTally::new(),
            presenter: Presenter::new(config.display.timing()),
            legacy_step: config.motion.legacy_step_steps,
            vote_step: config.motion.vote_step_steps,
        }
    }

    /// Apply one request and build its reply
    ///
    /// Never waits for motion: moves are queued and the reply reports
    /// the new target.
    pub fn execute(&mut self, command: &Command, now_ms: u64) -> Reply {
        match command {
            Command::Status => {
                let m = &self.motion;
                Reply::ok(format_args!(
                    "quizbox {}\nposition: {}\ntarget: {}\nmax speed: {} steps/s",
                    if m.is_idle() { "idle" } else { "moving" },
                    m.position(),
                    m.target(),
                    m.max_speed()
                ))
            }
            Command::LegacyStep => self.queue_move(self.legacy_step),
            Command::Move { steps } => self.queue_move(*steps),
            Command::SetQuiz(update) => {
                self.apply_quiz(update, now_ms);
                Reply::ok(format_args!("quiz updated"))
            }
            Command::PollVotes => Reply::votes(self.tally.drain()),
        }
    }

    fn queue_move(&mut self, steps: i32) -> Reply {
        match self.motion.enqueue_relative(steps) {
            Ok(target) => Reply::ok(format_args!(
                "moving {} steps, target {}",
                steps, target
            )),
            Err(e) => Reply::from(e),
        }
    }

    fn apply_quiz(&mut self, update: &QuizUpdate, now_ms: u64) {
        if let Some(q) = &update.question {
            self.presenter.set_question(q);
        }
        if let Some(a1) = &update.answer1 {
            self.presenter.set_answer1(a1);
        }
        if let Some(a2) = &update.answer2 {
            self.presenter.set_answer2(a2);
        }
        self.presenter.show_question(now_ms);
    }

    /// Replace all display text with a notice (e.g. a network failure)
    pub fn show_notice(&mut self, text: &str, now_ms: u64) {
        self.presenter.set_question(text);
        self.presenter.set_answers("", "");
        self.presenter.show_question(now_ms);
    }

    /// Run one control-loop iteration after any pending request
    ///
    /// Refreshes the display, then either advances the motor by at most
    /// one micro-step or, when idle, polls the vote sensors. A vote is
    /// counted and answered with a feedback move.
    ///
    /// The display is only written on scroll ticks and page swaps. Such a
    /// tick blocks for the whole redraw: about 4 ms over a 400 kHz I2C
    /// backpack, plus 2 ms when the swap clears the screen. Steps due in
    /// that window run late, which shows as brief speed jitter.
    ///
    /// # Arguments
    /// - `now_us`: Monotonic time in microseconds, read once per iteration
    pub fn tick<A, B, D>(
        &mut self,
        now_us: u64,
        sensor_a: &mut A,
        sensor_b: &mut B,
        display: &mut D,
    ) -> TickReport
    where
        A: LightSensor,
        B: LightSensor,
        D: CharDisplay,
    {
        let now_ms = now_us / 1000;
        let mut report = TickReport::default();

        let page = self.presenter.page();
        match self.presenter.refresh(now_ms, display) {
            Ok(redrawn) => report.redrawn = redrawn,
            Err(e) => report.display_error = Some(e),
        }
        if self.presenter.page() != page {
            report.page_swap = Some(self.presenter.page());
        }

        if !self.motion.is_idle() {
            report.moving = self.motion.advance(now_us);
            report.arrived = !report.moving;
            return report;
        }

        let levels = [sensor_a.level(), sensor_b.level()];
        if let Some(side) = self.monitor.poll(now_ms, levels) {
            self.tally.record(side);
            report.vote = Some(side);
            if let Err(e) = self.motion.enqueue_relative(side.feedback_steps(self.vote_step)) {
                report.feedback_error = Some(e);
            }
        }
        report.moving = !self.motion.is_idle();
        report
    }

    /// Get the motion controller
    pub fn motion(&self) -> &MotionController<C> {
        &self.motion
    }

    /// Get the pending vote tally
    pub fn tally(&self) -> &VoteTally {
        &self.tally
    }

    /// Get the display presenter
    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }
}
