use std::fmt;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::analyzer::{analyze, Analysis};
use crate::error::SessionError;
use crate::passages::Passage;
use crate::recorder::{compute_wpm, is_passage_complete, IntervalSeries, Key, TimingRecorder};

/// Where the exercise currently stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    PassageInProgress(usize),
    Completed,
    ResultsShown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not started"),
            Phase::PassageInProgress(i) => write!(f, "on passage {}", i + 1),
            Phase::Completed => write!(f, "completed"),
            Phase::ResultsShown => write!(f, "showing results"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Typing,
    /// The passage matched its reference exactly. `next` is the passage the
    /// presentation layer should begin once its pause is over.
    PassageComplete { passage: usize, next: Option<usize> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeystrokeOutcome {
    pub typed: String,
    pub progress: Progress,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionResults {
    /// `None` when no time elapsed between start and results
    pub wpm: Option<f64>,
    pub elapsed_ms: f64,
    pub started_at: Option<DateTime<Local>>,
    pub total_correct_chars: usize,
    pub analysis: Analysis,
    pub series: Vec<IntervalSeries>,
}

/// One run of the exercise: every passage, its typed buffer and timings
#[derive(Clone, Debug)]
pub struct Session {
    passages: Vec<Passage>,
    phase: Phase,
    recorder: TimingRecorder,
    typed: String,
    total_correct_chars: usize,
    started_at_ms: Option<f64>,
    started_at: Option<DateTime<Local>>,
}

impl Session {
    pub fn new(passages: Vec<Passage>) -> Result<Self, SessionError> {
        if passages.is_empty() {
            return Err(SessionError::NoPassages);
        }

        let recorder = TimingRecorder::new(passages.len());
        Ok(Self {
            passages,
            phase: Phase::NotStarted,
            recorder,
            typed: String::new(),
            total_correct_chars: 0,
            started_at_ms: None,
            started_at: None,
        })
    }

    /// Begin the first passage and start the session clock
    pub fn start(&mut self, now_ms: f64) -> Result<(), SessionError> {
        self.expect_phase(Phase::NotStarted, "start")?;

        self.started_at_ms = Some(now_ms);
        self.started_at = Some(Local::now());
        self.phase = Phase::PassageInProgress(0);
        info!(passages = self.passages.len(), "session started");
        Ok(())
    }

    /// Make `passage` the active one once the previous passage is sealed
    pub fn begin_passage(&mut self, passage: usize) -> Result<(), SessionError> {
        let Phase::PassageInProgress(current) = self.phase else {
            return Err(self.invalid_phase("begin a passage"));
        };

        let current_sealed = self.recorder.series(current).is_some_and(|s| s.is_sealed());
        if passage != current + 1 || !current_sealed {
            return Err(self.invalid_phase("begin a passage"));
        }
        if passage >= self.passages.len() {
            return Err(SessionError::UnknownPassage(passage));
        }

        self.typed.clear();
        self.phase = Phase::PassageInProgress(passage);
        debug!(passage = passage + 1, "passage started");
        Ok(())
    }

    /// Time and apply one key event on the active passage
    pub fn record_keystroke(
        &mut self,
        timestamp_ms: f64,
        key: &Key,
    ) -> Result<KeystrokeOutcome, SessionError> {
        let Phase::PassageInProgress(passage) = self.phase else {
            return Err(self.invalid_phase("record a keystroke"));
        };

        self.typed = self
            .recorder
            .record_keystroke(passage, timestamp_ms, key, &self.typed)?;

        let progress = if is_passage_complete(&self.typed, &self.passages[passage].text) {
            let next = self.on_passage_complete(passage)?;
            Progress::PassageComplete { passage, next }
        } else {
            Progress::Typing
        };

        Ok(KeystrokeOutcome {
            typed: self.typed.clone(),
            progress,
        })
    }

    /// Credit the passage's characters and seal its interval series.
    ///
    /// The typed buffer must match the reference exactly. Returns the index
    /// of the next passage, or `None` after the last one.
    pub fn on_passage_complete(&mut self, passage: usize) -> Result<Option<usize>, SessionError> {
        if self.phase != Phase::PassageInProgress(passage) {
            return Err(self.invalid_phase("complete a passage"));
        }
        if !is_passage_complete(&self.typed, &self.passages[passage].text) {
            return Err(SessionError::PassageIncomplete(passage));
        }

        self.recorder.seal(passage)?;
        self.total_correct_chars += self.passages[passage].len();

        info!(
            passage = passage + 1,
            intervals = self.recorder.series(passage).map_or(0, IntervalSeries::len),
            total_chars = self.total_correct_chars,
            "passage complete"
        );

        let next = passage + 1;
        if next < self.passages.len() {
            Ok(Some(next))
        } else {
            self.phase = Phase::Completed;
            Ok(None)
        }
    }

    /// Compute WPM and pairwise similarity once every passage is done
    pub fn show_results(&mut self, now_ms: f64) -> Result<SessionResults, SessionError> {
        self.expect_phase(Phase::Completed, "show results")?;

        let elapsed_ms = now_ms - self.started_at_ms.unwrap_or(now_ms);
        let wpm = compute_wpm(self.total_correct_chars, elapsed_ms);
        let analysis = analyze(self.recorder.all_series());

        self.phase = Phase::ResultsShown;
        info!(
            wpm = wpm.unwrap_or(f64::NAN),
            verdict = %analysis.verdict,
            "results computed"
        );

        Ok(SessionResults {
            wpm,
            elapsed_ms,
            started_at: self.started_at,
            total_correct_chars: self.total_correct_chars,
            analysis,
            series: self.recorder.all_series().to_vec(),
        })
    }

    /// Discard all timings and return to `NotStarted`
    pub fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.recorder = TimingRecorder::new(self.passages.len());
        self.typed.clear();
        self.total_correct_chars = 0;
        self.started_at_ms = None;
        self.started_at = None;
        info!("session reset");
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// The passage being typed (or just completed and awaiting the next one)
    pub fn current_passage(&self) -> Option<(usize, &Passage)> {
        match self.phase {
            Phase::PassageInProgress(i) => Some((i, &self.passages[i])),
            _ => None,
        }
    }

    /// True between a passage's completion and the start of the next one
    pub fn is_awaiting_next(&self) -> bool {
        match self.phase {
            Phase::PassageInProgress(i) => self.recorder.series(i).is_some_and(|s| s.is_sealed()),
            _ => false,
        }
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn total_correct_chars(&self) -> usize {
        self.total_correct_chars
    }

    pub fn series(&self) -> &[IntervalSeries] {
        self.recorder.all_series()
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    fn expect_phase(&self, phase: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.invalid_phase(action))
        }
    }

    fn invalid_phase(&self, action: &'static str) -> SessionError {
        SessionError::InvalidPhase {
            action,
            phase: self.phase,
        }
    }
}
