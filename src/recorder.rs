use crate::error::SessionError;

/// Characters per word in the standard WPM formula
pub const CHARS_PER_WORD: f64 = 5.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// A key event as the recorder sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// a single displayable character
    Char(char),
    /// the deletion control
    Backspace,
    /// any other key: timed, but never edits the buffer
    Other,
}

impl Key {
    /// Build a key from a single character, treating control characters as
    /// non-editing keys.
    pub fn from_char(c: char) -> Self {
        if c.is_control() {
            Key::Other
        } else {
            Key::Char(c)
        }
    }
}

/// Gaps in milliseconds between consecutive keystrokes of one passage
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntervalSeries {
    intervals: Vec<f64>,
    sealed: bool,
}

impl IntervalSeries {
    pub fn from_intervals(intervals: Vec<f64>) -> Self {
        Self {
            intervals,
            sealed: true,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn push(&mut self, interval: f64) {
        self.intervals.push(interval);
    }

    fn seal(&mut self) {
        self.sealed = true;
    }
}

/// Accumulates inter-keystroke intervals, one series per passage
#[derive(Clone, Debug)]
pub struct TimingRecorder {
    series: Vec<IntervalSeries>,
    last_timestamps: Vec<Option<f64>>,
}

impl TimingRecorder {
    pub fn new(passage_count: usize) -> Self {
        Self {
            series: vec![IntervalSeries::default(); passage_count],
            last_timestamps: vec![None; passage_count],
        }
    }

    /// Time a key event for `passage` and apply it to `typed_before`.
    ///
    /// The first keystroke of a passage only sets the reference timestamp;
    /// every later keystroke, backspaces included, appends one interval.
    pub fn record_keystroke(
        &mut self,
        passage: usize,
        timestamp_ms: f64,
        key: &Key,
        typed_before: &str,
    ) -> Result<String, SessionError> {
        let series = self
            .series
            .get_mut(passage)
            .ok_or(SessionError::UnknownPassage(passage))?;

        if series.is_sealed() {
            return Err(SessionError::PassageSealed(passage));
        }

        let last = &mut self.last_timestamps[passage];
        if let Some(previous) = *last {
            series.push((timestamp_ms - previous).max(0.0));
        }
        *last = Some(timestamp_ms);

        Ok(apply_key(typed_before, key))
    }

    /// Freeze the series of a completed passage
    pub fn seal(&mut self, passage: usize) -> Result<(), SessionError> {
        let series = self
            .series
            .get_mut(passage)
            .ok_or(SessionError::UnknownPassage(passage))?;

        if series.is_sealed() {
            return Err(SessionError::PassageSealed(passage));
        }

        series.seal();
        Ok(())
    }

    pub fn series(&self, passage: usize) -> Option<&IntervalSeries> {
        self.series.get(passage)
    }

    pub fn all_series(&self) -> &[IntervalSeries] {
        &self.series
    }
}

/// Apply one key to the typed buffer
pub fn apply_key(typed: &str, key: &Key) -> String {
    let mut after = typed.to_string();
    match key {
        Key::Backspace => {
            after.pop();
        }
        Key::Char(c) => after.push(*c),
        Key::Other => {}
    }
    after
}

/// Completion requires the buffer to equal the reference exactly
pub fn is_passage_complete(typed: &str, reference: &str) -> bool {
    typed == reference
}

/// Words per minute, with five characters counted as a word.
///
/// Returns `None` when no time has elapsed.
pub fn compute_wpm(total_correct_chars: usize, elapsed_ms: f64) -> Option<f64> {
    if elapsed_ms <= 0.0 || !elapsed_ms.is_finite() {
        return None;
    }

    let words = total_correct_chars as f64 / CHARS_PER_WORD;
    let minutes = elapsed_ms / MILLIS_PER_MINUTE;

    Some(words / minutes)
}
