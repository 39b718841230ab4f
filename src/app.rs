use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::export::export_to_dir;
use crate::passages::PassageSource;
use crate::runtime::{key_from_event, ScheduledAdvance, SessionClock};
use crate::session::{Phase, Progress, Session, SessionResults};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Intro,
    Typing,
    /// Between passages, waiting for the scheduled advance
    Paused,
    Results,
    LoadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Presentation-side owner of the session: routes keys, runs the pause
/// between passages and keeps the final results for rendering.
pub struct App {
    source: Box<dyn PassageSource>,
    session: Option<Session>,
    load_error: Option<String>,
    clock: SessionClock,
    advance_delay: Duration,
    pending_advance: Option<ScheduledAdvance>,
    results: Option<SessionResults>,
    export_dir: PathBuf,
    status: Option<String>,
}

impl App {
    pub fn new(source: Box<dyn PassageSource>, config: &Config, export_dir: PathBuf) -> Self {
        let mut app = Self {
            source,
            session: None,
            load_error: None,
            clock: SessionClock::new(),
            advance_delay: config.advance_delay(),
            pending_advance: None,
            results: None,
            export_dir,
            status: None,
        };
        app.load_session();
        app
    }

    fn load_session(&mut self) {
        let loaded = self
            .source
            .load()
            .map_err(|e| e.to_string())
            .and_then(|passages| Session::new(passages).map_err(|e| e.to_string()));

        match loaded {
            Ok(session) => {
                info!(passages = session.passages().len(), "passages loaded");
                self.session = Some(session);
                self.load_error = None;
            }
            Err(e) => {
                error!(error = %e, "failed to load passages");
                self.session = None;
                self.load_error = Some(e);
            }
        }
    }

    pub fn state(&self) -> AppState {
        let Some(session) = &self.session else {
            return AppState::LoadFailed;
        };

        if self.results.is_some() {
            return AppState::Results;
        }

        match session.phase() {
            Phase::NotStarted => AppState::Intro,
            Phase::PassageInProgress(_) if session.is_awaiting_next() => AppState::Paused,
            Phase::PassageInProgress(_) => AppState::Typing,
            Phase::Completed | Phase::ResultsShown => AppState::Results,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, at: Instant) -> AppAction {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return AppAction::Quit;
        }

        match self.state() {
            AppState::Intro => {
                if key.code == KeyCode::Enter {
                    self.start(at);
                }
            }
            AppState::Typing => self.type_key(key, at),
            // keystrokes during the pause belong to no passage
            AppState::Paused => {}
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('d') => self.export(),
                _ => {}
            },
            AppState::LoadFailed => {
                if key.code == KeyCode::Char('r') {
                    self.restart();
                }
            }
        }

        AppAction::Continue
    }

    /// Begin the next passage once the pause is over
    pub fn on_tick(&mut self, now: Instant) {
        let Some(passage) = self.pending_advance.and_then(|a| a.poll(now)) else {
            return;
        };

        self.pending_advance = None;
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.begin_passage(passage) {
                error!(error = %e, "could not begin next passage");
            }
        }
    }

    fn start(&mut self, at: Instant) {
        let now_ms = self.clock.millis_at(at);
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.start(now_ms) {
                warn!(error = %e, "start ignored");
            }
        }
    }

    fn type_key(&mut self, event: KeyEvent, at: Instant) {
        let Some(key) = key_from_event(&event) else {
            return;
        };
        let now_ms = self.clock.millis_at(at);
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let outcome = match session.record_keystroke(now_ms, &key) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "keystroke dropped");
                return;
            }
        };

        match outcome.progress {
            Progress::Typing => {}
            Progress::PassageComplete {
                next: Some(next), ..
            } => {
                self.pending_advance = Some(ScheduledAdvance::new(next, at, self.advance_delay));
            }
            Progress::PassageComplete { next: None, .. } => match session.show_results(now_ms) {
                Ok(results) => self.results = Some(results),
                Err(e) => error!(error = %e, "could not compute results"),
            },
        }
    }

    /// Throw away every timing and go back to the intro screen
    pub fn restart(&mut self) {
        if let Some(mut advance) = self.pending_advance.take() {
            advance.cancel();
        }
        self.results = None;
        self.status = None;

        match self.session.as_mut() {
            Some(session) => session.reset(),
            None => self.load_session(),
        }
    }

    pub fn export(&mut self) {
        let Some(results) = &self.results else {
            return;
        };

        self.status = Some(match export_to_dir(&self.export_dir, &results.series) {
            Ok(path) => format!("saved {}", path.display()),
            Err(e) => {
                error!(error = %e, "export failed");
                format!("export failed: {e}")
            }
        });
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn results(&self) -> Option<&SessionResults> {
        self.results.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn pending_advance(&self) -> Option<&ScheduledAdvance> {
        self.pending_advance.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PassageLoadError;
    use crate::passages::Passage;
    use tempfile::tempdir;

    struct FixedPassages(Vec<&'static str>);

    impl PassageSource for FixedPassages {
        fn load(&self) -> Result<Vec<Passage>, PassageLoadError> {
            Ok(self.0.iter().map(|t| Passage::new(*t, "fixed")).collect())
        }
    }

    struct BrokenSource;

    impl PassageSource for BrokenSource {
        fn load(&self) -> Result<Vec<Passage>, PassageLoadError> {
            Err(PassageLoadError::NoPassages("nowhere".to_string()))
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn app(texts: Vec<&'static str>, delay_secs: u64) -> App {
        let config = Config {
            advance_delay_secs: delay_secs,
            ..Config::default()
        };
        App::new(Box::new(FixedPassages(texts)), &config, PathBuf::from("."))
    }

    #[test]
    fn enter_starts_the_session() {
        let mut app = app(vec!["ab"], 0);
        let t0 = Instant::now();

        assert_eq!(app.state(), AppState::Intro);
        app.handle_key(key('a'), t0);
        assert_eq!(app.state(), AppState::Intro);

        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), t0);
        assert_eq!(app.state(), AppState::Typing);
    }

    #[test]
    fn escape_quits() {
        let mut app = app(vec!["ab"], 0);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.handle_key(esc, Instant::now()), AppAction::Quit);
    }

    #[test]
    fn pause_drops_keys_then_advances() {
        let mut app = app(vec!["a", "b"], 5);
        let t0 = Instant::now();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), t0);
        app.handle_key(key('a'), t0);

        assert_eq!(app.state(), AppState::Paused);
        app.handle_key(key('b'), t0 + Duration::from_secs(1));
        assert_eq!(app.session().unwrap().typed(), "a");

        app.on_tick(t0 + Duration::from_secs(4));
        assert_eq!(app.state(), AppState::Paused);

        app.on_tick(t0 + Duration::from_secs(5));
        assert_eq!(app.state(), AppState::Typing);
        assert_eq!(app.session().unwrap().phase(), Phase::PassageInProgress(1));
    }

    #[test]
    fn restart_cancels_pending_advance() {
        let mut app = app(vec!["a", "b"], 5);
        let t0 = Instant::now();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), t0);
        app.handle_key(key('a'), t0);

        app.restart();

        assert!(app.pending_advance().is_none());
        assert_eq!(app.state(), AppState::Intro);
        app.on_tick(t0 + Duration::from_secs(10));
        assert_eq!(app.state(), AppState::Intro);
    }

    #[test]
    fn second_run_after_results_starts_fresh() {
        let mut app = app(vec!["ab", "cd"], 0);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let t0 = Instant::now();
        let ms = |n: u64| t0 + Duration::from_millis(n);

        app.handle_key(enter, t0);
        app.handle_key(key('a'), ms(0));
        app.handle_key(key('b'), ms(500));
        app.on_tick(ms(600));
        app.handle_key(key('c'), ms(700));
        app.handle_key(key('d'), ms(1200));
        assert_eq!(app.state(), AppState::Results);

        app.handle_key(key('r'), ms(2000));
        assert_eq!(app.state(), AppState::Intro);
        assert!(app.results().is_none());
        let session = app.session().unwrap();
        assert_eq!(session.total_correct_chars(), 0);
        assert!(session.series().iter().all(|s| s.is_empty() && !s.is_sealed()));

        app.handle_key(enter, ms(3000));
        app.handle_key(key('a'), ms(3000));
        app.handle_key(key('b'), ms(3100));
        app.on_tick(ms(3200));
        app.handle_key(key('c'), ms(3300));
        app.handle_key(key('d'), ms(3400));
        assert_eq!(app.state(), AppState::Results);

        let results = app.results().unwrap();
        assert_eq!(results.total_correct_chars, 4);
        for series in &results.series {
            assert_eq!(series.len(), 1);
            assert!((series.as_slice()[0] - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn load_failure_is_a_distinct_state() {
        let app = App::new(Box::new(BrokenSource), &Config::default(), PathBuf::from("."));

        assert_eq!(app.state(), AppState::LoadFailed);
        assert!(app.load_error().unwrap().contains("nowhere"));
        assert!(app.session().is_none());
    }

    #[test]
    fn export_writes_csv() {
        let dir = tempdir().unwrap();
        let mut app = App::new(
            Box::new(FixedPassages(vec!["ab"])),
            &Config::default(),
            dir.path().to_path_buf(),
        );
        let t0 = Instant::now();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), t0);
        app.handle_key(key('a'), t0);
        app.handle_key(key('b'), t0 + Duration::from_millis(120));
        assert_eq!(app.state(), AppState::Results);

        app.handle_key(key('d'), t0 + Duration::from_secs(1));

        assert!(app.status().unwrap().starts_with("saved"));
        assert!(dir.path().join(crate::export::EXPORT_FILE_NAME).exists());
    }
}
