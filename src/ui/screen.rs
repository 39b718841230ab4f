use keycadence::app::{App, AppState};
use ratatui::{buffer::Buffer, layout::Rect};

use crate::ui::{render_intro, render_load_failed, render_paused, render_results, render_typing};

/// A UI Screen boundary: responsible for rendering one application state
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

pub struct IntroScreen;

impl Screen for IntroScreen {
    fn render(&self, _app: &App, area: Rect, buf: &mut Buffer) {
        render_intro(area, buf);
    }
}

pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_typing(app, area, buf);
    }
}

pub struct PausedScreen;

impl Screen for PausedScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_paused(app, area, buf);
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_results(app, area, buf);
    }
}

pub struct LoadFailedScreen;

impl Screen for LoadFailedScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_load_failed(app, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Intro => Box::new(IntroScreen),
        AppState::Typing => Box::new(TypingScreen),
        AppState::Paused => Box::new(PausedScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::LoadFailed => Box::new(LoadFailedScreen),
    }
}
