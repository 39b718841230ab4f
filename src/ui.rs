pub mod charting;
pub mod diff;
pub mod screen;

use std::time::Instant;

use keycadence::app::App;
use keycadence::session::SessionResults;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::charting::{compute_chart_params, format_label, series_points};
use crate::ui::diff::{mark_chars, CharMark};
use crate::ui::screen::{current_screen, Screen};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const SERIES_COLORS: [Color; 5] = [
    Color::Magenta,
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Blue,
];

const LOCAL_ONLY_NOTE: &str =
    "This app runs entirely in your terminal. Your data never leaves your device.";

/// Renders whichever screen matches the app state
pub struct AppView<'a>(pub &'a App);

impl Widget for AppView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        current_screen(self.0.state()).render(self.0, area, buf);
    }
}

pub fn ui(app: &App, f: &mut Frame) {
    f.render_widget(AppView(app), f.area());
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn centered_lines(lines: Vec<Line<'_>>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Min(height),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

pub fn render_intro(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled("keycadence", bold().fg(Color::Cyan))),
        Line::from(""),
        Line::from("Type three passages exactly as shown."),
        Line::from("The time between every keystroke is recorded and compared across passages."),
        Line::from(""),
        Line::from(Span::styled("(enter) start / (esc)ape", italic())),
        Line::from(""),
        Line::from(Span::styled(
            LOCAL_ONLY_NOTE,
            Style::default().fg(Color::DarkGray),
        )),
    ];

    centered_lines(lines, area, buf);
}

pub fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let Some((index, passage)) = app.session().and_then(|s| s.current_passage()) else {
        return;
    };
    let typed = app.session().map_or("", |s| s.typed());

    let green_bold_style = bold().fg(Color::Green);
    let red_bold_style = bold().fg(Color::Red);
    let dim_bold_style = bold().add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = dim_bold_style.add_modifier(Modifier::UNDERLINED);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_occupied_lines = if passage.text.width() <= max_chars_per_line as usize {
        1
    } else {
        ((passage.text.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(1), // title
            Constraint::Length(2), // attribution
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1), // counter
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(format!("Passage {}", index + 1), bold()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(passage.label.as_str(), italic()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let cursor = typed.chars().count();
    let spans = mark_chars(typed, &passage.text)
        .into_iter()
        .enumerate()
        .map(|(idx, (expected, mark))| match mark {
            CharMark::Correct => Span::styled(expected.to_string(), green_bold_style),
            CharMark::Incorrect => Span::styled(
                match expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
            CharMark::Pending if idx == cursor => {
                Span::styled(expected.to_string(), underlined_dim_bold_style)
            }
            CharMark::Pending => Span::styled(expected.to_string(), dim_bold_style),
        })
        .collect::<Vec<Span>>();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        format!("{} / {}", cursor, passage.len()),
        dim_bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

pub fn render_paused(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(advance) = app.pending_advance() else {
        return;
    };
    let remaining = advance.remaining(Instant::now()).as_secs_f64();

    let lines = vec![
        Line::from(Span::styled(
            format!("✅ Complete! Moving to passage {}...", advance.passage() + 1),
            bold().fg(Color::Green),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{:.1}", remaining),
            bold().add_modifier(Modifier::DIM),
        )),
    ];

    centered_lines(lines, area, buf);
}

pub fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(results) = app.results() else {
        return;
    };

    let summary = summary_lines(results);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),                       // chart
            Constraint::Length(summary.len() as u16), // numbers
            Constraint::Length(1),                    // padding
            Constraint::Length(1),                    // status / legend
            Constraint::Length(1),                    // note
        ])
        .split(area);

    let points = series_points(&results.series);
    let (longest, highest_ms) = compute_chart_params(&points);
    let datasets = points
        .iter()
        .enumerate()
        .map(|(i, data)| {
            Dataset::default()
                .name(format!("Passage {}", i + 1))
                .marker(Marker::Braille)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .graph_type(GraphType::Line)
                .data(data)
        })
        .collect::<Vec<Dataset>>();

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("keystroke index")
                .bounds([0.0, longest])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(format_label(longest), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("interval (ms)")
                .bounds([0.0, highest_ms])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(format_label(highest_ms), bold()),
                ]),
        )
        .render(chunks[0], buf);

    Paragraph::new(summary)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let legend = app
        .status()
        .map(str::to_string)
        .unwrap_or_else(|| "(r)estart / (d)ownload csv / (esc)ape".to_string());
    Paragraph::new(Span::styled(legend, italic())).render(chunks[3], buf);

    Paragraph::new(Span::styled(
        LOCAL_ONLY_NOTE,
        Style::default().fg(Color::DarkGray),
    ))
    .render(chunks[4], buf);
}

fn summary_lines(results: &SessionResults) -> Vec<Line<'static>> {
    let wpm = results
        .wpm
        .map_or_else(|| "n/a".to_string(), |wpm| format!("{wpm:.1}"));

    let scores = results
        .analysis
        .pairs
        .iter()
        .map(|p| format!("{} vs {}: {:.2}", p.a + 1, p.b + 1, p.score))
        .collect::<Vec<String>>()
        .join("   ");

    let rhythm = results
        .analysis
        .summaries
        .iter()
        .enumerate()
        .map(|(i, s)| match (s.mean_ms, s.std_dev_ms) {
            (Some(mean), Some(sd)) => format!("{}: {mean:.0} ± {sd:.0} ms", i + 1),
            _ => format!("{}: n/a", i + 1),
        })
        .collect::<Vec<String>>()
        .join("   ");

    let started = results
        .started_at
        .map(|t| format!("   (started {})", t.format("%H:%M:%S")))
        .unwrap_or_default();

    vec![
        Line::from(vec![
            Span::styled("Typing Speed: ", bold()),
            Span::raw(format!("{wpm} WPM{started}")),
        ]),
        Line::from(vec![
            Span::styled("Rhythm (mean ± σ): ", bold()),
            Span::raw(rhythm),
        ]),
        Line::from(vec![
            Span::styled("Similarity (log-likelihood-ish): ", bold()),
            Span::raw(scores),
        ]),
        Line::from(vec![
            Span::styled("Verdict: ", bold()),
            Span::raw(results.analysis.verdict.to_string()),
        ]),
    ]
}

pub fn render_load_failed(app: &App, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            "Could not load passages",
            bold().fg(Color::Red),
        )),
        Line::from(""),
        Line::from(app.load_error().unwrap_or("unknown error").to_string()),
        Line::from(""),
        Line::from(Span::styled("(r)etry / (esc)ape", italic())),
    ];

    centered_lines(lines, area, buf);
}
