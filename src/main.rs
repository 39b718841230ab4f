pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keycadence::{
    app::{App, AppAction},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    passages::{BuiltinPassages, DirectoryPassages, PassageSource},
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, SessionEvent, Ticker},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::ui::ui;

const TICK_RATE_MS: u64 = 100;

/// typing tui that times every keystroke across three passages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type three reference passages. The time between every keystroke is recorded, words per minute are computed, and the rhythm of each passage is compared with the others to flag an inconsistent typist."
)]
pub struct Cli {
    /// directory holding passage1.txt, passage2.txt, ... (built-in passages when omitted)
    #[clap(short = 'p', long)]
    passage_dir: Option<PathBuf>,

    /// directory the CSV export is written to
    #[clap(short = 'o', long)]
    export_dir: Option<PathBuf>,

    /// seconds to pause between passages
    #[clap(short = 'd', long)]
    delay: Option<u64>,

    /// persist the given options as the new defaults
    #[clap(long)]
    save_config: bool,

    /// log verbosity (-v info, -vv debug, -vvv trace); logs go to the state directory
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Layer command line options over the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.passage_dir {
            config.passage_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = Some(dir.clone());
        }
        if let Some(delay) = self.delay {
            config.advance_delay_secs = delay;
        }
        config
    }
}

fn init_logging(verbose: u8) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let log_dir = AppDirs::log_dir();
    std::fs::create_dir_all(&log_dir).ok()?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, "keycadence.log"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    Some(guard)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = init_logging(cli.verbose);

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "configuration saved");
    }

    let source: Box<dyn PassageSource> = match &config.passage_dir {
        Some(dir) => Box::new(DirectoryPassages::new(dir)),
        None => Box::new(BuiltinPassages),
    };
    let export_dir = config.export_dir.clone().unwrap_or_else(AppDirs::export_dir);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(source, &config, export_dir);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let res = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            SessionEvent::Tick => {
                app.on_tick(Instant::now());
            }
            SessionEvent::Resize => {}
            SessionEvent::Key(key, at) => {
                if app.handle_key(key, at) == AppAction::Quit {
                    break;
                }
            }
        }

        terminal.draw(|f| ui(app, f))?;
    }

    info!("exiting");
    Ok(())
}
