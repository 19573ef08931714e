use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use whack::{
    logging::{self, LogLevel},
    runtime::{CrosstermEventSource, FixedTicker, Runner, Ticker, WhackEvent, WhackEventSource},
    scheduler::ThreadSpawner,
    surface::ChannelSurface,
    ui::{
        keymap::{self, Action},
        View, ViewLayout,
    },
    Controller, Timing,
};

const TICK_RATE_MS: u64 = 100;

/// whack-a-mole in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Twelve moles pop up at random for twenty seconds. Hit them with their key or a mouse click before they duck back down."
)]
pub struct Cli {
    /// seed for reproducible mole schedules
    #[clap(long)]
    seed: Option<u64>,

    /// file to write logs to (default: ~/.local/state/whack/whack.log)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// how much to log; RUST_LOG overrides this
    #[clap(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// keyboard only: do not capture the mouse
    #[clap(long)]
    no_mouse: bool,
}

pub struct App {
    pub controller: Arc<Controller>,
    pub view: View,
}

impl App {
    pub fn new(controller: Arc<Controller>) -> Self {
        let view = View::new(controller.timing().session_units);
        Self { controller, view }
    }

    /// Returns false when the player wants out
    pub fn on_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Start => {
                if let Err(e) = self.controller.start() {
                    log::debug!("start ignored: {e}");
                }
            }
            Action::Select(id) => self.select(id),
        }
        true
    }

    pub fn on_click(&mut self, area: Rect, column: u16, row: u16) {
        if let Some(id) = ViewLayout::new(area).target_at(column, row) {
            self.select(id);
        }
    }

    fn select(&mut self, id: usize) {
        if let Err(e) = self.controller.select(id) {
            log::warn!("selection ignored: {e}");
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = logging::init(cli.log_file.clone(), cli.log_level)? {
        log::info!("whack starting, logging to {}", path.display());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if !cli.no_mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let controller = Arc::new(
        Controller::new(
            Timing::default(),
            ChannelSurface::new(events.sender()),
            ThreadSpawner::new(),
        )
        .with_seed(cli.seed),
    );
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    let mut app = App::new(Arc::clone(&controller));
    let result = start_tui(&mut terminal, &mut app, &runner);

    controller.shutdown();

    disable_raw_mode()?;
    if !cli.no_mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        log::error!("whack exited with an error: {e}");
    }
    result
}

fn start_tui<B: Backend, E: WhackEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            WhackEvent::Tick => continue,
            WhackEvent::Resize => {}
            WhackEvent::Render(cmd) => app.view.apply(cmd),
            WhackEvent::Key(key) => {
                if let Some(action) = keymap::action_for(key) {
                    if !app.on_action(action) {
                        break;
                    }
                }
            }
            WhackEvent::Click { column, row } => {
                let size = terminal.size().unwrap_or_default();
                app.on_click(Rect::new(0, 0, size.width, size.height), column, row);
            }
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(&app.view, f.area());
}
