use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{
    self, Event as CtEvent, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::surface::RenderCommand;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum WhackEvent {
    Key(KeyEvent),
    Click { column: u16, row: u16 },
    Resize,
    Tick,
    /// Posted by the game core for the UI thread to apply
    Render(RenderCommand),
}

/// Source of terminal and game events
pub trait WhackEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<WhackEvent, RecvTimeoutError>;
}

fn translate(event: CtEvent) -> Option<WhackEvent> {
    match event {
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(WhackEvent::Key(key)),
        CtEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(WhackEvent::Click { column, row }),
        CtEvent::Resize(_, _) => Some(WhackEvent::Resize),
        _ => None,
    }
}

/// Production event source: a crossterm reader thread plus whatever the
/// game core posts through [`CrosstermEventSource::sender`]
pub struct CrosstermEventSource {
    tx: Sender<WhackEvent>,
    rx: Receiver<WhackEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(ev) => {
                    if let Some(ev) = translate(ev) {
                        if input_tx.send(ev).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    log::error!("terminal input failed: {e}");
                    break;
                }
            }
        });

        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<WhackEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl WhackEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<WhackEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<WhackEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<WhackEvent>) -> Self {
        Self { rx }
    }
}

impl WhackEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<WhackEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: WhackEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: WhackEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> WhackEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                WhackEvent::Tick
            }
        }
    }
}
