//! The event loop's input side: a key-press source plus a tick heartbeat.
//!
//! The app redraws once per loop iteration, so a resize needs nothing beyond
//! "wake the loop up"; resizes are therefore folded into ticks instead of
//! carrying their own variant.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

/// Where key presses come from. The terminal implements this; tests swap in
/// a scripted channel.
pub trait AppEventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Crossterm input pumped from a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || read_loop(tx));
        Self { rx }
    }
}

// Repeat kinds pass through so held backspace keeps deleting; release
// events would double every keystroke on Windows terminals.
fn read_loop(tx: Sender<AppEvent>) {
    loop {
        let event = match event::read() {
            Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => AppEvent::Tick,
            Ok(_) => continue,
            Err(_) => break,
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Scripted event source for headless tests.
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    /// The source plus its sending half, for tests that queue input inline.
    pub fn channel() -> (Sender<AppEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls the next event for the app loop, synthesizing `Tick` whenever input
/// stays quiet for one tick interval.
pub struct Runner<E: AppEventSource> {
    source: E,
    tick_rate: Duration,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(source: E, tick_rate: Duration) -> Self {
        Self { source, tick_rate }
    }

    /// `None` means the source is gone and the loop should end.
    pub fn step(&self) -> Option<AppEvent> {
        match self.source.recv_timeout(self.tick_rate) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => Some(AppEvent::Tick),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
