//! A board that records everything the core asks of it.

#![allow(dead_code)]

use std::sync::Once;

use companion_kbd::{Board, Core, Instant, KeyEvent, RGB8};
use log::{LevelFilter, Log, Metadata, Record};

/// Each hardware call made by the core.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    Rail(bool),
    Led(RGB8),
    Interrupt,
    Report(Vec<u8>),
    Notify(u8, KeyEvent),
    Dormant,
}

pub struct MockBoard {
    pub calls: Vec<Call>,
    /// The time a dormant sleep wakes up at.
    pub wake_at: u64,
}

impl MockBoard {
    pub fn new() -> MockBoard {
        MockBoard {
            calls: Vec::new(),
            wake_at: 0,
        }
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn interrupts(&self) -> usize {
        self.count(&Call::Interrupt)
    }

    pub fn rails(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Rail(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn reports(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Report(keys) => Some(keys.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn notified(&self) -> Vec<(u8, KeyEvent)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Notify(id, ev) => Some((*id, *ev)),
                _ => None,
            })
            .collect()
    }

    pub fn last_led(&self) -> Option<RGB8> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Led(color) => Some(*color),
            _ => None,
        })
    }
}

impl Board for MockBoard {
    fn set_power_rail(&mut self, on: bool) {
        self.calls.push(Call::Rail(on));
    }

    fn drive_led(&mut self, color: RGB8) {
        self.calls.push(Call::Led(color));
    }

    fn dormant_until_power_key(&mut self) -> Instant {
        self.calls.push(Call::Dormant);
        at(self.wake_at)
    }

    fn raise_interrupt(&mut self) {
        self.calls.push(Call::Interrupt);
    }

    fn send_keyboard_report(&mut self, _modifiers: u8, keys: &[u8]) {
        self.calls.push(Call::Report(keys.to_vec()));
    }

    fn notify(&mut self, id: u8, event: KeyEvent) {
        self.calls.push(Call::Notify(id, event));
    }
}

pub fn at(ms: u64) -> Instant {
    Instant::from_ticks(ms)
}

/// A fresh core with the reset-time hardware calls forgotten.
pub fn core() -> Core<MockBoard> {
    init_log();
    let mut core = Core::new(MockBoard::new());
    core.board_mut().clear();
    core
}

/// Sample one key every `step` ms from `from` until (not including) `to`.
pub fn hold_key(core: &mut Core<MockBoard>, key: u8, pressed: bool, from: u64, to: u64, step: u64) {
    let mut t = from;
    while t < to {
        core.observe(at(t), key, pressed);
        t += step;
    }
}

/// Every event left in the FIFO, oldest first.
pub fn drain(core: &mut Core<MockBoard>) -> Vec<KeyEvent> {
    let mut events = Vec::new();
    while let Some(ev) = core.dequeue() {
        events.push(ev);
    }
    events
}

struct StdoutLog;

impl Log for StdoutLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        println!("{}:{}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StdoutLog = StdoutLog;
static INIT: Once = Once::new();

pub fn init_log() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Debug);
        }
    });
}
