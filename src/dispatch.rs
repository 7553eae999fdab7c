//! Keyboard event dispatch
//!
//! [`Core`] owns all of the controller's state: the tracked keys, the event
//! FIFO, the subscribers, the alarms, the LED stack, the power state and the
//! register file.  It has two kinds of entry point, both called from the same
//! cooperative context and both running to completion:
//!
//! - The scan tick: [`Core::scan_matrix`] and [`Core::observe`] feed samples
//!   through the hold machines.
//! - Alarm polling: [`Core::poll`] (or [`Core::fire_alarm`] from a hardware
//!   timer) runs whatever alarms are due.
//!
//! Every key event, from a key or synthesized, goes through
//! [`Core::keyboard_inject_event`].  That queues it for the companion and then
//! hands it to each subscriber in turn.  The FIFO filling up never keeps the
//! subscribers from seeing an event.

use crate::alarm::{Alarm, AlarmId, Alarms};
use crate::board::Board;
use crate::fifo::{Admission, EventFifo};
use crate::hold::{HoldMachine, HoldState, HoldTiming};
use crate::keys::{KeyEvent, KeyState, Keymap, KEY_POWER, KEY_STOP, NO_KEY};
use crate::leds::{LedStack, LedState};
use crate::log::{debug, warn};
use crate::power::PowerState;
use crate::regs::{Cfg, Int, Registers};
use crate::subscribers::{Subscriber, Subscribers};
use crate::tracker::{Observation, TrackedKeys};
use crate::usb;
use crate::Instant;

pub struct Core<B: Board> {
    pub(crate) board: B,
    pub(crate) regs: Registers,
    pub(crate) keys: TrackedKeys,
    /// The dedicated power button has its own machine, outside the table.
    pub(crate) power_key: HoldMachine,
    /// What the power key reports on the generic channel.  `NO_KEY` keeps it
    /// off the channel entirely.
    pub(crate) power_key_code: u8,
    pub(crate) fifo: EventFifo,
    pub(crate) subscribers: Subscribers,
    pub(crate) alarms: Alarms,
    pub(crate) leds: LedStack,
    /// Whether the flash is in the bright part of its cycle.
    pub(crate) flash_lit: bool,
    pub(crate) power: PowerState,
}

impl<B: Board> Core<B> {
    /// Bring up the core with everything in its reset state: no keys tracked,
    /// nothing queued, companion off, LED off.
    pub fn new(mut board: B) -> Core<B> {
        board.set_power_rail(false);
        board.drive_led(LedState::OFF.color);

        let mut subscribers = Subscribers::new();
        subscribers.subscribe(Subscriber::Interrupt);
        subscribers.subscribe(Subscriber::Usb);

        Core {
            board,
            regs: Registers::new(),
            keys: TrackedKeys::new(),
            power_key: HoldMachine::new(),
            power_key_code: NO_KEY,
            fifo: EventFifo::new(),
            subscribers,
            alarms: Alarms::new(),
            leds: LedStack::new(),
            flash_lit: false,
            power: PowerState::Off,
        }
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn fifo(&self) -> &EventFifo {
        &self.fifo
    }

    pub fn tracked_keys(&self) -> &TrackedKeys {
        &self.keys
    }

    pub fn alarms(&self) -> &Alarms {
        &self.alarms
    }

    pub fn led(&self) -> LedState {
        self.leds.top()
    }

    pub fn led_stack(&self) -> &LedStack {
        &self.leds
    }

    pub fn subscribers(&self) -> &Subscribers {
        &self.subscribers
    }

    /// Have the power key report `code` on the generic channel as well.
    /// `NO_KEY` (the default) keeps it silent there.
    pub fn set_power_key_code(&mut self, code: u8) {
        self.power_key_code = code;
    }

    /// How often the scan tick should run.
    pub fn scan_interval_ms(&self) -> u64 {
        self.regs.scan_interval_ms()
    }

    pub fn hold_timing(&self) -> HoldTiming {
        HoldTiming::new(self.regs.hold_ms())
    }

    pub fn subscribe(&mut self, sub: Subscriber) -> bool {
        self.subscribers.subscribe(sub)
    }

    pub fn unsubscribe(&mut self, sub: Subscriber) -> bool {
        self.subscribers.unsubscribe(sub)
    }

    /// Scan a whole matrix.  `sample(row, col)` reads one cell.  Cells are
    /// visited column by column, and cells with no key are skipped.
    pub fn scan_matrix<const ROWS: usize, const COLS: usize, F>(
        &mut self,
        now: Instant,
        keymap: &Keymap<ROWS, COLS>,
        mut sample: F,
    ) where
        F: FnMut(usize, usize) -> bool,
    {
        for col in 0..COLS {
            for row in 0..ROWS {
                let key = keymap[row][col];
                if key == NO_KEY {
                    continue;
                }
                let pressed = sample(row, col);
                self.observe(now, key, pressed);
            }
        }
    }

    /// Handle one sample for one key.
    pub fn observe(&mut self, now: Instant, key: u8, pressed: bool) {
        if key == KEY_POWER {
            self.observe_power_key(now, pressed);
            return;
        }

        let timing = self.hold_timing();
        if let Observation::Event(state) = self.keys.observe(key, pressed, now, &timing) {
            self.keyboard_inject_event(now, key, state);
        }
    }

    /// Handle one sample of the dedicated power key.
    pub fn observe_power_key(&mut self, now: Instant, pressed: bool) {
        let timing = self.hold_timing();
        let state = match self.power_key.step(pressed, now, &timing).and_then(HoldState::event) {
            Some(state) => state,
            None => return,
        };

        if state == KeyState::LongHold {
            // A discrete keypress, once per long hold.
            self.keyboard_inject_event(now, KEY_STOP, KeyState::Pressed);
            self.keyboard_inject_event(now, KEY_STOP, KeyState::Released);
        }

        // What the sequencer acts on isn't also reported: a long hold comes
        // back as the shutdown notice.
        let consumed = self.power_key_event(now, state);
        if !consumed && self.power_key_code != NO_KEY {
            self.keyboard_inject_event(now, self.power_key_code, state);
        }
    }

    /// Queue an event for the companion and tell every subscriber about it.
    pub fn keyboard_inject_event(&mut self, now: Instant, key: u8, state: KeyState) -> Admission {
        if key == NO_KEY {
            return Admission::Ignored;
        }
        let event = KeyEvent::new(key, state);

        let mut admission = self.fifo.enqueue(event);
        if admission.overflowed() {
            warn!("fifo overflow, key {}", key);
            let cfg = self.regs.cfg();
            if cfg.contains(Cfg::OVERFLOW_INT) {
                self.regs.set_int(Int::OVERFLOW);
                self.board.raise_interrupt();
            }
            if cfg.contains(Cfg::OVERFLOW_ON) {
                admission = self.fifo.enqueue_force(event);
            }
        }

        self.dispatch(now, event);
        admission
    }

    /// Hand an event to every subscriber, in order.  Subscribers removed
    /// partway through aren't called.
    fn dispatch(&mut self, now: Instant, event: KeyEvent) {
        for sub in self.subscribers.snapshot() {
            if !self.subscribers.contains(sub) {
                continue;
            }
            self.notify(now, sub, event);
        }
    }

    fn notify(&mut self, now: Instant, sub: Subscriber, event: KeyEvent) {
        match sub {
            Subscriber::Interrupt => {
                if self.regs.cfg().contains(Cfg::KEY_INT) {
                    self.regs.set_int(Int::KEY);
                    self.board.raise_interrupt();
                }
            }
            Subscriber::Usb => usb::report_key(&mut self.board, &self.regs, event),
            Subscriber::FlashCancel => self.flash_cancel(now, event),
            Subscriber::External(id) => self.board.notify(id, event),
        }
    }

    /// Pop the oldest queued event.
    pub fn dequeue(&mut self) -> Option<KeyEvent> {
        self.fifo.dequeue()
    }

    /// Run every alarm that is due at `now`.
    pub fn poll(&mut self, now: Instant) {
        while let Some(id) = self.alarms.next_due(now) {
            self.fire_alarm(now, id);
        }
    }

    /// When `poll` next has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.alarms.next_deadline()
    }

    /// Fire a single alarm.  Returns false, doing nothing, if the alarm was
    /// canceled or replaced since it was scheduled.
    pub fn fire_alarm(&mut self, now: Instant, id: AlarmId) -> bool {
        let alarm = match self.alarms.take(id) {
            Some(alarm) => alarm,
            None => {
                debug!("stale alarm {:?}", id);
                return false;
            }
        };

        match alarm {
            Alarm::PowerOn(reason) => self.power_on_alarm(now, reason),
            Alarm::ShutdownNotice => self.shutdown_notice_alarm(now),
            Alarm::PowerOff { dormant } => self.power_off_alarm(dormant),
            Alarm::LedFlash => self.led_flash_alarm(now),
        }
        true
    }
}
