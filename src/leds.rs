//! Status LED control.
//!
//! The LED state is a small stack.  The bottom entry is the base state, the
//! one set by whoever owns the LED at the moment (the power sequencer, or the
//! companion's driver through the LED registers).  A flash-until-key
//! indication is pushed on top of it, and comes back off the next time a key
//! (other than power) is pressed, revealing the base again.  The top of the
//! stack is always what the LED shows.

use arrayvec::ArrayVec;
use smart_leds::RGB8;

use crate::alarm::{Alarm, Category};
use crate::board::Board;
use crate::dispatch::Core;
use crate::keys::{KeyEvent, KEY_POWER};
use crate::log::debug;
use crate::subscribers::Subscriber;
use crate::{Duration, Instant};

/// How many states can be stacked, including the base.
pub const LED_STACK_DEPTH: usize = 4;

/// A flash cycle: lit for `LED_FLASH_ON_MS`, then dark (or showing the base)
/// for the rest of `LED_FLASH_CYCLE_MS`.
pub const LED_FLASH_ON_MS: u64 = 200;
pub const LED_FLASH_CYCLE_MS: u64 = 3000;

pub const OFF: RGB8 = RGB8::new(0, 0, 0);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    Off,
    On,
    /// Flash until told otherwise.
    FlashRepeating,
    /// Flash over the base state until the next key.
    FlashUntilKey,
}

impl LedMode {
    /// The value used in the LED register.
    pub fn to_wire(self) -> u8 {
        match self {
            LedMode::Off => 0,
            LedMode::On => 1,
            LedMode::FlashRepeating => 2,
            LedMode::FlashUntilKey => 3,
        }
    }

    pub fn from_wire(value: u8) -> Option<LedMode> {
        match value {
            0 => Some(LedMode::Off),
            1 => Some(LedMode::On),
            2 => Some(LedMode::FlashRepeating),
            3 => Some(LedMode::FlashUntilKey),
            _ => None,
        }
    }

    pub fn is_flashing(self) -> bool {
        matches!(self, LedMode::FlashRepeating | LedMode::FlashUntilKey)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LedState {
    pub mode: LedMode,
    pub color: RGB8,
}

impl LedState {
    pub const OFF: LedState = LedState {
        mode: LedMode::Off,
        color: OFF,
    };

    pub const fn new(mode: LedMode, color: RGB8) -> LedState {
        LedState { mode, color }
    }
}

pub struct LedStack {
    stack: ArrayVec<LedState, LED_STACK_DEPTH>,
}

impl Default for LedStack {
    fn default() -> Self {
        LedStack::new()
    }
}

impl LedStack {
    pub fn new() -> LedStack {
        let mut stack = ArrayVec::new();
        stack.push(LedState::OFF);
        LedStack { stack }
    }

    /// The state being shown.
    pub fn top(&self) -> LedState {
        self.stack.last().copied().unwrap_or(LedState::OFF)
    }

    pub fn base(&self) -> LedState {
        self.stack.first().copied().unwrap_or(LedState::OFF)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Set a new state.  Returns true when a flash-until-key was pushed, in
    /// which case the caller needs to listen for the next key.
    pub fn set(&mut self, state: LedState) -> bool {
        if state.mode == LedMode::FlashUntilKey {
            if self.stack.is_full() {
                // Replace the newest flash rather than lose the base.
                let depth = self.stack.len();
                self.stack[depth - 1] = state;
            } else {
                self.stack.push(state);
            }
            debug!("led: push flash, depth {}", self.stack.len());
            return true;
        }

        // Everything else replaces the base.  A flash on top stays on top, so
        // turning the base off while flashing leaves the flash showing over a
        // dark base.
        self.stack[0] = state;
        false
    }

    /// Pop the top state, never the base.  Returns true if something was
    /// popped.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            debug!("led: pop, depth {}", self.stack.len());
            true
        } else {
            false
        }
    }

    /// Pop every flash-until-key indication.  Returns true if any were popped.
    pub fn pop_flashes(&mut self) -> bool {
        let mut popped = false;
        while self.stack.len() > 1 && self.top().mode == LedMode::FlashUntilKey {
            self.pop();
            popped = true;
        }
        popped
    }

    /// The color for one phase of a flash cycle.  `lit` is the short bright
    /// part of the cycle.
    pub fn flash_color(&self, lit: bool) -> RGB8 {
        let top = self.top();
        match top.mode {
            LedMode::Off => OFF,
            LedMode::On => top.color,
            _ if lit => top.color,
            // Between flashes, a flash-until-key shows the base if it is on.
            LedMode::FlashUntilKey if self.base().mode == LedMode::On => self.base().color,
            _ => OFF,
        }
    }
}

impl<B: Board> Core<B> {
    /// Set the LED.  A flash-until-key goes over the current state and comes
    /// off again at the next key that isn't power.
    pub fn set_led(&mut self, now: Instant, state: LedState) {
        if self.leds.set(state) {
            self.subscribers.subscribe(Subscriber::FlashCancel);
        }
        self.apply_led(now);
    }

    /// Drive the LED from the top of the stack.
    pub fn apply_led(&mut self, now: Instant) {
        let top = self.leds.top();
        match top.mode {
            LedMode::Off | LedMode::On => {
                self.alarms.cancel(Category::LedFlash);
                let color = if top.mode == LedMode::On { top.color } else { OFF };
                self.board.drive_led(color);
            }
            LedMode::FlashRepeating | LedMode::FlashUntilKey => {
                // An already running flash picks the new colors up at its
                // next toggle.
                if !self.alarms.is_pending(Category::LedFlash) {
                    self.flash_lit = true;
                    self.board.drive_led(self.leds.flash_color(true));
                    self.alarms
                        .schedule(Alarm::LedFlash, now + Duration::from_ticks(LED_FLASH_ON_MS));
                }
            }
        }
    }

    pub(crate) fn led_flash_alarm(&mut self, now: Instant) {
        if !self.leds.top().mode.is_flashing() {
            self.apply_led(now);
            return;
        }

        self.flash_lit = !self.flash_lit;
        self.board.drive_led(self.leds.flash_color(self.flash_lit));
        let next = if self.flash_lit {
            LED_FLASH_ON_MS
        } else {
            LED_FLASH_CYCLE_MS - LED_FLASH_ON_MS
        };
        self.alarms.schedule(Alarm::LedFlash, now + Duration::from_ticks(next));
    }

    /// The `FlashCancel` subscriber.
    pub(crate) fn flash_cancel(&mut self, now: Instant, event: KeyEvent) {
        // The shutdown notice comes through as the power key.
        if event.key == KEY_POWER {
            return;
        }

        self.leds.pop_flashes();
        self.subscribers.unsubscribe(Subscriber::FlashCancel);
        self.apply_led(now);
    }
}
