//! Hold timing for a single key.
//!
//! Each tracked key runs this machine once per scan tick.  It distinguishes a
//! tap from a hold from a long hold purely by how long the key has been down:
//!
//! ```text
//! Idle -> Pressed -> [Hold -> [LongHold]] -> Released -> Idle
//! ```
//!
//! Hold detection is polled.  A hold is noticed on the first scan tick after
//! the threshold passes, so the resolution of both thresholds is the scan
//! interval, and raising the scan interval raises the jitter with it.

use crate::keys::KeyState;
use crate::{elapsed_ms, Instant};

/// How long the key must stay down, measured from the press, to become a
/// long hold.
pub const LONG_HOLD_MS: u64 = 5_000;

/// The thresholds a machine is evaluated against.  `hold_ms` comes from the
/// hold register and may change at runtime.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HoldTiming {
    pub hold_ms: u64,
    pub long_hold_ms: u64,
}

impl HoldTiming {
    pub fn new(hold_ms: u64) -> HoldTiming {
        HoldTiming {
            hold_ms,
            long_hold_ms: LONG_HOLD_MS,
        }
    }
}

/// Where a key is in its lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldState {
    Idle,
    Pressed,
    Hold,
    LongHold,
    Released,
}

impl HoldState {
    /// The event entering this state reports, if any.  Returning to idle is
    /// silent.
    pub fn event(self) -> Option<KeyState> {
        match self {
            HoldState::Idle => None,
            HoldState::Pressed => Some(KeyState::Pressed),
            HoldState::Hold => Some(KeyState::Hold),
            HoldState::LongHold => Some(KeyState::LongHold),
            HoldState::Released => Some(KeyState::Released),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HoldMachine {
    state: HoldState,
    /// When the key went down.  Only meaningful outside of `Idle`.
    hold_start: Instant,
}

impl Default for HoldMachine {
    fn default() -> Self {
        HoldMachine::new()
    }
}

impl HoldMachine {
    pub const fn new() -> HoldMachine {
        HoldMachine {
            state: HoldState::Idle,
            hold_start: Instant::from_ticks(0),
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == HoldState::Idle
    }

    /// Advance the machine with the latest sample.  Returns the new state when
    /// a transition happened, `None` when nothing changed.
    pub fn step(&mut self, pressed: bool, now: Instant, timing: &HoldTiming) -> Option<HoldState> {
        let held = elapsed_ms(self.hold_start, now);

        let next = match self.state {
            HoldState::Idle => {
                if !pressed {
                    return None;
                }
                self.hold_start = now;
                HoldState::Pressed
            }
            // The hold check wins over the release: a key that was down long
            // enough is a hold even if this sample already sees it up.
            HoldState::Pressed if held >= timing.hold_ms => HoldState::Hold,
            HoldState::Pressed if !pressed => HoldState::Released,
            HoldState::Hold if !pressed => HoldState::Released,
            HoldState::Hold if held >= timing.long_hold_ms => HoldState::LongHold,
            HoldState::LongHold if !pressed => HoldState::Released,
            HoldState::Released => HoldState::Idle,
            _ => return None,
        };

        self.state = next;
        Some(next)
    }

    /// Drop back to idle without reporting anything.
    pub fn reset(&mut self) {
        self.state = HoldState::Idle;
    }
}
