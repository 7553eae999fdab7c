//! Tracked key table.
//!
//! Any key that goes down gets a slot holding its own [`HoldMachine`], so
//! every key, not just the modifiers, gets hold and long hold events.  The
//! table is a fixed size so memory use is fixed.  When all the slots are busy,
//! a new press is simply lost; it is never queued for later.

use crate::hold::{HoldMachine, HoldTiming};
use crate::keys::{KeyState, NO_KEY};
use crate::log::warn;
use crate::Instant;

/// How many keys can be down (or finishing their release) at once.
pub const MAX_TRACKED_KEYS: usize = 10;

/// What happened to a sample handed to the table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Observation {
    /// The key's machine moved and this event should be dispatched.
    Event(KeyState),
    /// The key is tracked, but nothing reportable happened.
    Quiet,
    /// The key isn't tracked and isn't pressed.
    Untracked,
    /// A new press arrived with every slot busy, and was dropped.
    TableFull,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    /// `NO_KEY` marks a free slot.
    key: u8,
    machine: HoldMachine,
}

impl Slot {
    const FREE: Slot = Slot {
        key: NO_KEY,
        machine: HoldMachine::new(),
    };
}

pub struct TrackedKeys {
    slots: [Slot; MAX_TRACKED_KEYS],
}

impl Default for TrackedKeys {
    fn default() -> Self {
        TrackedKeys::new()
    }
}

impl TrackedKeys {
    pub const fn new() -> TrackedKeys {
        TrackedKeys {
            slots: [Slot::FREE; MAX_TRACKED_KEYS],
        }
    }

    /// Number of keys with an active machine.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|s| s.key != NO_KEY).count()
    }

    pub fn is_tracked(&self, key: u8) -> bool {
        key != NO_KEY && self.slots.iter().any(|s| s.key == key)
    }

    /// Hand the latest sample for `key` to the table.
    pub fn observe(&mut self, key: u8, pressed: bool, now: Instant, timing: &HoldTiming) -> Observation {
        if key == NO_KEY {
            return Observation::Untracked;
        }

        let index = match self.slots.iter().position(|s| s.key == key) {
            Some(index) => index,
            None => {
                if !pressed {
                    return Observation::Untracked;
                }
                match self.slots.iter().position(|s| s.key == NO_KEY) {
                    Some(index) => {
                        self.slots[index] = Slot {
                            key,
                            machine: HoldMachine::new(),
                        };
                        index
                    }
                    None => {
                        warn!("tracked keys full, dropping {}", key);
                        return Observation::TableFull;
                    }
                }
            }
        };

        let slot = &mut self.slots[index];
        match slot.machine.step(pressed, now, timing) {
            Some(next) => match next.event() {
                Some(state) => Observation::Event(state),
                None => {
                    // Back to idle, the slot is free again.
                    slot.key = NO_KEY;
                    Observation::Quiet
                }
            },
            None => Observation::Quiet,
        }
    }

    /// Forget every tracked key without reporting anything.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.key = NO_KEY;
            slot.machine.reset();
        }
    }
}
