//! Sharing the core with the protocol handler.
//!
//! The scan tick and the alarms all run in one context, but the companion's
//! register reads come in from the bus interrupt.  Each of those goes through
//! a critical section, so a FIFO read pops exactly one event and never lands
//! in the middle of a dispatch.

use core::cell::RefCell;

use critical_section::{with, Mutex};

use crate::board::Board;
use crate::dispatch::Core;
use crate::keys::KeyEvent;
use crate::Instant;

pub struct SharedCore<B: Board> {
    core: Mutex<RefCell<Core<B>>>,
}

impl<B: Board> SharedCore<B> {
    pub fn new(core: Core<B>) -> SharedCore<B> {
        SharedCore {
            core: Mutex::new(RefCell::new(core)),
        }
    }

    /// Run `f` with the core, inside a critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut Core<B>) -> R) -> R {
        with(|cs| f(&mut self.core.borrow_ref_mut(cs)))
    }

    /// Pop the oldest queued event.
    pub fn dequeue(&self) -> Option<KeyEvent> {
        self.with(|core| core.dequeue())
    }

    pub fn process_packet(&self, now: Instant, reg: u8, data: u8, out: &mut [u8; 2]) -> usize {
        self.with(|core| core.process_packet(now, reg, data, out))
    }

    pub fn into_inner(self) -> Core<B> {
        self.core.into_inner().into_inner()
    }
}
