//! The event FIFO read by the companion's driver.
//!
//! Bounded, oldest first.  When full, a new event is either dropped, or, if
//! the caller forces it, admitted by evicting the oldest event.  Either way the
//! events that stay keep their order.

use arraydeque::ArrayDeque;

use crate::keys::KeyEvent;

/// Queued events.  The count has to fit the 5 bit field of the key status
/// register.
pub const FIFO_CAPACITY: usize = 31;

/// Outcome of offering an event to the FIFO.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Admission {
    Accepted,
    /// The FIFO was full, and the new event was discarded.
    Dropped,
    /// The FIFO was full, and the oldest event was discarded to make room.
    Evicted(KeyEvent),
    /// Not a key at all, so never offered to the FIFO.
    Ignored,
}

impl Admission {
    pub fn overflowed(&self) -> bool {
        matches!(self, Admission::Dropped | Admission::Evicted(_))
    }
}

pub struct EventFifo {
    events: ArrayDeque<KeyEvent, FIFO_CAPACITY>,
}

impl Default for EventFifo {
    fn default() -> Self {
        EventFifo::new()
    }
}

impl EventFifo {
    pub fn new() -> EventFifo {
        EventFifo {
            events: ArrayDeque::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.events.is_full()
    }

    /// Try to queue an event, leaving the FIFO untouched if it is full.
    pub fn enqueue(&mut self, event: KeyEvent) -> Admission {
        match self.events.push_back(event) {
            Ok(()) => Admission::Accepted,
            Err(_) => Admission::Dropped,
        }
    }

    /// Queue an event, evicting the oldest one if there's no room.
    pub fn enqueue_force(&mut self, event: KeyEvent) -> Admission {
        let evicted = if self.events.is_full() {
            self.events.pop_front()
        } else {
            None
        };
        // There is room now, so this can't fail.
        let _ = self.events.push_back(event);
        match evicted {
            Some(old) => Admission::Evicted(old),
            None => Admission::Accepted,
        }
    }

    pub fn dequeue(&mut self) -> Option<KeyEvent> {
        self.events.pop_front()
    }

    pub fn peek(&self) -> Option<&KeyEvent> {
        self.events.front()
    }

    /// Discard everything queued.
    pub fn flush(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyEvent> {
        self.events.iter()
    }
}
