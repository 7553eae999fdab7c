//! Key event subscribers.
//!
//! Every event that goes through dispatch is handed to each subscriber, in the
//! order they subscribed.  Subscribers are small copyable handles rather than
//! references, so the list can be snapshotted at the start of a dispatch.  The
//! rules that fall out of this:
//!
//! - Subscribing a handle that is already present does nothing.
//! - A subscriber removed during a dispatch (including removing itself) isn't
//!   called for the rest of that dispatch, and the remaining subscribers still
//!   are.
//! - A subscriber added during a dispatch first hears the next event.

use arrayvec::ArrayVec;

/// Most subscribers there can be at once, not counting `FlashCancel`.
pub const MAX_SUBSCRIBERS: usize = 8;

/// `FlashCancel` has a slot of its own, so a full list never leaves a
/// flash-until-key indication stuck.
const SLOTS: usize = MAX_SUBSCRIBERS + 1;

/// A subscriber handle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Subscriber {
    /// Raises the key interrupt to the companion.
    Interrupt,
    /// Sends USB keyboard reports.
    Usb,
    /// Pops a flash-until-key LED indication on the next key.
    FlashCancel,
    /// Something on the board side, delivered through `Board::notify`.
    External(u8),
}

pub struct Subscribers {
    list: ArrayVec<Subscriber, SLOTS>,
}

impl Default for Subscribers {
    fn default() -> Self {
        Subscribers::new()
    }
}

impl Subscribers {
    pub fn new() -> Subscribers {
        Subscribers {
            list: ArrayVec::new(),
        }
    }

    /// Add to the end of the list.  Returns false if it was already
    /// subscribed, or if there is no room.  There is always room for
    /// `FlashCancel`.
    pub fn subscribe(&mut self, sub: Subscriber) -> bool {
        if self.contains(sub) {
            return false;
        }
        if sub != Subscriber::FlashCancel && self.ordinary() >= MAX_SUBSCRIBERS {
            return false;
        }
        self.list.try_push(sub).is_ok()
    }

    fn ordinary(&self) -> usize {
        self.list.iter().filter(|&&s| s != Subscriber::FlashCancel).count()
    }

    /// Remove a subscriber.  Returns false if it wasn't subscribed.
    pub fn unsubscribe(&mut self, sub: Subscriber) -> bool {
        match self.list.iter().position(|&s| s == sub) {
            Some(index) => {
                self.list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, sub: Subscriber) -> bool {
        self.list.contains(&sub)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// A copy of the current list, to iterate over while the real one may
    /// change underneath.
    pub fn snapshot(&self) -> ArrayVec<Subscriber, SLOTS> {
        self.list.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscriber> {
        self.list.iter()
    }
}
