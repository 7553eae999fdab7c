//! Cancelable alarms.
//!
//! There is at most one pending alarm per category.  Scheduling an alarm
//! replaces whatever was pending in its category, and canceling an empty
//! category does nothing.
//!
//! Each scheduled alarm gets a fresh [`AlarmId`].  A hardware timer can't
//! always be stopped once its interrupt is on the way, so firing goes through
//! [`Alarms::take`], which only hands back an alarm whose id is still the live
//! one for its category.  A late fire for a canceled or replaced alarm gets
//! nothing back and does nothing.

use crate::power::PowerOnReason;
use crate::Instant;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    PowerOn,
    ShutdownNotice,
    PowerOff,
    LedFlash,
}

const CATEGORIES: usize = 4;

impl Category {
    fn index(self) -> usize {
        match self {
            Category::PowerOn => 0,
            Category::ShutdownNotice => 1,
            Category::PowerOff => 2,
            Category::LedFlash => 3,
        }
    }
}

/// What to do when an alarm fires.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm {
    /// Power the companion on.
    PowerOn(PowerOnReason),
    /// Tell the companion it is about to lose power.
    ShutdownNotice,
    /// Cut the companion's power, optionally going dormant afterwards.
    PowerOff { dormant: bool },
    /// Toggle the flashing LED.
    LedFlash,
}

impl Alarm {
    pub fn category(&self) -> Category {
        match self {
            Alarm::PowerOn(_) => Category::PowerOn,
            Alarm::ShutdownNotice => Category::ShutdownNotice,
            Alarm::PowerOff { .. } => Category::PowerOff,
            Alarm::LedFlash => Category::LedFlash,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmId(u32);

#[derive(Clone, Copy, Debug)]
struct Pending {
    id: AlarmId,
    deadline: Instant,
    alarm: Alarm,
}

pub struct Alarms {
    pending: [Option<Pending>; CATEGORIES],
    next_id: u32,
}

impl Default for Alarms {
    fn default() -> Self {
        Alarms::new()
    }
}

impl Alarms {
    pub fn new() -> Alarms {
        Alarms {
            pending: [None; CATEGORIES],
            next_id: 1,
        }
    }

    /// Arm `alarm` for `deadline`, replacing anything pending in its category.
    pub fn schedule(&mut self, alarm: Alarm, deadline: Instant) -> AlarmId {
        let id = AlarmId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending[alarm.category().index()] = Some(Pending {
            id,
            deadline,
            alarm,
        });
        id
    }

    /// Cancel the pending alarm in a category.  Returns true if there was one.
    pub fn cancel(&mut self, category: Category) -> bool {
        self.pending[category.index()].take().is_some()
    }

    pub fn is_pending(&self, category: Category) -> bool {
        self.pending[category.index()].is_some()
    }

    /// The live alarm id for a category.
    pub fn id_of(&self, category: Category) -> Option<AlarmId> {
        self.pending[category.index()].map(|p| p.id)
    }

    pub fn deadline_of(&self, category: Category) -> Option<Instant> {
        self.pending[category.index()].map(|p| p.deadline)
    }

    /// The earliest deadline of anything pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().flatten().map(|p| p.deadline).min()
    }

    /// The id of the earliest alarm that is due at `now`.
    pub fn next_due(&self, now: Instant) -> Option<AlarmId> {
        self.pending
            .iter()
            .flatten()
            .filter(|p| p.deadline <= now)
            .min_by_key(|p| p.deadline)
            .map(|p| p.id)
    }

    /// Claim an alarm for firing.  Only the live id of a category gets its
    /// alarm back; a stale id gets `None`.
    pub fn take(&mut self, id: AlarmId) -> Option<Alarm> {
        let slot = self.pending.iter_mut().find(|slot| matches!(slot, Some(p) if p.id == id))?;
        slot.take().map(|p| p.alarm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_ticks(ms)
    }

    #[test]
    fn last_scheduler_wins() {
        let mut alarms = Alarms::new();
        let first = alarms.schedule(Alarm::PowerOn(PowerOnReason::Rewake), at(100));
        let second = alarms.schedule(Alarm::PowerOn(PowerOnReason::Button), at(200));
        assert_ne!(first, second);
        assert_eq!(alarms.take(first), None);
        assert_eq!(alarms.next_due(at(150)), None);
        assert_eq!(alarms.next_due(at(200)), Some(second));
        assert_eq!(alarms.take(second), Some(Alarm::PowerOn(PowerOnReason::Button)));
        assert!(!alarms.is_pending(Category::PowerOn));
    }

    #[test]
    fn cancel() {
        let mut alarms = Alarms::new();
        assert!(!alarms.cancel(Category::PowerOff));
        let id = alarms.schedule(Alarm::PowerOff { dormant: true }, at(10));
        assert!(alarms.cancel(Category::PowerOff));
        assert!(!alarms.cancel(Category::PowerOff));
        // A fire that was already on the way.
        assert_eq!(alarms.take(id), None);
    }

    #[test]
    fn categories_are_independent() {
        let mut alarms = Alarms::new();
        let notice = alarms.schedule(Alarm::ShutdownNotice, at(100));
        let off = alarms.schedule(Alarm::PowerOff { dormant: false }, at(150));
        alarms.schedule(Alarm::LedFlash, at(50));
        assert_eq!(alarms.next_deadline(), Some(at(50)));
        alarms.cancel(Category::LedFlash);
        assert_eq!(alarms.next_due(at(1000)), Some(notice));
        alarms.take(notice);
        assert_eq!(alarms.next_due(at(1000)), Some(off));
    }
}
