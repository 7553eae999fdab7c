//! Companion power sequencing.
//!
//! The companion is either off or on.  Three kinds of alarm move it between
//! the two: a delayed power on (rewake), a shutdown notice that tells the
//! companion to shut itself down, and a hard power off that follows the
//! notice after a grace period.  Each is canceled independently, and a newer
//! schedule of the same kind replaces the older one.
//!
//! The dedicated power key drives the same machine.  A hold powers the
//! companion on when it is off.  A long hold asks a running companion to shut
//! down gracefully.

use smart_leds::RGB8;

use crate::alarm::{Alarm, Category};
use crate::board::Board;
use crate::dispatch::Core;
use crate::keys::{KeyState, KEY_POWER};
use crate::leds::{LedMode, LedState};
use crate::log::{debug, info};
use crate::regs::{REG_DORMANT, REG_SHUTDOWN_GRACE, REG_STARTUP_REASON};
use crate::{Duration, Instant};

/// The shutdown notice never comes sooner than this, so the companion always
/// gets to see it before the power goes.
pub const MIN_SHUTDOWN_NOTICE_MS: u64 = 10;

/// How long a reboot leaves the companion off.
pub const REBOOT_DELAY_MS: u64 = 500;

/// Shown while the companion boots, until its driver takes over the LED.
pub const BOOT_COLOR: RGB8 = RGB8::new(0, 128, 0);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Off,
    On,
}

/// Why the companion was last powered on, readable in `REG_STARTUP_REASON`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerOnReason {
    FwInit,
    Button,
    Rewake,
    /// The power key was used while a rewake was pending.
    RewakeCanceled,
}

impl PowerOnReason {
    pub fn to_wire(self) -> u8 {
        match self {
            PowerOnReason::FwInit => 1,
            PowerOnReason::Button => 2,
            PowerOnReason::Rewake => 3,
            PowerOnReason::RewakeCanceled => 4,
        }
    }
}

fn after(now: Instant, ms: u64) -> Instant {
    now + Duration::from_ticks(ms)
}

impl<B: Board> Core<B> {
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Power the companion on.  Does nothing if it is already on.
    pub fn power_on(&mut self, now: Instant, reason: PowerOnReason) {
        if self.power == PowerState::On {
            return;
        }

        info!("power on: {:?}", reason);
        self.board.set_power_rail(true);
        self.power = PowerState::On;
        self.set_led(now, LedState::new(LedMode::On, BOOT_COLOR));
        self.regs.set(REG_STARTUP_REASON, reason.to_wire());
    }

    /// Cut the companion's power.  Does nothing if it is already off.
    pub fn power_off(&mut self) {
        if self.power == PowerState::Off {
            return;
        }

        info!("power off");
        self.board.set_power_rail(false);
        self.power = PowerState::Off;
    }

    /// Power on after `ms`, replacing any pending power on.
    pub fn schedule_power_on(&mut self, now: Instant, ms: u64) {
        self.schedule_power_on_for(now, ms, PowerOnReason::Rewake);
    }

    fn schedule_power_on_for(&mut self, now: Instant, ms: u64, reason: PowerOnReason) {
        let id = self.alarms.schedule(Alarm::PowerOn(reason), after(now, ms));
        debug!("power on in {}ms ({:?})", ms, id);
    }

    /// Drop a pending power on, if there is one.
    pub fn cancel_power_on(&mut self) -> bool {
        self.alarms.cancel(Category::PowerOn)
    }

    /// Send the shutdown notice after `shutdown_ms`, and cut the power
    /// `poweroff_ms` after that.  With `dormant`, the controller sleeps once
    /// the power is off, until the power key wakes it.
    pub fn schedule_power_off(
        &mut self,
        now: Instant,
        shutdown_ms: u64,
        poweroff_ms: u64,
        dormant: bool,
    ) {
        let shutdown_ms = shutdown_ms.max(MIN_SHUTDOWN_NOTICE_MS);
        self.alarms.schedule(Alarm::ShutdownNotice, after(now, shutdown_ms));
        self.alarms.schedule(
            Alarm::PowerOff { dormant },
            after(now, shutdown_ms + poweroff_ms),
        );
        debug!(
            "shutdown notice in {}ms, power off {}ms later, dormant {}",
            shutdown_ms, poweroff_ms, dormant
        );
    }

    /// Cancel every pending power on, shutdown notice and power off.
    pub fn cancel_all_power_alarms(&mut self) {
        self.alarms.cancel(Category::ShutdownNotice);
        self.alarms.cancel(Category::PowerOff);
        self.alarms.cancel(Category::PowerOn);
    }

    /// Power the companion off now and back on shortly.
    pub fn reboot(&mut self, now: Instant, reason: PowerOnReason) {
        self.power_off();
        self.schedule_power_on_for(now, REBOOT_DELAY_MS, reason);
    }

    /// A graceful shutdown: the notice right away, then the power off once
    /// the grace period from `REG_SHUTDOWN_GRACE` is up.
    pub fn begin_shutdown(&mut self, now: Instant, dormant: bool) {
        let grace_ms = self.regs.get(REG_SHUTDOWN_GRACE) as u64 * 1000;
        self.schedule_power_off(now, MIN_SHUTDOWN_NOTICE_MS, grace_ms, dormant);
    }

    pub fn dormant_reentry(&self) -> bool {
        self.regs.get(REG_DORMANT) != 0
    }

    /// A hold state change of the power key.  Returns true when the
    /// sequencer acted on it.
    pub(crate) fn power_key_event(&mut self, now: Instant, state: KeyState) -> bool {
        match (state, self.power) {
            (KeyState::Hold, PowerState::Off) => {
                let reason = if self.alarms.is_pending(Category::PowerOn) {
                    PowerOnReason::RewakeCanceled
                } else {
                    PowerOnReason::Button
                };
                self.cancel_all_power_alarms();
                self.power_on(now, reason);
                true
            }
            (KeyState::LongHold, PowerState::On) => {
                info!("power key long hold, shutting down");
                self.begin_shutdown(now, false);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn power_on_alarm(&mut self, now: Instant, reason: PowerOnReason) {
        self.cancel_all_power_alarms();
        self.power_on(now, reason);
    }

    pub(crate) fn shutdown_notice_alarm(&mut self, now: Instant) {
        info!("shutdown notice");
        self.keyboard_inject_event(now, KEY_POWER, KeyState::LongHold);
    }

    pub(crate) fn power_off_alarm(&mut self, dormant: bool) {
        self.power_off();
        if dormant {
            self.dormant();
        }
    }

    fn dormant(&mut self) {
        info!("dormant until power key");
        self.regs.set(REG_DORMANT, 1);
        self.board.drive_led(LedState::OFF.color);
        let woke = self.board.dormant_until_power_key();
        // Restart any flash from its lit phase, timed from the wake.
        self.alarms.cancel(Category::LedFlash);
        self.apply_led(woke);
    }
}
