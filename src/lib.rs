//! Companion keyboard controller core
//!
//! This is the hardware independent part of the firmware for a keyboard
//! controller that lives in a handheld next to a single-board computer (the
//! "companion").  The controller scans the key matrix, turns the samples into
//! timed key events (press, hold, long hold, release), queues those events for
//! the companion's driver, and supervises the companion's power rail and
//! status LED.
//!
//! Everything is owned by a single [`Core`], which is driven from the scan
//! tick and from alarm polling.  The hardware is reached only through the
//! [`Board`] trait.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub use smart_leds::RGB8;

pub use board::Board;
pub use dispatch::Core;
pub use keys::{KeyEvent, KeyState};
pub use leds::{LedMode, LedState};
pub use power::{PowerOnReason, PowerState};
pub use subscribers::Subscriber;

pub mod alarm;
pub mod board;
pub mod dispatch;
pub mod fifo;
pub mod hold;
pub mod keys;
pub mod leds;
pub mod power;
pub mod protocol;
pub mod regs;
pub mod shared;
pub mod subscribers;
pub mod tracker;
pub mod usb;

#[cfg(test)]
mod testlog;

/// Milliseconds since boot.  All entry points are handed the current time;
/// nothing in here reads a clock.
pub type Instant = fugit::TimerInstantU64<1_000>;

/// A span of milliseconds.
pub type Duration = fugit::MillisDurationU64;

/// Milliseconds between two instants, saturating at zero if `later` is
/// actually earlier.
pub(crate) fn elapsed_ms(earlier: Instant, later: Instant) -> u64 {
    later
        .checked_duration_since(earlier)
        .map(|d| d.ticks())
        .unwrap_or(0)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        mod log {
            pub use defmt::{debug, info, warn};
        }
    } else if #[cfg(feature = "log")] {
        mod log {
            pub use log::{debug, info, warn};
        }
    } else {
        mod log {
            // Logging disabled, swallow everything.
            macro_rules! debug { ($($arg:tt)*) => {{}}; }
            macro_rules! info { ($($arg:tt)*) => {{}}; }
            macro_rules! warn { ($($arg:tt)*) => {{}}; }
            pub(crate) use {debug, info, warn};
        }
    }
}
