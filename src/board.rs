//! The hardware seam.
//!
//! The core never touches pins.  Everything it needs from the board goes
//! through this trait, which the firmware implements on top of its HAL and the
//! tests implement with a recorder.

use smart_leds::RGB8;

use crate::keys::KeyEvent;
use crate::Instant;

pub trait Board {
    /// Drive the companion's power rail.
    fn set_power_rail(&mut self, on: bool);

    /// Drive the status LED.  Black is fully dark.
    fn drive_led(&mut self, color: RGB8);

    /// Enter dormant sleep, returning once the power key wakes the controller.
    /// Returns the time after waking.
    ///
    /// The board saves whatever clock and PLL state it needs before stopping
    /// the clocks, and restores it before returning.
    fn dormant_until_power_key(&mut self) -> Instant;

    /// Pulse the interrupt line to the companion.
    fn raise_interrupt(&mut self) {}

    /// Send a USB boot keyboard report with up to six keys down.
    fn send_keyboard_report(&mut self, modifiers: u8, keys: &[u8]) {
        let _ = (modifiers, keys);
    }

    /// Delivery for `Subscriber::External` handles.
    fn notify(&mut self, id: u8, event: KeyEvent) {
        let _ = (id, event);
    }
}
