// USB keyboard reports.

use crate::board::Board;
use crate::keys::{KeyEvent, KeyState};
use crate::regs::{Cfg2, Registers};

/// Turn a key event into a boot keyboard report.  A press reports the key
/// down, and a release or long hold reports everything up.  Hold has nothing
/// to report, the key is already down.
pub(crate) fn report_key<B: Board>(board: &mut B, regs: &Registers, event: KeyEvent) {
    if !regs.cfg2().contains(Cfg2::USB_KEYB_ON) {
        return;
    }

    match event.state {
        KeyState::Pressed => board.send_keyboard_report(0, &[event.key]),
        KeyState::Released | KeyState::LongHold => board.send_keyboard_report(0, &[]),
        KeyState::Hold => (),
    }
}
