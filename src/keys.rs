//! Keys on the controller
//!
//! Scancodes are the Linux input event codes, which the companion's driver
//! passes straight through.  Everything the keyboard can produce fits in a
//! `u8`.  Zero is never a key: a zero in the keymap means there is nothing
//! wired at that matrix position.

/// No key at this position.  Never tracked, queued, or reported.
pub const NO_KEY: u8 = 0;

pub const KEY_ESC: u8 = 1;
pub const KEY_0: u8 = 11;
pub const KEY_BACKSPACE: u8 = 14;
pub const KEY_Q: u8 = 16;
pub const KEY_W: u8 = 17;
pub const KEY_E: u8 = 18;
pub const KEY_R: u8 = 19;
pub const KEY_T: u8 = 20;
pub const KEY_Y: u8 = 21;
pub const KEY_U: u8 = 22;
pub const KEY_I: u8 = 23;
pub const KEY_O: u8 = 24;
pub const KEY_P: u8 = 25;
pub const KEY_ENTER: u8 = 28;
pub const KEY_LEFTCTRL: u8 = 29;
pub const KEY_A: u8 = 30;
pub const KEY_S: u8 = 31;
pub const KEY_D: u8 = 32;
pub const KEY_F: u8 = 33;
pub const KEY_G: u8 = 34;
pub const KEY_H: u8 = 35;
pub const KEY_J: u8 = 36;
pub const KEY_K: u8 = 37;
pub const KEY_L: u8 = 38;
pub const KEY_LEFTSHIFT: u8 = 42;
pub const KEY_Z: u8 = 44;
pub const KEY_X: u8 = 45;
pub const KEY_C: u8 = 46;
pub const KEY_V: u8 = 47;
pub const KEY_B: u8 = 48;
pub const KEY_N: u8 = 49;
pub const KEY_M: u8 = 50;
pub const KEY_RIGHTSHIFT: u8 = 54;
pub const KEY_LEFTALT: u8 = 56;
pub const KEY_SPACE: u8 = 57;
pub const KEY_RIGHTALT: u8 = 100;
pub const KEY_MUTE: u8 = 113;

/// The dedicated power button.
pub const KEY_POWER: u8 = 116;

/// The touchpad's center click.
pub const KEY_COMPOSE: u8 = 127;

/// Sent as a press/release pulse when the power key reaches a long hold, so
/// the companion can start an orderly shutdown.
pub const KEY_STOP: u8 = 128;

/// The call button and the "berry" key.
pub const KEY_OPEN: u8 = 134;
pub const KEY_PROPS: u8 = 130;

pub const NUM_ROWS: usize = 7;
pub const NUM_COLS: usize = 6;

/// A physical layout: the scancode at each (row, col) of the matrix.
pub type Keymap<const ROWS: usize, const COLS: usize> = [[u8; COLS]; ROWS];

/// The production keymap.  The holdable modifiers (call, berry, alt, symbol
/// and both shifts) are unmapped here; their hold behavior is what the
/// companion's driver keys off.
pub static DEFAULT_KEYMAP: Keymap<NUM_ROWS, NUM_COLS> = [
    // Touchpad center key
    [KEY_COMPOSE, KEY_W, KEY_G, KEY_S, KEY_L, KEY_H],
    [NO_KEY, KEY_Q, KEY_R, KEY_E, KEY_O, KEY_U],
    // Call button
    [NO_KEY, KEY_0, KEY_F, NO_KEY, KEY_K, KEY_J],
    [NO_KEY, KEY_SPACE, KEY_C, KEY_Z, KEY_M, KEY_N],
    // Berry key, symbol key
    [NO_KEY, NO_KEY, KEY_T, KEY_D, KEY_I, KEY_Y],
    // Back key, alt key
    [KEY_ESC, NO_KEY, KEY_V, KEY_X, KEY_MUTE, KEY_B],
    [NO_KEY, KEY_A, NO_KEY, KEY_P, KEY_BACKSPACE, KEY_ENTER],
];

/// The state a key event reports.  The discriminants are what the register
/// protocol puts on the wire.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum KeyState {
    Pressed = 1,
    Hold = 2,
    Released = 3,
    LongHold = 4,
}

impl KeyState {
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    pub fn from_wire(value: u8) -> Option<KeyState> {
        match value {
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Hold),
            3 => Some(KeyState::Released),
            4 => Some(KeyState::LongHold),
            _ => None,
        }
    }
}

/// A single key event.  Events are small and passed around by value.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub key: u8,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn new(key: u8, state: KeyState) -> KeyEvent {
        KeyEvent { key, state }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Pressed
    }

    pub fn is_release(&self) -> bool {
        self.state == KeyState::Released
    }

    /// The two byte form read out of the FIFO register.
    pub fn to_bytes(&self) -> [u8; 2] {
        [self.state.to_wire(), self.key]
    }
}
