//! The register file shared with the companion.
//!
//! Runtime configuration lives here, exactly where the companion's driver
//! reads and writes it.  The core consults these registers as it runs, so a
//! write takes effect on the next scan tick.

use bitflags::bitflags;

/// Set in the register byte of a packet when it is a write.
pub const PACKET_WRITE_MASK: u8 = 0x80;

/// Firmware version reported in `REG_VER`: major in the high nibble.
pub const VERSION: u8 = 0x10;

pub const REG_VER: u8 = 0x01;
pub const REG_CFG: u8 = 0x02;
pub const REG_INT: u8 = 0x03;
pub const REG_KEY: u8 = 0x04;
pub const REG_FRQ: u8 = 0x07;
pub const REG_FIF: u8 = 0x09;
pub const REG_HLD: u8 = 0x11;
pub const REG_CF2: u8 = 0x14;
pub const REG_LED: u8 = 0x20;
pub const REG_LED_R: u8 = 0x21;
pub const REG_LED_G: u8 = 0x22;
pub const REG_LED_B: u8 = 0x23;
pub const REG_REWAKE: u8 = 0x24;
pub const REG_SHUTDOWN_GRACE: u8 = 0x25;
pub const REG_POWER_OFF: u8 = 0x26;
pub const REG_STARTUP_REASON: u8 = 0x27;
pub const REG_DRIVER_STATE: u8 = 0x28;
pub const REG_DORMANT: u8 = 0x29;

/// One past the highest register.
pub const REG_COUNT: usize = 0x2a;

bitflags! {
    /// `REG_CFG`.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Cfg: u8 {
        /// Admit an event into a full FIFO by evicting the oldest.
        const OVERFLOW_ON = 0b0000_0001;
        /// Raise an interrupt when the FIFO overflows.
        const OVERFLOW_INT = 0b0000_0010;
        /// Raise an interrupt for every key event.
        const KEY_INT = 0b0001_0000;
    }
}

bitflags! {
    /// `REG_INT`, the pending interrupt causes.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Int: u8 {
        const OVERFLOW = 0b0000_0001;
        const KEY = 0b0000_1000;
    }
}

bitflags! {
    /// `REG_CF2`.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Cfg2: u8 {
        /// Also report keys as a USB keyboard.
        const USB_KEYB_ON = 0b0000_0010;
    }
}

pub struct Registers {
    regs: [u8; REG_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        Registers::new()
    }
}

impl Registers {
    /// The registers as they are at power on.
    pub fn new() -> Registers {
        let mut regs = Registers { regs: [0; REG_COUNT] };
        regs.set(REG_VER, VERSION);
        regs.set(REG_CFG, (Cfg::OVERFLOW_INT | Cfg::KEY_INT).bits());
        // ms
        regs.set(REG_FRQ, 10);
        // 10ms units
        regs.set(REG_HLD, 100);
        // USB reports on, so the keyboard works before the driver loads.
        regs.set(REG_CF2, Cfg2::USB_KEYB_ON.bits());
        // seconds
        regs.set(REG_SHUTDOWN_GRACE, 5);
        regs
    }

    /// Read a register.  Unknown registers read as zero.
    pub fn get(&self, reg: u8) -> u8 {
        self.regs.get(reg as usize).copied().unwrap_or(0)
    }

    /// Write a register.  Writes to unknown registers are ignored.
    pub fn set(&mut self, reg: u8, value: u8) {
        if let Some(slot) = self.regs.get_mut(reg as usize) {
            *slot = value;
        }
    }

    pub fn cfg(&self) -> Cfg {
        Cfg::from_bits_truncate(self.get(REG_CFG))
    }

    pub fn cfg2(&self) -> Cfg2 {
        Cfg2::from_bits_truncate(self.get(REG_CF2))
    }

    pub fn int(&self) -> Int {
        Int::from_bits_truncate(self.get(REG_INT))
    }

    pub fn set_int(&mut self, bits: Int) {
        self.set(REG_INT, (self.int() | bits).bits());
    }

    /// Hold threshold in ms.  The register is in 10ms units.
    pub fn hold_ms(&self) -> u64 {
        self.get(REG_HLD) as u64 * 10
    }

    /// Scan interval in ms.  Never zero.
    pub fn scan_interval_ms(&self) -> u64 {
        self.get(REG_FRQ).max(1) as u64
    }

    pub fn driver_loaded(&self) -> bool {
        self.get(REG_DRIVER_STATE) != 0
    }
}
