//! The register protocol spoken with the companion's driver.
//!
//! Each packet is a register byte, with [`PACKET_WRITE_MASK`] set for a
//! write, and a data byte.  A read answers with one byte, except `REG_FIF`,
//! which dequeues an event and answers with two.

use smart_leds::RGB8;

use crate::board::Board;
use crate::dispatch::Core;
use crate::fifo::FIFO_CAPACITY;
use crate::leds::{LedMode, LedState};
use crate::log::{debug, warn};
use crate::regs::*;
use crate::Instant;

/// Minutes, as the `REG_REWAKE` register counts them.
const MINUTE_MS: u64 = 60_000;

/// `REG_KEY` carries the event count in its low bits.
const KEY_COUNT_MASK: u8 = 0x1f;

// The count always fits.
const _: () = assert!(FIFO_CAPACITY <= KEY_COUNT_MASK as usize);

impl<B: Board> Core<B> {
    /// Handle one packet.  Any reply goes into `out`, and the number of reply
    /// bytes is returned.  Writes and unknown registers reply with nothing.
    pub fn process_packet(&mut self, now: Instant, reg: u8, data: u8, out: &mut [u8; 2]) -> usize {
        let is_write = reg & PACKET_WRITE_MASK != 0;
        let reg = reg & !PACKET_WRITE_MASK;

        if is_write {
            self.write_register(now, reg, data);
            return 0;
        }

        match reg {
            REG_VER => {
                out[0] = VERSION;
                1
            }
            REG_KEY => {
                out[0] = self.fifo.count() as u8 & KEY_COUNT_MASK;
                1
            }
            REG_FIF => {
                *out = self.fifo.dequeue().map(|ev| ev.to_bytes()).unwrap_or([0, 0]);
                2
            }
            REG_CFG | REG_INT | REG_FRQ | REG_HLD | REG_CF2 | REG_LED | REG_LED_R
            | REG_LED_G | REG_LED_B | REG_REWAKE | REG_SHUTDOWN_GRACE | REG_POWER_OFF
            | REG_STARTUP_REASON | REG_DRIVER_STATE | REG_DORMANT => {
                out[0] = self.regs.get(reg);
                1
            }
            _ => 0,
        }
    }

    fn write_register(&mut self, now: Instant, reg: u8, data: u8) {
        match reg {
            REG_CFG | REG_INT | REG_FRQ | REG_HLD | REG_CF2 | REG_LED_R | REG_LED_G
            | REG_LED_B | REG_SHUTDOWN_GRACE | REG_DORMANT => {
                self.regs.set(reg, data);
            }
            REG_LED => {
                let mode = match LedMode::from_wire(data) {
                    Some(mode) => mode,
                    None => {
                        warn!("led: bad mode {}", data);
                        return;
                    }
                };
                self.regs.set(reg, data);
                let color = RGB8::new(
                    self.regs.get(REG_LED_R),
                    self.regs.get(REG_LED_G),
                    self.regs.get(REG_LED_B),
                );
                self.set_led(now, LedState::new(mode, color));
            }
            REG_REWAKE => {
                self.regs.set(reg, data);
                if data == 0 {
                    debug!("rewake canceled");
                    self.cancel_power_on();
                } else {
                    self.schedule_power_on(now, data as u64 * MINUTE_MS);
                }
            }
            REG_POWER_OFF => {
                self.regs.set(reg, data);
                debug!("driver requested power off: {}", data);
                self.begin_shutdown(now, data & 1 != 0);
            }
            REG_DRIVER_STATE => {
                self.regs.set(reg, data);
                if data != 0 {
                    // Anything queued before the driver loaded is stale.
                    debug!("driver loaded, flushing {} events", self.fifo.count());
                    self.fifo.flush();
                }
            }
            _ => debug!("write to read-only register {}", reg),
        }
    }
}
