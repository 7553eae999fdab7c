//! Power sequencing scenarios.

mod common;

use common::{at, core, drain, hold_key, Call};
use companion_kbd::alarm::Category;
use companion_kbd::keys::{KEY_POWER, KEY_STOP};
use companion_kbd::leds::{LED_FLASH_ON_MS, OFF};
use companion_kbd::power::{BOOT_COLOR, MIN_SHUTDOWN_NOTICE_MS, REBOOT_DELAY_MS};
use companion_kbd::regs::{REG_SHUTDOWN_GRACE, REG_STARTUP_REASON};
use companion_kbd::{KeyEvent, KeyState, LedMode, LedState, PowerOnReason, PowerState};

fn notice() -> KeyEvent {
    KeyEvent::new(KEY_POWER, KeyState::LongHold)
}

#[test]
fn notice_then_power_off() {
    let mut core = core();
    core.power_on(at(0), PowerOnReason::FwInit);
    core.board_mut().clear();

    core.schedule_power_off(at(0), 100, 50, false);
    core.poll(at(99));
    assert!(core.fifo().is_empty());

    core.poll(at(100));
    assert_eq!(drain(&mut core), vec![notice()]);
    assert_eq!(core.power_state(), PowerState::On);

    core.poll(at(149));
    assert!(core.board().rails().is_empty());
    core.poll(at(150));
    assert_eq!(core.power_state(), PowerState::Off);

    core.poll(at(10_000));
    assert_eq!(core.board().rails(), vec![false]);
    assert!(core.fifo().is_empty());
}

#[test]
fn cancel_before_notice() {
    let mut core = core();
    core.power_on(at(0), PowerOnReason::FwInit);
    core.board_mut().clear();

    core.schedule_power_off(at(0), 100, 50, false);
    core.poll(at(50));
    core.cancel_all_power_alarms();
    core.poll(at(10_000));

    assert!(core.fifo().is_empty());
    assert!(core.board().rails().is_empty());
    assert_eq!(core.power_state(), PowerState::On);
    assert_eq!(core.next_deadline(), None);
}

#[test]
fn notice_has_a_floor() {
    let mut core = core();
    core.schedule_power_off(at(0), 0, 0, false);
    assert_eq!(core.alarms().deadline_of(Category::ShutdownNotice), Some(at(MIN_SHUTDOWN_NOTICE_MS)));
    assert_eq!(core.alarms().deadline_of(Category::PowerOff), Some(at(MIN_SHUTDOWN_NOTICE_MS)));
}

#[test]
fn rescheduling_replaces() {
    let mut core = core();
    core.power_on(at(0), PowerOnReason::FwInit);
    core.schedule_power_off(at(0), 100, 50, false);
    core.schedule_power_off(at(0), 1000, 50, false);

    core.poll(at(500));
    assert!(core.fifo().is_empty());
    core.poll(at(1050));
    assert_eq!(drain(&mut core), vec![notice()]);
    assert_eq!(core.power_state(), PowerState::Off);
}

#[test]
fn stale_fire_does_nothing() {
    let mut core = core();
    core.schedule_power_on(at(0), 100);
    let stale = core.alarms().id_of(Category::PowerOn).unwrap();
    core.cancel_all_power_alarms();
    assert!(!core.fire_alarm(at(100), stale));
    assert_eq!(core.power_state(), PowerState::Off);

    core.schedule_power_on(at(0), 100);
    let live = core.alarms().id_of(Category::PowerOn).unwrap();
    assert_ne!(live, stale);
    assert!(core.fire_alarm(at(100), live));
    assert!(!core.fire_alarm(at(100), live));
    assert_eq!(core.power_state(), PowerState::On);
    assert_eq!(core.regs().get(REG_STARTUP_REASON), PowerOnReason::Rewake.to_wire());
}

#[test]
fn power_on_and_off_are_idempotent() {
    let mut core = core();
    core.power_on(at(0), PowerOnReason::FwInit);
    core.power_on(at(0), PowerOnReason::Button);
    assert_eq!(core.board().rails(), vec![true]);
    assert_eq!(core.regs().get(REG_STARTUP_REASON), 1);
    assert_eq!(core.board().last_led(), Some(BOOT_COLOR));

    core.power_off();
    core.power_off();
    assert_eq!(core.board().rails(), vec![true, false]);
}

#[test]
fn power_key_hold_powers_on() {
    let mut core = core();
    hold_key(&mut core, KEY_POWER, true, 0, 990, 10);
    assert_eq!(core.power_state(), PowerState::Off);

    core.observe(at(1000), KEY_POWER, true);
    assert_eq!(core.power_state(), PowerState::On);
    assert_eq!(core.regs().get(REG_STARTUP_REASON), PowerOnReason::Button.to_wire());
    assert_eq!(core.board().last_led(), Some(BOOT_COLOR));
    assert!(core.fifo().is_empty());
}

#[test]
fn power_key_cancels_rewake() {
    let mut core = core();
    core.schedule_power_on(at(0), 60_000);
    hold_key(&mut core, KEY_POWER, true, 0, 1010, 10);

    assert_eq!(core.power_state(), PowerState::On);
    assert_eq!(
        core.regs().get(REG_STARTUP_REASON),
        PowerOnReason::RewakeCanceled.to_wire()
    );
    assert!(!core.alarms().is_pending(Category::PowerOn));
}

#[test]
fn power_key_long_hold_shuts_down() {
    let mut core = core();
    core.power_on(at(0), PowerOnReason::FwInit);
    core.regs_mut().set(REG_SHUTDOWN_GRACE, 2);
    hold_key(&mut core, KEY_POWER, true, 0, 5010, 10);
    hold_key(&mut core, KEY_POWER, false, 5010, 5030, 10);

    assert_eq!(
        drain(&mut core),
        vec![
            KeyEvent::new(KEY_STOP, KeyState::Pressed),
            KeyEvent::new(KEY_STOP, KeyState::Released),
        ]
    );

    core.poll(at(5000 + MIN_SHUTDOWN_NOTICE_MS));
    assert_eq!(drain(&mut core), vec![notice()]);
    core.poll(at(5000 + MIN_SHUTDOWN_NOTICE_MS + 1999));
    assert_eq!(core.power_state(), PowerState::On);
    core.poll(at(5000 + MIN_SHUTDOWN_NOTICE_MS + 2000));
    assert_eq!(core.power_state(), PowerState::Off);
}

#[test]
fn long_hold_while_off_is_ignored() {
    let mut core = core();
    hold_key(&mut core, KEY_POWER, true, 0, 2000, 10);
    assert_eq!(core.power_state(), PowerState::On);
    core.power_off();

    hold_key(&mut core, KEY_POWER, true, 2000, 5010, 10);
    assert!(!core.alarms().is_pending(Category::ShutdownNotice));
    assert!(!core.alarms().is_pending(Category::PowerOff));
    // The stop pulse still goes out.
    assert_eq!(drain(&mut core).len(), 2);
}

#[test]
fn reboot_comes_back() {
    let mut core = core();
    core.power_on(at(0), PowerOnReason::FwInit);
    core.reboot(at(0), PowerOnReason::Button);
    assert_eq!(core.power_state(), PowerState::Off);

    core.poll(at(REBOOT_DELAY_MS - 1));
    assert_eq!(core.power_state(), PowerState::Off);
    core.poll(at(REBOOT_DELAY_MS));
    assert_eq!(core.power_state(), PowerState::On);
    assert_eq!(core.regs().get(REG_STARTUP_REASON), PowerOnReason::Button.to_wire());
    assert_eq!(core.board().rails(), vec![true, false, true]);
}

#[test]
fn dormant_after_power_off() {
    let mut core = core();
    core.power_on(at(0), PowerOnReason::FwInit);
    core.board_mut().clear();
    assert!(!core.dormant_reentry());

    core.schedule_power_off(at(0), 10, 0, true);
    core.poll(at(10));

    assert_eq!(core.power_state(), PowerState::Off);
    assert!(core.dormant_reentry());
    let hw: Vec<Call> = core
        .board()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Rail(_) | Call::Led(_) | Call::Dormant))
        .cloned()
        .collect();
    assert_eq!(
        hw,
        vec![Call::Rail(false), Call::Led(OFF), Call::Dormant, Call::Led(BOOT_COLOR)]
    );
}

#[test]
fn flash_restarts_from_the_wake() {
    let mut core = core();
    core.power_on(at(0), PowerOnReason::FwInit);
    core.set_led(at(0), LedState::new(LedMode::FlashRepeating, BOOT_COLOR));
    core.board_mut().wake_at = 100_000;

    core.schedule_power_off(at(0), 10, 0, true);
    core.poll(at(10));

    assert_eq!(core.board().last_led(), Some(BOOT_COLOR));
    assert_eq!(
        core.alarms().deadline_of(Category::LedFlash),
        Some(at(100_000 + LED_FLASH_ON_MS))
    );
}
