//! Log to stdout from unit tests.

use std::sync::Once;

use log::{LevelFilter, Log, Metadata, Record};

struct StdoutLog;

impl Log for StdoutLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        println!("{}:{}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StdoutLog = StdoutLog;
static INIT: Once = Once::new();

/// Install the logger.  Safe to call from every test.
pub fn init() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Debug);
        }
    });
}
