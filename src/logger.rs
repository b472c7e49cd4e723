// src/logger.rs

//! `log` backend that writes records to a serial console.

use crate::console::{Console, CONSOLE};
use crate::serial::{DefaultBackend, SerialError, SerialHardware};
use core::fmt;
use log::{LevelFilter, Log, Metadata, Record};

/// Writes `[LEVEL] target: message` lines to a [`Console`].
///
/// Records are dropped, not queued, when the console is unconfigured or its
/// lock is held; logging from inside a console write cannot deadlock.
pub struct SerialLogger<H: 'static> {
    console: &'static Console<H>,
    level: LevelFilter,
}

impl<H> SerialLogger<H> {
    /// Logger writing to `console`, dropping records above `level`.
    pub const fn new(console: &'static Console<H>, level: LevelFilter) -> Self {
        Self { console, level }
    }
}

impl<H: SerialHardware + Send> Log for SerialLogger<H> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = self.console.try_with_uart(|uart| {
            use fmt::Write;
            writeln!(
                uart,
                "[{:>5}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        });
    }

    fn flush(&self) {}
}

impl<H> fmt::Debug for SerialLogger<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialLogger")
            .field("console", self.console)
            .field("level", &self.level)
            .finish()
    }
}

static LOGGER: SerialLogger<DefaultBackend> = SerialLogger::new(&CONSOLE, LevelFilter::Trace);

/// Route the `log` macros to the serial console, filtered at `level`.
///
/// # Errors
///
/// - `SerialError::AlreadyInitialized` if a logger is already installed
pub fn init_logger(level: LevelFilter) -> Result<(), SerialError> {
    log::set_logger(&LOGGER).map_err(|_| SerialError::AlreadyInitialized)?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::sim::SimulatedUart;
    use crate::serial::{ComPort, SerialConfig};
    use log::Level;

    static TEST_CONSOLE: Console<SimulatedUart> = Console::new();

    #[test]
    fn formats_and_filters_records() {
        TEST_CONSOLE
            .init(
                SimulatedUart::new(ComPort::COM1),
                ComPort::COM1,
                &SerialConfig::default(),
            )
            .unwrap();
        let logger = SerialLogger::new(&TEST_CONSOLE, LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .target("boot")
                .args(format_args!("disk {} missing", 2))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("boot")
                .args(format_args!("filtered"))
                .build(),
        );

        let uart = TEST_CONSOLE.shutdown().unwrap();
        assert_eq!(
            String::from_utf8(uart.hardware().transmitted()).unwrap(),
            "[ WARN] boot: disk 2 missing\n"
        );
    }
}
