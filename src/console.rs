// src/console.rs

//! Serial console: the kernel-facing front end of the transmitter.
//!
//! [`Console`] owns one configured [`Uart`] behind a spin lock, so there is
//! exactly one writer per port at a time. Before [`Console::init`] every
//! write fails with [`SerialError::NotConfigured`].
//!
//! # Locking
//!
//! The lock is not interrupt-safe. Code that may run while the lock holder
//! is interrupted (exception and IRQ handlers) must use
//! [`Console::try_write`], which reports [`SerialError::Busy`] instead of
//! spinning forever.

use crate::serial::{
    default_backend, ComPort, Configured, DefaultBackend, SerialConfig, SerialError,
    SerialHardware, TransmitStats, Uart,
};
use core::fmt::{self, Write};
use spin::Mutex;

/// A lock-protected, lazily configured UART
pub struct Console<H> {
    uart: Mutex<Option<Uart<H, Configured>>>,
}

impl<H> Console<H> {
    /// An unconfigured console; usable in a `static`.
    pub const fn new() -> Self {
        Self {
            uart: Mutex::new(None),
        }
    }
}

impl<H> Default for Console<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: SerialHardware> Console<H> {
    /// Configure the UART at `port` and start accepting writes.
    ///
    /// # Errors
    ///
    /// - `SerialError::AlreadyInitialized` if the console already owns a UART
    pub fn init(&self, hw: H, port: ComPort, config: &SerialConfig) -> Result<(), SerialError> {
        let mut slot = self.uart.lock();
        if slot.is_some() {
            return Err(SerialError::AlreadyInitialized);
        }
        *slot = Some(Uart::new(hw, port).configure_with(config));
        Ok(())
    }

    /// Whether [`init`](Self::init) has succeeded and the UART was not shut down.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.uart.lock().is_some()
    }

    /// Run `f` with exclusive access to the configured UART.
    pub fn with_uart<F, R>(&self, f: F) -> Result<R, SerialError>
    where
        F: FnOnce(&mut Uart<H, Configured>) -> R,
    {
        let mut slot = self.uart.lock();
        let uart = slot.as_mut().ok_or(SerialError::NotConfigured)?;
        Ok(f(uart))
    }

    /// Like [`with_uart`](Self::with_uart) but never spins on the lock.
    pub fn try_with_uart<F, R>(&self, f: F) -> Result<R, SerialError>
    where
        F: FnOnce(&mut Uart<H, Configured>) -> R,
    {
        let mut slot = self.uart.try_lock().ok_or(SerialError::Busy)?;
        let uart = slot.as_mut().ok_or(SerialError::NotConfigured)?;
        Ok(f(uart))
    }

    /// Transmit `bytes`, spinning on the lock.
    pub fn write(&self, bytes: &[u8]) -> Result<(), SerialError> {
        self.with_uart(|uart| uart.write(bytes))?
    }

    /// Transmit `bytes`, or fail with [`SerialError::Busy`] if the lock is held.
    pub fn try_write(&self, bytes: &[u8]) -> Result<(), SerialError> {
        self.try_with_uart(|uart| uart.write(bytes))?
    }

    /// Format `args` straight into the UART under one lock acquisition.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> Result<(), SerialError> {
        self.with_uart(|uart| {
            let mut sink = ErrorCapture { uart, error: None };
            // fmt::Error without a captured error came from a Display impl
            let _ = fmt::write(&mut sink, args);
            sink.error.map_or(Ok(()), Err)
        })?
    }

    /// Transmit counters, if configured
    pub fn stats(&self) -> Option<TransmitStats> {
        self.uart.lock().as_ref().map(Uart::stats)
    }

    /// Take the UART out of the console, returning it to the unconfigured
    /// state from the console's point of view.
    pub fn shutdown(&self) -> Option<Uart<H, Configured>> {
        self.uart.lock().take()
    }
}

/// Keeps the transmit error that `fmt::Write` would flatten to `fmt::Error`
struct ErrorCapture<'a, H> {
    uart: &'a mut Uart<H, Configured>,
    error: Option<SerialError>,
}

impl<H: SerialHardware> Write for ErrorCapture<'_, H> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.uart.write(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

impl<H> fmt::Debug for Console<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.uart.try_lock() {
            Some(slot) if slot.is_some() => "configured",
            Some(_) => "unconfigured",
            None => "locked",
        };
        f.debug_struct("Console").field("state", &state).finish()
    }
}

/// The kernel's serial console
///
/// # Locking Order
///
/// Never acquire another device lock while holding `CONSOLE`; the `log`
/// backend writes through it.
pub static CONSOLE: Console<DefaultBackend> = Console::new();

/// Configure `port` with `config` as the kernel console.
///
/// # Safety
///
/// The caller must own the 16550 at `port`, as for
/// [`default_backend`].
///
/// # Errors
///
/// - `SerialError::AlreadyInitialized` if the console already owns a UART;
///   no register is touched in that case
pub unsafe fn init(port: ComPort, config: &SerialConfig) -> Result<(), SerialError> {
    // SAFETY: forwarded to the caller.
    let hw = unsafe { default_backend(port) };
    CONSOLE.init(hw, port, config)?;
    log::debug!(
        "serial console on {} at {} baud",
        port,
        config.divisor.baud()
    );
    Ok(())
}

/// Configure COM1 at 115200 8N1 as the kernel console.
///
/// # Safety
///
/// The caller must own COM1.
pub unsafe fn init_com1() -> Result<(), SerialError> {
    // SAFETY: forwarded to the caller.
    unsafe { init(ComPort::COM1, &SerialConfig::default()) }
}

/// Whether the kernel console has been initialized
#[inline]
pub fn is_initialized() -> bool {
    CONSOLE.is_initialized()
}

/// Transmit `bytes` on the kernel console.
pub fn write(bytes: &[u8]) -> Result<(), SerialError> {
    CONSOLE.write(bytes)
}

/// Transmit `bytes` on the kernel console unless its lock is held.
pub fn try_write(bytes: &[u8]) -> Result<(), SerialError> {
    CONSOLE.try_write(bytes)
}

/// Transmit a string on the kernel console.
pub fn write_str(s: &str) -> Result<(), SerialError> {
    CONSOLE.write(s.as_bytes())
}

/// Serial writer implementing `core::fmt::Write`
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialWriter;

impl Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_str(s).map_err(|_| fmt::Error)
    }
}

/// Write formatted data to the serial console
#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    // Output before `init` is dropped, like on a machine without COM1
    let _ = CONSOLE.write_fmt(args);
}

/// Prints to the host through the serial console.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::console::_print(format_args!($($arg)*))
    };
}

/// Prints to the host through the serial console, appending a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($fmt:expr) => ($crate::serial_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::serial_print!(concat!($fmt, "\n"), $($arg)*));
}
