// src/serial/backend.rs

//! Hardware abstraction for the serial driver.
//!
//! The transmitter only needs two primitives from the platform: read a byte
//! from an I/O address and write a byte to one. Keeping them behind a trait
//! lets the same driver run against x86 port I/O, a stub on other targets,
//! or the register model in [`super::sim`].

use super::port::ComPort;

/// Byte-wide port I/O supplied by the platform layer.
///
/// Implementations are assumed synchronous and infallible.
pub trait SerialHardware {
    /// Read the register at `port`.
    fn read_byte(&mut self, port: u16) -> u8;
    /// Write `value` to the register at `port`.
    fn write_byte(&mut self, port: u16, value: u8);
}

impl<T: SerialHardware + ?Sized> SerialHardware for &mut T {
    #[inline]
    fn read_byte(&mut self, port: u16) -> u8 {
        (**self).read_byte(port)
    }

    #[inline]
    fn write_byte(&mut self, port: u16, value: u8) {
        (**self).write_byte(port, value)
    }
}

#[cfg(target_arch = "x86_64")]
pub use port_io::PortIoBackend;

#[cfg(target_arch = "x86_64")]
mod port_io {
    use super::{ComPort, SerialHardware};
    use x86_64::instructions::port::Port;

    /// x86 implementation backed by `in`/`out` instructions.
    ///
    /// Bound at construction to the eight registers of one UART. Addresses
    /// outside that window never reach the bus: reads return `0xFF`, as an
    /// undecoded port would, and writes are dropped.
    ///
    /// Only meaningful in ring 0 (or with I/O privilege); from ordinary user
    /// space the first access faults.
    #[derive(Debug)]
    pub struct PortIoBackend {
        port: ComPort,
    }

    impl PortIoBackend {
        /// Backend for the UART at `port`.
        ///
        /// # Safety
        ///
        /// The caller must own the 16550 at `port`: a UART is actually
        /// decoded there, and nothing else (another backend, firmware, a
        /// debugger stub) programs or drains it while this backend exists.
        pub const unsafe fn new(port: ComPort) -> Self {
            Self { port }
        }

        /// The UART this backend is bound to
        pub const fn port(&self) -> ComPort {
            self.port
        }
    }

    impl SerialHardware for PortIoBackend {
        #[inline]
        fn read_byte(&mut self, addr: u16) -> u8 {
            if self.port.offset_of(addr).is_none() {
                return 0xFF;
            }
            // SAFETY: `addr` is a register of the UART whose ownership the
            // caller of `new` vouched for.
            unsafe { Port::<u8>::new(addr).read() }
        }

        #[inline]
        fn write_byte(&mut self, addr: u16, value: u8) {
            if self.port.offset_of(addr).is_none() {
                return;
            }
            // SAFETY: see `read_byte`.
            unsafe { Port::<u8>::new(addr).write(value) }
        }
    }
}

/// Backend for targets without x86 port I/O.
///
/// Writes are discarded and every register reads as "transmitter empty",
/// so console output on such targets is a silent no-op instead of a hang.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubSerialBackend {
    _private: (),
}

impl StubSerialBackend {
    /// A backend that drops every write.
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl SerialHardware for StubSerialBackend {
    #[inline]
    fn read_byte(&mut self, _port: u16) -> u8 {
        0x60
    }

    #[inline]
    fn write_byte(&mut self, _port: u16, _value: u8) {}
}

/// Backend used by the global console on this target
#[cfg(target_arch = "x86_64")]
pub type DefaultBackend = PortIoBackend;

/// Backend used by the global console on this target
#[cfg(not(target_arch = "x86_64"))]
pub type DefaultBackend = StubSerialBackend;

/// The [`DefaultBackend`] for the UART at `port`.
///
/// # Safety
///
/// Same contract as [`PortIoBackend::new`]: the caller owns the 16550 at
/// `port`.
#[cfg(target_arch = "x86_64")]
pub const unsafe fn default_backend(port: ComPort) -> DefaultBackend {
    // SAFETY: forwarded to the caller.
    unsafe { PortIoBackend::new(port) }
}

/// The [`DefaultBackend`] for the UART at `port`.
///
/// # Safety
///
/// Kept `unsafe` so callers are written once for every target; the stub
/// itself touches no hardware.
#[cfg(not(target_arch = "x86_64"))]
pub const unsafe fn default_backend(_port: ComPort) -> DefaultBackend {
    StubSerialBackend::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::registers::LineStatus;

    #[test]
    fn stub_reads_as_ready_and_swallows_writes() {
        let mut stub = StubSerialBackend::new();
        stub.write_byte(0x3F8, b'x');
        assert!(LineStatus::from_bits_retain(stub.read_byte(0x3FD)).transmit_ready());
    }

    // Addresses outside the bound UART are filtered before any `in`/`out`,
    // so these run safely on the host.
    #[cfg(target_arch = "x86_64")]
    #[test]
    fn port_io_ignores_addresses_outside_its_uart() {
        // SAFETY: only out-of-window addresses are accessed below.
        let mut com1 = unsafe { PortIoBackend::new(ComPort::COM1) };
        assert_eq!(com1.port(), ComPort::COM1);

        com1.write_byte(0x64, 0xFE);
        com1.write_byte(0xCF8, 0x80);
        com1.write_byte(ComPort::COM2.data(), b'x');
        assert_eq!(com1.read_byte(0x60), 0xFF);
        assert_eq!(com1.read_byte(ComPort::COM1.base() + 8), 0xFF);
    }
}
