// src/serial/port.rs

//! COM port handle: a base address and the register addresses derived from it.

use super::constants::{base_address, register_offset, REGISTER_SPAN};

/// Identifies one UART by its base I/O address.
///
/// The handle is a plain value; all register addresses are computed from
/// the base with the fixed 16550 offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComPort {
    base: u16,
}

impl ComPort {
    /// COM1 at `0x3F8`
    pub const COM1: ComPort = ComPort::new(base_address::COM1);
    /// COM2 at `0x2F8`
    pub const COM2: ComPort = ComPort::new(base_address::COM2);
    /// COM3 at `0x3E8`
    pub const COM3: ComPort = ComPort::new(base_address::COM3);
    /// COM4 at `0x2E8`
    pub const COM4: ComPort = ComPort::new(base_address::COM4);

    /// Create a handle for a UART at `base`.
    pub const fn new(base: u16) -> Self {
        Self { base }
    }

    /// Base I/O address
    #[inline]
    pub const fn base(self) -> u16 {
        self.base
    }

    /// Offset of `addr` from the base, if `addr` is one of this UART's
    /// registers.
    #[inline]
    pub const fn offset_of(self, addr: u16) -> Option<u16> {
        let offset = addr.wrapping_sub(self.base);
        if offset < REGISTER_SPAN {
            Some(offset)
        } else {
            None
        }
    }

    /// Data register; divisor latch low byte while DLAB is set.
    #[inline]
    pub const fn data(self) -> u16 {
        self.base + register_offset::DATA
    }

    /// Interrupt enable register; divisor latch high byte while DLAB is set.
    #[inline]
    pub const fn interrupt_enable(self) -> u16 {
        self.base + register_offset::INTERRUPT_ENABLE
    }

    /// FIFO control register
    #[inline]
    pub const fn fifo_control(self) -> u16 {
        self.base + register_offset::FIFO_CONTROL
    }

    /// Line control register
    #[inline]
    pub const fn line_control(self) -> u16 {
        self.base + register_offset::LINE_CONTROL
    }

    /// Modem control register
    #[inline]
    pub const fn modem_control(self) -> u16 {
        self.base + register_offset::MODEM_CONTROL
    }

    /// Line status register
    #[inline]
    pub const fn line_status(self) -> u16 {
        self.base + register_offset::LINE_STATUS
    }
}

impl Default for ComPort {
    fn default() -> Self {
        Self::COM1
    }
}

impl core::fmt::Display for ComPort {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            ComPort::COM1 => f.write_str("COM1"),
            ComPort::COM2 => f.write_str("COM2"),
            ComPort::COM3 => f.write_str("COM3"),
            ComPort::COM4 => f.write_str("COM4"),
            ComPort { base } => write!(f, "UART@{:#06x}", base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn com1_register_map() {
        let com1 = ComPort::COM1;
        assert_eq!(com1.data(), 0x3F8);
        assert_eq!(com1.interrupt_enable(), 0x3F9);
        assert_eq!(com1.fifo_control(), 0x3FA);
        assert_eq!(com1.line_control(), 0x3FB);
        assert_eq!(com1.modem_control(), 0x3FC);
        assert_eq!(com1.line_status(), 0x3FD);
    }

    #[test]
    fn offsets_follow_base() {
        let port = ComPort::new(0x1000);
        assert_eq!(port.fifo_control() - port.base(), 2);
        assert_eq!(port.line_status() - port.base(), 5);
    }

    #[test]
    fn offset_of_covers_only_the_register_window() {
        let com1 = ComPort::COM1;
        assert_eq!(com1.offset_of(0x3F8), Some(0));
        assert_eq!(com1.offset_of(0x3FF), Some(7));
        assert_eq!(com1.offset_of(0x400), None);
        assert_eq!(com1.offset_of(0x3F7), None);
        assert_eq!(com1.offset_of(0x64), None);
    }

    #[test]
    fn display_names_known_ports() {
        assert_eq!(format!("{}", ComPort::COM2), "COM2");
        assert_eq!(format!("{}", ComPort::new(0x1000)), "UART@0x1000");
    }
}
