// src/serial/sim.rs

//! Register-level model of a 16550 for tests and host tooling.
//!
//! [`SimulatedUart`] implements [`SerialHardware`] for a single base address.
//! It tracks the divisor latch, the control registers and the bytes that
//! reach the transmitter, records every access in order, and answers line
//! status reads from a scripted [`Readiness`].

use super::backend::SerialHardware;
use super::constants::register_offset;
use super::port::ComPort;
use super::registers::{LineControl, LineStatus};
use alloc::vec::Vec;

/// One register access, as seen on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// `in` from `port` that returned `value`
    Read {
        /// I/O address
        port: u16,
        /// Byte returned
        value: u8,
    },
    /// `out` of `value` to `port`
    Write {
        /// I/O address
        port: u16,
        /// Byte written
        value: u8,
    },
}

/// When the line status register reports the transmitter as empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Every poll reports ready
    Always,
    /// The first `n` polls before each burst report busy
    After(u32),
    /// Polls report ready `n` times in total, then busy forever
    ReadyFor(u32),
    /// No poll ever reports ready
    Never,
}

/// Snapshot of the programmable registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterState {
    /// Divisor latch low (DLL)
    pub divisor_low: u8,
    /// Divisor latch high (DLM)
    pub divisor_high: u8,
    /// Interrupt enable register
    pub interrupt_enable: u8,
    /// Last value written to the FIFO control register
    pub fifo_control: u8,
    /// Line control register
    pub line_control: u8,
    /// Modem control register
    pub modem_control: u8,
}

/// A 16550 at one base address, driven through [`SerialHardware`]
#[derive(Debug, Clone)]
pub struct SimulatedUart {
    port: ComPort,
    registers: RegisterState,
    readiness: Readiness,
    busy_polls: u32,
    accesses: Vec<Access>,
    bursts: Vec<Vec<u8>>,
    burst_open: bool,
}

impl SimulatedUart {
    /// A UART at `port` whose transmitter is always ready.
    pub fn new(port: ComPort) -> Self {
        Self::with_readiness(port, Readiness::Always)
    }

    /// A UART at `port` whose line status follows `readiness`.
    pub fn with_readiness(port: ComPort, readiness: Readiness) -> Self {
        Self {
            port,
            registers: RegisterState::default(),
            readiness,
            busy_polls: 0,
            accesses: Vec::new(),
            bursts: Vec::new(),
            burst_open: false,
        }
    }

    /// Preload the line control register, as firmware might leave it.
    pub fn with_line_control(mut self, value: u8) -> Self {
        self.registers.line_control = value;
        self
    }

    /// Switch the readiness script, restarting its busy count.
    pub fn set_readiness(&mut self, readiness: Readiness) {
        self.readiness = readiness;
        self.busy_polls = 0;
    }

    /// Current programmable register contents
    pub fn registers(&self) -> RegisterState {
        self.registers
    }

    /// Divisor currently held by the latch
    pub fn divisor(&self) -> u16 {
        (u16::from(self.registers.divisor_high) << 8) | u16::from(self.registers.divisor_low)
    }

    /// Every access since creation or the last [`clear_log`](Self::clear_log)
    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    /// Writes only, in order, as `(port, value)`
    pub fn writes(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.accesses.iter().filter_map(|access| match *access {
            Access::Write { port, value } => Some((port, value)),
            Access::Read { .. } => None,
        })
    }

    /// Payload bytes that reached the transmitter, in order
    pub fn transmitted(&self) -> Vec<u8> {
        self.bursts.iter().flatten().copied().collect()
    }

    /// Payload grouped by burst: consecutive data writes between status polls
    pub fn bursts(&self) -> &[Vec<u8>] {
        &self.bursts
    }

    /// Number of line status reads so far
    pub fn status_polls(&self) -> usize {
        let lsr = self.port.line_status();
        self.accesses
            .iter()
            .filter(|access| matches!(access, Access::Read { port, .. } if *port == lsr))
            .count()
    }

    /// Forget recorded traffic; register contents are kept.
    pub fn clear_log(&mut self) {
        self.accesses.clear();
        self.bursts.clear();
        self.burst_open = false;
    }

    fn dlab(&self) -> bool {
        LineControl::from_bits_retain(self.registers.line_control).contains(LineControl::DLAB)
    }

    fn line_status(&mut self) -> u8 {
        let ready = match self.readiness {
            Readiness::Always => true,
            Readiness::Never => false,
            Readiness::After(n) => {
                if self.busy_polls < n {
                    self.busy_polls += 1;
                    false
                } else {
                    true
                }
            }
            Readiness::ReadyFor(0) => false,
            Readiness::ReadyFor(n) => {
                self.readiness = Readiness::ReadyFor(n - 1);
                true
            }
        };
        if ready {
            self.busy_polls = 0;
            (LineStatus::TRANSMIT_EMPTY | LineStatus::TRANSMITTER_IDLE).bits()
        } else {
            0
        }
    }

    fn transmit(&mut self, value: u8) {
        if !self.burst_open || self.bursts.is_empty() {
            self.bursts.push(Vec::new());
            self.burst_open = true;
        }
        if let Some(burst) = self.bursts.last_mut() {
            burst.push(value);
        }
    }
}

impl SerialHardware for SimulatedUart {
    fn read_byte(&mut self, port: u16) -> u8 {
        let value = match self.port.offset_of(port) {
            Some(register_offset::DATA) if self.dlab() => self.registers.divisor_low,
            Some(register_offset::DATA) => 0,
            Some(register_offset::INTERRUPT_ENABLE) if self.dlab() => self.registers.divisor_high,
            Some(register_offset::INTERRUPT_ENABLE) => self.registers.interrupt_enable,
            Some(register_offset::LINE_CONTROL) => self.registers.line_control,
            Some(register_offset::MODEM_CONTROL) => self.registers.modem_control,
            Some(register_offset::LINE_STATUS) => {
                self.burst_open = false;
                self.line_status()
            }
            _ => 0xFF,
        };
        self.accesses.push(Access::Read { port, value });
        value
    }

    fn write_byte(&mut self, port: u16, value: u8) {
        self.accesses.push(Access::Write { port, value });
        match self.port.offset_of(port) {
            Some(register_offset::DATA) if self.dlab() => self.registers.divisor_low = value,
            Some(register_offset::DATA) => self.transmit(value),
            Some(register_offset::INTERRUPT_ENABLE) if self.dlab() => {
                self.registers.divisor_high = value
            }
            Some(register_offset::INTERRUPT_ENABLE) => self.registers.interrupt_enable = value,
            Some(register_offset::FIFO_CONTROL) => self.registers.fifo_control = value,
            Some(register_offset::LINE_CONTROL) => self.registers.line_control = value,
            Some(register_offset::MODEM_CONTROL) => self.registers.modem_control = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_writes_under_dlab_land_in_divisor_latch() {
        let com1 = ComPort::COM1;
        let mut uart = SimulatedUart::new(com1);
        uart.write_byte(com1.line_control(), 0x80);
        uart.write_byte(com1.data(), 0x0C);
        uart.write_byte(com1.interrupt_enable(), 0x00);
        uart.write_byte(com1.line_control(), 0x03);

        assert_eq!(uart.divisor(), 12);
        assert!(uart.transmitted().is_empty());
    }

    #[test]
    fn bursts_split_on_status_polls() {
        let com1 = ComPort::COM1;
        let mut uart = SimulatedUart::new(com1);
        uart.read_byte(com1.line_status());
        uart.write_byte(com1.data(), b'a');
        uart.write_byte(com1.data(), b'b');
        uart.read_byte(com1.line_status());
        uart.write_byte(com1.data(), b'c');

        assert_eq!(uart.bursts(), &[b"ab".to_vec(), b"c".to_vec()]);
        assert_eq!(uart.transmitted(), b"abc");
        assert_eq!(uart.status_polls(), 2);
    }

    #[test]
    fn ready_after_resets_per_burst() {
        let com1 = ComPort::COM1;
        let mut uart = SimulatedUart::with_readiness(com1, Readiness::After(2));
        let lsr = com1.line_status();
        assert_eq!(uart.read_byte(lsr) & 0x20, 0);
        assert_eq!(uart.read_byte(lsr) & 0x20, 0);
        assert_ne!(uart.read_byte(lsr) & 0x20, 0);
        assert_eq!(uart.read_byte(lsr) & 0x20, 0);
    }

    #[test]
    fn ready_for_runs_out() {
        let com1 = ComPort::COM1;
        let mut uart = SimulatedUart::with_readiness(com1, Readiness::ReadyFor(2));
        let lsr = com1.line_status();
        assert_ne!(uart.read_byte(lsr) & 0x20, 0);
        assert_ne!(uart.read_byte(lsr) & 0x20, 0);
        assert_eq!(uart.read_byte(lsr) & 0x20, 0);
    }

    #[test]
    fn foreign_addresses_float() {
        let com1 = ComPort::COM1;
        let mut uart = SimulatedUart::new(com1);
        uart.write_byte(ComPort::COM2.line_control(), 0x80);
        uart.write_byte(com1.base() + 8, 0x55);

        assert_eq!(uart.read_byte(ComPort::COM2.line_control()), 0xFF);
        assert_eq!(uart.registers(), RegisterState::default());
    }

    #[test]
    fn never_ready_reports_busy() {
        let com1 = ComPort::COM1;
        let mut uart = SimulatedUart::with_readiness(com1, Readiness::Never);
        for _ in 0..50 {
            assert_eq!(uart.read_byte(com1.line_status()), 0);
        }
    }
}
