// src/serial/uart.rs

//! The transmitter: configures a 16550 and pushes bytes through its FIFO.
//!
//! A [`Uart`] starts out [`Unconfigured`]; the only way to get a handle that
//! can transmit is [`Uart::configure`], so writing to a port whose baud,
//! line, FIFO and modem registers were never programmed does not type-check.
//!
//! # Liveness
//!
//! With the default [`WaitPolicy::unbounded`] policy, `write` spins on the
//! line status register until the FIFO drains. If the UART is absent or
//! wedged that never happens and the caller hangs. Install a bounded policy
//! with [`Uart::set_wait_policy`] when that matters.

use super::backend::SerialHardware;
use super::config::{BaudDivisor, SerialConfig};
use super::constants::FIFO_DEPTH;
use super::error::SerialError;
use super::port::ComPort;
use super::registers::{LineControl, LineStatus};
use super::timeout::{poll_with_timeout, TimeoutError, WaitPolicy};
use core::fmt;
use core::marker::PhantomData;

/// Typestate: registers not yet programmed
#[derive(Debug)]
pub enum Unconfigured {}

/// Typestate: baud, line, FIFO and modem registers programmed
#[derive(Debug)]
pub enum Configured {}

/// Per-handle transmit counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransmitStats {
    /// Payload bytes written to the data register
    pub bytes: u64,
    /// FIFO bursts (one readiness wait each)
    pub bursts: u64,
    /// Line status reads made while waiting
    pub ready_polls: u64,
    /// Waits that hit the policy ceiling
    pub timeouts: u64,
}

/// A 16550 UART owned through a [`SerialHardware`] backend.
#[derive(Debug)]
pub struct Uart<H, S = Configured> {
    hw: H,
    port: ComPort,
    wait: WaitPolicy,
    stats: TransmitStats,
    _state: PhantomData<S>,
}

impl<H: SerialHardware> Uart<H, Unconfigured> {
    /// Take over the UART at `port` through `hw`. Nothing is accessed yet.
    pub const fn new(hw: H, port: ComPort) -> Self {
        Self {
            hw,
            port,
            wait: WaitPolicy::unbounded(),
            stats: TransmitStats {
                bytes: 0,
                bursts: 0,
                ready_polls: 0,
                timeouts: 0,
            },
            _state: PhantomData,
        }
    }

    /// Program the baud divisor and the fixed 8N1 / FIFO / RTS+DTR settings.
    pub fn configure(self, divisor: BaudDivisor) -> Uart<H, Configured> {
        self.configure_with(&SerialConfig::with_divisor(divisor))
    }

    /// Like [`configure`](Self::configure) for a divisor that may be zero.
    pub fn try_configure(self, divisor: u16) -> Result<Uart<H, Configured>, SerialError> {
        let divisor = BaudDivisor::new(divisor).ok_or(SerialError::InvalidDivisor)?;
        Ok(self.configure(divisor))
    }

    /// Program every register from `config` and adopt its wait policy.
    pub fn configure_with(mut self, config: &SerialConfig) -> Uart<H, Configured> {
        self.program(config);
        Uart {
            hw: self.hw,
            port: self.port,
            wait: config.wait,
            stats: self.stats,
            _state: PhantomData,
        }
    }
}

impl<H: SerialHardware, S> Uart<H, S> {
    /// The COM port this handle drives
    #[inline]
    pub fn port(&self) -> ComPort {
        self.port
    }

    /// The backend, for inspection
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// The backend, mutably
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Give the backend back, dropping the handle.
    pub fn into_hardware(self) -> H {
        self.hw
    }

    fn program(&mut self, config: &SerialConfig) {
        let port = self.port;

        // Set DLAB on top of whatever the line control register holds
        let lcr = self.hw.read_byte(port.line_control());
        let lcr_latched = lcr | LineControl::DLAB.bits();
        self.hw.write_byte(port.line_control(), lcr_latched);

        self.hw.write_byte(port.data(), config.divisor.high_byte());
        self.hw.write_byte(port.data(), config.divisor.low_byte());

        self.hw
            .write_byte(port.line_control(), lcr_latched & !LineControl::DLAB.bits());

        self.hw.write_byte(port.line_control(), config.line.bits().bits());
        self.hw.write_byte(port.fifo_control(), config.fifo.bits().bits());
        self.hw.write_byte(port.modem_control(), config.modem.bits().bits());
    }
}

impl<H: SerialHardware> Uart<H, Configured> {
    /// Re-apply the full fixed configuration. Idempotent.
    pub fn reconfigure(&mut self, divisor: BaudDivisor) {
        self.program(&SerialConfig::with_divisor(divisor));
    }

    /// Re-apply `config`, including its wait policy.
    pub fn reconfigure_with(&mut self, config: &SerialConfig) {
        self.program(config);
        self.wait = config.wait;
    }

    /// Current transmit wait policy
    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    /// Replace the transmit wait policy; registers are untouched.
    pub fn set_wait_policy(&mut self, wait: WaitPolicy) {
        self.wait = wait;
    }

    /// Counters accumulated since configuration
    pub fn stats(&self) -> TransmitStats {
        self.stats
    }

    /// Whether the transmit FIFO is empty (line status bit 5).
    #[inline]
    pub fn is_transmit_ready(&mut self) -> bool {
        LineStatus::from_bits_retain(self.hw.read_byte(self.port.line_status())).transmit_ready()
    }

    /// Block until [`is_transmit_ready`](Self::is_transmit_ready) holds,
    /// subject to the wait policy.
    pub fn wait_until_ready(&mut self) -> Result<(), TimeoutError> {
        let policy = self.wait;
        let status = self.port.line_status();
        let hw = &mut self.hw;
        let mut polls = 0u64;

        let result = poll_with_timeout(policy, || {
            polls += 1;
            LineStatus::from_bits_retain(hw.read_byte(status)).transmit_ready()
        })
        .into_result();

        self.stats.ready_polls += polls;
        if result.is_err() {
            self.stats.timeouts += 1;
        }
        result
    }

    /// Transmit `buf` in FIFO-sized bursts.
    ///
    /// Each burst of at most [`FIFO_DEPTH`] bytes is preceded by a wait for
    /// an empty FIFO. An empty `buf` touches no register.
    pub fn write(&mut self, buf: &[u8]) -> Result<(), SerialError> {
        let data = self.port.data();
        let mut written = 0usize;

        for burst in buf.chunks(FIFO_DEPTH) {
            self.wait_until_ready()
                .map_err(|_| SerialError::Timeout { written })?;

            for &byte in burst {
                self.hw.write_byte(data, byte);
            }

            written += burst.len();
            self.stats.bursts += 1;
            self.stats.bytes += burst.len() as u64;
        }

        Ok(())
    }

    /// Transmit `len` bytes starting at `buf`.
    ///
    /// Entry point for callers holding a raw pointer (e.g. a C console). A
    /// null `buf` is rejected with [`SerialError::InvalidBuffer`] before any
    /// register access.
    ///
    /// # Safety
    ///
    /// If `buf` is non-null it must be valid for reads of `len` bytes for the
    /// duration of the call.
    pub unsafe fn write_raw(&mut self, buf: *const u8, len: usize) -> Result<(), SerialError> {
        if buf.is_null() {
            return Err(SerialError::InvalidBuffer);
        }
        // SAFETY: non-null, and the caller guarantees `len` readable bytes.
        let bytes = unsafe { core::slice::from_raw_parts(buf, len) };
        self.write(bytes)
    }
}

impl<H: SerialHardware> fmt::Write for Uart<H, Configured> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::sim::{Access, Readiness, SimulatedUart};

    fn configured(readiness: Readiness) -> Uart<SimulatedUart, Configured> {
        let com1 = ComPort::COM1;
        let sim = SimulatedUart::with_readiness(com1, readiness);
        let mut uart = Uart::new(sim, com1).configure(BaudDivisor::MAX_SPEED);
        uart.hardware_mut().clear_log();
        uart
    }

    #[test]
    fn configure_sequence_matches_register_map() {
        let com1 = ComPort::COM1;
        let sim = SimulatedUart::new(com1).with_line_control(0x03);
        let uart = Uart::new(sim, com1).configure(BaudDivisor::new(3).unwrap());

        assert_eq!(
            uart.hardware().accesses(),
            &[
                Access::Read { port: 0x3FB, value: 0x03 },
                Access::Write { port: 0x3FB, value: 0x83 },
                Access::Write { port: 0x3F8, value: 0x00 },
                Access::Write { port: 0x3F8, value: 0x03 },
                Access::Write { port: 0x3FB, value: 0x03 },
                Access::Write { port: 0x3FB, value: 0x03 },
                Access::Write { port: 0x3FA, value: 0xC7 },
                Access::Write { port: 0x3FC, value: 0x03 },
            ]
        );
    }

    #[test]
    fn dlab_toggle_preserves_unrelated_line_bits() {
        let com1 = ComPort::COM1;
        let sim = SimulatedUart::new(com1).with_line_control(0x1B);
        let uart = Uart::new(sim, com1).configure(BaudDivisor::MAX_SPEED);

        let lcr_writes: Vec<u8> = uart
            .hardware()
            .writes()
            .filter(|&(port, _)| port == com1.line_control())
            .map(|(_, value)| value)
            .collect();
        assert_eq!(lcr_writes, [0x9B, 0x1B, 0x03]);
    }

    #[test]
    fn zero_divisor_touches_nothing() {
        let com1 = ComPort::COM1;
        let err = Uart::new(SimulatedUart::new(com1), com1)
            .try_configure(0)
            .unwrap_err();
        assert_eq!(err, SerialError::InvalidDivisor);
    }

    #[test]
    fn empty_write_touches_nothing() {
        let mut uart = configured(Readiness::Always);
        assert_eq!(uart.write(b""), Ok(()));
        assert!(uart.hardware().accesses().is_empty());
        assert_eq!(uart.stats(), TransmitStats::default());
    }

    #[test]
    fn null_raw_buffer_is_rejected_without_io() {
        let mut uart = configured(Readiness::Always);
        let result = unsafe { uart.write_raw(core::ptr::null(), 5) };
        assert_eq!(result, Err(SerialError::InvalidBuffer));
        assert!(uart.hardware().accesses().is_empty());
    }

    #[test]
    fn raw_write_sends_bytes() {
        let mut uart = configured(Readiness::Always);
        let msg = b"raw";
        unsafe { uart.write_raw(msg.as_ptr(), msg.len()) }.unwrap();
        assert_eq!(uart.hardware().transmitted(), b"raw");
    }

    #[test]
    fn thirty_bytes_go_out_in_three_bursts() {
        let mut uart = configured(Readiness::Always);
        let payload: Vec<u8> = (0..30).collect();
        uart.write(&payload).unwrap();

        let sizes: Vec<usize> = uart.hardware().bursts().iter().map(Vec::len).collect();
        assert_eq!(sizes, [14, 14, 2]);
        assert_eq!(uart.hardware().transmitted(), payload);
        assert_eq!(uart.stats().bursts, 3);
        assert_eq!(uart.stats().bytes, 30);
    }

    #[test]
    fn waits_for_readiness_before_each_burst() {
        let mut uart = configured(Readiness::After(3));
        uart.write(&[0u8; 20]).unwrap();

        // 3 busy polls + 1 ready poll, per burst
        assert_eq!(uart.hardware().status_polls(), 8);
        assert_eq!(uart.stats().ready_polls, 8);
        assert_eq!(uart.hardware().transmitted().len(), 20);
    }

    #[test]
    fn bounded_wait_reports_timeout() {
        let mut uart = configured(Readiness::Never);
        uart.set_wait_policy(WaitPolicy::bounded(16));

        assert_eq!(uart.write(b"lost"), Err(SerialError::Timeout { written: 0 }));
        assert_eq!(uart.hardware().status_polls(), 16);
        assert!(uart.hardware().transmitted().is_empty());
        assert_eq!(uart.stats().timeouts, 1);
    }

    #[test]
    fn timeout_reports_partial_progress() {
        let mut uart = configured(Readiness::ReadyFor(1));
        uart.set_wait_policy(WaitPolicy::bounded(4));

        assert_eq!(
            uart.write(&[b'b'; 20]),
            Err(SerialError::Timeout { written: 14 })
        );
        assert_eq!(uart.hardware().transmitted(), [b'b'; 14]);
        assert_eq!(uart.stats().bytes, 14);
    }

    #[test]
    fn stats_accumulate_across_writes() {
        let mut uart = configured(Readiness::ReadyFor(2));
        uart.set_wait_policy(WaitPolicy::bounded(5));

        uart.write(b"first").unwrap();
        uart.write(b"second").unwrap();
        assert_eq!(uart.write(b"third"), Err(SerialError::Timeout { written: 0 }));

        assert_eq!(
            uart.stats(),
            TransmitStats {
                bytes: 11,
                bursts: 2,
                ready_polls: 7,
                timeouts: 1,
            }
        );
        assert_eq!(
            uart.wait_until_ready(),
            Err(TimeoutError {
                iterations: 5,
                total_waits: 0
            })
        );
        assert_eq!(uart.stats().timeouts, 2);
    }

    #[test]
    fn is_transmit_ready_reads_status_once() {
        let mut uart = configured(Readiness::Always);
        assert!(uart.is_transmit_ready());
        assert_eq!(uart.hardware().accesses().len(), 1);
    }

    #[test]
    fn fmt_write_goes_through_bursts() {
        use core::fmt::Write;
        let mut uart = configured(Readiness::Always);
        write!(uart, "value={}", 42).unwrap();
        assert_eq!(uart.hardware().transmitted(), b"value=42");
    }
}
