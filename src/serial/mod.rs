// src/serial/mod.rs

//! Polled 16550 UART transmitter
//!
//! Provides configuration and FIFO-burst transmission on any PC COM port:
//! - Baud rate as a divisor of 115200 (divisor latch toggled read-modify-write)
//! - 8 data bits, no parity, 1 stop bit (8N1), break disabled
//! - FIFO enabled and cleared, 14-byte trigger level
//! - RTS and DTR asserted
//! - Transmission in bursts of at most 14 bytes, each after the FIFO drains
//!
//! Register access goes through the [`SerialHardware`] trait; on x86_64 the
//! [`DefaultBackend`] issues real `in`/`out` instructions, limited to the
//! registers of the UART it was created for.

pub mod backend;
pub mod config;
pub mod constants;
mod error;
pub mod port;
pub mod registers;
pub mod sim;
pub mod timeout;
mod uart;

pub use backend::{default_backend, DefaultBackend, SerialHardware, StubSerialBackend};
#[cfg(target_arch = "x86_64")]
pub use backend::PortIoBackend;
pub use config::{
    BaudDivisor, DataBits, FifoConfig, LineConfig, ModemConfig, Parity, SerialConfig, StopBits,
    TriggerLevel,
};
pub use error::SerialError;
pub use port::ComPort;
pub use timeout::{
    poll_with_timeout, BackoffStrategy, TimeoutContext, TimeoutError, TimeoutResult, WaitPolicy,
};
pub use uart::{Configured, TransmitStats, Uart, Unconfigured};
