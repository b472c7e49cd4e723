// src/lib.rs
//! Tiny Serial - polled 16550 UART transmitter for bare-metal kernels
//!
//! - [`serial`]: the transmitter itself ([`serial::Uart`]), its register map,
//!   configuration and wait policies, and the hardware backend seam
//! - [`console`]: the lock-protected kernel console and `serial_print!`
//! - [`logger`]: a `log` backend on top of the console
//!
//! ```no_run
//! use tiny_serial::serial::{default_backend, BaudDivisor, ComPort, Uart};
//!
//! // SAFETY: nothing else drives COM1 in this kernel.
//! let hw = unsafe { default_backend(ComPort::COM1) };
//! let mut com1 = Uart::new(hw, ComPort::COM1).configure(BaudDivisor::MAX_SPEED);
//! com1.write(b"HI").expect("unbounded wait never times out");
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

pub mod serial;

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "console")]
pub mod logger;

pub use serial::{ComPort, SerialError};
