// src/serial/constants.rs

//! Constants and register definitions for serial port operations

/// Register offsets from a COM port's base address
pub mod register_offset {
    /// Transmit holding / receive buffer; divisor latch low with DLAB
    pub const DATA: u16 = 0;
    /// Interrupt enable; divisor latch high with DLAB
    pub const INTERRUPT_ENABLE: u16 = 1;
    /// FIFO control (write-only)
    pub const FIFO_CONTROL: u16 = 2;
    /// Line control, including DLAB
    pub const LINE_CONTROL: u16 = 3;
    /// Modem control
    pub const MODEM_CONTROL: u16 = 4;
    /// Line status (read-only)
    pub const LINE_STATUS: u16 = 5;
}

/// Number of consecutive I/O addresses a 16550 decodes
pub const REGISTER_SPAN: u16 = 8;

/// Well-known base I/O addresses of the PC COM ports
pub mod base_address {
    /// First serial port
    pub const COM1: u16 = 0x3F8;
    /// Second serial port
    pub const COM2: u16 = 0x2F8;
    /// Third serial port
    pub const COM3: u16 = 0x3E8;
    /// Fourth serial port
    pub const COM4: u16 = 0x2E8;
}

/// UART input clock divided by 16; divisor 1 runs the line at this rate
pub const BASE_BAUD: u32 = 115_200;

/// Depth of the 16550 transmit FIFO in bytes
pub const FIFO_DEPTH: usize = 14;

/// Line control value for 8 data bits, no parity, one stop bit, no break
pub const LINE_8N1: u8 = 0x03;

/// FIFO control value: enable, clear RX and TX, 14-byte trigger level
pub const FIFO_ENABLE_CLEAR_14: u8 = 0xC7;

/// Modem control value: RTS and DTR asserted
pub const MODEM_RTS_DTR: u8 = 0x03;
