// src/serial/registers.rs

//! Bit layouts of the 16550 control and status registers.

use bitflags::bitflags;

bitflags! {
    /// Line Control Register (base + 3)
    ///
    /// ```text
    /// Bit:     | 7    | 6   | 5 4 3  | 2    | 1 0 |
    /// Content: | dlab | brk | parity | stop | len |
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineControl: u8 {
        /// Word length select, low bit
        const WORD_LENGTH_0 = 1 << 0;
        /// Word length select, high bit
        const WORD_LENGTH_1 = 1 << 1;
        /// Two stop bits
        const TWO_STOP_BITS = 1 << 2;
        /// Generate and check parity
        const PARITY_ENABLE = 1 << 3;
        /// Even rather than odd parity
        const EVEN_PARITY = 1 << 4;
        /// Force the parity bit (mark/space)
        const STICK_PARITY = 1 << 5;
        /// Hold TX low
        const BREAK = 1 << 6;
        /// Divisor latch access: data/IER become DLL/DLM while set
        const DLAB = 1 << 7;
    }
}

bitflags! {
    /// FIFO Control Register (base + 2), write-only
    ///
    /// ```text
    /// Bit:     | 7 6 | 5  | 4 | 3   | 2   | 1   | 0 |
    /// Content: | lvl | bs | r | dma | clt | clr | e |
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FifoControl: u8 {
        /// Enable both FIFOs
        const ENABLE = 1 << 0;
        /// Clear receive FIFO (self-clearing)
        const CLEAR_RX = 1 << 1;
        /// Clear transmit FIFO (self-clearing)
        const CLEAR_TX = 1 << 2;
        /// DMA mode select
        const DMA_MODE = 1 << 3;
        /// Receive trigger level, low bit
        const TRIGGER_LOW = 1 << 6;
        /// Receive trigger level, high bit
        const TRIGGER_HIGH = 1 << 7;
    }
}

bitflags! {
    /// Modem Control Register (base + 4)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModemControl: u8 {
        /// Data terminal ready
        const DTR = 1 << 0;
        /// Request to send
        const RTS = 1 << 1;
        /// Auxiliary output 1
        const OUT1 = 1 << 2;
        /// Auxiliary output 2 (IRQ gate on PCs)
        const OUT2 = 1 << 3;
        /// Internal loopback
        const LOOPBACK = 1 << 4;
    }
}

bitflags! {
    /// Line Status Register (base + 5), read-only
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineStatus: u8 {
        /// Received byte waiting
        const DATA_READY = 1 << 0;
        /// Receive overrun
        const OVERRUN_ERROR = 1 << 1;
        /// Parity error
        const PARITY_ERROR = 1 << 2;
        /// Missing stop bit
        const FRAMING_ERROR = 1 << 3;
        /// Break received
        const BREAK_INTERRUPT = 1 << 4;
        /// Transmit holding register / FIFO empty
        const TRANSMIT_EMPTY = 1 << 5;
        /// Holding register and shift register empty
        const TRANSMITTER_IDLE = 1 << 6;
        /// Error somewhere in the receive FIFO
        const FIFO_ERROR = 1 << 7;
    }
}

impl LineStatus {
    /// Whether the transmit FIFO can take a full burst.
    #[inline]
    pub const fn transmit_ready(self) -> bool {
        self.contains(LineStatus::TRANSMIT_EMPTY)
    }
}
