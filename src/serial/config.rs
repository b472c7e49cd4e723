// src/serial/config.rs

//! Line, FIFO, modem and baud settings applied by `configure`.
//!
//! The defaults are the fixed values the transmitter was designed around:
//! 115200 baud, 8N1 without break, FIFO enabled and cleared with a 14-byte
//! trigger, RTS and DTR asserted.

use super::constants::BASE_BAUD;
use super::registers::{FifoControl, LineControl, ModemControl};
use super::timeout::WaitPolicy;
use core::num::NonZeroU16;

/// Baud rate divisor; the line runs at `115200 / divisor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaudDivisor(NonZeroU16);

impl BaudDivisor {
    /// Divisor 1, 115200 baud
    pub const MAX_SPEED: BaudDivisor = BaudDivisor(NonZeroU16::MIN);

    /// `None` for a zero divisor.
    pub const fn new(divisor: u16) -> Option<Self> {
        match NonZeroU16::new(divisor) {
            Some(d) => Some(Self(d)),
            None => None,
        }
    }

    /// Divisor for `baud`, if `baud` divides the base clock exactly.
    pub const fn from_baud(baud: u32) -> Option<Self> {
        if baud == 0 || BASE_BAUD % baud != 0 {
            return None;
        }
        let divisor = BASE_BAUD / baud;
        if divisor > u16::MAX as u32 {
            return None;
        }
        Self::new(divisor as u16)
    }

    /// Raw divisor value
    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    /// Resulting line rate in bits per second
    pub const fn baud(self) -> u32 {
        BASE_BAUD / self.0.get() as u32
    }

    /// Divisor latch high byte (DLM)
    #[inline]
    pub const fn high_byte(self) -> u8 {
        (self.0.get() >> 8) as u8
    }

    /// Divisor latch low byte (DLL)
    #[inline]
    pub const fn low_byte(self) -> u8 {
        (self.0.get() & 0x00FF) as u8
    }
}

impl Default for BaudDivisor {
    fn default() -> Self {
        Self::MAX_SPEED
    }
}

/// Character length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity bit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit
    None,
    /// Odd number of set bits
    Odd,
    /// Even number of set bits
    Even,
    /// Parity bit always 1
    Mark,
    /// Parity bit always 0
    Space,
}

/// Stop bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    /// One stop bit
    One,
    /// Two stop bits (1.5 with five data bits)
    Two,
}

/// Line control settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    /// Character length
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Hold the line in the break condition
    pub break_enabled: bool,
}

impl LineConfig {
    /// 8 data bits, no parity, 1 stop bit, no break (`0x03`)
    pub const EIGHT_N_ONE: LineConfig = LineConfig {
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
        break_enabled: false,
    };

    /// Encode as a Line Control Register value with DLAB clear.
    pub const fn bits(&self) -> LineControl {
        let length = match self.data_bits {
            DataBits::Five => LineControl::empty(),
            DataBits::Six => LineControl::WORD_LENGTH_0,
            DataBits::Seven => LineControl::WORD_LENGTH_1,
            DataBits::Eight => LineControl::WORD_LENGTH_0.union(LineControl::WORD_LENGTH_1),
        };
        let parity = match self.parity {
            Parity::None => LineControl::empty(),
            Parity::Odd => LineControl::PARITY_ENABLE,
            Parity::Even => LineControl::PARITY_ENABLE.union(LineControl::EVEN_PARITY),
            Parity::Mark => LineControl::PARITY_ENABLE.union(LineControl::STICK_PARITY),
            Parity::Space => LineControl::PARITY_ENABLE
                .union(LineControl::EVEN_PARITY)
                .union(LineControl::STICK_PARITY),
        };
        let stop = match self.stop_bits {
            StopBits::One => LineControl::empty(),
            StopBits::Two => LineControl::TWO_STOP_BITS,
        };
        let brk = if self.break_enabled {
            LineControl::BREAK
        } else {
            LineControl::empty()
        };
        length.union(parity).union(stop).union(brk)
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self::EIGHT_N_ONE
    }
}

/// Receive FIFO interrupt trigger level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerLevel {
    /// 1 byte
    One,
    /// 4 bytes
    Four,
    /// 8 bytes
    Eight,
    /// 14 bytes
    Fourteen,
}

/// FIFO control settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoConfig {
    /// Enable both FIFOs
    pub enabled: bool,
    /// Discard pending received bytes
    pub clear_rx: bool,
    /// Discard pending transmit bytes
    pub clear_tx: bool,
    /// Receive interrupt threshold
    pub trigger: TriggerLevel,
}

impl FifoConfig {
    /// Enabled, both queues cleared, 14-byte trigger (`0xC7`)
    pub const DEFAULT: FifoConfig = FifoConfig {
        enabled: true,
        clear_rx: true,
        clear_tx: true,
        trigger: TriggerLevel::Fourteen,
    };

    /// Encode as a FIFO Control Register value.
    pub const fn bits(&self) -> FifoControl {
        let mut bits = FifoControl::empty();
        if self.enabled {
            bits = bits.union(FifoControl::ENABLE);
        }
        if self.clear_rx {
            bits = bits.union(FifoControl::CLEAR_RX);
        }
        if self.clear_tx {
            bits = bits.union(FifoControl::CLEAR_TX);
        }
        let level = match self.trigger {
            TriggerLevel::One => FifoControl::empty(),
            TriggerLevel::Four => FifoControl::TRIGGER_LOW,
            TriggerLevel::Eight => FifoControl::TRIGGER_HIGH,
            TriggerLevel::Fourteen => FifoControl::TRIGGER_LOW.union(FifoControl::TRIGGER_HIGH),
        };
        bits.union(level)
    }
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Modem control settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemConfig {
    /// Data terminal ready
    pub dtr: bool,
    /// Request to send
    pub rts: bool,
    /// Auxiliary output 1
    pub out1: bool,
    /// Gates the UART interrupt line on PC hardware
    pub out2: bool,
    /// Route TX back to RX internally
    pub loopback: bool,
}

impl ModemConfig {
    /// Request-to-send and data-terminal-ready (`0x03`)
    pub const RTS_DTR: ModemConfig = ModemConfig {
        dtr: true,
        rts: true,
        out1: false,
        out2: false,
        loopback: false,
    };

    /// Encode as a Modem Control Register value.
    pub const fn bits(&self) -> ModemControl {
        let mut bits = ModemControl::empty();
        if self.dtr {
            bits = bits.union(ModemControl::DTR);
        }
        if self.rts {
            bits = bits.union(ModemControl::RTS);
        }
        if self.out1 {
            bits = bits.union(ModemControl::OUT1);
        }
        if self.out2 {
            bits = bits.union(ModemControl::OUT2);
        }
        if self.loopback {
            bits = bits.union(ModemControl::LOOPBACK);
        }
        bits
    }
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self::RTS_DTR
    }
}

/// Everything `configure_with` programs, plus the transmit wait policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate divisor
    pub divisor: BaudDivisor,
    /// Line control
    pub line: LineConfig,
    /// FIFO control
    pub fifo: FifoConfig,
    /// Modem control
    pub modem: ModemConfig,
    /// How long `write` waits for the FIFO to drain
    pub wait: WaitPolicy,
}

impl SerialConfig {
    /// Fixed configuration at the given divisor, unbounded transmit wait.
    pub const fn with_divisor(divisor: BaudDivisor) -> Self {
        Self {
            divisor,
            line: LineConfig::EIGHT_N_ONE,
            fifo: FifoConfig::DEFAULT,
            modem: ModemConfig::RTS_DTR,
            wait: WaitPolicy::unbounded(),
        }
    }

    /// Replace the transmit wait policy.
    pub const fn wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::with_divisor(BaudDivisor::MAX_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::constants::{FIFO_ENABLE_CLEAR_14, LINE_8N1, MODEM_RTS_DTR};

    #[test]
    fn defaults_encode_fixed_register_values() {
        let config = SerialConfig::default();
        assert_eq!(config.divisor.get(), 1);
        assert_eq!(config.line.bits().bits(), LINE_8N1);
        assert_eq!(config.fifo.bits().bits(), FIFO_ENABLE_CLEAR_14);
        assert_eq!(config.modem.bits().bits(), MODEM_RTS_DTR);
        assert!(!config.wait.is_bounded());
    }

    #[test]
    fn zero_divisor_is_rejected() {
        assert!(BaudDivisor::new(0).is_none());
        assert_eq!(BaudDivisor::from_baud(0), None);
    }

    #[test]
    fn divisor_baud_round_trip() {
        let d = BaudDivisor::from_baud(38_400).unwrap();
        assert_eq!(d.get(), 3);
        assert_eq!(d.baud(), 38_400);
        assert_eq!(BaudDivisor::from_baud(1_000), None);
    }

    #[test]
    fn divisor_bytes_split() {
        let d = BaudDivisor::new(0x0180).unwrap();
        assert_eq!(d.high_byte(), 0x01);
        assert_eq!(d.low_byte(), 0x80);
    }

    #[test]
    fn line_config_variants() {
        let seven_e_two = LineConfig {
            data_bits: DataBits::Seven,
            parity: Parity::Even,
            stop_bits: StopBits::Two,
            break_enabled: false,
        };
        assert_eq!(seven_e_two.bits().bits(), 0b0001_1110);
        assert!(!seven_e_two.bits().contains(LineControl::DLAB));
    }
}
