// src/serial/error.rs

//! Error types for serial port operations

/// Errors reported by the transmitter and the serial console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    /// Null buffer passed to a raw write; nothing was transmitted
    InvalidBuffer,
    /// Baud divisor of zero
    InvalidDivisor,
    /// Transmitter never reported ready within the configured wait ceiling
    Timeout {
        /// Bytes already handed to the FIFO before the wait gave up
        written: usize,
    },
    /// Console used before `init`
    NotConfigured,
    /// Console or logger installed twice
    AlreadyInitialized,
    /// Console lock held by another context
    Busy,
}

impl SerialError {
    /// Short description without the variant's payload
    pub const fn as_str(&self) -> &'static str {
        match self {
            SerialError::InvalidBuffer => "invalid buffer",
            SerialError::InvalidDivisor => "invalid baud divisor",
            SerialError::Timeout { .. } => "transmit timeout",
            SerialError::NotConfigured => "serial port not configured",
            SerialError::AlreadyInitialized => "serial port already initialized",
            SerialError::Busy => "serial port busy",
        }
    }
}

impl core::fmt::Display for SerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SerialError::Timeout { written } => {
                write!(f, "{} after {} bytes", self.as_str(), written)
            }
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_timeout_progress() {
        assert_eq!(format!("{}", SerialError::InvalidBuffer), "invalid buffer");
        assert_eq!(
            format!("{}", SerialError::Timeout { written: 28 }),
            "transmit timeout after 28 bytes"
        );
    }
}
