//! Error types for spidev operations

use spihal_core::Error as CoreError;
use thiserror::Error;

/// spidev specific errors
#[derive(Debug, Error)]
pub enum SpidevError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set SPI mode
    #[error("Failed to set SPI mode to {mode}: {source}")]
    SetModeFailed {
        mode: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bits per word
    #[error("Failed to set bits per word to {bits}: {source}")]
    SetBitsPerWordFailed {
        bits: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("Failed to set clock speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },

    /// SPI_IOC_MESSAGE failed
    #[error("SPI transfer of {len} bytes failed: {source}")]
    TransferFailed {
        len: usize,
        #[source]
        source: std::io::Error,
    },

    /// Buffers handed to an exchange disagree in length or exceed the
    /// kernel's 32-bit length field
    #[error("Invalid transfer length: write {write}, read {read}")]
    InvalidLength { write: usize, read: usize },
}

impl From<SpidevError> for CoreError {
    fn from(e: SpidevError) -> Self {
        match e {
            SpidevError::OpenFailed { .. } => CoreError::AccessDenied,
            SpidevError::SetModeFailed { .. } => CoreError::InvalidMode,
            SpidevError::SetBitsPerWordFailed { .. } => CoreError::InvalidBitsPerWord,
            SpidevError::SetSpeedFailed { .. } => CoreError::InvalidSpeed,
            SpidevError::TransferFailed { .. } | SpidevError::InvalidLength { .. } => {
                CoreError::TransferFailed
            }
        }
    }
}

/// Result type for spidev operations
pub type Result<T> = std::result::Result<T, SpidevError>;
