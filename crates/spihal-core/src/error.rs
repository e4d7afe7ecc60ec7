//! Error types for spihal-core
//!
//! Every failure the HAL reports collapses into one of a handful of short
//! symbolic codes. The error is `Copy` and `no_std` compatible; backends
//! keep richer errors of their own and convert into this one at the
//! contract boundary.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Device path could not be opened (permissions, nonexistent device)
    AccessDenied,
    /// Kernel rejected the requested SPI mode
    InvalidMode,
    /// Kernel rejected the requested word size
    InvalidBitsPerWord,
    /// Kernel rejected the requested clock speed
    InvalidSpeed,
    /// Malformed argument, e.g. a device name that overflows the path bound
    InvalidArgument,
    /// Buffer allocation for a transfer could not be satisfied
    AllocFailed,
    /// The underlying exchange reported failure
    TransferFailed,
    /// Operation attempted on a handle that is closed
    InvalidHandle,
}

impl Error {
    /// Short symbolic code for this error, e.g. `access_denied`
    pub const fn as_atom(&self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::InvalidMode => "invalid_mode",
            Self::InvalidBitsPerWord => "invalid_bits_per_word",
            Self::InvalidSpeed => "invalid_speed",
            Self::InvalidArgument => "invalid_argument",
            Self::AllocFailed => "alloc_failed",
            Self::TransferFailed => "transfer_failed",
            Self::InvalidHandle => "invalid_handle",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessDenied => write!(f, "access denied to SPI device"),
            Self::InvalidMode => write!(f, "invalid SPI mode"),
            Self::InvalidBitsPerWord => write!(f, "invalid bits per word"),
            Self::InvalidSpeed => write!(f, "invalid SPI clock speed"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::AllocFailed => write!(f, "transfer buffer allocation failed"),
            Self::TransferFailed => write!(f, "SPI transfer failed"),
            Self::InvalidHandle => write!(f, "SPI handle is closed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
