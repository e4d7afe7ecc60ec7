//! SPI bus configuration
//!
//! [`SpiConfig`] carries both what the caller asked for and, once a device is
//! open, what the driver actually agreed to. [`DevicePath`] resolves the
//! caller's short device name into a bounded filesystem path.

use crate::error::{Error, Result};
use bitflags::bitflags;
use core::fmt;

/// Fallback single-exchange size when the backend cannot say (Linux default)
pub const DEFAULT_MAX_TRANSFER_SIZE: u64 = 4096;

/// Longest device path accepted, in bytes
pub const MAX_DEVICE_PATH_LEN: usize = 63;

/// Directory prefixed to short device names
pub const DEV_ROOT: &str = "/dev/";

/// Default SPI clock speed in Hz (1 MHz)
pub const DEFAULT_SPEED_HZ: u32 = 1_000_000;

/// Default word size
pub const DEFAULT_BITS_PER_WORD: u8 = 8;

/// SPI mode constants
pub mod mode {
    /// SPI mode 0: CPOL=0, CPHA=0
    pub const MODE_0: u8 = 0;
    /// SPI mode 1: CPOL=0, CPHA=1
    pub const MODE_1: u8 = 1;
    /// SPI mode 2: CPOL=1, CPHA=0
    pub const MODE_2: u8 = 2;
    /// SPI mode 3: CPOL=1, CPHA=1
    pub const MODE_3: u8 = 3;
}

bitflags! {
    /// Bits of the spidev mode byte
    ///
    /// Only CPOL and CPHA form the SPI mode proper; the remaining flags are
    /// what some controllers report back alongside it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpiMode: u8 {
        /// Clock phase
        const CPHA = 0x01;
        /// Clock polarity
        const CPOL = 0x02;
        /// Chip select active high
        const CS_HIGH = 0x04;
        /// Shift least significant bit first
        const LSB_FIRST = 0x08;
        /// Shared SI/SO signal
        const THREE_WIRE = 0x10;
        /// Loopback mode
        const LOOP = 0x20;
        /// No chip select
        const NO_CS = 0x40;
        /// Slave pulls low to pause
        const READY = 0x80;

        /// The 2-bit clock mode field
        const CLOCK = Self::CPHA.bits() | Self::CPOL.bits();
    }
}

impl SpiMode {
    /// Strip everything but CPOL/CPHA from a raw mode byte
    pub fn normalize(raw: u8) -> u8 {
        Self::from_bits_retain(raw).intersection(Self::CLOCK).bits()
    }
}

/// SPI bus configuration
///
/// Before open this is the requested configuration. After open it holds the
/// effective values negotiated with the driver, and `sw_lsb_first` records
/// whether bit order has to be emulated in software. It never changes for
/// the lifetime of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    /// Clock polarity/phase (0-3)
    pub mode: u8,
    /// Device word size
    pub bits_per_word: u8,
    /// Clock rate ceiling in Hz
    pub speed_hz: u32,
    /// Pause after each exchange in microseconds
    pub delay_us: u16,
    /// Requested bit order
    pub lsb_first: bool,
    /// LSB-first was requested but the hardware refused it
    pub sw_lsb_first: bool,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            mode: mode::MODE_0,
            bits_per_word: DEFAULT_BITS_PER_WORD,
            speed_hz: DEFAULT_SPEED_HZ,
            delay_us: 0,
            lsb_first: false,
            sw_lsb_first: false,
        }
    }
}

impl SpiConfig {
    /// Build a requested configuration from unchecked caller integers
    ///
    /// Values that do not fit the kernel's field widths are rejected rather
    /// than truncated.
    pub fn from_raw(
        mode: u32,
        bits_per_word: u32,
        speed_hz: u32,
        delay_us: u32,
        lsb_first: bool,
    ) -> Result<Self> {
        let mode = u8::try_from(mode)
            .ok()
            .filter(|&m| m & !SpiMode::CLOCK.bits() == 0)
            .ok_or(Error::InvalidMode)?;
        let bits_per_word = u8::try_from(bits_per_word).map_err(|_| Error::InvalidBitsPerWord)?;
        let delay_us = u16::try_from(delay_us).map_err(|_| Error::InvalidArgument)?;

        Ok(Self {
            mode,
            bits_per_word,
            speed_hz,
            delay_us,
            lsb_first,
            sw_lsb_first: false,
        })
    }

    /// Set the SPI mode (0-3)
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Set the word size
    pub fn with_bits_per_word(mut self, bits: u8) -> Self {
        self.bits_per_word = bits;
        self
    }

    /// Set the SPI clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the inter-transfer delay in microseconds
    pub fn with_delay_us(mut self, delay_us: u16) -> Self {
        self.delay_us = delay_us;
        self
    }

    /// Request LSB-first bit order
    pub fn with_lsb_first(mut self, lsb_first: bool) -> Self {
        self.lsb_first = lsb_first;
        self
    }

    /// Clock mode as flags
    pub fn spi_mode(&self) -> SpiMode {
        SpiMode::from_bits_retain(self.mode)
    }
}

/// Resolved path of an SPI character device
///
/// Short names such as `spidev0.0` are placed under `/dev/`; absolute paths
/// are used as given. The result never exceeds [`MAX_DEVICE_PATH_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePath(heapless::String<MAX_DEVICE_PATH_LEN>);

impl DevicePath {
    /// Resolve a caller-supplied device name
    pub fn resolve(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains('\0') {
            return Err(Error::InvalidArgument);
        }

        let mut path = heapless::String::new();
        if !name.starts_with('/') {
            path.push_str(DEV_ROOT).map_err(|_| Error::InvalidArgument)?;
        }
        path.push_str(name).map_err(|_| {
            log::debug!(
                "device name '{}' exceeds the {} byte path bound",
                name,
                MAX_DEVICE_PATH_LEN
            );
            Error::InvalidArgument
        })?;

        Ok(Self(path))
    }

    /// The path as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for DevicePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
