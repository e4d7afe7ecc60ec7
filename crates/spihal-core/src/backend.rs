//! Backend trait definitions
//!
//! A backend is the thing that actually moves bytes: the Linux spidev
//! driver, or a loopback stub for testing. Everything above it (handle
//! lifetime, chunking, bit-order emulation) lives in this crate and is
//! shared by all backends.

use crate::config::{DevicePath, SpiConfig};
use crate::error::Result;
use alloc::string::String;

/// Identification returned by [`SpiBackend::info`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    /// Short backend identifier ("spidev", "stub")
    pub name: &'static str,
    /// Human readable description
    pub description: &'static str,
    /// Kernel release, for backends that talk to a kernel driver
    pub kernel_version: Option<String>,
    /// Machine hardware name, for backends that talk to a kernel driver
    pub machine: Option<String>,
}

impl BackendInfo {
    /// Info carrying only a name and description
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            kernel_version: None,
            machine: None,
        }
    }
}

/// SPI backend contract
///
/// Implementations are blocking. A backend value carries no per-device
/// state; everything belonging to one open device lives in its `Channel`,
/// which the [`SpiDevice`](crate::SpiDevice) handle owns.
///
/// ## Chunking
///
/// [`exchange`](SpiBackend::exchange) is only ever called with at most
/// [`max_transfer_size`](SpiBackend::max_transfer_size) bytes (as sampled
/// when the device was opened). Backends must not split or pad on their own.
pub trait SpiBackend {
    /// Open resource for one device (a file descriptor, or nothing at all)
    type Channel;

    /// Describe this backend. Never fails.
    fn info(&self) -> BackendInfo;

    /// Largest number of bytes a single exchange may carry
    ///
    /// Advisory: a wrong value costs efficiency, never correctness.
    fn max_transfer_size(&self) -> u64;

    /// Open and configure a device
    ///
    /// Returns the channel together with the effective configuration. If
    /// configuration fails the partially configured resource must be
    /// released before the error is returned.
    fn open(&self, path: &DevicePath, requested: &SpiConfig) -> Result<(Self::Channel, SpiConfig)>;

    /// Release a channel
    fn close(&self, channel: Self::Channel);

    /// Perform one full-duplex exchange of `write.len()` bytes into `read`
    ///
    /// `read` is always the same length as `write`.
    fn exchange(
        &self,
        channel: &mut Self::Channel,
        config: &SpiConfig,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<()>;
}
