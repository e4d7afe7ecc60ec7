//! spihal-stub - Loopback SPI backend for testing
//!
//! This crate provides a backend that needs no hardware: every exchange
//! copies the write buffer straight into the read buffer. It's useful for
//! testing callers on a development host.
//!
//! [`LoopbackStub::msb_only`] additionally behaves like a controller that
//! cannot shift LSB-first, which forces the HAL to emulate bit order in
//! software. Since the loopback echoes exactly, the emulation cancels out
//! and transfers still return what was written.

#![cfg_attr(not(feature = "std"), no_std)]

use spihal_core::config::DEFAULT_MAX_TRANSFER_SIZE;
use spihal_core::error::{Error, Result};
use spihal_core::{BackendInfo, DevicePath, SpiBackend, SpiConfig};

/// Backend identifier
pub const NAME: &str = "stub";

/// Loopback backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopbackStub {
    hw_lsb_first: bool,
}

impl Default for LoopbackStub {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackStub {
    /// Create a loopback that accepts every configuration
    pub const fn new() -> Self {
        Self { hw_lsb_first: true }
    }

    /// Create a loopback that refuses LSB-first, like an MSB-only controller
    pub const fn msb_only() -> Self {
        Self {
            hw_lsb_first: false,
        }
    }

    /// Whether LSB-first requests are honored "in hardware"
    pub fn supports_lsb_first(&self) -> bool {
        self.hw_lsb_first
    }
}

/// Open loopback channel
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoopbackChannel {
    exchanges: usize,
    bytes: usize,
}

impl LoopbackChannel {
    /// Number of exchanges performed on this channel
    pub fn exchanges(&self) -> usize {
        self.exchanges
    }

    /// Total bytes looped back on this channel
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl SpiBackend for LoopbackStub {
    type Channel = LoopbackChannel;

    fn info(&self) -> BackendInfo {
        BackendInfo::new(NAME, "Loopback stub (no hardware)")
    }

    fn max_transfer_size(&self) -> u64 {
        DEFAULT_MAX_TRANSFER_SIZE
    }

    fn open(&self, path: &DevicePath, requested: &SpiConfig) -> Result<(LoopbackChannel, SpiConfig)> {
        let mut config = *requested;
        config.sw_lsb_first = requested.lsb_first && !self.hw_lsb_first;

        log::debug!(
            "stub: Opened {} (mode={}, speed={} kHz, lsb_first={}, sw_lsb_first={})",
            path,
            config.mode,
            config.speed_hz / 1000,
            config.lsb_first,
            config.sw_lsb_first
        );

        Ok((LoopbackChannel::default(), config))
    }

    fn close(&self, channel: LoopbackChannel) {
        log::trace!(
            "stub: closed after {} exchange(s), {} byte(s)",
            channel.exchanges,
            channel.bytes
        );
    }

    fn exchange(
        &self,
        channel: &mut LoopbackChannel,
        _config: &SpiConfig,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<()> {
        if read.len() != write.len() {
            return Err(Error::TransferFailed);
        }

        read.copy_from_slice(write);
        channel.exchanges += 1;
        channel.bytes += write.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spihal_core::SpiDevice;

    fn open(stub: LoopbackStub, config: SpiConfig) -> SpiDevice<LoopbackStub> {
        SpiDevice::open(stub, "spidev0.0", config).unwrap()
    }

    #[test]
    fn test_info() {
        let info = LoopbackStub::new().info();
        assert_eq!(info.name, "stub");
        assert!(info.kernel_version.is_none());
        assert_eq!(LoopbackStub::new().max_transfer_size(), 4096);
    }

    #[test]
    fn test_open_transfer_close_scenario() {
        let config = SpiConfig::from_raw(0, 8, 500_000, 0, false).unwrap();
        let mut dev = open(LoopbackStub::new(), config);

        assert_eq!(dev.transfer(&[0x01, 0x02, 0x03]).unwrap(), vec![0x01, 0x02, 0x03]);
        dev.close();
        assert_eq!(dev.transfer(&[0x00]), Err(Error::InvalidHandle));
    }

    #[test]
    fn test_loopback_identity() {
        let mut dev = open(LoopbackStub::new(), SpiConfig::default());
        for len in [0usize, 1, 2, 255, 4095, 4096, 4097, 9000] {
            let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            assert_eq!(dev.transfer(&data).unwrap(), data);
        }
    }

    #[test]
    fn test_large_transfer_is_chunked() {
        let mut dev = open(LoopbackStub::new(), SpiConfig::default());
        let data: Vec<u8> = (0..10_000).map(|i| (i % 256) as u8).collect();

        let read = dev.transfer(&data).unwrap();
        assert_eq!(read.len(), 10_000);
        assert_eq!(read, data);

        let channel = dev.channel().unwrap();
        assert_eq!(channel.exchanges(), 3);
        assert_eq!(channel.bytes(), 10_000);
    }

    #[test]
    fn test_msb_only_emulates_lsb_first() {
        let config = SpiConfig::default().with_lsb_first(true);
        let mut dev = open(LoopbackStub::msb_only(), config);
        assert!(dev.config().lsb_first);
        assert!(dev.config().sw_lsb_first);

        let data = [0x01, 0x80, 0x12, 0xFE];
        assert_eq!(dev.transfer(&data).unwrap(), data.to_vec());
    }

    #[test]
    fn test_msb_only_without_lsb_request() {
        let dev = open(LoopbackStub::msb_only(), SpiConfig::default());
        assert!(!dev.config().sw_lsb_first);
    }

    #[test]
    fn test_lsb_capable_stub_does_not_emulate() {
        let config = SpiConfig::default().with_lsb_first(true);
        let dev = open(LoopbackStub::new(), config);
        assert!(!dev.config().sw_lsb_first);
    }

    #[test]
    fn test_double_close() {
        let mut dev = open(LoopbackStub::new(), SpiConfig::default());
        dev.close();
        dev.close();
        assert!(!dev.is_open());
        assert!(dev.channel().is_none());
    }
}
