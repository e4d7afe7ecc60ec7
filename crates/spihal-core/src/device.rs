//! Device handle
//!
//! [`SpiDevice`] owns one open backend channel plus the configuration that
//! was negotiated for it. Closing is idempotent and also happens on drop, so
//! the channel is released exactly once on every path.

use crate::backend::{BackendInfo, SpiBackend};
use crate::config::{DevicePath, SpiConfig};
use crate::error::{Error, Result};
use crate::transfer;
use alloc::vec::Vec;

/// An open SPI device
///
/// A handle is single use: once closed it never reopens, and every further
/// transfer fails with [`Error::InvalidHandle`] without touching the
/// backend.
pub struct SpiDevice<B: SpiBackend> {
    backend: B,
    channel: Option<B::Channel>,
    path: DevicePath,
    config: SpiConfig,
    chunk_size: usize,
}

impl<B: SpiBackend> SpiDevice<B> {
    /// Open `device` on `backend` with the requested configuration
    ///
    /// `device` is either a short name under `/dev` (`"spidev0.0"`) or an
    /// absolute path.
    pub fn open(backend: B, device: &str, requested: SpiConfig) -> Result<Self> {
        let path = DevicePath::resolve(device)?;
        let (channel, config) = backend.open(&path, &requested)?;
        let chunk_size = transfer::chunk_size(backend.max_transfer_size());

        if config.sw_lsb_first {
            log::debug!("{}: emulating LSB-first in software", path);
        }

        Ok(Self {
            backend,
            channel: Some(channel),
            path,
            config,
            chunk_size,
        })
    }

    /// Effective configuration negotiated at open time
    pub fn config(&self) -> &SpiConfig {
        &self.config
    }

    /// Resolved device path
    pub fn path(&self) -> &DevicePath {
        &self.path
    }

    /// Largest number of bytes sent per backend exchange
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Whether the underlying channel is still held
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// The backend this device was opened on
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The open channel, if any
    pub fn channel(&self) -> Option<&B::Channel> {
        self.channel.as_ref()
    }

    /// Full-duplex transfer; returns as many bytes as were written
    ///
    /// On failure no read data is returned. Transfers longer than the chunk
    /// size are split into several exchanges.
    pub fn transfer(&mut self, write: &[u8]) -> Result<Vec<u8>> {
        if self.channel.is_none() {
            return Err(Error::InvalidHandle);
        }

        let mut read = transfer::alloc_buffer(write.len())?;
        self.transfer_into(write, &mut read)?;
        Ok(read)
    }

    /// Full-duplex transfer into a caller supplied buffer
    ///
    /// `read` must be exactly as long as `write`.
    pub fn transfer_into(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        let channel = self.channel.as_mut().ok_or(Error::InvalidHandle)?;
        transfer::run(
            &self.backend,
            channel,
            &self.config,
            self.chunk_size,
            write,
            read,
        )
    }

    /// Release the channel. Calling this again is a no-op.
    pub fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            log::debug!("{}: closing", self.path);
            self.backend.close(channel);
        }
    }

    /// Describe the backend this device runs on
    pub fn info(&self) -> BackendInfo {
        self.backend.info()
    }
}

impl<B: SpiBackend> Drop for SpiDevice<B> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<B: SpiBackend> core::fmt::Debug for SpiDevice<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpiDevice")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("chunk_size", &self.chunk_size)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Object-safe view of an open device
///
/// Lets callers hold devices of different backends behind one
/// `Box<dyn SpiPort>`.
pub trait SpiPort {
    /// Effective configuration
    fn config(&self) -> &SpiConfig;

    /// Whether the channel is still held
    fn is_open(&self) -> bool;

    /// Full-duplex transfer returning the read bytes
    fn transfer(&mut self, write: &[u8]) -> Result<Vec<u8>>;

    /// Full-duplex transfer into `read`
    fn transfer_into(&mut self, write: &[u8], read: &mut [u8]) -> Result<()>;

    /// Release the channel (idempotent)
    fn close(&mut self);

    /// Backend description
    fn info(&self) -> BackendInfo;
}

impl<B: SpiBackend> SpiPort for SpiDevice<B> {
    fn config(&self) -> &SpiConfig {
        SpiDevice::config(self)
    }

    fn is_open(&self) -> bool {
        SpiDevice::is_open(self)
    }

    fn transfer(&mut self, write: &[u8]) -> Result<Vec<u8>> {
        SpiDevice::transfer(self, write)
    }

    fn transfer_into(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        SpiDevice::transfer_into(self, write, read)
    }

    fn close(&mut self) {
        SpiDevice::close(self)
    }

    fn info(&self) -> BackendInfo {
        SpiDevice::info(self)
    }
}
