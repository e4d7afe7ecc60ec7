//! Linux spidev backend implementation
//!
//! This module provides the `Spidev` backend that implements the
//! `SpiBackend` trait using Linux's spidev interface.

use crate::error::{Result, SpidevError};

use spihal_core::config::DEFAULT_MAX_TRANSFER_SIZE;
use spihal_core::error::Result as CoreResult;
use spihal_core::{BackendInfo, DevicePath, SpiBackend, SpiConfig, SpiMode};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Backend identifier
pub const NAME: &str = "spidev";

/// Path to kernel spidev buffer size parameter
pub const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Linux spidev ioctl constants
mod ioctl {
    use super::SpiIocTransfer;
    use nix::{ioctl_read, ioctl_write_buf, ioctl_write_ptr};

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MESSAGE: u8 = 0;
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_LSB_FIRST: u8 = 2;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    // Generate ioctl functions
    ioctl_read!(spi_ioc_rd_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_lsb_first,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_LSB_FIRST,
        u8
    );
    ioctl_read!(
        spi_ioc_rd_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_read!(
        spi_ioc_rd_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    // SPI_IOC_MESSAGE(n) = _IOW(SPI_IOC_MAGIC, 0, char[n * sizeof(struct spi_ioc_transfer)]);
    // the buffer variant sizes the request from the slice it is given
    ioctl_write_buf!(
        spi_ioc_message,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MESSAGE,
        SpiIocTransfer
    );
}

/// SPI transfer structure for ioctl
/// This must match the kernel's struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,          // __u64 tx_buf
    rx_buf: u64,          // __u64 rx_buf
    len: u32,             // __u32 len
    speed_hz: u32,        // __u32 speed_hz
    delay_usecs: u16,     // __u16 delay_usecs
    bits_per_word: u8,    // __u8 bits_per_word
    cs_change: u8,        // __u8 cs_change
    tx_nbits: u8,         // __u8 tx_nbits
    rx_nbits: u8,         // __u8 rx_nbits
    word_delay_usecs: u8, // __u8 word_delay_usecs
    _pad: u8,             // padding
}

fn errno_to_io(e: nix::errno::Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e as i32)
}

/// Linux spidev backend
///
/// Opens `/dev/spidevX.Y` character devices and drives them through the
/// spidev ioctl interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spidev {
    bufsiz_path: PathBuf,
}

impl Default for Spidev {
    fn default() -> Self {
        Self::new()
    }
}

impl Spidev {
    /// Create a backend reading the buffer size from the standard sysfs path
    pub fn new() -> Self {
        Self {
            bufsiz_path: PathBuf::from(BUF_SIZE_SYSFS),
        }
    }

    /// Read the buffer size parameter from another location
    pub fn with_bufsiz_path(path: impl Into<PathBuf>) -> Self {
        Self {
            bufsiz_path: path.into(),
        }
    }

    /// Open and configure a device, keeping the detailed error
    ///
    /// The mode, word size and speed are written and then read back; the
    /// read-back values are what the returned configuration reports. If the
    /// driver refuses LSB-first the open still succeeds and the returned
    /// configuration asks for software emulation instead.
    pub fn open_channel(
        &self,
        path: &DevicePath,
        requested: &SpiConfig,
    ) -> Result<(SpidevChannel, SpiConfig)> {
        log::debug!("spidev: Opening device {}", path);

        // Dropping `file` on any early return below closes the descriptor
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_str())
            .map_err(|e| SpidevError::OpenFailed {
                path: path.to_string(),
                source: e,
            })?;

        let fd = file.as_raw_fd();
        let mut config = *requested;
        config.sw_lsb_first = false;

        // Set SPI mode
        let mut mode = requested.mode;
        unsafe { ioctl::spi_ioc_wr_mode(fd, &mode) }.map_err(|e| {
            SpidevError::SetModeFailed {
                mode: requested.mode,
                source: errno_to_io(e),
            }
        })?;
        if unsafe { ioctl::spi_ioc_rd_mode(fd, &mut mode) }.is_ok() {
            config.mode = SpiMode::normalize(mode);
        }

        // Set bits per word
        let mut bits = requested.bits_per_word;
        unsafe { ioctl::spi_ioc_wr_bits_per_word(fd, &bits) }.map_err(|e| {
            SpidevError::SetBitsPerWordFailed {
                bits: requested.bits_per_word,
                source: errno_to_io(e),
            }
        })?;
        if unsafe { ioctl::spi_ioc_rd_bits_per_word(fd, &mut bits) }.is_ok() {
            config.bits_per_word = bits;
        }

        // Set clock speed
        let mut speed = requested.speed_hz;
        unsafe { ioctl::spi_ioc_wr_max_speed_hz(fd, &speed) }.map_err(|e| {
            SpidevError::SetSpeedFailed {
                speed: requested.speed_hz,
                source: errno_to_io(e),
            }
        })?;
        if unsafe { ioctl::spi_ioc_rd_max_speed_hz(fd, &mut speed) }.is_ok() {
            config.speed_hz = speed;
        }

        // Bit order is a soft requirement
        let lsb_first = u8::from(requested.lsb_first);
        if let Err(e) = unsafe { ioctl::spi_ioc_wr_lsb_first(fd, &lsb_first) } {
            if requested.lsb_first {
                log::warn!(
                    "spidev: {} cannot shift LSB-first ({}), reversing bits in software",
                    path,
                    e
                );
            }
            config.sw_lsb_first = requested.lsb_first;
        }

        log::info!(
            "spidev: Opened {} (mode={}, bits={}, speed={} kHz, lsb_first={})",
            path,
            config.mode,
            config.bits_per_word,
            config.speed_hz / 1000,
            config.lsb_first
        );

        Ok((
            SpidevChannel {
                file,
                path: path.clone(),
            },
            config,
        ))
    }

    /// Perform one SPI_IOC_MESSAGE(1) full-duplex exchange
    pub fn exchange_raw(
        &self,
        channel: &mut SpidevChannel,
        config: &SpiConfig,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<()> {
        let len = u32::try_from(write.len())
            .ok()
            .filter(|_| read.len() == write.len())
            .ok_or(SpidevError::InvalidLength {
                write: write.len(),
                read: read.len(),
            })?;

        // The kernel expects user pointers widened to __u64
        let transfer = SpiIocTransfer {
            tx_buf: write.as_ptr() as usize as u64,
            rx_buf: read.as_mut_ptr() as usize as u64,
            len,
            speed_hz: config.speed_hz,
            delay_usecs: config.delay_us,
            bits_per_word: config.bits_per_word,
            ..Default::default()
        };

        let fd = channel.file.as_raw_fd();
        unsafe { ioctl::spi_ioc_message(fd, std::slice::from_ref(&transfer)) }.map_err(|e| {
            SpidevError::TransferFailed {
                len: write.len(),
                source: errno_to_io(e),
            }
        })?;

        Ok(())
    }

    /// Path the buffer size is read from
    pub fn bufsiz_path(&self) -> &Path {
        &self.bufsiz_path
    }
}

/// An open spidev character device
#[derive(Debug)]
pub struct SpidevChannel {
    /// File handle for spidev device
    file: File,
    path: DevicePath,
}

impl SpidevChannel {
    /// Device path this channel was opened on
    pub fn path(&self) -> &DevicePath {
        &self.path
    }
}

impl SpiBackend for Spidev {
    type Channel = SpidevChannel;

    fn info(&self) -> BackendInfo {
        let (kernel_version, machine) = match nix::sys::utsname::uname() {
            Ok(uts) => (
                uts.release().to_string_lossy().into_owned(),
                uts.machine().to_string_lossy().into_owned(),
            ),
            Err(e) => {
                log::debug!("spidev: uname failed: {}", e);
                ("unknown".to_string(), "unknown".to_string())
            }
        };

        BackendInfo {
            name: NAME,
            description: "Linux spidev driver",
            kernel_version: Some(kernel_version),
            machine: Some(machine),
        }
    }

    fn max_transfer_size(&self) -> u64 {
        read_max_kernel_buf_size(&self.bufsiz_path)
    }

    fn open(&self, path: &DevicePath, requested: &SpiConfig) -> CoreResult<(SpidevChannel, SpiConfig)> {
        self.open_channel(path, requested).map_err(|e| {
            log::error!("spidev: {}", e);
            e.into()
        })
    }

    fn close(&self, channel: SpidevChannel) {
        log::debug!("spidev: Closing {}", channel.path);
        drop(channel);
    }

    fn exchange(
        &self,
        channel: &mut SpidevChannel,
        config: &SpiConfig,
        write: &[u8],
        read: &mut [u8],
    ) -> CoreResult<()> {
        self.exchange_raw(channel, config, write, read).map_err(|e| {
            log::error!("spidev: {}: {}", channel.path, e);
            e.into()
        })
    }
}

/// Read the maximum kernel buffer size from sysfs, or use the Linux default
fn read_max_kernel_buf_size(path: &Path) -> u64 {
    match std::fs::read_to_string(path) {
        Ok(content) => match content.trim().parse::<u64>() {
            Ok(size) if size > 0 => {
                log::debug!("spidev: Using buffer size {} from sysfs", size);
                return size;
            }
            _ => log::warn!("spidev: Invalid buffer size in {}", path.display()),
        },
        Err(_) => log::debug!(
            "spidev: Cannot read {}, using default",
            path.display()
        ),
    }

    DEFAULT_MAX_TRANSFER_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use spihal_core::{Error, SpiDevice};

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("spihal-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_transfer_struct_layout() {
        assert_eq!(std::mem::size_of::<SpiIocTransfer>(), 32);
    }

    #[test]
    fn test_open_nonexistent_device() {
        let err = SpiDevice::open(Spidev::new(), "nonexistent99", SpiConfig::default()).unwrap_err();
        assert_eq!(err, Error::AccessDenied);
    }

    #[test]
    fn test_open_detailed_error() {
        let path = DevicePath::resolve("nonexistent99").unwrap();
        match Spidev::new().open_channel(&path, &SpiConfig::default()) {
            Err(SpidevError::OpenFailed { path, .. }) => assert_eq!(path, "/dev/nonexistent99"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_open_rejects_long_name() {
        let name = "spidev".repeat(11);
        let err = SpiDevice::open(Spidev::new(), &name, SpiConfig::default()).unwrap_err();
        assert_eq!(err, Error::InvalidArgument);
    }

    #[test]
    fn test_open_non_spi_file_is_invalid_mode() {
        // A regular file opens fine but refuses every spidev ioctl
        let path = temp_file("regular", "");
        let err =
            SpiDevice::open(Spidev::new(), path.to_str().unwrap(), SpiConfig::default()).unwrap_err();
        assert_eq!(err, Error::InvalidMode);
        std::fs::remove_file(&path).unwrap();
    }

    fn open_fd_count() -> usize {
        std::fs::read_dir("/proc/self/fd").unwrap().count()
    }

    #[test]
    fn test_failed_open_releases_descriptor() {
        let path = temp_file("fd-release", "");
        let name = path.to_str().unwrap().to_owned();

        let before = open_fd_count();
        for _ in 0..50 {
            let err = SpiDevice::open(Spidev::new(), &name, SpiConfig::default()).unwrap_err();
            assert_eq!(err, Error::InvalidMode);
        }
        let after = open_fd_count();

        // Other tests run concurrently and may hold a few descriptors
        assert!(after < before + 8, "leaked descriptors: {} -> {}", before, after);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_max_transfer_size_from_sysfs() {
        let path = temp_file("bufsiz-ok", "65536\n");
        assert_eq!(Spidev::with_bufsiz_path(&path).max_transfer_size(), 65536);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_max_transfer_size_fallbacks() {
        let zero = temp_file("bufsiz-zero", "0\n");
        assert_eq!(Spidev::with_bufsiz_path(&zero).max_transfer_size(), 4096);
        std::fs::remove_file(&zero).unwrap();

        let junk = temp_file("bufsiz-junk", "lots\n");
        assert_eq!(Spidev::with_bufsiz_path(&junk).max_transfer_size(), 4096);
        std::fs::remove_file(&junk).unwrap();

        let missing = std::env::temp_dir().join("spihal-no-such-bufsiz");
        assert_eq!(Spidev::with_bufsiz_path(missing).max_transfer_size(), 4096);
    }

    #[test]
    fn test_info() {
        let info = Spidev::new().info();
        assert_eq!(info.name, "spidev");
        assert_eq!(info.description, "Linux spidev driver");
        assert!(!info.kernel_version.unwrap().is_empty());
        assert!(!info.machine.unwrap().is_empty());
    }
}
