//! spihal-spidev - Linux spidev backend
//!
//! This crate provides the hardware backend of spihal, driving SPI
//! controllers through the `/dev/spidevX.Y` character device interface.
//!
//! # Overview
//!
//! The Linux SPI driver exposes SPI controllers through character devices
//! at `/dev/spidevX.Y` where X is the bus number and Y is the chip select.
//! Configuration is negotiated with `SPI_IOC_WR_*`/`SPI_IOC_RD_*` ioctls and
//! data moves with `SPI_IOC_MESSAGE`.
//!
//! Controllers that cannot shift LSB-first are still usable with
//! `lsb_first` requested: the open succeeds and the transfer engine in
//! `spihal-core` mirrors the bits of every byte instead.
//!
//! # Example
//!
//! ```no_run
//! use spihal_core::{SpiConfig, SpiDevice};
//! use spihal_spidev::Spidev;
//!
//! let config = SpiConfig::default().with_speed(500_000).with_mode(0);
//! let mut spi = SpiDevice::open(Spidev::new(), "spidev0.0", config)?;
//!
//! let read = spi.transfer(&[0x9F, 0x00, 0x00, 0x00])?;
//! println!("read: {:02X?}", read);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y` device
//! - May require adding user to `spi` group or using udev rules
//!
//! The single-exchange limit is taken from
//! `/sys/module/spidev/parameters/bufsiz` when present (4096 otherwise).

pub mod device;
pub mod error;

// Re-exports
pub use device::{Spidev, SpidevChannel, BUF_SIZE_SYSFS, NAME};
pub use error::{Result, SpidevError};
