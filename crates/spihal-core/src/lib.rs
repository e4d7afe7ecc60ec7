//! spihal-core - Core SPI hardware abstraction layer
//!
//! This crate provides the backend-independent half of the SPI HAL: the
//! negotiated bus configuration, the [`SpiBackend`] contract that concrete
//! back ends implement, the [`SpiDevice`] handle that owns an open channel,
//! and the chunked transfer engine with software LSB-first emulation.
//!
//! It is `no_std` compatible but requires an allocator, since transfers
//! hand back owned read buffers.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for [`Error`]
//!
//! # Example
//!
//! ```ignore
//! use spihal_core::{SpiConfig, SpiDevice};
//!
//! fn echo<B: spihal_core::SpiBackend>(backend: B) -> spihal_core::Result<()> {
//!     let mut dev = SpiDevice::open(backend, "spidev0.0", SpiConfig::default())?;
//!     let read = dev.transfer(&[0x9F, 0x00, 0x00, 0x00])?;
//!     assert_eq!(read.len(), 4);
//!     dev.close();
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod reverse;
pub mod transfer;

pub use backend::{BackendInfo, SpiBackend};
pub use config::{mode, DevicePath, SpiConfig, SpiMode};
pub use device::{SpiDevice, SpiPort};
pub use error::{Error, Result};
