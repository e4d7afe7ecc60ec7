//! spihal-bus - SPI bus access with build-time backend selection
//!
//! This crate is the caller-facing surface of spihal. It provides:
//! - [`open`], [`info`] and [`max_transfer_size`] on the default backend,
//!   which is fixed when the crate is built
//! - [`SpiHandle`], a backend-independent owned device handle
//! - a registry for choosing a backend by name at runtime ([`open_bus`])
//!
//! # Default backend
//!
//! With the `spidev` feature on a Linux target the default backend is the
//! spidev driver. Everywhere else it is the loopback stub (`stub` feature).
//!
//! # Example
//!
//! ```no_run
//! let mut handle = spihal_bus::open("spidev0.0", 0, 8, 500_000, 0, false)?;
//! let read = handle.transfer(&[0x01, 0x02, 0x03])?;
//! assert_eq!(read.len(), 3);
//! handle.close()?;
//! # Ok::<(), spihal_bus::Error>(())
//! ```

mod handle;
mod registry;

pub use handle::SpiHandle;
pub use registry::{available_backends, open_bus, BackendEntry, BackendKind, BusError, BusParams};
pub use spihal_core::{BackendInfo, Error, SpiConfig};

use spihal_core::SpiBackend;

#[cfg(not(any(all(feature = "spidev", target_os = "linux"), feature = "stub")))]
compile_error!("spihal-bus needs the `spidev` feature on Linux or the `stub` feature");

/// Backend used by [`open`], [`info`] and [`max_transfer_size`]
#[cfg(all(feature = "spidev", target_os = "linux"))]
pub type DefaultBackend = spihal_spidev::Spidev;

/// Backend used by [`open`], [`info`] and [`max_transfer_size`]
#[cfg(not(all(feature = "spidev", target_os = "linux")))]
pub type DefaultBackend = spihal_stub::LoopbackStub;

/// Open an SPI device on the default backend
///
/// `device_name` is a name under `/dev` (`"spidev0.0"`) or an absolute
/// path. The integer arguments are range checked before anything is opened.
pub fn open(
    device_name: &str,
    mode: u32,
    bits_per_word: u32,
    speed_hz: u32,
    delay_us: u32,
    lsb_first: bool,
) -> Result<SpiHandle, Error> {
    let requested = SpiConfig::from_raw(mode, bits_per_word, speed_hz, delay_us, lsb_first)?;
    SpiHandle::open(DefaultBackend::default(), device_name, requested)
}

/// Describe the default backend
pub fn info() -> BackendInfo {
    DefaultBackend::default().info()
}

/// Advisory single-exchange limit of the default backend
///
/// Transfers larger than this still succeed; they are split into chunks.
pub fn max_transfer_size() -> u64 {
    DefaultBackend::default().max_transfer_size()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_info() {
        let info = info();
        assert!(info.name == "spidev" || info.name == "stub");
        assert!(max_transfer_size() > 0);
    }

    #[test]
    fn test_open_rejects_bad_arguments() {
        assert_eq!(open("spidev0.0", 4, 8, 1_000, 0, false).unwrap_err(), Error::InvalidMode);
        assert_eq!(
            open("spidev0.0", 0, 300, 1_000, 0, false).unwrap_err(),
            Error::InvalidBitsPerWord
        );
        assert_eq!(
            open(&"s".repeat(64), 0, 8, 1_000, 0, false).unwrap_err(),
            Error::InvalidArgument
        );
    }

    #[test]
    fn test_registry_agrees_with_default_backend() {
        let listed = available_backends().iter().any(|b| b.name == "spidev");
        assert_eq!(listed, info().name == "spidev");
        assert_eq!(BackendKind::from_name("spidev").is_ok(), listed);
    }

    #[cfg(all(feature = "spidev", target_os = "linux"))]
    #[test]
    fn test_open_nonexistent_on_spidev() {
        assert_eq!(
            open("nonexistent99", 0, 8, 500_000, 0, false).unwrap_err(),
            Error::AccessDenied
        );
    }
}
