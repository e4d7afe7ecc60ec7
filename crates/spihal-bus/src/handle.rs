//! SpiHandle - type-erased handle over any backend
//!
//! Callers hold a `SpiHandle` and never need to know whether it drives a
//! real spidev device or the loopback stub.

use spihal_core::{BackendInfo, Error, SpiBackend, SpiConfig, SpiDevice, SpiPort};

/// Open SPI device handle
///
/// The handle owns the device. Dropping it closes the device if `close`
/// was not called.
pub struct SpiHandle {
    port: Box<dyn SpiPort + Send>,
}

impl SpiHandle {
    /// Open `device` on `backend`
    pub fn open<B>(backend: B, device: &str, requested: SpiConfig) -> Result<Self, Error>
    where
        B: SpiBackend + Send + 'static,
        B::Channel: Send,
    {
        let dev = SpiDevice::open(backend, device, requested)?;
        Ok(Self::from_device(dev))
    }

    /// Wrap an already opened device
    pub fn from_device<B>(dev: SpiDevice<B>) -> Self
    where
        B: SpiBackend + Send + 'static,
        B::Channel: Send,
    {
        Self {
            port: Box::new(dev),
        }
    }

    /// Full-duplex transfer; the result is as long as `write`
    pub fn transfer(&mut self, write: &[u8]) -> Result<Vec<u8>, Error> {
        self.port.transfer(write)
    }

    /// Full-duplex transfer into a caller supplied buffer of equal length
    pub fn transfer_into(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), Error> {
        self.port.transfer_into(write, read)
    }

    /// Close the device
    ///
    /// Always succeeds; closing an already closed handle does nothing.
    pub fn close(&mut self) -> Result<(), Error> {
        self.port.close();
        Ok(())
    }

    /// Effective configuration negotiated at open time
    ///
    /// Still available after close.
    pub fn config(&self) -> Result<SpiConfig, Error> {
        Ok(*self.port.config())
    }

    /// Whether the device is still open
    pub fn is_open(&self) -> bool {
        self.port.is_open()
    }

    /// Description of the backend behind this handle
    pub fn info(&self) -> BackendInfo {
        self.port.info()
    }
}

impl std::fmt::Debug for SpiHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpiHandle")
            .field("backend", &self.port.info().name)
            .field("config", self.port.config())
            .field("open", &self.port.is_open())
            .finish()
    }
}

#[cfg(all(test, feature = "stub"))]
mod tests {
    use super::*;
    use spihal_stub::LoopbackStub;

    #[test]
    fn test_handle_lifecycle() {
        let config = SpiConfig::from_raw(0, 8, 500_000, 0, false).unwrap();
        let mut handle = SpiHandle::open(LoopbackStub::new(), "spidev0.0", config).unwrap();

        assert_eq!(handle.transfer(&[0x01, 0x02, 0x03]).unwrap(), vec![0x01, 0x02, 0x03]);
        assert!(handle.close().is_ok());
        assert!(handle.close().is_ok());
        assert_eq!(handle.transfer(&[0x00]), Err(Error::InvalidHandle));
        assert_eq!(handle.config().unwrap().speed_hz, 500_000);
    }

    #[test]
    fn test_handle_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let handle = SpiHandle::open(LoopbackStub::new(), "spidev0.0", SpiConfig::default()).unwrap();
        assert_send(&handle);

        let worker = std::thread::spawn(move || {
            let mut handle = handle;
            handle.transfer(&[0xAA; 8]).unwrap()
        });
        assert_eq!(worker.join().unwrap(), vec![0xAA; 8]);
    }

    #[test]
    fn test_handle_software_lsb_first() {
        let config = SpiConfig::default().with_lsb_first(true);
        let mut handle = SpiHandle::open(LoopbackStub::msb_only(), "spidev0.0", config).unwrap();

        let cfg = handle.config().unwrap();
        assert!(cfg.lsb_first);
        assert!(cfg.sw_lsb_first);
        assert_eq!(handle.transfer(&[0x01, 0x02]).unwrap(), vec![0x01, 0x02]);
    }
}
