//! Backend registry and bus string parsing
//!
//! This module handles opening devices on a backend chosen by name at
//! runtime, using the same `name:key=value,...` syntax for every backend.

use crate::handle::SpiHandle;
use spihal_core::{BackendInfo, Error, SpiBackend, SpiConfig};
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Errors from bus string parsing and backend lookup
#[derive(Debug, ThisError)]
pub enum BusError {
    /// Backend name not known or not compiled in
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// Parameter not in key=value form
    #[error("Invalid parameter format: '{0}' (expected key=value)")]
    InvalidFormat(String),

    /// Parameter value could not be parsed
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// No device given
    #[error("No device specified. Use dev=spidevX.Y")]
    NoDevice,

    /// The HAL itself failed
    #[error(transparent)]
    Hal(#[from] Error),
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        match e {
            BusError::Hal(e) => e,
            _ => Error::InvalidArgument,
        }
    }
}

/// Information about a backend
pub struct BackendEntry {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendEntry> {
    let mut backends = Vec::new();

    #[cfg(all(feature = "spidev", target_os = "linux"))]
    backends.push(BackendEntry {
        name: "spidev",
        aliases: &["linux_spi", "linux-spi"],
        description: "Linux spidev interface (dev=spidevX.Y,speed=<Hz>,mode=<0-3>,bits=<n>,delay=<us>,lsb=<0|1>)",
    });

    #[cfg(feature = "stub")]
    backends.push(BackendEntry {
        name: "stub",
        aliases: &["loopback"],
        description: "Loopback stub, echoes written bytes (same options as spidev)",
    });

    #[cfg(feature = "stub")]
    backends.push(BackendEntry {
        name: "stub-msb",
        aliases: &["loopback-msb"],
        description: "Loopback stub without hardware LSB-first support",
    });

    backends
}

/// Backends selectable at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Linux spidev
    #[cfg(all(feature = "spidev", target_os = "linux"))]
    Spidev,
    /// Loopback stub
    #[cfg(feature = "stub")]
    Stub,
    /// Loopback stub refusing LSB-first
    #[cfg(feature = "stub")]
    StubMsbOnly,
}

impl BackendKind {
    /// Look up a backend by name or alias
    pub fn from_name(name: &str) -> Result<Self, BusError> {
        match name {
            #[cfg(all(feature = "spidev", target_os = "linux"))]
            "spidev" | "linux_spi" | "linux-spi" => Ok(Self::Spidev),
            #[cfg(feature = "stub")]
            "stub" | "loopback" => Ok(Self::Stub),
            #[cfg(feature = "stub")]
            "stub-msb" | "loopback-msb" => Ok(Self::StubMsbOnly),
            _ => Err(BusError::UnknownBackend(name.to_string())),
        }
    }

    /// Describe the backend
    pub fn info(&self) -> BackendInfo {
        match self {
            #[cfg(all(feature = "spidev", target_os = "linux"))]
            Self::Spidev => spihal_spidev::Spidev::new().info(),
            #[cfg(feature = "stub")]
            Self::Stub => spihal_stub::LoopbackStub::new().info(),
            #[cfg(feature = "stub")]
            Self::StubMsbOnly => spihal_stub::LoopbackStub::msb_only().info(),
        }
    }

    /// Advisory single-exchange limit of the backend
    pub fn max_transfer_size(&self) -> u64 {
        match self {
            #[cfg(all(feature = "spidev", target_os = "linux"))]
            Self::Spidev => spihal_spidev::Spidev::new().max_transfer_size(),
            #[cfg(feature = "stub")]
            Self::Stub | Self::StubMsbOnly => spihal_stub::LoopbackStub::new().max_transfer_size(),
        }
    }

    /// Open a device on this backend
    pub fn open(&self, device: &str, requested: SpiConfig) -> Result<SpiHandle, Error> {
        match self {
            #[cfg(all(feature = "spidev", target_os = "linux"))]
            Self::Spidev => SpiHandle::open(spihal_spidev::Spidev::new(), device, requested),
            #[cfg(feature = "stub")]
            Self::Stub => SpiHandle::open(spihal_stub::LoopbackStub::new(), device, requested),
            #[cfg(feature = "stub")]
            Self::StubMsbOnly => {
                SpiHandle::open(spihal_stub::LoopbackStub::msb_only(), device, requested)
            }
        }
    }
}

/// Parsed bus parameters
pub struct BusParams {
    /// Backend name as given
    pub backend: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl BusParams {
    /// Parse a bus string into backend name and parameters
    ///
    /// Format: "name" or "name:key1=value1,key2=value2"
    ///
    /// # Example
    /// ```
    /// use spihal_bus::BusParams;
    ///
    /// let params = BusParams::parse("spidev:dev=spidev0.0,speed=500000").unwrap();
    /// assert_eq!(params.backend, "spidev");
    /// assert_eq!(params.params.get("dev"), Some(&"spidev0.0".to_string()));
    /// ```
    pub fn parse(s: &str) -> Result<Self, BusError> {
        let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

        let mut params = HashMap::new();
        if !opts_str.is_empty() {
            for opt in opts_str.split(',') {
                if let Some((key, value)) = opt.split_once('=') {
                    params.insert(key.to_string(), value.to_string());
                } else {
                    return Err(BusError::InvalidFormat(opt.to_string()));
                }
            }
        }

        Ok(Self {
            backend: name.to_string(),
            params,
        })
    }

    /// Device name (`dev=`)
    pub fn device(&self) -> Result<&str, BusError> {
        self.params
            .get("dev")
            .map(String::as_str)
            .filter(|d| !d.is_empty())
            .ok_or(BusError::NoDevice)
    }

    /// Build the requested configuration from the parameters
    ///
    /// Missing keys keep their defaults; unknown keys are ignored with a
    /// warning.
    pub fn config(&self) -> Result<SpiConfig, BusError> {
        let defaults = SpiConfig::default();
        let mut mode = u32::from(defaults.mode);
        let mut bits = u32::from(defaults.bits_per_word);
        let mut speed = defaults.speed_hz;
        let mut delay = u32::from(defaults.delay_us);
        let mut lsb_first = defaults.lsb_first;

        for (key, value) in &self.params {
            match key.as_str() {
                "dev" => {}
                "mode" => mode = parse_number(key, value)?,
                "bits" => bits = parse_number(key, value)?,
                "speed" => speed = parse_number(key, value)?,
                "delay" => delay = parse_number(key, value)?,
                "lsb" => lsb_first = parse_bool(key, value)?,
                _ => {
                    log::warn!("{}: Unknown option: {}={}", self.backend, key, value);
                }
            }
        }

        Ok(SpiConfig::from_raw(mode, bits, speed, delay, lsb_first)?)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32, BusError> {
    let parsed = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        value.parse::<u32>()
    };

    parsed.map_err(|_| BusError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, BusError> {
    match value {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BusError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Open a device from a bus string
///
/// # Example
/// ```ignore
/// let mut handle = open_bus("spidev:dev=spidev0.0,speed=500000,mode=3")?;
/// let id = handle.transfer(&[0x9F, 0, 0, 0])?;
/// ```
pub fn open_bus(bus: &str) -> Result<SpiHandle, BusError> {
    let params = BusParams::parse(bus)?;
    let kind = BackendKind::from_name(&params.backend)?;
    let config = params.config()?;
    let device = params.device()?;

    log::debug!("{}: requested {:?}", params.backend, config);
    Ok(kind.open(device, config)?)
}
