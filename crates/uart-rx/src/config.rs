//! UART Line Configuration

use crate::error::UartError;
use serde::{Deserialize, Serialize};
use tokio_serial::{DataBits, StopBits};

/// Parity setting for the serial line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl Parity {
    /// Map to the serial driver's parity setting
    pub fn to_serial(self) -> tokio_serial::Parity {
        match self {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }
}

/// Receive-side UART configuration
///
/// Hardware flow control is never enabled; the peer is not throttled and
/// bytes arriving while the ring is full are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UartConfig {
    /// Serial port device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub device: String,
    /// Line rate in bits per second
    pub baud_rate: u32,
    /// Data bits per character (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: Parity,
    /// Bytes requested from the port per read call
    pub read_chunk: usize,
    /// Emit a receive heartbeat every N bytes
    pub heartbeat_every: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: crate::DEFAULT_BAUD_RATE,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            read_chunk: 64,
            heartbeat_every: 1000,
        }
    }
}

impl UartConfig {
    /// Create a config for a device with the default 115200 8N1 line settings
    pub fn for_device(device: &str) -> Self {
        Self {
            device: device.to_string(),
            ..Default::default()
        }
    }

    /// Check the configuration before opening the port
    pub fn validate(&self) -> Result<(), UartError> {
        if self.device.trim().is_empty() {
            return Err(UartError::InvalidConfig("device path is empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(UartError::InvalidConfig("baud_rate must be non-zero".to_string()));
        }
        if self.read_chunk == 0 {
            return Err(UartError::InvalidConfig("read_chunk must be non-zero".to_string()));
        }
        if self.heartbeat_every == 0 {
            return Err(UartError::InvalidConfig(
                "heartbeat_every must be non-zero".to_string(),
            ));
        }
        self.serial_data_bits()?;
        self.serial_stop_bits()?;
        Ok(())
    }

    /// Data bits as the serial driver's setting
    pub fn serial_data_bits(&self) -> Result<DataBits, UartError> {
        match self.data_bits {
            5 => Ok(DataBits::Five),
            6 => Ok(DataBits::Six),
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(UartError::InvalidConfig(format!(
                "unsupported data_bits {}",
                other
            ))),
        }
    }

    /// Stop bits as the serial driver's setting
    pub fn serial_stop_bits(&self) -> Result<StopBits, UartError> {
        match self.stop_bits {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            other => Err(UartError::InvalidConfig(format!(
                "unsupported stop_bits {}",
                other
            ))),
        }
    }
}
