//! UART Error Types

use thiserror::Error;

/// Errors that can occur on the serial receive path
#[derive(Debug, Error)]
pub enum UartError {
    /// Serial port could not be opened or configured
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// Read from the open port failed
    #[error("Serial read failed: {0}")]
    ReadError(String),

    /// Configuration rejected before touching the port
    #[error("Invalid UART configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for UartError {
    fn from(err: std::io::Error) -> Self {
        UartError::ReadError(err.to_string())
    }
}

impl From<tokio_serial::Error> for UartError {
    fn from(err: tokio_serial::Error) -> Self {
        UartError::SerialError(err.to_string())
    }
}
