//! Bridge settings

use crate::BridgeError;
use config::{Config, Environment, File, FileFormat};
use rx_pump::PumpConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uart_rx::UartConfig;

/// Environment variable prefix for overrides (e.g. `RX_BRIDGE__UART__DEVICE`)
pub const ENV_PREFIX: &str = "RX_BRIDGE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Top-level bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Serial line settings
    pub uart: UartConfig,
    /// Drain loop settings
    pub pump: PumpConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Load configuration from an optional TOML file plus environment overrides
///
/// Missing keys fall back to their defaults.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, BridgeError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config: BridgeConfig = builder.build()?.try_deserialize()?;
    config.uart.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uart_rx::Parity;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.uart.baud_rate, 115_200);
        assert_eq!(config.pump.poll_interval_ms, 1);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_partial_file() {
        let path = write_temp(
            "rx-bridge-partial",
            r#"
                [uart]
                device = "/dev/ttyACM1"
                baud_rate = 57600
                parity = "even"

                [logging]
                format = "json"
            "#,
        );

        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.uart.device, "/dev/ttyACM1");
        assert_eq!(config.uart.baud_rate, 57_600);
        assert_eq!(config.uart.parity, Parity::Even);
        assert_eq!(config.uart.read_chunk, 64);
        assert_eq!(config.pump.status_every, 1000);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_rejects_invalid_uart() {
        let path = write_temp(
            "rx-bridge-invalid",
            r#"
                [uart]
                baud_rate = 0
            "#,
        );

        let result = load_config(Some(&path));
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(BridgeError::Uart(_))));
    }
}
