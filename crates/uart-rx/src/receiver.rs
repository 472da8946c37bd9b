//! Serial Receiver
//!
//! Opens the serial port and feeds every received byte to an [`RxHandler`].

use crate::config::UartConfig;
use crate::error::UartError;
use crate::handler::{RxHandler, RxStats};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_serial::{FlowControl, SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, info};

/// Serial receive loop for a single port
pub struct SerialReceiver {
    /// Validated line configuration
    config: UartConfig,
}

impl SerialReceiver {
    /// Create a receiver, rejecting invalid configuration up front
    pub fn new(config: UartConfig) -> Result<Self, UartError> {
        config.validate()?;
        info!(
            "Creating serial receiver for {} at {} baud",
            config.device, config.baud_rate
        );
        Ok(Self { config })
    }

    /// Line configuration in use
    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// Open and configure the serial port (receive only, no flow control)
    pub fn open(&self) -> Result<SerialStream, UartError> {
        let stream = tokio_serial::new(self.config.device.as_str(), self.config.baud_rate)
            .data_bits(self.config.serial_data_bits()?)
            .stop_bits(self.config.serial_stop_bits()?)
            .parity(self.config.parity.to_serial())
            .flow_control(FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                error!("Failed to open {}: {}", self.config.device, e);
                UartError::from(e)
            })?;

        info!("Serial port {} opened", self.config.device);
        Ok(stream)
    }

    /// Read from `reader` until end of stream, handing bytes to `handler` one at a time
    ///
    /// Each byte is pushed without waiting on the consumer; bytes that do
    /// not fit are dropped and counted by the handler.
    pub async fn run<R, const C: usize>(
        &self,
        mut reader: R,
        handler: &mut RxHandler<'_, C>,
    ) -> Result<RxStats, UartError>
    where
        R: AsyncRead + Unpin,
    {
        let mut chunk = vec![0u8; self.config.read_chunk];

        loop {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                info!("Serial stream on {} closed", self.config.device);
                break;
            }

            debug!("Received {} bytes", n);
            for &byte in &chunk[..n] {
                handler.on_receive(byte);
            }
        }

        Ok(handler.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_buffer::RingBuffer;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let result = SerialReceiver::new(UartConfig::for_device(""));
        assert!(matches!(result, Err(UartError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_run_feeds_bytes_in_order() {
        let mut config = UartConfig::for_device("test");
        config.read_chunk = 3;
        let receiver = SerialReceiver::new(config).unwrap();

        let mut ring = RingBuffer::<32>::new();
        let (producer, mut consumer) = ring.split();
        let mut handler = RxHandler::new(producer, 1000);

        let data: &[u8] = b"\x55\x02\x02hello";
        let stats = receiver.run(data, &mut handler).await.unwrap();
        assert_eq!(stats.received, 8);
        assert_eq!(stats.dropped, 0);

        let mut out = [0u8; 32];
        let n = consumer.read_into(&mut out);
        assert_eq!(&out[..n], data);
    }

    #[tokio::test]
    async fn test_run_drops_on_overflow() {
        let receiver = SerialReceiver::new(UartConfig::for_device("test")).unwrap();

        let mut ring = RingBuffer::<8>::new();
        let (producer, mut consumer) = ring.split();
        let mut handler = RxHandler::new(producer, 1000);

        let (mut tx, rx) = tokio::io::duplex(64);
        tx.write_all(&[0xAB; 20]).await.unwrap();
        drop(tx);

        let stats = receiver.run(rx, &mut handler).await.unwrap();
        assert_eq!(stats.accepted, 7);
        assert_eq!(stats.dropped, 13);
        assert_eq!(consumer.len(), 7);
    }
}
