//! Serial Receive Bridge
//!
//! Wires the UART receive task (producer) and the polling drain loop
//! (consumer) together around a process-lifetime receive ring.

use ring_buffer::UartRing;
use rx_pump::{FrameParser, Pump, PumpConfig, PumpStats};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use uart_rx::{DoEvery, RxCounters, RxHandler, RxStats, SerialReceiver, UartError};

mod settings;
mod sink;

pub use settings::{load_config, BridgeConfig, LogFormat, LoggingConfig, ENV_PREFIX};
pub use sink::TraceSink;

/// Errors that stop the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serial receive path failed
    #[error(transparent)]
    Uart(#[from] UartError),

    /// Logging could not be initialised
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Receive task panicked or was cancelled unexpectedly
    #[error("Receive task failed: {0}")]
    ReceiveTask(String),
}

/// Totals reported when the bridge stops
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BridgeSummary {
    /// Receive side
    pub rx: RxStats,
    /// Drain side
    pub pump: PumpStats,
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), BridgeError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| BridgeError::Logging(format!("unknown log level '{}'", config.level)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = match config.format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    result.map_err(|e| BridgeError::Logging(e.to_string()))
}

/// Open the configured port and run until Ctrl-C or the port closes
pub async fn run(config: BridgeConfig) -> Result<BridgeSummary, BridgeError> {
    let receiver = SerialReceiver::new(config.uart)?;
    let port = receiver.open()?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    run_with_reader(receiver, port, TraceSink::new(), &config.pump, shutdown).await
}

/// Run the bridge over any byte stream until `shutdown` resolves or the stream ends
///
/// The receive ring is allocated once and lives for the rest of the process.
/// The producer runs as its own task; the consumer loop runs here and never
/// waits on the ring, it drains whatever is buffered on each poll tick.
pub async fn run_with_reader<R, P, S>(
    receiver: SerialReceiver,
    reader: R,
    parser: P,
    pump_config: &PumpConfig,
    shutdown: S,
) -> Result<BridgeSummary, BridgeError>
where
    R: AsyncRead + Unpin + Send + 'static,
    P: FrameParser,
    S: Future<Output = ()>,
{
    let ring: &'static mut UartRing = Box::leak(Box::new(UartRing::new()));
    let (producer, consumer) = ring.split();

    let mut handler = RxHandler::new(producer, receiver.config().heartbeat_every);
    let counters = handler.counters();
    let mut receive_task = tokio::spawn(async move { receiver.run(reader, &mut handler).await });

    let mut pump = Pump::new(consumer, parser);
    let mut status = DoEvery::new(pump_config.status_every);
    let poll_interval = Duration::from_millis(pump_config.poll_interval_ms.max(1));
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Receive bridge running");
    tokio::pin!(shutdown);

    let finished = loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                receive_task.abort();
                break None;
            }
            result = &mut receive_task => break Some(result),
            _ = ticker.tick() => {
                pump.drain();
                if status.tick() {
                    log_status(&counters, &pump.stats(), pump.pending());
                }
            }
        }
    };

    // Anything received before the producer stopped is still delivered
    pump.drain();

    let summary = BridgeSummary {
        rx: counters.snapshot(),
        pump: pump.stats(),
    };
    log_status(&counters, &summary.pump, pump.pending());

    match finished {
        None | Some(Ok(Ok(_))) => Ok(summary),
        Some(Ok(Err(e))) => {
            error!("Receive task stopped: {}", e);
            Err(e.into())
        }
        Some(Err(e)) => Err(BridgeError::ReceiveTask(e.to_string())),
    }
}

fn log_status(counters: &RxCounters, pump: &PumpStats, buffered: usize) {
    let rx = counters.snapshot();
    info!(
        received = rx.received,
        dropped = rx.dropped,
        buffered,
        parsed_bytes = pump.bytes,
        frames = pump.frames,
        parser_errors = pump.parser_errors,
        "Receive status"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_buffer::ByteSource;
    use rx_pump::{ParseOutcome, ParserError};
    use std::sync::{Arc, Mutex};
    use tokio::io::AsyncWriteExt;
    use uart_rx::UartConfig;

    /// Records every byte it is supplied
    #[derive(Clone, Default)]
    struct Collector(Arc<Mutex<Vec<u8>>>);

    impl FrameParser for Collector {
        fn process(&mut self, source: &mut dyn ByteSource) -> Result<ParseOutcome, ParserError> {
            let mut buf = [0u8; 16];
            let n = source.supply(&mut buf);
            self.0.lock().unwrap().extend_from_slice(&buf[..n]);
            Ok(if n == 0 {
                ParseOutcome::Idle
            } else {
                ParseOutcome::Progress
            })
        }
    }

    fn test_receiver() -> SerialReceiver {
        SerialReceiver::new(UartConfig::for_device("test")).unwrap()
    }

    #[tokio::test]
    async fn test_bridge_delivers_stream_in_order() {
        let data: Vec<u8> = (0..300u32).map(|i| (i % 251) as u8).collect();
        let collector = Collector::default();
        let (mut tx, rx) = tokio::io::duplex(64);

        let payload = data.clone();
        tokio::spawn(async move {
            for chunk in payload.chunks(50) {
                tx.write_all(chunk).await.unwrap();
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        });

        let summary = run_with_reader(
            test_receiver(),
            rx,
            collector.clone(),
            &PumpConfig::default(),
            std::future::pending::<()>(),
        )
        .await
        .unwrap();

        assert_eq!(summary.rx.received, 300);
        assert_eq!(summary.rx.dropped, 0);
        assert_eq!(summary.pump.bytes, 300);
        assert_eq!(*collector.0.lock().unwrap(), data);
    }

    #[tokio::test]
    async fn test_bridge_stops_on_shutdown() {
        let (_tx, rx) = tokio::io::duplex(64);

        let summary = run_with_reader(
            test_receiver(),
            rx,
            TraceSink::new(),
            &PumpConfig::default(),
            tokio::time::sleep(Duration::from_millis(20)),
        )
        .await
        .unwrap();

        assert_eq!(summary.rx.received, 0);
        assert!(summary.pump.passes > 0);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(init_logging(&config), Err(BridgeError::Logging(_))));
    }
}
