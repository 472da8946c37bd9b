//! Receive Pump
//!
//! Consumer side of the receive ring. Each `drain` pass hands the frame
//! parser the consumer as its byte source until the ring reports empty.

use crate::parser::{CountingSource, FrameParser, ParseOutcome};
use ring_buffer::{Consumer, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for the polling loop around the pump
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    /// Sleep between drain passes (milliseconds)
    pub poll_interval_ms: u64,
    /// Log a status line every N drain passes
    pub status_every: u32,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1,
            status_every: 1000,
        }
    }
}

/// Outcome of a single drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Bytes handed to the parser
    pub bytes: usize,
    /// Frames dispatched
    pub frames: usize,
    /// Parser errors seen
    pub errors: usize,
    /// Whether the pass stopped because the parser consumed nothing
    pub stalled: bool,
}

/// Running totals across all drain passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PumpStats {
    /// Drain passes run
    pub passes: u64,
    /// Bytes handed to the parser
    pub bytes: u64,
    /// Frames dispatched
    pub frames: u64,
    /// Parser errors seen
    pub parser_errors: u64,
}

/// Drains the receive ring into a frame parser
pub struct Pump<'a, P, const C: usize = DEFAULT_CAPACITY> {
    /// Read half of the ring
    consumer: Consumer<'a, C>,
    /// Frame parser fed from the ring
    parser: P,
    /// Running totals
    stats: PumpStats,
}

impl<'a, P: FrameParser, const C: usize> Pump<'a, P, C> {
    /// Create a pump around the ring's consumer half
    pub fn new(consumer: Consumer<'a, C>, parser: P) -> Self {
        Self {
            consumer,
            parser,
            stats: PumpStats::default(),
        }
    }

    /// Feed buffered bytes to the parser until the ring is empty
    ///
    /// Never waits for new bytes. Parser errors are counted and logged, not
    /// propagated. If a parser step consumes nothing while bytes are still
    /// buffered, the pass ends early and the bytes wait for the next pass.
    pub fn drain(&mut self) -> DrainReport {
        let mut report = DrainReport::default();

        while !self.consumer.is_empty() {
            let mut source = CountingSource::new(&mut self.consumer);
            let result = self.parser.process(&mut source);
            let supplied = source.supplied();
            report.bytes += supplied;

            match result {
                Ok(ParseOutcome::FrameDispatched(msg_type)) => {
                    report.frames += 1;
                    debug!("Dispatched frame {:04X}", msg_type);
                }
                Ok(ParseOutcome::Idle) | Ok(ParseOutcome::Progress) => {}
                Err(e) => {
                    report.errors += 1;
                    warn!("Frame parser error: {}", e);
                }
            }

            if supplied == 0 {
                debug!(
                    buffered = self.consumer.len(),
                    "Parser consumed nothing, deferring to next pass"
                );
                report.stalled = true;
                break;
            }
        }

        self.stats.passes += 1;
        self.stats.bytes += report.bytes as u64;
        self.stats.frames += report.frames as u64;
        self.stats.parser_errors += report.errors as u64;
        report
    }

    /// Bytes currently waiting in the ring
    pub fn pending(&self) -> usize {
        self.consumer.len()
    }

    /// Running totals
    pub fn stats(&self) -> PumpStats {
        self.stats
    }

    /// Access the parser
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Mutable access to the parser
    pub fn parser_mut(&mut self) -> &mut P {
        &mut self.parser
    }
}
