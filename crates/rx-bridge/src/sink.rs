//! Trace sink parser

use ring_buffer::ByteSource;
use rx_pump::{FrameParser, ParseOutcome, ParserError};
use tracing::debug;

/// Bytes pulled per step
const SINK_CHUNK: usize = 64;

/// Stand-in frame parser that logs raw bytes instead of decoding them
#[derive(Debug, Default)]
pub struct TraceSink {
    /// Total bytes observed
    bytes_seen: u64,
}

impl TraceSink {
    /// Create a new sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes observed
    pub fn bytes_seen(&self) -> u64 {
        self.bytes_seen
    }
}

impl FrameParser for TraceSink {
    fn process(&mut self, source: &mut dyn ByteSource) -> Result<ParseOutcome, ParserError> {
        let mut buf = [0u8; SINK_CHUNK];
        let n = source.supply(&mut buf);
        if n == 0 {
            return Ok(ParseOutcome::Idle);
        }

        self.bytes_seen += n as u64;
        debug!("rx {:02X?}", &buf[..n]);
        Ok(ParseOutcome::Progress)
    }
}
