//! Receive Pump
//!
//! Polling consumer for the receive ring: defines the frame parser seam and
//! the non-blocking drain that feeds buffered bytes into it.

mod parser;
mod pump;

pub use parser::{FrameParser, ParseOutcome, ParserError};
pub use pump::{DrainReport, Pump, PumpConfig, PumpStats};
