//! UART Receive Path
//!
//! This crate owns the producer side of the receive ring: serial line
//! configuration, the port read loop, and the byte-at-a-time receive
//! handler that pushes into the ring and counts overflow drops.

mod config;
mod error;
mod handler;
mod receiver;
mod throttle;

pub use config::{Parity, UartConfig};
pub use error::UartError;
pub use handler::{RxCounters, RxHandler, RxStats};
pub use receiver::SerialReceiver;
pub use throttle::DoEvery;

/// Default line rate used by the receiving adapter
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
