//! Lock-Free Byte Ring Buffer
//!
//! Fixed-capacity SPSC queue that carries received serial bytes from the
//! receive handler (producer) to the polling loop that feeds the frame
//! parser (consumer).

mod buffer;

pub use buffer::{Consumer, Producer, RingBuffer, DEFAULT_CAPACITY};

/// Ring sized for the UART receive path
pub type UartRing = RingBuffer<DEFAULT_CAPACITY>;

/// Byte source pulled by a frame parser
///
/// `supply` writes up to `out.len()` bytes and returns how many it wrote.
/// Returning 0 means nothing is available right now; it is not an error.
pub trait ByteSource {
    /// Fill `out` with as many pending bytes as are available
    fn supply(&mut self, out: &mut [u8]) -> usize;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn supply(&mut self, out: &mut [u8]) -> usize {
        (**self).supply(out)
    }
}
