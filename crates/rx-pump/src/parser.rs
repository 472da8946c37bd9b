//! Frame Parser Interface

use ring_buffer::ByteSource;
use thiserror::Error;

/// Result of one parser step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Nothing to do (no bytes were available)
    Idle,
    /// Bytes were consumed but no frame completed yet
    Progress,
    /// A complete frame with the given message id was decoded and dispatched
    FrameDispatched(u16),
}

/// Errors reported by a frame parser
///
/// None of these are fatal to the drain loop; the parser is expected to
/// resynchronise on the following bytes.
#[derive(Debug, Clone, Error)]
pub enum ParserError {
    /// Frame checksum did not match
    #[error("CRC mismatch on message {msg_type:04X}: expected {expected:04X}, got {actual:04X}")]
    CrcMismatch {
        msg_type: u16,
        expected: u16,
        actual: u16,
    },

    /// Frame declared a payload longer than the parser accepts
    #[error("Frame payload too long: {0} bytes")]
    FrameTooLong(usize),

    /// Any other decoder failure
    #[error("Frame parser error: {0}")]
    Other(String),
}

/// Stateful decoder that pulls bytes from a [`ByteSource`]
///
/// Each call may pull any number of bytes, including none. Implementations
/// must treat a zero-length supply as "no data right now" and return
/// [`ParseOutcome::Idle`] rather than an error.
pub trait FrameParser {
    /// Pull bytes and advance the decoder by one step
    fn process(&mut self, source: &mut dyn ByteSource) -> Result<ParseOutcome, ParserError>;
}

impl<P: FrameParser + ?Sized> FrameParser for Box<P> {
    fn process(&mut self, source: &mut dyn ByteSource) -> Result<ParseOutcome, ParserError> {
        (**self).process(source)
    }
}

/// Byte source wrapper that counts what it supplied
pub(crate) struct CountingSource<'s, S: ByteSource> {
    inner: &'s mut S,
    supplied: usize,
}

impl<'s, S: ByteSource> CountingSource<'s, S> {
    pub(crate) fn new(inner: &'s mut S) -> Self {
        Self { inner, supplied: 0 }
    }

    pub(crate) fn supplied(&self) -> usize {
        self.supplied
    }
}

impl<S: ByteSource> ByteSource for CountingSource<'_, S> {
    fn supply(&mut self, out: &mut [u8]) -> usize {
        let n = self.inner.supply(out);
        self.supplied += n;
        n
    }
}
