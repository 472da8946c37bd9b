//! Lock-Free Byte Ring Buffer Implementation

use crate::ByteSource;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default buffer capacity (512 slots = 511 usable bytes)
pub const DEFAULT_CAPACITY: usize = 512;

/// Lock-free SPSC ring buffer for received serial bytes
///
/// One slot is always left free so that `head == tail` means empty and
/// `tail + 1 == head` (mod `C`) means full. A buffer of `C` slots therefore
/// holds at most `C - 1` bytes.
///
/// With exclusive access (`&mut self`) the buffer can be pushed and popped
/// directly. For a producer and a consumer running in different contexts,
/// [`RingBuffer::split`] hands out one [`Producer`] and one [`Consumer`].
pub struct RingBuffer<const C: usize = DEFAULT_CAPACITY> {
    /// Pre-allocated storage
    storage: UnsafeCell<[u8; C]>,
    /// Head position (read index, consumer-owned)
    head: AtomicUsize,
    /// Tail position (write index, producer-owned)
    tail: AtomicUsize,
}

impl<const C: usize> RingBuffer<C> {
    const VALID_CAPACITY: () = assert!(C >= 2, "ring buffer needs at least two slots");

    /// Create an empty ring buffer
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CAPACITY;
        Self {
            storage: UnsafeCell::new([0; C]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        Self::advance(self.tail.load(Ordering::Acquire)) == self.head.load(Ordering::Acquire)
    }

    /// Get the number of bytes currently buffered
    ///
    /// Under concurrent use this is a snapshot and may already be stale.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (tail + C - head) % C
    }

    /// Get the number of bytes the buffer can hold (`C - 1`)
    pub const fn capacity(&self) -> usize {
        C - 1
    }

    /// Append a byte
    ///
    /// Returns `false` without touching the buffer if it is full; the byte is
    /// dropped and nothing already queued is evicted.
    #[must_use = "a `false` result means the byte was dropped"]
    pub fn push(&mut self, byte: u8) -> bool {
        // SAFETY: `&mut self` rules out any other producer or consumer.
        unsafe { self.produce(byte) }
    }

    /// Remove the oldest byte, or `None` if empty
    pub fn pop(&mut self) -> Option<u8> {
        // SAFETY: `&mut self` rules out any other producer or consumer.
        unsafe { self.consume() }
    }

    /// Pop up to `buf.len()` bytes into `buf`, returning how many were written
    ///
    /// Stops as soon as the buffer is empty. Zero means "no data right now".
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        fill_from(buf, || self.pop())
    }

    /// Discard everything currently buffered
    pub fn clear(&mut self) {
        let tail = *self.tail.get_mut();
        *self.head.get_mut() = tail;
    }

    /// Split into the producer and consumer halves
    ///
    /// Both halves borrow the buffer mutably, so no other access is possible
    /// while either is alive.
    pub fn split(&mut self) -> (Producer<'_, C>, Consumer<'_, C>) {
        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }

    #[inline]
    fn advance(index: usize) -> usize {
        (index + 1) % C
    }

    #[inline]
    fn slot(&self, index: usize) -> *mut u8 {
        debug_assert!(index < C);
        self.storage.get().cast::<u8>().wrapping_add(index)
    }

    /// # Safety
    ///
    /// At most one caller may be producing at any time.
    unsafe fn produce(&self, byte: u8) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let next = Self::advance(tail);
        if next == self.head.load(Ordering::Acquire) {
            return false;
        }

        // The consumer never reads the slot at `tail` until we publish `next`.
        self.slot(tail).write(byte);
        self.tail.store(next, Ordering::Release);
        true
    }

    /// # Safety
    ///
    /// At most one caller may be consuming at any time.
    unsafe fn consume(&self) -> Option<u8> {
        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }

        // The producer never writes the slot at `head` until we publish the advance.
        let byte = self.slot(head).read();
        self.head.store(Self::advance(head), Ordering::Release);
        Some(byte)
    }
}

impl<const C: usize> Default for RingBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> std::fmt::Debug for RingBuffer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish()
    }
}

impl<const C: usize> ByteSource for RingBuffer<C> {
    fn supply(&mut self, out: &mut [u8]) -> usize {
        self.read_into(out)
    }
}

// SAFETY: the only methods reachable through `&RingBuffer` are atomic loads.
// Storage writes and reads go through `produce`/`consume`, which are only
// called from `&mut self` methods or from the single `Producer`/`Consumer`
// pair handed out by `split`.
unsafe impl<const C: usize> Sync for RingBuffer<C> {}

/// Write half of a split [`RingBuffer`]
///
/// Runs in the receive context. `push` never blocks and never allocates.
pub struct Producer<'a, const C: usize = DEFAULT_CAPACITY> {
    ring: &'a RingBuffer<C>,
}

impl<const C: usize> Producer<'_, C> {
    /// Append a byte, returning `false` if the buffer is full and the byte was dropped
    #[must_use = "a `false` result means the byte was dropped"]
    pub fn push(&mut self, byte: u8) -> bool {
        // SAFETY: only one `Producer` exists per split and `push` takes `&mut self`.
        unsafe { self.ring.produce(byte) }
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Number of bytes currently buffered
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Usable capacity (`C - 1`)
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

/// Read half of a split [`RingBuffer`]
///
/// Runs in the polling loop. `pop` and `read_into` never block.
pub struct Consumer<'a, const C: usize = DEFAULT_CAPACITY> {
    ring: &'a RingBuffer<C>,
}

impl<const C: usize> Consumer<'_, C> {
    /// Remove the oldest byte, or `None` if empty
    pub fn pop(&mut self) -> Option<u8> {
        // SAFETY: only one `Consumer` exists per split and `pop` takes `&mut self`.
        unsafe { self.ring.consume() }
    }

    /// Pop up to `buf.len()` bytes into `buf`, returning how many were written
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        fill_from(buf, || self.pop())
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of bytes currently buffered
    pub fn len(&self) -> usize {
        self.ring.len()
    }
}

impl<const C: usize> ByteSource for Consumer<'_, C> {
    fn supply(&mut self, out: &mut [u8]) -> usize {
        self.read_into(out)
    }
}

fn fill_from(buf: &mut [u8], mut next: impl FnMut() -> Option<u8>) -> usize {
    let mut count = 0;
    for slot in buf.iter_mut() {
        match next() {
            Some(byte) => {
                *slot = byte;
                count += 1;
            }
            None => break,
        }
    }
    count
}
