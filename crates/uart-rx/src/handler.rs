//! Receive Handler
//!
//! The producer side of the ring: takes one received byte at a time, pushes
//! it, and keeps count of what had to be dropped.

use crate::throttle::DoEvery;
use ring_buffer::{Producer, DEFAULT_CAPACITY};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Receive counters shared with whoever reports status
#[derive(Debug, Default)]
pub struct RxCounters {
    received: AtomicU64,
    dropped: AtomicU64,
}

impl RxCounters {
    /// Take a point-in-time copy of the counters
    pub fn snapshot(&self) -> RxStats {
        let received = self.received.load(Ordering::Relaxed);
        let dropped = self.dropped.load(Ordering::Relaxed);
        RxStats {
            received,
            accepted: received.saturating_sub(dropped),
            dropped,
        }
    }
}

/// Receive statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RxStats {
    /// Bytes delivered to the handler
    pub received: u64,
    /// Bytes queued into the ring
    pub accepted: u64,
    /// Bytes dropped because the ring was full
    pub dropped: u64,
}

/// Byte-at-a-time receive handler feeding the ring
pub struct RxHandler<'a, const C: usize = DEFAULT_CAPACITY> {
    /// Write half of the ring
    producer: Producer<'a, C>,
    /// Heartbeat throttle
    heartbeat: DoEvery,
    /// Shared counters
    counters: Arc<RxCounters>,
    /// Whether the last push was rejected
    overflowing: bool,
}

impl<'a, const C: usize> RxHandler<'a, C> {
    /// Create a handler around the ring's producer half
    pub fn new(producer: Producer<'a, C>, heartbeat_every: u32) -> Self {
        Self {
            producer,
            heartbeat: DoEvery::new(heartbeat_every),
            counters: Arc::new(RxCounters::default()),
            overflowing: false,
        }
    }

    /// Handle one received byte
    ///
    /// Never blocks. Returns `false` if the ring was full and the byte was
    /// dropped; the drop is counted and the start of each overflow burst is
    /// logged.
    pub fn on_receive(&mut self, byte: u8) -> bool {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        let accepted = self.producer.push(byte);
        if accepted {
            if self.overflowing {
                self.overflowing = false;
                info!(
                    dropped_total = self.counters.dropped.load(Ordering::Relaxed),
                    "Receive buffer has room again"
                );
            }
        } else {
            let dropped = self.counters.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if !self.overflowing {
                self.overflowing = true;
                warn!(
                    capacity = self.producer.capacity(),
                    dropped_total = dropped,
                    "Receive buffer full, dropping bytes"
                );
            }
        }

        if self.heartbeat.tick() {
            trace!(
                received = self.counters.received.load(Ordering::Relaxed),
                buffered = self.producer.len(),
                "rx heartbeat"
            );
        }

        accepted
    }

    /// Handle a run of received bytes, returning how many were accepted
    pub fn on_receive_all(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&byte| self.on_receive(byte)).count()
    }

    /// Current receive statistics
    pub fn stats(&self) -> RxStats {
        self.counters.snapshot()
    }

    /// Shared handle to the counters, for status reporting elsewhere
    pub fn counters(&self) -> Arc<RxCounters> {
        Arc::clone(&self.counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_buffer::RingBuffer;

    #[test]
    fn test_counts_drops_without_evicting() {
        let mut ring = RingBuffer::<4>::new();
        let (producer, mut consumer) = ring.split();
        let mut handler = RxHandler::new(producer, 1000);

        assert_eq!(handler.on_receive_all(&[0x41, 0x42, 0x43, 0x44, 0x45]), 3);

        let stats = handler.stats();
        assert_eq!(stats.received, 5);
        assert_eq!(stats.accepted, 3);
        assert_eq!(stats.dropped, 2);

        assert_eq!(consumer.pop(), Some(0x41));
        assert_eq!(consumer.pop(), Some(0x42));
        assert_eq!(consumer.pop(), Some(0x43));
        assert_eq!(consumer.pop(), None);
    }

    #[test]
    fn test_recovers_after_drain() {
        let mut ring = RingBuffer::<4>::new();
        let (producer, mut consumer) = ring.split();
        let mut handler = RxHandler::new(producer, 1);
        let counters = handler.counters();

        handler.on_receive_all(&[1, 2, 3, 4]);
        assert!(handler.overflowing);

        assert_eq!(consumer.pop(), Some(1));
        assert!(handler.on_receive(5));
        assert!(!handler.overflowing);

        assert_eq!(counters.snapshot().dropped, 1);
        assert_eq!(counters.snapshot().accepted, 4);
    }
}
