//! Lock-free block channel built on two `ringbuf` SPSC rings.
//!
//! Sample data and block lengths travel in separate rings.  The sender
//! pushes the samples first and the length last, so a length visible to the
//! receiver always has its samples behind it.  Both rings are allocated up
//! front; [`BlockSender::post`] never allocates, never locks and never
//! blocks.
//!
//! Admission is decided from the `queued_*` counters rather than the rings'
//! cached indices: the receiver decrements them only after popping, so the
//! sender never sees more room than the rings really have.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use super::{BlockSink, ConduitError, ConduitStats};
use crate::audio::AudioBlock;

/// Largest sample ring [`block_channel`] will allocate (64 MiB of `f32`).
pub const MAX_CONDUIT_SAMPLES: usize = 1 << 24;

// ---------------------------------------------------------------------------
// Shared counters
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Shared {
    capacity_blocks: usize,
    capacity_samples: usize,
    queued_blocks: AtomicUsize,
    queued_samples: AtomicUsize,
    sender_alive: AtomicBool,
    receiver_alive: AtomicBool,
    sent: AtomicU64,
    dropped_full: AtomicU64,
    dropped_closed: AtomicU64,
    rejected_oversized: AtomicU64,
}

impl Shared {
    fn new(capacity_blocks: usize, capacity_samples: usize) -> Self {
        Self {
            capacity_blocks,
            capacity_samples,
            queued_blocks: AtomicUsize::new(0),
            queued_samples: AtomicUsize::new(0),
            sender_alive: AtomicBool::new(true),
            receiver_alive: AtomicBool::new(true),
            sent: AtomicU64::new(0),
            dropped_full: AtomicU64::new(0),
            dropped_closed: AtomicU64::new(0),
            rejected_oversized: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> ConduitStats {
        ConduitStats {
            sent: self.sent.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            dropped_closed: self.dropped_closed.load(Ordering::Relaxed),
            rejected_oversized: self.rejected_oversized.load(Ordering::Relaxed),
        }
    }
}

/// Create a bounded block channel.
///
/// The channel holds up to `capacity_blocks` blocks of at most
/// `max_block_len` samples each.
///
/// # Panics
///
/// Panics if `capacity_blocks == 0`, `max_block_len == 0`, or their product
/// exceeds [`MAX_CONDUIT_SAMPLES`].
///
/// ```
/// use frame_forwarder::conduit::{block_channel, BlockSink};
///
/// let (mut tx, mut rx) = block_channel(4, 128);
/// tx.post(&[0.1, -0.2, 0.3]).unwrap();
///
/// let block = rx.try_recv().unwrap();
/// assert_eq!(block.as_slice(), &[0.1, -0.2, 0.3]);
/// assert!(rx.try_recv().is_none());
/// ```
pub fn block_channel(capacity_blocks: usize, max_block_len: usize) -> (BlockSender, BlockReceiver) {
    assert!(capacity_blocks > 0, "conduit capacity must be > 0");
    assert!(max_block_len > 0, "conduit block length must be > 0");

    let capacity_samples = capacity_blocks
        .checked_mul(max_block_len)
        .filter(|&n| n <= MAX_CONDUIT_SAMPLES)
        .expect("conduit sample capacity exceeds MAX_CONDUIT_SAMPLES");
    let (samples_tx, samples_rx) = HeapRb::<f32>::new(capacity_samples).split();
    let (lengths_tx, lengths_rx) = HeapRb::<usize>::new(capacity_blocks).split();
    let shared = Arc::new(Shared::new(capacity_blocks, capacity_samples));

    let sender = BlockSender {
        samples: samples_tx,
        lengths: lengths_tx,
        max_block_len,
        shared: Arc::clone(&shared),
    };
    let receiver = BlockReceiver {
        samples: samples_rx,
        lengths: lengths_rx,
        shared,
    };
    (sender, receiver)
}

// ---------------------------------------------------------------------------
// BlockSender
// ---------------------------------------------------------------------------

/// Producer half of the conduit, owned by the real-time side.
pub struct BlockSender {
    samples: HeapProd<f32>,
    lengths: HeapProd<usize>,
    max_block_len: usize,
    shared: Arc<Shared>,
}

impl BlockSender {
    /// Largest block the channel accepts.
    pub fn max_block_len(&self) -> usize {
        self.max_block_len
    }

    /// `true` once the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        !self.shared.receiver_alive.load(Ordering::Acquire)
    }

    /// Counters as seen from the sending side.
    pub fn stats(&self) -> ConduitStats {
        self.shared.snapshot()
    }
}

impl BlockSink for BlockSender {
    /// Enqueue one block, whole or not at all.
    fn post(&mut self, block: &[f32]) -> Result<(), ConduitError> {
        if self.is_closed() {
            self.shared.dropped_closed.fetch_add(1, Ordering::Relaxed);
            return Err(ConduitError::Closed);
        }
        if block.len() > self.max_block_len {
            self.shared.rejected_oversized.fetch_add(1, Ordering::Relaxed);
            return Err(ConduitError::Oversized {
                len: block.len(),
                max: self.max_block_len,
            });
        }
        // Single producer: room can only grow between this check and the push.
        let shared = &self.shared;
        let blocks_free = shared.capacity_blocks - shared.queued_blocks.load(Ordering::Acquire);
        let samples_free = shared.capacity_samples - shared.queued_samples.load(Ordering::Acquire);
        if blocks_free == 0 || samples_free < block.len() {
            self.shared.dropped_full.fetch_add(1, Ordering::Relaxed);
            return Err(ConduitError::Full);
        }

        let written = self.samples.push_slice(block);
        debug_assert_eq!(written, block.len());
        if self.lengths.try_push(block.len()).is_err() {
            // unreachable while the vacancy check above holds
            self.shared.dropped_full.fetch_add(1, Ordering::Relaxed);
            return Err(ConduitError::Full);
        }
        self.shared.queued_samples.fetch_add(written, Ordering::Release);
        self.shared.queued_blocks.fetch_add(1, Ordering::Release);
        self.shared.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Drop for BlockSender {
    fn drop(&mut self) {
        self.shared.sender_alive.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// BlockReceiver
// ---------------------------------------------------------------------------

/// Consumer half of the conduit.  May allocate; never used on the real-time
/// side.
pub struct BlockReceiver {
    samples: HeapCons<f32>,
    lengths: HeapCons<usize>,
    shared: Arc<Shared>,
}

impl BlockReceiver {
    /// Pop the oldest pending block, if any.
    pub fn try_recv(&mut self) -> Option<AudioBlock> {
        let mut samples = Vec::new();
        self.try_recv_into(&mut samples)?;
        Some(AudioBlock::new(samples))
    }

    /// Pop the oldest pending block into `out`, replacing its contents.
    ///
    /// Returns the block length, or `None` when nothing is pending.  Reusing
    /// `out` across calls avoids a fresh allocation per block.
    pub fn try_recv_into(&mut self, out: &mut Vec<f32>) -> Option<usize> {
        let len = self.lengths.try_pop()?;
        out.clear();
        out.resize(len, 0.0);
        let read = self.samples.pop_slice(out);
        debug_assert_eq!(read, len);
        out.truncate(read);
        self.shared.queued_samples.fetch_sub(read, Ordering::Release);
        self.shared.queued_blocks.fetch_sub(1, Ordering::Release);
        Some(read)
    }

    /// Pop every pending block in arrival order.
    pub fn drain(&mut self) -> Vec<AudioBlock> {
        let mut blocks = Vec::with_capacity(self.pending());
        while let Some(block) = self.try_recv() {
            blocks.push(block);
        }
        blocks
    }

    /// Number of blocks waiting to be received.
    pub fn pending(&self) -> usize {
        self.shared.queued_blocks.load(Ordering::Acquire)
    }

    /// `true` when the sender is gone and every block has been received.
    pub fn is_closed(&self) -> bool {
        !self.shared.sender_alive.load(Ordering::Acquire) && self.pending() == 0
    }

    /// Counters for every post attempt made so far.
    pub fn stats(&self) -> ConduitStats {
        self.shared.snapshot()
    }
}

impl Drop for BlockReceiver {
    fn drop(&mut self) {
        self.shared.receiver_alive.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
